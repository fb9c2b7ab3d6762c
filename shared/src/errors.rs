//! Error types for TableScan

use thiserror::Error;

/// Result type alias using TableScan Error
pub type Result<T> = std::result::Result<T, Error>;

/// TableScan error types
#[derive(Error, Debug)]
pub enum Error {
    /// Segment count outside `1..=MAX_SEGMENTS`
    #[error("Invalid segment count: {0}")]
    InvalidSegmentCount(i32),

    /// Page size must be > 0 and page number >= 1
    #[error("Invalid page spec: page_size={page_size}, page_number={page_number}")]
    InvalidPageSpec { page_size: i32, page_number: i32 },

    /// A segment of a parallel scan failed; the whole round fails with it
    #[error("Scan segment {segment} failed: {source}")]
    ScanSegmentFailure {
        segment: i32,
        #[source]
        source: Box<Error>,
    },

    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Invalid continuation cursor
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// DynamoDB error
    #[error("Database error: {0}")]
    Database(String),

    /// JSON Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DynamoDB serialization error
    #[error("DynamoDB serialization error: {0}")]
    DynamoSerialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a store error with the identity of the segment that produced it
    pub fn segment_failure(segment: i32, source: Error) -> Self {
        Error::ScanSegmentFailure {
            segment,
            source: Box::new(source),
        }
    }

    /// Returns the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidSegmentCount(_) => "invalid_segment_count",
            Error::InvalidPageSpec { .. } => "invalid_page_spec",
            Error::ScanSegmentFailure { .. } => "scan_segment_failure",
            Error::NotFound(_) => "not_found",
            Error::InvalidCursor(_) => "invalid_cursor",
            Error::Validation(_) => "validation_error",
            Error::Database(_) => "database_error",
            Error::Serialization(_) => "serialization_error",
            Error::DynamoSerialization(_) => "serialization_error",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidSegmentCount(_) => 400,
            Error::InvalidPageSpec { .. } => 400,
            Error::ScanSegmentFailure { .. } => 502,
            Error::NotFound(_) => 404,
            Error::InvalidCursor(_) => 400,
            Error::Validation(_) => 400,
            Error::Database(_) => 500,
            Error::Serialization(_) => 400,
            Error::DynamoSerialization(_) => 500,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }
}
