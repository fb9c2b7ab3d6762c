//! TableScan Core Library
//!
//! Shared functionality for TableScan functions including:
//! - Scan models and pagination
//! - DynamoDB operations
//! - Parallel scan segmenting and coordination
//! - Continuation cursor encoding
//! - Configuration and error types

pub mod models;
pub mod dynamo;
pub mod store;
pub mod segmenter;
pub mod coordinator;
pub mod cursor;
pub mod config;
pub mod errors;

pub use models::*;
pub use dynamo::DynamoClient;
pub use store::ScanStore;
pub use segmenter::ScanSegmenter;
pub use coordinator::ScanCoordinator;
pub use config::StoreConfig;
pub use errors::{Error, Result};
