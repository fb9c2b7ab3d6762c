//! Domain models for TableScan
//!
//! These types describe one parallel scan round:
//! - ScanRequest: base scan parameters, optionally tagged with a segment
//! - PartialScanResult: what one segment returned
//! - MergedScanResult: all segments of a round combined
//! - Page: a fixed-size window over a merged result

use aws_sdk_dynamodb::operation::query::QueryOutput;
use aws_sdk_dynamodb::operation::scan::ScanOutput;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{Error, Result};

/// A single table record
pub type Item = HashMap<String, AttributeValue>;

/// Parameters for a scan, shared by every segment of a parallel round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub filter_expression: Option<String>,
    pub projection_expression: Option<String>,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    pub limit: Option<i32>,
    pub consistent_read: Option<bool>,
    pub exclusive_start_key: Option<Item>,
    /// Zero-based segment index
    pub segment: Option<i32>,
    /// Total number of segments in the round
    pub total_segments: Option<i32>,
}

impl ScanRequest {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn with_filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    pub fn with_projection(mut self, expression: impl Into<String>) -> Self {
        self.projection_expression = Some(expression.into());
        self
    }

    pub fn with_attribute_name(mut self, placeholder: impl Into<String>, name: impl Into<String>) -> Self {
        self.expression_attribute_names
            .get_or_insert_with(HashMap::new)
            .insert(placeholder.into(), name.into());
        self
    }

    pub fn with_attribute_value(mut self, placeholder: impl Into<String>, value: AttributeValue) -> Self {
        self.expression_attribute_values
            .get_or_insert_with(HashMap::new)
            .insert(placeholder.into(), value);
        self
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    pub fn with_start_key(mut self, key: Item) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    /// Copy of this request tagged as segment `segment` of `total_segments`
    pub fn for_segment(&self, segment: i32, total_segments: i32) -> Self {
        Self {
            segment: Some(segment),
            total_segments: Some(total_segments),
            ..self.clone()
        }
    }
}

/// Result of scanning one segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialScanResult {
    pub items: Vec<Item>,
    pub count: u64,
    pub scanned_count: u64,
    /// Present when the segment has more data beyond this read
    pub last_evaluated_key: Option<Item>,
}

impl From<ScanOutput> for PartialScanResult {
    fn from(output: ScanOutput) -> Self {
        Self {
            items: output.items.unwrap_or_default(),
            count: non_negative(output.count),
            scanned_count: non_negative(output.scanned_count),
            last_evaluated_key: non_empty(output.last_evaluated_key),
        }
    }
}

/// All segments of one parallel scan round, combined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedScanResult {
    /// Segment order, then within-segment order. Not globally sorted.
    pub items: Vec<Item>,
    pub count: u64,
    pub scanned_count: u64,
    /// Cursor of the last segment (in segment order) that reported one
    pub last_evaluated_key: Option<Item>,
}

/// Validated page size and 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page_size: usize,
    page_number: usize,
}

impl PageSpec {
    pub fn new(page_size: i32, page_number: i32) -> Result<Self> {
        if page_size <= 0 || page_number < 1 {
            return Err(Error::InvalidPageSpec {
                page_size,
                page_number,
            });
        }
        Ok(Self {
            page_size: page_size as usize,
            page_number: page_number as usize,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Half-open item range of this page, clamped to `len`
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = (self.page_number - 1).saturating_mul(self.page_size).min(len);
        let end = self.page_number.saturating_mul(self.page_size).min(len);
        (start, end)
    }
}

/// A window over a merged scan result.
///
/// `count`, `scanned_count` and `last_evaluated_key` describe the whole round,
/// not just the items on this page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page_number: usize,
    pub page_size: usize,
    pub items: Vec<Item>,
    pub count: u64,
    pub scanned_count: u64,
    pub last_evaluated_key: Option<Item>,
}

impl Page {
    /// Number of pages the whole round spans at this page size.
    /// Zero when `page_size` is zero.
    pub fn total_pages(&self) -> u64 {
        match self.page_size as u64 {
            0 => 0,
            size => self.count.div_ceil(size),
        }
    }
}

/// Parameters for a key-condition query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub key_condition_expression: String,
    pub filter_expression: Option<String>,
    pub projection_expression: Option<String>,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    pub limit: Option<i32>,
    pub scan_index_forward: Option<bool>,
    pub exclusive_start_key: Option<Item>,
}

/// One page of query results, as returned by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub count: u64,
    pub scanned_count: u64,
    pub last_evaluated_key: Option<Item>,
}

impl From<QueryOutput> for QueryPage {
    fn from(output: QueryOutput) -> Self {
        Self {
            items: output.items.unwrap_or_default(),
            count: non_negative(output.count),
            scanned_count: non_negative(output.scanned_count),
            last_evaluated_key: non_empty(output.last_evaluated_key),
        }
    }
}

fn non_negative(n: i32) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn non_empty(key: Option<Item>) -> Option<Item> {
    key.filter(|k| !k.is_empty())
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        let response = ErrorResponse::new(e.code(), e.to_string());
        match e {
            Error::ScanSegmentFailure { segment, .. } => {
                response.with_details(serde_json::json!({ "segment": segment }))
            }
            _ => response,
        }
    }
}
