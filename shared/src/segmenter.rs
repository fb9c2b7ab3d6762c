//! Segmenter for splitting a full-table scan into parallel segments
//!
//! The store partitions the table itself; all we do is issue one request per
//! segment index `0..total_segments`, each otherwise identical to the base.

use crate::errors::{Error, Result};
use crate::models::ScanRequest;

/// Largest segment count the store accepts
pub const MAX_SEGMENTS: i32 = 1_000_000;

/// ScanSegmenter builds the per-segment requests of one scan round
#[derive(Debug, Clone, Copy)]
pub struct ScanSegmenter {
    total_segments: i32,
}

impl ScanSegmenter {
    /// Create a segmenter for `total_segments` segments
    pub fn new(total_segments: i32) -> Result<Self> {
        if !(1..=MAX_SEGMENTS).contains(&total_segments) {
            return Err(Error::InvalidSegmentCount(total_segments));
        }
        Ok(Self { total_segments })
    }

    /// One request per segment, in segment order
    pub fn build(&self, base: &ScanRequest) -> Vec<ScanRequest> {
        (0..self.total_segments)
            .map(|segment| base.for_segment(segment, self.total_segments))
            .collect()
    }

    /// Get the segment count
    pub fn total_segments(&self) -> i32 {
        self.total_segments
    }
}
