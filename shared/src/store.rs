//! Store capability consumed by the scan coordinator

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{PartialScanResult, ScanRequest};

/// A table store that can execute one (optionally segmented) scan call.
///
/// Implementations are shared across concurrently running segment tasks and
/// must not rely on per-call mutable state.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Scan once, honouring `segment`/`total_segments` when present
    async fn scan(&self, request: ScanRequest) -> Result<PartialScanResult>;
}
