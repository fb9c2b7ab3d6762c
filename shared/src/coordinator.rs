//! Parallel scan coordination
//!
//! One round dispatches every segment request at once, waits for all of them,
//! and folds the partial results into a single [`MergedScanResult`]. The round
//! is all-or-nothing: if any segment fails, no merged result is produced.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::models::{MergedScanResult, Page, PageSpec, PartialScanResult, ScanRequest};
use crate::segmenter::ScanSegmenter;
use crate::store::ScanStore;

/// Runs segmented scans against a shared store
pub struct ScanCoordinator<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ScanCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ScanCoordinator<S>
where
    S: ScanStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Scan every request concurrently and return the partial results in
    /// request order.
    ///
    /// All calls are awaited before returning, even when one fails early. If
    /// several segments fail, the one earliest in request order is reported.
    /// Dropping the returned future aborts every in-flight segment.
    pub async fn execute(&self, requests: Vec<ScanRequest>) -> Result<Vec<PartialScanResult>> {
        let segments: Vec<i32> = requests
            .iter()
            .enumerate()
            .map(|(slot, r)| r.segment.unwrap_or(slot as i32))
            .collect();

        let mut tasks = JoinSet::new();
        for (slot, request) in requests.into_iter().enumerate() {
            let store = Arc::clone(&self.store);
            debug!(
                table = %request.table_name,
                segment = segments[slot],
                total_segments = ?request.total_segments,
                "Dispatching scan segment"
            );
            tasks.spawn(async move { (slot, store.scan(request).await) });
        }

        // Indexed by slot so completion order never leaks into merge order
        let mut results: Vec<Option<Result<PartialScanResult>>> =
            (0..segments.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, result)) => {
                    if let Err(e) = &result {
                        warn!(segment = segments[slot], error = %e, "Scan segment failed");
                    }
                    results[slot] = Some(result);
                }
                Err(e) => warn!(error = %e, "Scan segment task did not complete"),
            }
        }

        let mut partials = Vec::with_capacity(results.len());
        for (slot, result) in results.into_iter().enumerate() {
            match result {
                Some(Ok(partial)) => partials.push(partial),
                Some(Err(e)) => return Err(Error::segment_failure(segments[slot], e)),
                None => {
                    return Err(Error::segment_failure(
                        segments[slot],
                        Error::Internal("segment task panicked".to_string()),
                    ))
                }
            }
        }

        Ok(partials)
    }

    /// Fold partial results into one, preserving segment order.
    ///
    /// The continuation cursor is last-writer-wins: only the last partial that
    /// carries a cursor is kept, even if earlier segments were also incomplete.
    pub fn merge<I>(partials: I) -> MergedScanResult
    where
        I: IntoIterator<Item = PartialScanResult>,
    {
        partials
            .into_iter()
            .fold(MergedScanResult::default(), |mut merged, partial| {
                merged.items.extend(partial.items);
                merged.count = merged.count.saturating_add(partial.count);
                merged.scanned_count = merged.scanned_count.saturating_add(partial.scanned_count);
                if let Some(key) = partial.last_evaluated_key.filter(|k| !k.is_empty()) {
                    merged.last_evaluated_key = Some(key);
                }
                merged
            })
    }

    /// Slice one page out of a merged result. Out-of-range pages are empty.
    pub fn paginate(merged: MergedScanResult, spec: PageSpec) -> Page {
        let MergedScanResult {
            mut items,
            count,
            scanned_count,
            last_evaluated_key,
        } = merged;

        let (start, end) = spec.bounds(items.len());
        let items: Vec<_> = items.drain(start..end).collect();

        Page {
            page_number: spec.page_number(),
            page_size: spec.page_size(),
            items,
            count,
            scanned_count,
            last_evaluated_key,
        }
    }

    /// Segment, dispatch and merge one full scan round
    pub async fn execute_without_pagination(
        &self,
        base: &ScanRequest,
        num_segments: i32,
    ) -> Result<MergedScanResult> {
        let requests = ScanSegmenter::new(num_segments)?.build(base);
        let partials = self.execute(requests).await?;
        let merged = Self::merge(partials);

        info!(
            table = %base.table_name,
            segments = num_segments,
            count = merged.count,
            scanned_count = merged.scanned_count,
            has_more = merged.last_evaluated_key.is_some(),
            "Parallel scan complete"
        );

        Ok(merged)
    }

    /// Like [`Self::execute_without_pagination`], then return one page of the
    /// merged items. Page arguments are validated before any store call.
    pub async fn execute_with_pagination(
        &self,
        base: &ScanRequest,
        num_segments: i32,
        page_size: i32,
        page_number: i32,
    ) -> Result<Page> {
        let spec = PageSpec::new(page_size, page_number)?;
        let merged = self.execute_without_pagination(base, num_segments).await?;
        Ok(Self::paginate(merged, spec))
    }
}
