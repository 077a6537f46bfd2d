//! Batch orchestrator (spec §4.5, C7): submit → poll-until-done → collect,
//! for create/update/delete alike.
//!
//! Grounded on `original_source/stockx/api/batch.py`'s `batch_completed`
//! poll-loop shape and the teacher's `BatchManager`/`execute_with_retry`
//! for the Rust builder/config conventions. The teacher's per-tier
//! `RateLimitTier` has no counterpart here: this spec's rate limiting is
//! global (one `HttpClient`, one throttle), not per-endpoint-tier, so that
//! concept is dropped.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::api::batch::BatchApi;
use crate::error::{Error, Result};
use crate::models::{
    BatchCreateInput, BatchDeleteInput, BatchItemResult, BatchKind, BatchStatus, BatchUpdateInput,
};

/// Initial backoff for [`BatchOrchestrator::await_completion`] (spec §4.5).
const INITIAL_POLL_DELAY: Duration = Duration::from_secs(1);

pub struct BatchOrchestrator {
    api: BatchApi,
}

impl BatchOrchestrator {
    pub fn new(api: BatchApi) -> Self {
        Self { api }
    }

    pub async fn submit_create(&self, items: &[BatchCreateInput]) -> Result<BatchStatus> {
        self.api.submit_create(items).await
    }

    pub async fn submit_update(&self, items: &[BatchUpdateInput]) -> Result<BatchStatus> {
        self.api.submit_update(items).await
    }

    pub async fn submit_delete(&self, items: &[BatchDeleteInput]) -> Result<BatchStatus> {
        self.api.submit_delete(items).await
    }

    pub async fn status(&self, kind: BatchKind, batch_id: &str) -> Result<BatchStatus> {
        self.api.status(kind, batch_id).await
    }

    pub async fn items(&self, kind: BatchKind, batch_id: &str) -> Result<Vec<BatchItemResult>> {
        self.api.items(kind, batch_id, None).await
    }

    /// Polls `batch_ids` (all of kind `kind`) until each is done or the
    /// wall-clock `timeout` elapses, per spec §4.5's algorithm exactly:
    /// exponential backoff starting at 1s, doubling, clamped to the
    /// remaining budget.
    ///
    /// On full completion, returns each batch's collected item results. On
    /// timeout with pending batches remaining, returns `Err(BatchTimeout)`
    /// carrying the still-queued batch ids and whatever item results are
    /// already available for ALL batches in the wait-set (§4.5).
    pub async fn await_completion(
        &self,
        kind: BatchKind,
        batch_ids: Vec<String>,
        timeout: Duration,
    ) -> Result<HashMap<String, Vec<BatchItemResult>>> {
        let deadline = Instant::now() + timeout;
        let mut pending = batch_ids;
        let mut finished: Vec<String> = Vec::new();
        let mut sleep_duration = INITIAL_POLL_DELAY;

        loop {
            // The status fetch for the current pending set always runs,
            // even if the budget is already exhausted when this iteration
            // begins (spec §5: a timed-out-on-entry call still gets one
            // status pass), matching `listings.rs::await_operation`'s
            // check-then-sleep ordering.
            let mut still_pending = Vec::new();
            for batch_id in &pending {
                let status = self.api.status(kind, batch_id).await?;
                if status.is_done() {
                    finished.push(batch_id.clone());
                } else {
                    still_pending.push(batch_id.clone());
                }
            }
            pending = still_pending;

            if pending.is_empty() {
                let mut results = HashMap::new();
                for batch_id in &finished {
                    let items = self.api.items(kind, batch_id, None).await?;
                    results.insert(batch_id.clone(), items);
                }
                return Ok(results);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let this_sleep = sleep_duration.min(remaining);
            tokio::time::sleep(this_sleep).await;
            sleep_duration = (sleep_duration * 2).min(remaining.max(Duration::from_millis(1)));
        }

        tracing::warn!(
            pending = pending.len(),
            finished = finished.len(),
            "batch poll budget exhausted with pending batches remaining"
        );

        let mut partial_results = Vec::new();
        for batch_id in finished.iter().chain(pending.iter()) {
            if let Ok(items) = self.api.items(kind, batch_id, None).await {
                partial_results.extend(items);
            }
        }

        Err(Error::BatchTimeout {
            timed_out_batch_ids: pending,
            partial_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_poll_delay_matches_spec() {
        assert_eq!(INITIAL_POLL_DELAY, Duration::from_secs(1));
    }
}
