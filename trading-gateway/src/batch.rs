//! Batch orchestration for multi-order submission and bulk cancellation.
//!
//! Venues rarely take an arbitrary list of orders atomically. The
//! [`BatchOrchestrator`] sequences such work:
//!
//! - submission without a native batch endpoint goes one order at a time in
//!   input order, with a fixed delay between orders
//! - submission with a native endpoint uses one call when the list fits the
//!   venue's batch size and falls back to one-at-a-time otherwise
//! - bulk cancellation splits the ids into ceil(N/G) groups and stops at the
//!   first failing group
//!
//! Work that stops part way through reports what was already done through
//! [`VenueError::PartialBatch`]. Placed orders are left resting.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{VenueError, VenueResult};

/// Fixed spacing between sequential order submissions.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(100);

/// Group size used when a venue does not state one.
pub const DEFAULT_CANCEL_GROUP_SIZE: usize = 20;

/// Split `items` into consecutive groups of at most `group_size`.
///
/// Produces `ceil(len / group_size)` groups; every item appears exactly once
/// and listing order is preserved.
pub fn chunk_groups<T>(items: &[T], group_size: usize) -> Vec<&[T]> {
    items.chunks(group_size.max(1)).collect()
}

/// Number of groups `chunk_groups` produces.
pub fn group_count(len: usize, group_size: usize) -> usize {
    len.div_ceil(group_size.max(1))
}

/// Sequences multi-order work against one venue.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    submit_delay: Duration,
    max_batch_size: usize,
    cancel_group_size: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self {
            submit_delay: DEFAULT_SUBMIT_DELAY,
            max_batch_size: 1,
            cancel_group_size: DEFAULT_CANCEL_GROUP_SIZE,
        }
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator with the default delay and group size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay inserted between sequential submissions.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Set the largest list the venue's native batch endpoint accepts.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    /// Set the bulk cancellation group size.
    pub fn with_cancel_group_size(mut self, size: usize) -> Self {
        self.cancel_group_size = size.max(1);
        self
    }

    pub fn submit_delay(&self) -> Duration {
        self.submit_delay
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn cancel_group_size(&self) -> usize {
        self.cancel_group_size
    }

    /// Submit `items` one at a time in input order.
    ///
    /// # Returns
    ///
    /// The id returned for each item, in submission order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. When earlier items succeeded the error is
    /// [`VenueError::PartialBatch`] carrying their ids.
    pub async fn submit_sequential<T, F, Fut>(&self, items: &[T], mut submit: F) -> VenueResult<Vec<String>>
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = VenueResult<String>>,
    {
        let mut ids = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if index > 0 && !self.submit_delay.is_zero() {
                tokio::time::sleep(self.submit_delay).await;
            }
            match submit(item).await {
                Ok(id) => {
                    debug!("batch item {}/{} placed: {}", index + 1, items.len(), id);
                    ids.push(id);
                }
                Err(e) => {
                    warn!(
                        "batch stopped at item {}/{} after {} placed: {}",
                        index + 1,
                        items.len(),
                        ids.len(),
                        e
                    );
                    return Err(VenueError::partial_batch(ids, e));
                }
            }
        }
        Ok(ids)
    }

    /// Submit `items` through a native batch endpoint when they fit in one
    /// call, otherwise one at a time.
    ///
    /// `submit_batch` must itself report a partially accepted batch as
    /// `PartialBatch`.
    pub async fn submit_batched<T, B, BFut, S, SFut>(
        &self,
        items: &[T],
        submit_batch: B,
        submit_one: S,
    ) -> VenueResult<Vec<String>>
    where
        B: FnOnce(&[T]) -> BFut,
        BFut: Future<Output = VenueResult<Vec<String>>>,
        S: FnMut(&T) -> SFut,
        SFut: Future<Output = VenueResult<String>>,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        if items.len() > 1 && items.len() <= self.max_batch_size {
            debug!("submitting {} orders in one batch call", items.len());
            return submit_batch(items).await;
        }
        self.submit_sequential(items, submit_one).await
    }

    /// Cancel `ids` in groups of the configured size, one call per group.
    ///
    /// `cancel_group` returns the ids the venue confirmed. A group that is
    /// only partly confirmed reports the confirmed ids through
    /// `PartialBatch`.
    ///
    /// # Returns
    ///
    /// The confirmed ids of every group, in listing order.
    ///
    /// # Errors
    ///
    /// The first failing group stops the run; remaining groups are not sent.
    /// Ids confirmed so far, including those of the failing group, are
    /// reported through `PartialBatch`.
    pub async fn cancel_in_groups<F, Fut>(&self, ids: &[String], mut cancel_group: F) -> VenueResult<Vec<String>>
    where
        F: FnMut(&[String]) -> Fut,
        Fut: Future<Output = VenueResult<Vec<String>>>,
    {
        let groups = chunk_groups(ids, self.cancel_group_size);
        let total = groups.len();
        let mut canceled = Vec::with_capacity(ids.len());

        for (index, group) in groups.into_iter().enumerate() {
            match cancel_group(group).await {
                Ok(confirmed) => {
                    debug!(
                        "cancel group {}/{} done ({} of {} orders)",
                        index + 1,
                        total,
                        confirmed.len(),
                        group.len()
                    );
                    canceled.extend(confirmed);
                }
                Err(e) => {
                    let (confirmed, source) = e.into_partial();
                    warn!(
                        "cancel group {}/{} failed after {} confirmed: {}",
                        index + 1,
                        total,
                        confirmed.len(),
                        source
                    );
                    canceled.extend(confirmed);
                    return Err(VenueError::partial_batch(canceled, source));
                }
            }
        }
        Ok(canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("ord-{}", i)).collect()
    }

    #[test]
    fn test_chunk_groups_45_by_20() {
        let orders = ids(45);
        let groups = chunk_groups(&orders, 20);
        let sizes: Vec<_> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, [20, 20, 5]);
        assert_eq!(group_count(45, 20), 3);

        let flattened: Vec<_> = groups.concat();
        assert_eq!(flattened, orders);
    }

    #[test]
    fn test_group_count_matches_chunks() {
        for n in [0, 1, 19, 20, 21, 40, 41, 100] {
            let items = ids(n);
            assert_eq!(chunk_groups(&items, 20).len(), group_count(n, 20));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_submission_keeps_order_and_delay() {
        let orchestrator = BatchOrchestrator::new();
        let start = Instant::now();

        let result = orchestrator
            .submit_sequential(&[1, 2, 3], |n| {
                let n = *n;
                async move { Ok(format!("id-{}", n)) }
            })
            .await
            .unwrap();

        assert_eq!(result, ["id-1", "id-2", "id-3"]);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_failure_reports_first_id() {
        let orchestrator = BatchOrchestrator::new();
        let attempts = Arc::new(Mutex::new(Vec::new()));

        let err = orchestrator
            .submit_sequential(&[1, 2, 3], |n| {
                let n = *n;
                let attempts = attempts.clone();
                async move {
                    attempts.lock().unwrap().push(n);
                    if n == 2 {
                        Err(VenueError::api("51008", "Insufficient balance"))
                    } else {
                        Ok(format!("id-{}", n))
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(*attempts.lock().unwrap(), [1, 2]);
        match err {
            VenueError::PartialBatch { completed, source } => {
                assert_eq!(completed, ["id-1"]);
                assert_eq!(source.venue_code(), Some("51008"));
            }
            other => panic!("expected PartialBatch, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_is_plain_error() {
        let err = BatchOrchestrator::new()
            .submit_sequential(&[1], |_| async { Err(VenueError::Transport("reset".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::Transport(_)));
    }

    #[tokio::test]
    async fn test_submit_batched_uses_native_endpoint_when_it_fits() {
        let orchestrator = BatchOrchestrator::new()
            .with_submit_delay(Duration::ZERO)
            .with_max_batch_size(20);
        let batch_calls = Arc::new(Mutex::new(0));
        let single_calls = Arc::new(Mutex::new(0));

        let items: Vec<u32> = (0..5).collect();
        let result = orchestrator
            .submit_batched(
                &items,
                |all| {
                    *batch_calls.lock().unwrap() += 1;
                    let out: Vec<String> = all.iter().map(|n| n.to_string()).collect();
                    async move { Ok(out) }
                },
                |n| {
                    *single_calls.lock().unwrap() += 1;
                    let id = n.to_string();
                    async move { Ok(id) }
                },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(*batch_calls.lock().unwrap(), 1);
        assert_eq!(*single_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_batched_falls_back_when_too_large() {
        let orchestrator = BatchOrchestrator::new()
            .with_submit_delay(Duration::ZERO)
            .with_max_batch_size(20);
        let items: Vec<u32> = (0..25).collect();

        let result = orchestrator
            .submit_batched(
                &items,
                |_| async { Err(VenueError::Decode("batch endpoint must not be used".into())) },
                |n| {
                    let id = n.to_string();
                    async move { Ok(id) }
                },
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 25);
        assert_eq!(result[24], "24");
    }

    #[tokio::test]
    async fn test_cancel_stops_at_first_failing_group() {
        let orchestrator = BatchOrchestrator::new().with_cancel_group_size(20);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let orders = ids(45);

        let err = orchestrator
            .cancel_in_groups(&orders, |group| {
                let calls = calls.clone();
                let size = group.len();
                let group = group.to_vec();
                async move {
                    let mut calls = calls.lock().unwrap();
                    calls.push(size);
                    if calls.len() == 2 {
                        Err(VenueError::api("50011", "Too Many Requests"))
                    } else {
                        Ok(group)
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(*calls.lock().unwrap(), [20, 20]);
        assert_eq!(err.completed_ids().len(), 20);
        assert_eq!(err.completed_ids()[0], "ord-0");
    }

    #[tokio::test]
    async fn test_cancel_all_groups() {
        let orchestrator = BatchOrchestrator::new();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let orders = ids(45);

        let canceled = orchestrator
            .cancel_in_groups(&orders, |group| {
                sizes.lock().unwrap().push(group.len());
                let group = group.to_vec();
                async move { Ok(group) }
            })
            .await
            .unwrap();

        assert_eq!(*sizes.lock().unwrap(), [20, 20, 5]);
        assert_eq!(canceled, orders);
    }

    #[tokio::test]
    async fn test_partly_confirmed_group_keeps_its_confirmed_ids() {
        let orchestrator = BatchOrchestrator::new().with_cancel_group_size(20);
        let orders = ids(45);
        let calls = Arc::new(Mutex::new(0));

        let err = orchestrator
            .cancel_in_groups(&orders, |group| {
                let calls = calls.clone();
                let group = group.to_vec();
                async move {
                    *calls.lock().unwrap() += 1;
                    if group[0] == "ord-20" {
                        let confirmed = group[..19].to_vec();
                        Err(VenueError::partial_batch(
                            confirmed,
                            VenueError::api("51400", "Cancellation failed"),
                        ))
                    } else {
                        Ok(group)
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(err.completed_ids().len(), 39);
        assert_eq!(err.completed_ids()[38], "ord-38");
        assert_eq!(err.venue_code(), Some("51400"));
    }
}
