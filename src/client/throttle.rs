//! FIFO request throttle (spec §4.1 C1, §5).
//!
//! Wraps a single asynchronous operation so that concurrent callers are
//! serialized through a queue and the N-th call starts no earlier than
//! `min_interval` after the (N-1)-th call started. A decorator in the
//! source implementation (`original_source/stockx/api/client/throttle.py`);
//! here it is an explicit wrapper type, per design note §9.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

type Job<T> = Box<dyn FnOnce() -> futures_box::BoxFuture<T> + Send>;

/// Minimal boxed-future alias so we don't pull in the `futures` crate for
/// one type. Kept private to this module.
mod futures_box {
    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
}

struct Request<T> {
    job: Job<T>,
    reply: oneshot::Sender<T>,
}

/// A single-worker FIFO throttle. One dispatcher task is spawned lazily on
/// first use and lives until the throttle (and its sender clones) are
/// dropped.
pub struct Throttle<T> {
    min_interval: Duration,
    sender: mpsc::UnboundedSender<Request<T>>,
    _worker: tokio::task::JoinHandle<()>,
}

impl<T: Send + 'static> Throttle<T> {
    pub fn new(min_interval: Duration) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Request<T>>();

        let worker = tokio::spawn(async move {
            let mut last_start: Option<Instant> = None;
            while let Some(Request { job, reply }) = receiver.recv().await {
                // The caller dropped its `run(...)` future while this job
                // was still queued: drop the job without running it and
                // without advancing `last_start` (spec §4.1).
                if reply.is_closed() {
                    continue;
                }
                if let Some(last) = last_start {
                    let elapsed = last.elapsed();
                    if elapsed < min_interval {
                        tokio::time::sleep(min_interval - elapsed).await;
                    }
                }
                last_start = Some(Instant::now());
                let result = job().await;
                // Ignore send errors: the caller may have cancelled between
                // the check above and now.
                let _ = reply.send(result);
            }
        });

        Self {
            min_interval,
            sender,
            _worker: worker,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Submit `f` to run through the throttle. Dropping the returned future
    /// before it resolves cancels the call: if it is still queued, the
    /// worker checks `reply.is_closed()` before invoking it and drops the
    /// job without ever running it and without advancing `last_start`; if
    /// it is already running, the underlying job still runs to completion
    /// (the worker doesn't observe cancellation mid-flight) but the result
    /// is discarded.
    pub async fn run<F, Fut>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = T> + Send + 'static,
        T: 'static,
    {
        let (reply, recv) = oneshot::channel();
        let job: Job<T> = Box::new(move || Box::pin(f()));
        // An unbounded send only fails if the worker task died; that should
        // never happen under normal operation since the worker loops
        // forever until the sender is dropped.
        let _ = self.sender.send(Request { job, reply });
        recv.await.expect("throttle worker dropped without a reply")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn serializes_and_spaces_calls() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(20)));
        let counter = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let throttle = throttle.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                throttle
                    .run(move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Three calls spaced 20ms apart take at least 40ms total.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn cancelling_a_queued_call_does_not_advance_the_clock() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(30)));
        let start = Instant::now();

        // Job 1 occupies the worker long enough for job 2 to be queued
        // and cancelled before the worker ever dequeues it.
        let t1 = throttle.clone();
        let h1 = tokio::spawn(async move {
            t1.run(|| async {
                tokio::time::sleep(Duration::from_millis(80)).await;
            })
            .await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Job 2 sits behind job 1 in the queue, then is cancelled by
        // aborting its caller task before the worker can reach it.
        let t2 = throttle.clone();
        let h2 = tokio::spawn(async move {
            t2.run(|| async {
                tokio::time::sleep(Duration::from_millis(80)).await;
            })
            .await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        h2.abort();

        h1.await.unwrap();

        // If the worker ran job 2's 80ms sleep anyway, this would land well
        // past 160ms; skipping it without advancing the clock keeps total
        // elapsed close to job 1's own 80ms.
        throttle.run(|| async {}).await;
        assert!(start.elapsed() < Duration::from_millis(120));
    }
}
