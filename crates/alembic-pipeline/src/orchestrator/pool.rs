//! Bounded worker pool for provider calls.
//!
//! One semaphore is shared by every request, so the pool size caps the
//! number of concurrent outbound generations engine-wide.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use alembic_core::errors::{AlembicError, AlembicResult};

/// Results of one batch, in completion order.
#[derive(Debug)]
pub(crate) struct BatchOutcome<T> {
    pub completed: Vec<(usize, AlembicResult<T>)>,
    /// Jobs that never reported: abandoned at the deadline or aborted.
    pub lost: Vec<usize>,
    pub deadline_hit: bool,
}

pub(crate) struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `count` jobs concurrently until `deadline`. Jobs still running at
    /// the deadline are aborted, not retried.
    pub async fn run_until<T, F, Fut>(&self, count: usize, deadline: Instant, job: F) -> BatchOutcome<T>
    where
        T: Send + 'static,
        F: Fn(usize) -> Fut,
        Fut: Future<Output = AlembicResult<T>> + Send + 'static,
    {
        let mut set = JoinSet::new();
        for index in 0..count {
            let permits = Arc::clone(&self.permits);
            let fut = job(index);
            set.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => fut.await,
                    Err(_) => Err(AlembicError::GenerationFailed {
                        reasons: vec!["worker pool closed".to_string()],
                    }),
                };
                (index, result)
            });
        }

        let mut completed = Vec::with_capacity(count);
        let mut deadline_hit = false;
        loop {
            match timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok(done))) => completed.push(done),
                Ok(Some(Err(e))) => debug!(error = %e, "variant task did not finish"),
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    set.abort_all();
                    break;
                }
            }
        }

        let reported: BTreeSet<usize> = completed.iter().map(|(i, _)| *i).collect();
        let lost = (0..count).filter(|i| !reported.contains(i)).collect();
        BatchOutcome {
            completed,
            lost,
            deadline_hit,
        }
    }
}
