//! Re-embedding of artifacts flagged by a standard change or a failed
//! embedding at generation time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use alembic_core::config::EmbeddingConfig;
use alembic_core::errors::AlembicResult;
use alembic_core::traits::IArtifactStore;
use alembic_providers::EmbeddingRouter;

/// What one pass accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReembedReport {
    pub embedded: usize,
    pub failed: usize,
}

pub struct ReembedWorker {
    store: Arc<dyn IArtifactStore>,
    router: Arc<EmbeddingRouter>,
    batch_size: usize,
    period: Duration,
}

impl ReembedWorker {
    pub fn new(
        store: Arc<dyn IArtifactStore>,
        router: Arc<EmbeddingRouter>,
        config: &EmbeddingConfig,
    ) -> Self {
        Self {
            store,
            router,
            batch_size: config.reembed_batch_size.max(1),
            period: Duration::from_secs(config.reembed_interval_secs.max(1)),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Embed one batch of flagged artifacts. Artifacts that fail stay flagged.
    pub async fn run_once(&self) -> AlembicResult<ReembedReport> {
        let pending = self.store.pending_reembed(self.batch_size)?;
        let mut report = ReembedReport::default();
        for artifact in pending {
            let outcome = match self
                .router
                .compute_embedding(&artifact.content, Some(&artifact.provider))
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(artifact_id = %artifact.id, error = %e, "re-embedding failed");
                    report.failed += 1;
                    continue;
                }
            };
            match self
                .store
                .store_embedding(&artifact.id, &outcome.vector, &outcome.info)
            {
                Ok(()) => report.embedded += 1,
                Err(e) => {
                    warn!(artifact_id = %artifact.id, error = %e, "re-embedded vector not saved");
                    report.failed += 1;
                }
            }
        }
        if report.embedded + report.failed > 0 {
            info!(
                embedded = report.embedded,
                failed = report.failed,
                dimensions = self.router.dimensions(),
                "re-embedding pass finished"
            );
        }
        Ok(report)
    }

    /// Run passes until `shutdown` flips to `true`.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            debug!(period_secs = self.period.as_secs_f64(), "re-embed worker started");

            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            warn!(error = %e, "re-embed pass could not read pending artifacts");
                        }
                    }
                }
            }
            debug!("re-embed worker stopped");
        })
    }
}
