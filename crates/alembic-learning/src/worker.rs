//! Periodic training task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use alembic_core::models::TrainingOutcome;

use crate::engine::LearningEngine;

pub struct LearningWorker {
    engine: Arc<LearningEngine>,
    period: Duration,
}

impl LearningWorker {
    pub fn new(engine: Arc<LearningEngine>) -> Self {
        let secs = engine.config().training_interval_secs.max(1);
        Self {
            engine,
            period: Duration::from_secs(secs),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Run until `shutdown` flips to `true`. Training runs on the blocking
    /// pool since it reads SQLite.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first run
            // happens one period after start.
            ticker.tick().await;
            info!(period_secs = self.period.as_secs_f64(), "learning worker started");

            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        // A dropped sender also means shutdown.
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let engine = Arc::clone(&self.engine);
                        match tokio::task::spawn_blocking(move || engine.run_once()).await {
                            Ok(Ok(run)) => {
                                if let TrainingOutcome::Published { version } = run.outcome {
                                    info!(version, events = run.events_used, "scheduled training published weights");
                                }
                            }
                            Ok(Err(e)) => warn!(error = %e, "scheduled training could not read feedback"),
                            Err(e) => warn!(error = %e, "scheduled training task panicked"),
                        }
                    }
                }
            }
            info!("learning worker stopped");
        })
    }
}
