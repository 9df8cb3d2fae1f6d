//! LearningEngine: implements ILearner and the cursor-driven training run.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use alembic_core::config::LearningConfig;
use alembic_core::errors::{AlembicError, AlembicResult, LearningError};
use alembic_core::models::{
    Factor, FactorScores, FeedbackEvent, TrainingOutcome, TrainingRun, WeightVector,
};
use alembic_core::traits::{IArtifactStore, ILearner};
use alembic_observability::SharedMetrics;
use alembic_ranking::WeightStore;

use crate::correlation;

pub struct LearningEngine {
    store: Arc<dyn IArtifactStore>,
    weights: Arc<WeightStore>,
    config: LearningConfig,
    metrics: SharedMetrics,
    /// Held for a whole run, from cursor read to run record.
    running: Mutex<()>,
}

impl LearningEngine {
    pub fn new(
        store: Arc<dyn IArtifactStore>,
        weights: Arc<WeightStore>,
        config: LearningConfig,
    ) -> Self {
        Self {
            store,
            weights,
            config,
            metrics: SharedMetrics::default(),
            running: Mutex::new(()),
        }
    }

    /// Tally every run into `metrics`.
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Pair each usable event with the factor breakdown of its artifact.
    ///
    /// Events on artifacts without a weighted ranking (unscored, or judged)
    /// carry no factor signal and are counted as skipped. Out-of-range
    /// events are quarantined.
    fn samples(&self, batch: &[FeedbackEvent]) -> AlembicResult<Samples> {
        let mut out = Samples::default();
        for event in batch {
            let Some(outcome) = event.outcome() else {
                warn!(
                    event_id = event.id,
                    kind = event.kind.as_str(),
                    value = event.value,
                    "malformed feedback quarantined"
                );
                out.quarantined.push(event.id);
                continue;
            };
            match self.store.get_ranking(&event.artifact_id)?.and_then(|r| r.factors) {
                Some(factors) => out.usable.push((factors, outcome)),
                None => {
                    debug!(artifact_id = %event.artifact_id, "feedback without factor signal skipped");
                    out.skipped += 1;
                }
            }
        }
        Ok(out)
    }

    /// Bounded per-factor update. Pure; exposed for property tests.
    pub fn step(&self, current: &WeightVector, samples: &[(FactorScores, f64)]) -> [f64; 4] {
        let positive: Vec<f64> = samples
            .iter()
            .map(|(_, outcome)| {
                if *outcome >= self.config.positive_threshold {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        let max_step = self.config.max_step.abs();
        let (lo, hi) = (
            self.config.min_weight.min(self.config.max_weight),
            self.config.max_weight.max(self.config.min_weight),
        );

        Factor::ALL.map(|factor| {
            let values: Vec<f64> = samples.iter().map(|(f, _)| f.get(factor)).collect();
            let corr = correlation::pearson(&values, &positive).unwrap_or(0.0);
            let delta = (self.config.learning_rate * corr).clamp(-max_step, max_step);
            (current.get(factor) + delta).clamp(lo, hi)
        })
    }

    /// One scheduled run: train on feedback after the last cursor and log
    /// the run. Training failures are recorded, never returned.
    ///
    /// A short batch that cannot train is held back for the next run. A full
    /// batch is consumed either way, so feedback without signal never blocks
    /// the events behind it.
    pub fn run_once(&self) -> AlembicResult<TrainingRun> {
        let _guard = self.lock()?;
        let started_at = Utc::now();
        let cursor = self.store.last_training_cursor()?;
        let batch = self
            .store
            .feedback_since(cursor, self.config.max_batch_size)?;
        let full = self.config.max_batch_size > 0 && batch.len() >= self.config.max_batch_size;
        let end = batch.last().map(|e| e.id).unwrap_or(cursor);
        let before = self.weights.version();

        let samples = self.samples(&batch)?;
        let (outcome, next_cursor) = match self.apply(&samples.usable) {
            Ok(w) if w.version > before => (TrainingOutcome::Published { version: w.version }, end),
            Ok(_) => (TrainingOutcome::Unchanged, end),
            Err(e) => {
                let consumed = full
                    && matches!(
                        e,
                        AlembicError::LearningFailure(LearningError::InsufficientData { .. })
                    );
                warn!(
                    error = %e,
                    events = batch.len(),
                    skipped = samples.skipped,
                    quarantined = samples.quarantined.len(),
                    consumed,
                    "training run failed, weights unchanged"
                );
                let reason = e.to_string();
                (
                    TrainingOutcome::Failed { reason },
                    if consumed { end } else { cursor },
                )
            }
        };
        let run = TrainingRun {
            started_at,
            finished_at: Utc::now(),
            events_used: batch.len(),
            skipped: samples.skipped,
            quarantined: samples.quarantined,
            cursor: next_cursor,
            outcome,
        };
        if let Err(e) = self.store.record_training_run(&run) {
            warn!(error = %e, "failed to record training run");
        }
        self.metrics.record(|m| m.learning.record_run(&run));
        Ok(run)
    }

    fn lock(&self) -> AlembicResult<MutexGuard<'_, ()>> {
        self.running.lock().map_err(|e| {
            LearningError::WeightStoreUnavailable {
                reason: format!("training lock poisoned: {e}"),
            }
            .into()
        })
    }

    /// Step, persist, and publish. Callers hold the training lock.
    fn apply(&self, samples: &[(FactorScores, f64)]) -> AlembicResult<WeightVector> {
        let needed = self.config.min_batch_size.max(2);
        if samples.len() < needed {
            return Err(LearningError::InsufficientData {
                needed,
                available: samples.len(),
            }
            .into());
        }

        let current = self.weights.snapshot();
        let updated = self.step(&current, samples);
        for (factor, w) in Factor::ALL.iter().zip(updated) {
            if !w.is_finite() {
                return Err(LearningError::NonFiniteWeight {
                    factor: factor.to_string(),
                }
                .into());
            }
        }
        if updated
            .iter()
            .zip(current.as_array())
            .all(|(a, b)| (a - b).abs() < 1e-12)
        {
            debug!(samples = samples.len(), "no weight change");
            return Ok((*current).clone());
        }

        let next = current.next(updated);
        // Durable first: a published version must exist in history.
        self.store
            .save_weight_vector(&next, &format!("trained on {} events", samples.len()))?;
        let published = self.weights.publish(next)?;
        info!(
            version = published.version,
            samples = samples.len(),
            weights = ?published.as_array(),
            "weights updated from feedback"
        );
        Ok((*published).clone())
    }
}

/// A batch split by usefulness.
#[derive(Default)]
struct Samples {
    usable: Vec<(FactorScores, f64)>,
    skipped: usize,
    quarantined: Vec<i64>,
}

impl ILearner for LearningEngine {
    /// Returns the published vector, or the active one when nothing moved.
    /// Malformed events are dropped from the batch.
    fn train(&self, batch: &[FeedbackEvent]) -> AlembicResult<WeightVector> {
        let _guard = self.lock()?;
        let samples = self.samples(batch)?;
        self.apply(&samples.usable)
    }
}

/// Align the in-memory store with persisted weight history.
///
/// Restores the latest saved version when it is newer, or records the
/// configured initial vector when history is empty.
pub fn bootstrap_weights(store: &dyn IArtifactStore, weights: &WeightStore) -> AlembicResult<()> {
    match store.latest_weight_vector()? {
        Some(saved) if saved.version > weights.version() => {
            info!(version = saved.version, "restored persisted weights");
            weights.publish(saved)?;
        }
        Some(_) => {}
        None => {
            store.save_weight_vector(&weights.snapshot(), "initial")?;
        }
    }
    Ok(())
}
