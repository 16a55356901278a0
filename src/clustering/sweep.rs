use crate::clustering::forel::Forel;
use crate::core::float::ForelFloat;
use crate::error::{ForelError, ForelResult};
use log::{info, warn};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Normalization constants and trial count for a radius sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepParams<F: ForelFloat> {
    /// Trial `i` uses radius `(i / radius_rate) * diameter`.
    pub radius_rate: F,
    /// Expected total weight at a known-good radius; divides the weight term.
    pub reference_weight: F,
    pub trials: usize,
}

impl<F: ForelFloat> SweepParams<F> {
    pub const DEFAULT_TRIALS: usize = 99;

    pub fn new(radius_rate: F, reference_weight: F) -> Self {
        Self {
            radius_rate,
            reference_weight,
            trials: Self::DEFAULT_TRIALS,
        }
    }

    pub fn validate(&self) -> ForelResult<()> {
        if !(self.radius_rate.is_finite() && self.radius_rate > F::zero()) {
            return Err(ForelError::Configuration(format!(
                "radius_rate must be positive, got {}",
                self.radius_rate
            )));
        }
        if !(self.reference_weight.is_finite() && self.reference_weight > F::zero()) {
            return Err(ForelError::Configuration(format!(
                "reference_weight must be positive, got {}",
                self.reference_weight
            )));
        }
        if self.trials == 0 {
            return Err(ForelError::Configuration(
                "a sweep needs at least one trial".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialResult<F: ForelFloat> {
    pub index: usize,
    pub radius: F,
    pub cluster_count: usize,
    pub total_weight: F,
    pub objective: F,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport<F: ForelFloat> {
    pub diameter: F,
    pub trials: Vec<TrialResult<F>>,
    /// Indices of trials that produced no usable partition.
    pub skipped: Vec<usize>,
}

impl<F: ForelFloat> SweepReport<F> {
    /// The trial with the lowest objective; the earliest one wins ties.
    pub fn best(&self) -> Option<&TrialResult<F>> {
        self.trials.iter().fold(None, |best: Option<&TrialResult<F>>, trial| match best {
            Some(b) if b.objective.partial_cmp(&trial.objective) != Some(Ordering::Greater) => {
                Some(b)
            }
            _ => Some(trial),
        })
    }
}

/// `cluster_count / (n + 1) + total_weight / reference_weight`.
pub fn objective<F: ForelFloat>(
    cluster_count: usize,
    total_weight: F,
    n: usize,
    reference_weight: F,
) -> F {
    let count = F::from_usize(cluster_count).unwrap_or_else(F::zero);
    let denominator = F::from_usize(n + 1).unwrap_or_else(F::one);
    count / denominator + total_weight / reference_weight
}

/// Runs FOREL over a range of radii proportional to the metric diameter.
pub struct RadiusSweep<'a, F: ForelFloat> {
    forel: Forel<'a, F>,
    params: SweepParams<F>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, F: ForelFloat> RadiusSweep<'a, F> {
    /// Trials never rank salience, even when `forel` was built with it.
    pub fn new(forel: Forel<'a, F>, params: SweepParams<F>) -> Self {
        Self {
            forel: forel.without_salience(),
            params,
            cancel: None,
        }
    }

    /// Stops the sweep before the next trial once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run(&self) -> ForelResult<SweepReport<F>> {
        self.params.validate()?;
        let n = self.forel.metric().len();
        let diameter = self.forel.metric().diameter();
        info!(
            "Sweeping {} radii over diameter {} (rate {}, reference weight {})",
            self.params.trials, diameter, self.params.radius_rate, self.params.reference_weight
        );

        let mut trials = Vec::with_capacity(self.params.trials);
        let mut skipped = Vec::new();
        for index in 1..=self.params.trials {
            if self.is_cancelled() {
                return Err(ForelError::Cancelled {
                    completed: index - 1,
                });
            }

            let step = F::from_usize(index).unwrap_or_else(F::zero);
            let radius = (step / self.params.radius_rate) * diameter;
            match self.forel.run(radius) {
                Ok(partition) if partition.cluster_count() > 0 => {
                    let cluster_count = partition.cluster_count();
                    let total_weight = partition.total_weight;
                    trials.push(TrialResult {
                        index,
                        radius,
                        cluster_count,
                        total_weight,
                        objective: objective(
                            cluster_count,
                            total_weight,
                            n,
                            self.params.reference_weight,
                        ),
                    });
                }
                Ok(_) => {
                    warn!("Trial {} at radius {} produced no clusters, skipping", index, radius);
                    skipped.push(index);
                }
                Err(e) => {
                    warn!("Trial {} at radius {} failed, skipping: {}", index, radius, e);
                    skipped.push(index);
                }
            }
        }

        info!(
            "Sweep finished: {} trials, {} skipped",
            trials.len(),
            skipped.len()
        );
        Ok(SweepReport {
            diameter,
            trials,
            skipped,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(AtomicOrdering::Relaxed))
            .unwrap_or(false)
    }
}
