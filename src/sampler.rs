//! A single Metropolis-Hastings chain over a cluster model
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use splitmerge_kernel::{ClusterModel, McmcOperator, TuningError};
use splitmerge_stats::mh::{ln_acceptance, mh_accept};
use splitmerge_stats::rv::misc::pflip;

use crate::target::{LogTarget, Target};

/// An operator a `Sampler` can run
pub type BoxedOperator =
    Box<dyn McmcOperator<ClusterModel, Xoshiro256Plus> + Send + Sync>;

/// Per-operator counts of what happened to its proposals
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatorStats {
    pub name: String,
    pub n_proposed: usize,
    pub n_accepted: usize,
    pub n_rejected: usize,
    /// Proposals that returned an error. The model was restored.
    pub n_failed: usize,
}

impl OperatorStats {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Fraction of proposals accepted. Zero if nothing was proposed.
    pub fn acceptance_rate(&self) -> f64 {
        if self.n_proposed == 0 {
            0.0
        } else {
            self.n_accepted as f64 / self.n_proposed as f64
        }
    }
}

/// Per-iteration trace of a chain
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ChainDiagnostics {
    /// Number of occupied clusters after each iteration
    pub n_occupied: Vec<usize>,
    /// Log target after each iteration
    pub ln_target: Vec<f64>,
}

impl ChainDiagnostics {
    pub fn n_iters(&self) -> usize {
        self.n_occupied.len()
    }

    fn push(&mut self, n_occupied: usize, ln_target: f64) {
        self.n_occupied.push(n_occupied);
        self.ln_target.push(ln_target);
    }
}

/// What one step of the chain did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    Rejected,
    /// The proposal returned an error and the model was restored
    Failed,
}

/// One chain: a model, its target, and a weighted schedule of operators.
///
/// The sampler owns the commit/rollback contract. It snapshots the model
/// before each proposal and restores the snapshot if the proposal is rejected
/// or fails.
pub struct Sampler {
    model: ClusterModel,
    target: Target,
    operators: Vec<BoxedOperator>,
    stats: Vec<OperatorStats>,
    ln_target: f64,
    diagnostics: ChainDiagnostics,
}

impl Sampler {
    pub fn new(model: ClusterModel, target: Target) -> Self {
        let ln_target = target.ln_f(&model);
        Self {
            model,
            target,
            operators: Vec::new(),
            stats: Vec::new(),
            ln_target,
            diagnostics: ChainDiagnostics::default(),
        }
    }

    /// Add an operator to the schedule
    pub fn with_operator<O>(mut self, operator: O) -> Self
    where
        O: McmcOperator<ClusterModel, Xoshiro256Plus> + Send + Sync + 'static,
    {
        self.add_operator(Box::new(operator));
        self
    }

    pub fn add_operator(&mut self, operator: BoxedOperator) {
        self.stats.push(OperatorStats::new(operator.name()));
        self.operators.push(operator);
    }

    #[inline]
    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    #[inline]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Log target of the current model
    #[inline]
    pub fn ln_target(&self) -> f64 {
        self.ln_target
    }

    #[inline]
    pub fn diagnostics(&self) -> &ChainDiagnostics {
        &self.diagnostics
    }

    #[inline]
    pub fn stats(&self) -> &[OperatorStats] {
        &self.stats
    }

    /// Fraction of all proposals accepted
    pub fn acceptance_rate(&self) -> f64 {
        let (n_accepted, n_proposed) =
            self.stats.iter().fold((0, 0), |(acc, prop), stats| {
                (acc + stats.n_accepted, prop + stats.n_proposed)
            });
        if n_proposed == 0 {
            0.0
        } else {
            n_accepted as f64 / n_proposed as f64
        }
    }

    /// Run one operator chosen with probability proportional to its weight.
    ///
    /// Returns `None` if the schedule is empty.
    pub fn step(&mut self, rng: &mut Xoshiro256Plus) -> Option<StepOutcome> {
        if self.operators.is_empty() {
            return None;
        }

        let weights: Vec<f64> =
            self.operators.iter().map(|op| op.weight()).collect();
        let ix = pflip(&weights, 1, rng)[0];

        let snapshot = self.model.clone();
        self.model.allocations.clear_changes();

        let outcome = match self.operators[ix].propose(&mut self.model, rng) {
            Ok(ln_hastings) => {
                let ln_target_prop = self.target.ln_f(&self.model);
                let ln_alpha =
                    ln_acceptance(ln_hastings, self.ln_target, ln_target_prop);
                if mh_accept(ln_alpha, rng) {
                    log::trace!(
                        "{} accepted; {} allocation changes",
                        self.stats[ix].name,
                        self.model.allocations.changed().len()
                    );
                    self.ln_target = ln_target_prop;
                    StepOutcome::Accepted
                } else {
                    log::debug!(
                        "{} rejected; ln alpha = {}",
                        self.stats[ix].name,
                        ln_alpha
                    );
                    self.model = snapshot;
                    StepOutcome::Rejected
                }
            }
            Err(err) => {
                log::warn!("{} failed: {err}", self.stats[ix].name);
                self.model = snapshot;
                StepOutcome::Failed
            }
        };

        let stats = &mut self.stats[ix];
        stats.n_proposed += 1;
        match outcome {
            StepOutcome::Accepted => stats.n_accepted += 1,
            StepOutcome::Rejected => stats.n_rejected += 1,
            StepOutcome::Failed => stats.n_failed += 1,
        }

        self.diagnostics.push(self.model.n_occupied(), self.ln_target);

        Some(outcome)
    }

    /// Run `n_iters` steps
    pub fn run(&mut self, n_iters: usize, rng: &mut Xoshiro256Plus) {
        for _ in 0..n_iters {
            if self.step(rng).is_none() {
                break;
            }
        }
    }

    /// Ask every optimizing operator to adapt toward `target_acceptance`.
    /// Operators that do not optimize are skipped.
    pub fn tune(&mut self, target_acceptance: f64) -> Result<(), TuningError> {
        self.operators.iter_mut().try_for_each(|op| {
            if op.is_optimizing() {
                op.optimize(target_acceptance)
            } else {
                log::debug!(
                    "Not tuning {}: operator does not optimize",
                    op.name()
                );
                Ok(())
            }
        })
    }

    /// Hints from operators whose acceptance rate is outside their
    /// acceptable band
    pub fn suggestions(&self) -> Vec<String> {
        self.operators
            .iter()
            .zip(self.stats.iter())
            .filter(|(_, stats)| stats.n_proposed > 0)
            .filter_map(|(op, stats)| {
                op.performance_suggestion(stats.acceptance_rate())
                    .map(|hint| format!("{}: {}", stats.name, hint))
            })
            .collect()
    }
}
