//! Independent chains run in parallel
mod error;
pub mod update_handler;

pub use error::NewEngineError;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use splitmerge_consts::{DEFAULT_CRP_ALPHA, DEFAULT_LOCATION_SD};
use splitmerge_kernel::{ClusterModel, ClusterSplitMerge};

use crate::config::RunConfig;
use crate::sampler::{OperatorStats, Sampler};
use crate::target::Target;
use update_handler::UpdateHandler;

/// End-of-run state of one chain
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChainSummary {
    pub chain_id: usize,
    /// Number of iterations the chain has run
    pub n_iters: usize,
    /// Number of occupied clusters in the current model
    pub n_occupied: usize,
    pub acceptance_rate: f64,
    pub ln_target: f64,
    pub operators: Vec<OperatorStats>,
}

/// A collection of independent chains, each with its own copy of the model
pub struct Engine {
    pub chains: Vec<Sampler>,
    pub chain_ids: Vec<usize>,
    pub rng: Xoshiro256Plus,
}

impl Engine {
    /// Build `config.n_chains` chains, each initialized from the prior and
    /// running the split-merge move.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use splitmerge::{Engine, RunConfig};
    /// let config = RunConfig::new(10).n_chains(2).seed(Some(1337));
    /// let mut engine = Engine::new(&config).unwrap();
    /// engine.run(50, ());
    ///
    /// assert!(engine.summaries().iter().all(|s| s.n_iters == 50));
    /// ```
    pub fn new(config: &RunConfig) -> Result<Self, NewEngineError> {
        if config.n_chains == 0 {
            return Err(NewEngineError::ZeroChainsRequested);
        }

        let mut rng = match config.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };

        let (alpha, location_sd) = match config.target {
            Target::CrpLocationPrior(prior) => {
                prior.validate()?;
                (prior.alpha, prior.location_sd)
            }
            Target::Flat => (DEFAULT_CRP_ALPHA, DEFAULT_LOCATION_SD),
        };

        let chains = (0..config.n_chains)
            .map(|_| -> Result<Sampler, NewEngineError> {
                let model = ClusterModel::from_prior(
                    config.n_items,
                    config.n_slots,
                    config.dim,
                    alpha,
                    location_sd,
                    &mut rng,
                )?;
                let operator = ClusterSplitMerge::from_config(
                    &model.allocations,
                    &model.locations,
                    &config.operator,
                )?;
                Ok(Sampler::new(model, config.target).with_operator(operator))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            chain_ids: (0..config.n_chains).collect(),
            chains,
            rng,
        })
    }

    #[inline]
    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Run every chain for `n_iters` iterations in parallel
    pub fn run<U: UpdateHandler>(&mut self, n_iters: usize, mut handler: U) {
        log::info!(
            "Running {} chains for {} iterations",
            self.n_chains(),
            n_iters
        );
        handler.global_init(n_iters, &self.chains);

        let mut trngs: Vec<Xoshiro256Plus> = (0..self.n_chains())
            .map(|_| Xoshiro256Plus::seed_from_u64(self.rng.gen()))
            .collect();

        let mut handlers: Vec<U> =
            (0..self.n_chains()).map(|_| handler.clone()).collect();

        self.chains
            .par_iter_mut()
            .zip(trngs.par_iter_mut())
            .zip(handlers.par_iter_mut())
            .zip(self.chain_ids.par_iter())
            .for_each(|(((chain, trng), handler), &chain_id)| {
                handler.new_chain_init(chain_id, chain);
                for _ in 0..n_iters {
                    if handler.stop_engine() || handler.stop_chain(chain_id) {
                        break;
                    }
                    chain.step(trng);
                    handler.chain_updated(chain_id, chain);
                }
                handler.chain_complete(chain_id, chain);
            });

        // per-chain handlers may hold shared channels open
        std::mem::drop(handlers);
        handler.finalize();

        self.chains.iter().zip(self.chain_ids.iter()).for_each(
            |(chain, chain_id)| {
                chain.suggestions().iter().for_each(|hint| {
                    log::warn!("chain {chain_id}: {hint}");
                })
            },
        );
        log::info!("Finished running {} chains", self.n_chains());
    }

    /// Summaries of every chain in chain-id order
    pub fn summaries(&self) -> Vec<ChainSummary> {
        self.chains
            .iter()
            .zip(self.chain_ids.iter())
            .map(|(chain, &chain_id)| ChainSummary {
                chain_id,
                n_iters: chain.diagnostics().n_iters(),
                n_occupied: chain.model().n_occupied(),
                acceptance_rate: chain.acceptance_rate(),
                ln_target: chain.ln_target(),
                operators: chain.stats().to_vec(),
            })
            .collect()
    }
}
