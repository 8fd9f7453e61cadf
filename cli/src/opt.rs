use clap::Parser;
use splitmerge::target::{CrpLocationPrior, Target};
use splitmerge::RunConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "splitmerge", version, about)]
pub enum Opt {
    /// Run split-merge chains and print a summary of each
    Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to a run config YAML. Flags override its values.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// The number of items to allocate
    #[arg(long)]
    pub n_items: Option<usize>,
    /// The number of cluster slots. Defaults to the number of items.
    #[arg(long)]
    pub n_slots: Option<usize>,
    /// The dimension of the cluster locations
    #[arg(long)]
    pub dim: Option<usize>,
    /// The number of iterations to run each chain
    #[arg(long, short = 'n')]
    pub n_iters: Option<usize>,
    /// The number of chains to run
    #[arg(long, short = 's')]
    pub n_chains: Option<usize>,
    /// The PRNG seed
    #[arg(long)]
    pub seed: Option<u64>,
    /// The scale of the split jitter
    #[arg(long)]
    pub scale: Option<f64>,
    /// CRP concentration of the target
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Standard deviation of the location prior in the target
    #[arg(long)]
    pub location_sd: Option<f64>,
    /// The maximum number of seconds to run. The run stops at the first
    /// iteration after the timeout.
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,
    /// Path to write a YAML summary of every chain
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    /// Do not display run progress
    #[arg(long, short)]
    pub quiet: bool,
}

impl RunArgs {
    /// Build the run config from the config file, if any, and the flags
    pub fn run_config(&self) -> Result<RunConfig, String> {
        let config = match self.config {
            Some(ref path) => RunConfig::from_yaml_file(path)
                .map_err(|err| format!("could not read {path:?}: {err}"))?,
            None => {
                let n_items = self
                    .n_items
                    .ok_or("--n-items is required without --config")?;
                let n_iters = self
                    .n_iters
                    .ok_or("--n-iters is required without --config")?;
                RunConfig::new(n_items).n_iters(n_iters)
            }
        };

        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: RunConfig) -> RunConfig {
        if let Some(n_items) = self.n_items {
            config.n_items = n_items;
            if self.config.is_none() && self.n_slots.is_none() {
                config.n_slots = n_items;
            }
        }
        if let Some(n_slots) = self.n_slots {
            config.n_slots = n_slots;
        }
        if let Some(dim) = self.dim {
            config.dim = dim;
        }
        if let Some(n_iters) = self.n_iters {
            config.n_iters = n_iters;
        }
        if let Some(n_chains) = self.n_chains {
            config.n_chains = n_chains;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(scale) = self.scale {
            config.operator.scale = scale;
        }
        if self.alpha.is_some() || self.location_sd.is_some() {
            let mut prior = match config.target {
                Target::CrpLocationPrior(prior) => prior,
                Target::Flat => CrpLocationPrior::default(),
            };
            if let Some(alpha) = self.alpha {
                prior.alpha = alpha;
            }
            if let Some(location_sd) = self.location_sd {
                prior.location_sd = location_sd;
            }
            config.target = Target::CrpLocationPrior(prior);
        }
        config
    }
}
