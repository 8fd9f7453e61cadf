use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use splitmerge_kernel::SplitMergeConfig;
use thiserror::Error;

use crate::target::Target;

/// Errors reading or writing a `RunConfig`
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn default_n_chains() -> usize {
    4
}

fn default_dim() -> usize {
    2
}

/// Configuration for a sampling run
///
/// # Example
///
/// ```rust
/// # use splitmerge::RunConfig;
/// let yaml = "
/// n_iters: 500
/// n_items: 20
/// n_slots: 20
/// operator:
///   scale: 0.5
/// ";
/// let config: RunConfig = serde_yaml::from_str(yaml).unwrap();
///
/// assert_eq!(config.n_iters, 500);
/// assert_eq!(config.n_chains, 4);
/// assert_eq!(config.operator.scale, 0.5);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of iterations to run each chain
    pub n_iters: usize,
    /// Number of independent chains
    #[serde(default = "default_n_chains")]
    pub n_chains: usize,
    /// PRNG seed. Runs with the same seed and config are identical.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of items to allocate
    pub n_items: usize,
    /// Number of cluster slots. Must be at least `n_items`.
    pub n_slots: usize,
    /// Dimension of the cluster locations
    #[serde(default = "default_dim")]
    pub dim: usize,
    #[serde(default)]
    pub operator: SplitMergeConfig,
    #[serde(default)]
    pub target: Target,
}

impl RunConfig {
    pub fn new(n_items: usize) -> Self {
        Self {
            n_iters: 1,
            n_chains: default_n_chains(),
            seed: None,
            n_items,
            n_slots: n_items,
            dim: default_dim(),
            operator: SplitMergeConfig::default(),
            target: Target::default(),
        }
    }

    pub fn n_iters(mut self, n_iters: usize) -> Self {
        self.n_iters = n_iters;
        self
    }

    pub fn n_chains(mut self, n_chains: usize) -> Self {
        self.n_chains = n_chains;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_slots(mut self, n_slots: usize) -> Self {
        self.n_slots = n_slots;
        self
    }

    pub fn dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn operator(mut self, operator: SplitMergeConfig) -> Self {
        self.operator = operator;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Read a config from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, RunConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Write the config to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RunConfigError> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }
}
