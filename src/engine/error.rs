use splitmerge_kernel::ConfigError;
use thiserror::Error;

/// Errors that can arise when creating a new engine
#[derive(Debug, Error)]
pub enum NewEngineError {
    /// Asked for zero chains. The Engine must have at least one chain.
    #[error("attempted to create an engine with zero chains")]
    ZeroChainsRequested,
    /// The models or operators could not be built from the run config
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
