pub use rv;

/// Name under which the split-merge operator registers with a host
pub const OPERATOR_NAME: &str = "clusterSplitMergeOperator";

/// Default relative selection weight among the host's operators
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Default scale, σ, of the split jitter
pub const DEFAULT_SCALE: f64 = 1.0;

/// Maximum number of draws made by the rejection-sampling loops (distinct
/// merge pair, occupied split source) before the proposal fails.
pub const MAX_DRAW_ATTEMPTS: usize = 1_000;

/// Below this acceptance rate the operator is considered to be mixing badly
pub const MIN_ACCEPTANCE_LEVEL: f64 = 0.1;

/// Above this acceptance rate the operator is considered to be too timid
pub const MAX_ACCEPTANCE_LEVEL: f64 = 0.4;

/// Lower bound of the "good" acceptance band
pub const MIN_GOOD_ACCEPTANCE_LEVEL: f64 = 0.20;

/// Upper bound of the "good" acceptance band
pub const MAX_GOOD_ACCEPTANCE_LEVEL: f64 = 0.30;

/// Default CRP concentration for the reference location prior
pub const DEFAULT_CRP_ALPHA: f64 = 1.0;

/// Default standard deviation of the Gaussian prior on cluster locations
pub const DEFAULT_LOCATION_SD: f64 = 1.0;
