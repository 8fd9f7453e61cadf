use splitmerge_stats::OccupancyError;
use thiserror::Error;

/// Errors raised when binding the operator to the host's parameters. These
/// are detected before sampling starts and are never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("The allocation parameter '{id}' has no items")]
    EmptyAllocation { id: String },
    #[error("Cluster locations must have at least one dimension")]
    ZeroDimension,
    #[error("At least two cluster slots are required, but there are {n_slots}")]
    TooFewSlots { n_slots: usize },
    #[error("There are {n_items} items but only {n_slots} cluster slots")]
    FewerSlotsThanItems { n_items: usize, n_slots: usize },
    #[error(
        "Item {item} is allocated to cluster {cluster} but there are only \
        {n_slots} cluster slots"
    )]
    AllocationOutOfBounds {
        item: usize,
        cluster: usize,
        n_slots: usize,
    },
    #[error("Operator weight must be positive and finite, got {0}")]
    InvalidWeight(f64),
    #[error("Split scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("The draw attempt cap must be at least 1")]
    ZeroDrawAttempts,
    #[error("CRP concentration must be positive and finite, got {0}")]
    InvalidConcentration(f64),
    #[error(
        "Location prior standard deviation must be positive and finite, \
        got {0}"
    )]
    InvalidLocationSd(f64),
}

/// Errors raised by a single proposal
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProposalError {
    #[error("Invalid allocation: {0}")]
    Occupancy(#[from] OccupancyError),
    #[error("Expected {expected} items but the allocation has {found}")]
    ItemCountChanged { expected: usize, found: usize },
    #[error(
        "Expected {expected_slots} location slots of dimension {expected_dim} \
        but found {found_slots} of dimension {found_dim}"
    )]
    LocationShapeChanged {
        expected_slots: usize,
        expected_dim: usize,
        found_slots: usize,
        found_dim: usize,
    },
    #[error("No free cluster slot to split into; all {n_slots} are occupied")]
    NoFreeSlot { n_slots: usize },
    #[error(
        "A merge requires at least two occupied clusters, but there are \
        {n_occupied}"
    )]
    TooFewClusters { n_occupied: usize },
    #[error("Cluster {cluster} has no items")]
    EmptyCluster { cluster: usize },
    #[error("Cannot merge cluster {cluster} with itself")]
    IdenticalMergePair { cluster: usize },
    #[error("Expected {expected} {what} in the draw, found {found}")]
    DrawLengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Failed to draw {what} after {attempts} attempts")]
    DrawAttemptsExhausted { what: &'static str, attempts: usize },
}

/// Errors from the step-size tuning protocol
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TuningError {
    #[error("Operator '{operator}' cannot be optimized")]
    NotTunable { operator: String },
}
