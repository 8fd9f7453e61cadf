//! A reversible-jump split-merge move for cluster allocations.
//!
//! The move proposes to split one occupied cluster into two, or to merge two
//! occupied clusters into one, in a model that allocates `n` items to a fixed
//! number of cluster slots, each slot carrying a location in `D` dimensions.
//!
//! Split and merge are pure functions of the current state and their random
//! draws (see [`draw`]); [`operator::ClusterSplitMerge`] reads the host's
//! parameters, runs one of them, writes the result back, and reports the log
//! Hastings ratio computed by an injectable [`hastings::HastingsRatio`].
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

pub mod config;
pub mod draw;
pub mod error;
pub mod hastings;
pub mod merge;
pub mod operator;
pub mod policy;
pub mod split;
pub mod state;

pub use config::{HastingsKind, SplitMergeConfig};
pub use draw::{MergePair, SplitDraw};
pub use error::{ConfigError, ProposalError, TuningError};
pub use hastings::{HastingsRatio, MoveContext, Neutral, ReversibleJump};
pub use merge::{merge, MergeOutcome};
pub use operator::{
    AcceptanceBounds, ClusterSplitMerge, McmcOperator, ProposalSummary,
};
pub use policy::MoveKind;
pub use split::{split, SplitOutcome};
pub use state::{
    AllocationParameter, Allocations, ClusterLocations, ClusterModel,
    HasClusterParameters, LocationParameter,
};
