//! A reference sampler for the reversible-jump cluster split-merge move.
//!
//! The move itself lives in [`kernel`]. This crate supplies a host for it:
//! a log target over cluster models, a Metropolis-Hastings [`Sampler`] that
//! snapshots the model and restores it on rejection, and an [`Engine`] that
//! runs independent chains in parallel.
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
pub mod engine;
pub mod sampler;
pub mod target;

pub use config::{RunConfig, RunConfigError};
pub use engine::update_handler::{self, UpdateHandler};
pub use engine::{ChainSummary, Engine, NewEngineError};
pub use sampler::{
    BoxedOperator, ChainDiagnostics, OperatorStats, Sampler, StepOutcome,
};
pub use target::{LogTarget, Target};

pub use splitmerge_consts as consts;
pub use splitmerge_kernel as kernel;
pub use splitmerge_stats as stats;
pub use splitmerge_utils as utils;
