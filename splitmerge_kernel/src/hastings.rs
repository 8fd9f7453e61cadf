//! The log Hastings ratio of a split or merge.
//!
//! Ratios are computed in the labelled state space: the allocation vector
//! plus the locations of occupied slots. Rows of free slots are auxiliary
//! and play no part in the target.
use splitmerge_stats::gauss::ln_jitter_density;
use std::f64::consts::LN_2;

use crate::config::HastingsKind;
use crate::policy::{ln_move_probability, MoveKind};

/// Everything a Hastings ratio needs to know about one proposal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveContext<'a> {
    pub kind: MoveKind,
    /// Number of occupied clusters before the move, K
    pub n_occupied: usize,
    /// Number of cluster slots, S
    pub n_slots: usize,
    /// Number of fair coins flipped by the split, or by the reverse split of
    /// a merge
    pub n_coins: usize,
    /// The split jitter, or the jitter recorded by a merge
    pub jitter: &'a [f64],
    pub scale: f64,
    /// `false` if the proposed state cannot be undone by the reverse move
    pub has_reverse: bool,
}

impl MoveContext<'_> {
    /// Dimension of the cluster locations
    #[inline]
    pub fn dim(&self) -> usize {
        self.jitter.len()
    }
}

/// Computes the log Hastings ratio, ln q(x|x') - ln q(x'|x) plus the log
/// Jacobian, of a proposal.
pub trait HastingsRatio {
    fn ln_hastings(&self, ctx: &MoveContext) -> f64;
}

/// The full reversible-jump correction
///
/// For a split of a cluster with `n` members from `K` occupied clusters:
///
/// ```text
/// ln p_merge(K+1) - ln p_split(K) - ln(K+1) + n ln 2 - ln φ(z) + D ln(2σ)
/// ```
///
/// and for a merge of an ordered pair whose union has `n` members:
///
/// ```text
/// ln p_split(K-1) - ln p_merge(K) + ln K - n ln 2 + ln φ(z) - D ln(2σ)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReversibleJump;

impl HastingsRatio for ReversibleJump {
    fn ln_hastings(&self, ctx: &MoveContext) -> f64 {
        if !ctx.has_reverse {
            return f64::NEG_INFINITY;
        }

        let k = ctx.n_occupied;
        let s = ctx.n_slots;
        let ln_coins = ctx.n_coins as f64 * LN_2;
        let ln_jitter = ln_jitter_density(ctx.jitter);
        let ln_jacobian = ctx.dim() as f64 * (2.0 * ctx.scale).ln();

        match ctx.kind {
            MoveKind::Split => {
                ln_move_probability(MoveKind::Merge, k + 1, s)
                    - ln_move_probability(MoveKind::Split, k, s)
                    - ((k + 1) as f64).ln()
                    + ln_coins
                    - ln_jitter
                    + ln_jacobian
            }
            MoveKind::Merge => {
                ln_move_probability(MoveKind::Split, k - 1, s)
                    - ln_move_probability(MoveKind::Merge, k, s)
                    + (k as f64).ln()
                    - ln_coins
                    + ln_jitter
                    - ln_jacobian
            }
        }
    }
}

/// Reports a ratio of one for every proposal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neutral;

impl HastingsRatio for Neutral {
    fn ln_hastings(&self, _ctx: &MoveContext) -> f64 {
        0.0
    }
}

impl HastingsRatio for HastingsKind {
    fn ln_hastings(&self, ctx: &MoveContext) -> f64 {
        match self {
            Self::ReversibleJump => ReversibleJump.ln_hastings(ctx),
            Self::Neutral => Neutral.ln_hastings(ctx),
        }
    }
}
