//! Choosing between a split and a merge.
//!
//! A merge needs two occupied clusters and a split needs a free slot, so the
//! choice is forced at both edges and a fair coin otherwise. The Hastings
//! ratio evaluates the same probabilities for the reverse move.
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Split,
    Merge,
}

impl MoveKind {
    /// The kind of the reverse move
    pub fn reverse(self) -> Self {
        match self {
            Self::Split => Self::Merge,
            Self::Merge => Self::Split,
        }
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Split => write!(f, "split"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Probability of choosing a split with `n_occupied` of `n_slots` slots in
/// use
pub fn split_probability(n_occupied: usize, n_slots: usize) -> f64 {
    if n_occupied <= 1 {
        1.0
    } else if n_occupied >= n_slots {
        0.0
    } else {
        0.5
    }
}

/// Log probability of choosing a move of `kind`
pub fn ln_move_probability(
    kind: MoveKind,
    n_occupied: usize,
    n_slots: usize,
) -> f64 {
    let p_split = split_probability(n_occupied, n_slots);
    match kind {
        MoveKind::Split => p_split.ln(),
        MoveKind::Merge => (1.0 - p_split).ln(),
    }
}

/// Choose a split or a merge
pub fn choose_move<R: Rng>(
    n_occupied: usize,
    n_slots: usize,
    rng: &mut R,
) -> MoveKind {
    if n_occupied <= 1 {
        MoveKind::Split
    } else if n_occupied >= n_slots {
        MoveKind::Merge
    } else if rng.gen::<bool>() {
        MoveKind::Split
    } else {
        MoveKind::Merge
    }
}
