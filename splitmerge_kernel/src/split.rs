//! Splitting one occupied cluster into two
use serde::{Deserialize, Serialize};
use splitmerge_stats::Occupancy;

use crate::draw::SplitDraw;
use crate::error::ProposalError;
use crate::hastings::MoveContext;
use crate::policy::MoveKind;
use crate::state::LocationParameter;

/// The state produced by a split, before it is written back to the host
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SplitOutcome {
    /// The full allocation vector after the split
    pub asgn: Vec<usize>,
    /// The cluster that was split. Keeps the items whose coin said stay.
    pub source: usize,
    /// The lowest-indexed free slot. Receives the items whose coin said move.
    pub destination: usize,
    /// Number of items in `source` before the split
    pub n_source: usize,
    /// Number of items sent to `destination`
    pub n_moved: usize,
    /// `c + σz`
    pub source_location: Vec<f64>,
    /// `c - σz`
    pub destination_location: Vec<f64>,
    pub jitter: Vec<f64>,
    pub scale: f64,
}

impl SplitOutcome {
    /// `true` if one of the children is empty. A degenerate split leaves the
    /// number of occupied clusters unchanged and has no reverse merge.
    pub fn is_degenerate(&self) -> bool {
        self.n_moved == 0 || self.n_moved == self.n_source
    }

    /// The offset `σz` applied to the source location
    pub fn displacement(&self) -> Vec<f64> {
        self.jitter.iter().map(|z| z * self.scale).collect()
    }

    /// The number of occupied clusters after the split, given `n_occupied`
    /// before
    pub fn n_occupied_after(&self, n_occupied: usize) -> usize {
        if self.is_degenerate() {
            n_occupied
        } else {
            n_occupied + 1
        }
    }

    /// Inputs to the Hastings ratio
    pub fn context<'a>(&'a self, occ: &Occupancy) -> MoveContext<'a> {
        MoveContext {
            kind: MoveKind::Split,
            n_occupied: occ.n_occupied(),
            n_slots: occ.n_slots(),
            n_coins: self.n_source,
            jitter: &self.jitter,
            scale: self.scale,
            has_reverse: !self.is_degenerate(),
        }
    }
}

/// Split `draw.source` into itself and the lowest-indexed free slot.
///
/// Each member of the source is sent to the destination if its coin in
/// `draw.moves` is `true`. With `c` the source location and `z` the jitter,
/// the source moves to `c + σz` and the destination to `c - σz`. The
/// destination location is written even if no item moves, so its row never
/// collides with the source.
///
/// # Example
///
/// ```rust
/// # use splitmerge_kernel::{split, SplitDraw};
/// # use splitmerge_stats::Occupancy;
/// # use splitmerge_utils::Matrix;
/// let asgn = vec![0, 0, 0];
/// let occ = Occupancy::from_allocation(&asgn, 3).unwrap();
/// let locs = Matrix::from_vecs(vec![vec![1.0], vec![9.0], vec![9.0]]);
/// let draw = SplitDraw {
///     source: 0,
///     moves: vec![true, false, true],
///     jitter: vec![0.5],
/// };
///
/// let outcome = split(&asgn, &occ, &locs, &draw, 2.0).unwrap();
///
/// assert_eq!(outcome.asgn, vec![1, 0, 1]);
/// assert_eq!(outcome.source_location, vec![2.0]);
/// assert_eq!(outcome.destination_location, vec![0.0]);
/// ```
pub fn split<L: LocationParameter + ?Sized>(
    asgn: &[usize],
    occ: &Occupancy,
    locations: &L,
    draw: &SplitDraw,
    scale: f64,
) -> Result<SplitOutcome, ProposalError> {
    let source = draw.source;
    if source >= occ.n_slots() || !occ.is_occupied(source) {
        return Err(ProposalError::EmptyCluster { cluster: source });
    }

    let destination = occ.first_unoccupied().ok_or(ProposalError::NoFreeSlot {
        n_slots: occ.n_slots(),
    })?;

    let n_source = occ.count(source);
    if draw.moves.len() != n_source {
        return Err(ProposalError::DrawLengthMismatch {
            what: "moves",
            expected: n_source,
            found: draw.moves.len(),
        });
    }

    let dim = locations.dim();
    if draw.jitter.len() != dim {
        return Err(ProposalError::DrawLengthMismatch {
            what: "jitter",
            expected: dim,
            found: draw.jitter.len(),
        });
    }

    let mut coins = draw.moves.iter();
    let asgn: Vec<usize> = asgn
        .iter()
        .map(|&k| {
            if k == source && coins.next() == Some(&true) {
                destination
            } else {
                k
            }
        })
        .collect();

    let center = locations.location(source);
    let source_location: Vec<f64> = center
        .iter()
        .zip(draw.jitter.iter())
        .map(|(&c, &z)| z.mul_add(scale, c))
        .collect();
    let destination_location: Vec<f64> = center
        .iter()
        .zip(draw.jitter.iter())
        .map(|(&c, &z)| (-z).mul_add(scale, c))
        .collect();

    Ok(SplitOutcome {
        asgn,
        source,
        destination,
        n_source,
        n_moved: draw.n_moved(),
        source_location,
        destination_location,
        jitter: draw.jitter.clone(),
        scale,
    })
}
