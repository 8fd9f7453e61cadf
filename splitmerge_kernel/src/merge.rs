//! Merging two occupied clusters into one
use serde::{Deserialize, Serialize};
use splitmerge_stats::Occupancy;
use splitmerge_utils::midpoint;

use crate::draw::{MergePair, SplitDraw};
use crate::error::ProposalError;
use crate::hastings::MoveContext;
use crate::policy::MoveKind;
use crate::state::LocationParameter;

/// The state produced by a merge, before it is written back to the host
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// The full allocation vector after the merge
    pub asgn: Vec<usize>,
    pub survivor: usize,
    /// Empty after the merge. Its location row is left stale.
    pub absorbed: usize,
    /// Number of items in the merged cluster
    pub n_merged: usize,
    /// New location of `survivor`, the midpoint of the old locations
    pub location: Vec<f64>,
    /// The draw that makes the split of `survivor` reproduce the state
    /// before the merge
    pub reverse: SplitDraw,
    pub scale: f64,
    /// `false` if the reverse split would send the absorbed items to a slot
    /// other than `absorbed`
    pub reversible: bool,
}

impl MergeOutcome {
    /// The offset `σz` that the reverse split would apply
    pub fn displacement(&self) -> Vec<f64> {
        self.reverse.jitter.iter().map(|z| z * self.scale).collect()
    }

    /// Inputs to the Hastings ratio
    pub fn context<'a>(&'a self, occ: &Occupancy) -> MoveContext<'a> {
        MoveContext {
            kind: MoveKind::Merge,
            n_occupied: occ.n_occupied(),
            n_slots: occ.n_slots(),
            n_coins: self.n_merged,
            jitter: &self.reverse.jitter,
            scale: self.scale,
            has_reverse: self.reversible,
        }
    }
}

/// Merge `pair.absorbed` into `pair.survivor`.
///
/// The survivor moves to the midpoint `m` of the two locations, and the
/// reverse split's jitter is recorded as `(c_survivor - m) / σ`.
///
/// # Example
///
/// ```rust
/// # use splitmerge_kernel::{merge, MergePair};
/// # use splitmerge_stats::Occupancy;
/// # use splitmerge_utils::Matrix;
/// let asgn = vec![0, 1, 0];
/// let occ = Occupancy::from_allocation(&asgn, 3).unwrap();
/// let locs = Matrix::from_vecs(vec![
///     vec![1.0, 1.0],
///     vec![3.0, 3.0],
///     vec![0.0, 0.0],
/// ]);
/// let pair = MergePair { survivor: 0, absorbed: 1 };
///
/// let outcome = merge(&asgn, &occ, &locs, &pair, 1.0).unwrap();
///
/// assert_eq!(outcome.asgn, vec![0, 0, 0]);
/// assert_eq!(outcome.location, vec![2.0, 2.0]);
/// assert_eq!(outcome.reverse.jitter, vec![-1.0, -1.0]);
/// assert_eq!(outcome.reverse.moves, vec![false, true, false]);
/// ```
pub fn merge<L: LocationParameter + ?Sized>(
    asgn: &[usize],
    occ: &Occupancy,
    locations: &L,
    pair: &MergePair,
    scale: f64,
) -> Result<MergeOutcome, ProposalError> {
    let MergePair { survivor, absorbed } = *pair;
    if survivor == absorbed {
        return Err(ProposalError::IdenticalMergePair { cluster: survivor });
    }
    for cluster in [survivor, absorbed] {
        if cluster >= occ.n_slots() || !occ.is_occupied(cluster) {
            return Err(ProposalError::EmptyCluster { cluster });
        }
    }

    let moves: Vec<bool> = asgn
        .iter()
        .filter(|&&k| k == survivor || k == absorbed)
        .map(|&k| k == absorbed)
        .collect();

    let new_asgn: Vec<usize> = asgn
        .iter()
        .map(|&k| if k == absorbed { survivor } else { k })
        .collect();

    let old_location = locations.location(survivor);
    let location = midpoint(old_location, locations.location(absorbed));
    let jitter: Vec<f64> = old_location
        .iter()
        .zip(location.iter())
        .map(|(c, m)| (c - m) / scale)
        .collect();

    // After the merge `absorbed` is free, so the reverse split picks it only
    // if no lower slot is already free.
    let reversible = occ.first_unoccupied().map_or(true, |k| absorbed < k);

    Ok(MergeOutcome {
        asgn: new_asgn,
        survivor,
        absorbed,
        n_merged: moves.len(),
        location,
        reverse: SplitDraw {
            source: survivor,
            moves,
            jitter,
        },
        scale,
        reversible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitmerge_utils::Matrix;

    fn locations() -> Matrix<f64> {
        Matrix::from_vecs(vec![
            vec![1.0, 1.0],
            vec![3.0, 3.0],
            vec![10.0, -10.0],
            vec![0.0, 0.0],
        ])
    }

    #[test]
    fn absorbed_items_join_survivor() {
        let asgn = vec![2, 0, 2, 1, 0];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 0,
            absorbed: 2,
        };
        let outcome = merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap();

        assert_eq!(outcome.asgn, vec![0, 0, 0, 1, 0]);
        assert_eq!(outcome.n_merged, 4);
        assert_eq!(outcome.reverse.source, 0);
        assert_eq!(outcome.reverse.moves, vec![true, false, true, false]);
        assert_eq!(outcome.location, vec![5.5, -4.5]);
        assert_eq!(outcome.reverse.jitter, vec![-4.5, 5.5]);
    }

    #[test]
    fn recorded_jitter_scales_inversely_with_scale() {
        let asgn = vec![0, 1];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 0,
            absorbed: 1,
        };
        let outcome = merge(&asgn, &occ, &locations(), &pair, 2.0).unwrap();
        assert_eq!(outcome.reverse.jitter, vec![-0.5, -0.5]);
        assert_eq!(outcome.displacement(), vec![-1.0, -1.0]);
    }

    #[test]
    fn absorbing_above_a_free_slot_is_not_reversible() {
        // slot 1 is free, so the reverse split would use 1, not 2
        let asgn = vec![0, 2, 3];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 0,
            absorbed: 2,
        };
        let outcome = merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap();
        assert!(!outcome.reversible);

        let pair = MergePair {
            survivor: 2,
            absorbed: 0,
        };
        let outcome = merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap();
        assert!(outcome.reversible);
    }

    #[test]
    fn merge_at_capacity_is_reversible() {
        let asgn = vec![3, 2, 1, 0];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 1,
            absorbed: 3,
        };
        let outcome = merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap();
        assert!(outcome.reversible);
    }

    #[test]
    fn identical_pair_is_an_error() {
        let asgn = vec![0, 1];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 1,
            absorbed: 1,
        };
        assert_eq!(
            merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap_err(),
            ProposalError::IdenticalMergePair { cluster: 1 }
        );
    }

    #[test]
    fn unoccupied_cluster_is_an_error() {
        let asgn = vec![0, 1];
        let occ = Occupancy::from_allocation(&asgn, 4).unwrap();
        let pair = MergePair {
            survivor: 0,
            absorbed: 3,
        };
        assert_eq!(
            merge(&asgn, &occ, &locations(), &pair, 1.0).unwrap_err(),
            ProposalError::EmptyCluster { cluster: 3 }
        );
    }
}
