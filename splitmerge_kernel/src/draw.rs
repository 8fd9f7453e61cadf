//! The random draws that fully determine a split or a merge.
//!
//! Keeping the draws separate from the state update makes both moves pure
//! functions of (state, draw), so a merge can hand back the exact draw its
//! reverse split would need.
use rand::Rng;
use serde::{Deserialize, Serialize};
use splitmerge_stats::gauss::draw_jitter;
use splitmerge_stats::Occupancy;
use splitmerge_utils::{choose2ixs, coin_flips};

use crate::error::ProposalError;

/// Everything random about a split
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SplitDraw {
    /// The occupied cluster to split
    pub source: usize,
    /// One coin per member of `source`, in item order. `true` moves the item
    /// to the destination cluster.
    pub moves: Vec<bool>,
    /// Standard-normal jitter, one entry per dimension
    pub jitter: Vec<f64>,
}

impl SplitDraw {
    /// Draw a uniformly chosen occupied source, one fair coin per member, and
    /// a `dim`-dimensional standard-normal jitter.
    pub fn sample<R: Rng>(
        occ: &Occupancy,
        dim: usize,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<Self, ProposalError> {
        let n_occupied = occ.n_occupied();
        if n_occupied == 0 {
            return Err(ProposalError::TooFewClusters { n_occupied });
        }

        // The occupied list only holds nonzero counts, so the first draw is
        // accepted unless the occupancy bookkeeping is broken.
        let source = (0..max_attempts)
            .map(|_| occ.occupied[rng.gen_range(0..n_occupied)])
            .find(|&k| occ.is_occupied(k))
            .ok_or(ProposalError::DrawAttemptsExhausted {
                what: "an occupied split source",
                attempts: max_attempts,
            })?;

        let moves = coin_flips(occ.count(source), rng);
        let jitter = draw_jitter(dim, rng);

        Ok(Self {
            source,
            moves,
            jitter,
        })
    }

    /// The number of coins that send an item to the destination
    pub fn n_moved(&self) -> usize {
        self.moves.iter().filter(|&&mv| mv).count()
    }
}

/// An ordered pair of distinct occupied clusters to merge
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergePair {
    /// Receives every item and the merged location
    pub survivor: usize,
    /// Emptied by the merge
    pub absorbed: usize,
}

impl MergePair {
    /// Draw an ordered pair of distinct occupied clusters uniformly
    pub fn sample<R: Rng>(
        occ: &Occupancy,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<Self, ProposalError> {
        let n_occupied = occ.n_occupied();
        if n_occupied < 2 {
            return Err(ProposalError::TooFewClusters { n_occupied });
        }

        let (i, j) = choose2ixs(n_occupied, max_attempts, rng).ok_or(
            ProposalError::DrawAttemptsExhausted {
                what: "a distinct merge pair",
                attempts: max_attempts,
            },
        )?;

        Ok(Self {
            survivor: occ.occupied[i],
            absorbed: occ.occupied[j],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn split_draw_has_one_coin_per_member() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let occ = Occupancy::from_allocation(&[0, 2, 2, 0, 2], 5).unwrap();
        for _ in 0..20 {
            let draw = SplitDraw::sample(&occ, 3, 10, &mut rng).unwrap();
            assert!(draw.source == 0 || draw.source == 2);
            assert_eq!(draw.moves.len(), occ.count(draw.source));
            assert_eq!(draw.jitter.len(), 3);
        }
    }

    #[test]
    fn split_source_is_uniform_over_occupied() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let occ =
            Occupancy::from_allocation(&[0, 0, 0, 0, 0, 0, 0, 1], 4).unwrap();
        let n_zero = (0..2_000)
            .filter(|_| {
                SplitDraw::sample(&occ, 1, 10, &mut rng).unwrap().source == 0
            })
            .count();
        // by cluster, not by item
        assert!(n_zero > 850 && n_zero < 1_150);
    }

    #[test]
    fn merge_pair_is_distinct_and_occupied() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let occ = Occupancy::from_allocation(&[3, 1, 3, 0], 6).unwrap();
        for _ in 0..100 {
            let pair = MergePair::sample(&occ, 1_000, &mut rng).unwrap();
            assert_ne!(pair.survivor, pair.absorbed);
            assert!(occ.is_occupied(pair.survivor));
            assert!(occ.is_occupied(pair.absorbed));
        }
    }

    #[test]
    fn merge_pair_needs_two_clusters() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let occ = Occupancy::from_allocation(&[1, 1, 1], 3).unwrap();
        assert_eq!(
            MergePair::sample(&occ, 1_000, &mut rng),
            Err(ProposalError::TooFewClusters { n_occupied: 1 })
        );
    }

    #[test]
    fn merge_pair_with_no_attempts_fails_loudly() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let occ = Occupancy::from_allocation(&[0, 1], 2).unwrap();
        assert_eq!(
            MergePair::sample(&occ, 0, &mut rng),
            Err(ProposalError::DrawAttemptsExhausted {
                what: "a distinct merge pair",
                attempts: 0,
            })
        );
    }
}
