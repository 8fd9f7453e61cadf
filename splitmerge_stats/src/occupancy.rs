//! Cluster occupancy derived from a flat allocation vector
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validates occupancy if `SPLITMERGE_NOCHECK` is not set to `"1"` at build
/// time.
#[macro_export]
macro_rules! validate_occupancy {
    ($occ:expr) => {{
        let validate_occ: bool = match option_env!("SPLITMERGE_NOCHECK") {
            Some(value) => value != "1",
            None => true,
        };
        if validate_occ {
            $occ.validate().is_valid()
        } else {
            true
        }
    }};
}

/// Per-proposal occupancy of a fixed set of cluster slots.
///
/// Derived from the allocation vector at the start of every proposal and
/// never persisted.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Occupancy {
    /// `counts[k]` is the number of items allocated to slot `k`. There is one
    /// entry per slot, occupied or not.
    pub counts: Vec<usize>,
    /// The occupied slots in the order they were first encountered while
    /// scanning items `0..n`.
    pub occupied: Vec<usize>,
    /// The number of allocated items
    pub n_items: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OccupancyError {
    #[error("The allocation vector is empty")]
    EmptyAllocation,
    #[error(
        "Item {item} is allocated to cluster {cluster} but there are only \
        {n_slots} cluster slots"
    )]
    ClusterIndexOutOfBounds {
        item: usize,
        cluster: usize,
        n_slots: usize,
    },
    #[error("The sum of counts does not equal the number of items")]
    SumCountsNotEqualToNItems,
    #[error("The occupied list contains a cluster beyond the slot range")]
    OccupiedClusterOutOfRange,
    #[error("The occupied list contains a cluster more than once")]
    DuplicateOccupiedCluster,
    #[error("The occupied list does not agree with the counts")]
    OccupiedAndCountsDisagree,
    #[error("The number of occupied clusters is out of bounds")]
    NOccupiedOutOfBounds,
}

/// The possible ways occupancy can go wrong with incorrect bookkeeping
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct OccupancyDiagnostics {
    /// The sum of `counts` should be the number of items
    sum_counts_cmp_n: bool,
    /// Every entry in `occupied` should be a valid slot
    occupied_within_slots: bool,
    /// No cluster should appear twice in `occupied`
    occupied_has_no_duplicates: bool,
    /// A slot is in `occupied` iff its count is nonzero
    occupied_agrees_with_counts: bool,
    /// `1 <= K <= min(n_items, n_slots)`
    n_occupied_in_bounds: bool,
}

impl OccupancyDiagnostics {
    pub fn new(occ: &Occupancy) -> Self {
        let n_slots = occ.counts.len();
        OccupancyDiagnostics {
            sum_counts_cmp_n: {
                let n: usize = occ.counts.iter().sum();
                n == occ.n_items
            },
            occupied_within_slots: occ
                .occupied
                .iter()
                .all(|&k| k < n_slots),
            occupied_has_no_duplicates: {
                let mut seen = vec![false; n_slots];
                occ.occupied.iter().all(|&k| {
                    k < n_slots && !std::mem::replace(&mut seen[k], true)
                })
            },
            occupied_agrees_with_counts: {
                let n_nonzero = occ.counts.iter().filter(|&&ct| ct > 0).count();
                n_nonzero == occ.occupied.len()
                    && occ
                        .occupied
                        .iter()
                        .all(|&k| occ.counts.get(k).map_or(false, |&ct| ct > 0))
            },
            n_occupied_in_bounds: {
                let k = occ.occupied.len();
                k >= 1 && k <= occ.n_items && k <= n_slots
            },
        }
    }

    /// `true` if none of diagnostics was violated
    pub fn is_valid(&self) -> bool {
        self.sum_counts_cmp_n
            && self.occupied_within_slots
            && self.occupied_has_no_duplicates
            && self.occupied_agrees_with_counts
            && self.n_occupied_in_bounds
    }

    pub fn emit_error(&self) -> Result<(), OccupancyError> {
        if !self.sum_counts_cmp_n {
            Err(OccupancyError::SumCountsNotEqualToNItems)
        } else if !self.occupied_within_slots {
            Err(OccupancyError::OccupiedClusterOutOfRange)
        } else if !self.occupied_has_no_duplicates {
            Err(OccupancyError::DuplicateOccupiedCluster)
        } else if !self.occupied_agrees_with_counts {
            Err(OccupancyError::OccupiedAndCountsDisagree)
        } else if !self.n_occupied_in_bounds {
            Err(OccupancyError::NOccupiedOutOfBounds)
        } else {
            Ok(())
        }
    }
}

impl Occupancy {
    /// Derive the occupancy of `n_slots` cluster slots from an allocation
    /// vector.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use splitmerge_stats::Occupancy;
    /// let occ = Occupancy::from_allocation(&[3, 0, 3, 1], 5).unwrap();
    ///
    /// assert_eq!(occ.counts, vec![1, 1, 0, 2, 0]);
    /// assert_eq!(occ.occupied, vec![3, 0, 1]);
    /// assert_eq!(occ.n_occupied(), 3);
    /// assert_eq!(occ.first_unoccupied(), Some(2));
    /// ```
    pub fn from_allocation(
        asgn: &[usize],
        n_slots: usize,
    ) -> Result<Self, OccupancyError> {
        if asgn.is_empty() {
            return Err(OccupancyError::EmptyAllocation);
        }

        let mut counts: Vec<usize> = vec![0; n_slots];
        let mut occupied: Vec<usize> = Vec::new();

        for (item, &k) in asgn.iter().enumerate() {
            let ct = counts.get_mut(k).ok_or(
                OccupancyError::ClusterIndexOutOfBounds {
                    item,
                    cluster: k,
                    n_slots,
                },
            )?;
            *ct += 1;
            if *ct == 1 {
                occupied.push(k);
            }
        }

        let occ = Occupancy {
            counts,
            occupied,
            n_items: asgn.len(),
        };

        if validate_occupancy!(occ) {
            Ok(occ)
        } else {
            occ.validate().emit_error().map(|_| occ)
        }
    }

    /// The number of cluster slots, occupied or not
    #[inline]
    pub fn n_slots(&self) -> usize {
        self.counts.len()
    }

    /// The number of occupied clusters, K
    #[inline]
    pub fn n_occupied(&self) -> usize {
        self.occupied.len()
    }

    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.counts[k]
    }

    #[inline]
    pub fn is_occupied(&self, k: usize) -> bool {
        self.counts[k] > 0
    }

    /// The lowest-indexed slot with no items in it
    pub fn first_unoccupied(&self) -> Option<usize> {
        self.counts.iter().position(|&ct| ct == 0)
    }

    /// Validates the occupancy
    pub fn validate(&self) -> OccupancyDiagnostics {
        OccupancyDiagnostics::new(self)
    }
}
