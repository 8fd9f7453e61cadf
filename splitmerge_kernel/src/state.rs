//! Handles to the host-owned allocation vector and cluster-location table.
//!
//! The host owns both parameters for the whole run and lends them to the
//! operator for the duration of one proposal. The operator only ever writes
//! entries; it never resizes either parameter. Snapshotting before a proposal
//! and restoring on rejection is the host's job.
use rand::Rng;
use serde::{Deserialize, Serialize};
use splitmerge_stats::crp;
use splitmerge_stats::rv::dist::Gaussian;
use splitmerge_stats::rv::traits::Rv;
use splitmerge_utils::{Matrix, Shape};

use crate::error::ConfigError;

/// Read-write access to the allocation of items to cluster slots
pub trait AllocationParameter {
    /// Identifier used in operator names and logs
    fn id(&self) -> &str;

    /// The number of items, `n`
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cluster slot item `ix` is allocated to
    fn get(&self, ix: usize) -> usize;

    /// Allocate item `ix` to cluster slot `k`
    fn set(&mut self, ix: usize, k: usize);

    /// Copy of the whole allocation vector
    fn values(&self) -> Vec<usize> {
        (0..self.len()).map(|ix| self.get(ix)).collect()
    }
}

/// Read-write access to the fixed-capacity table of cluster locations
pub trait LocationParameter {
    /// The number of cluster slots. This is the hard cap on the number of
    /// occupied clusters.
    fn n_slots(&self) -> usize;

    /// Dimension of each location
    fn dim(&self) -> usize;

    /// Location of cluster slot `k`
    fn location(&self, k: usize) -> &[f64];

    /// Overwrite the location of cluster slot `k`
    fn set_location(&mut self, k: usize, loc: &[f64]);
}

/// A host model that exposes both parameters the split-merge move acts on
pub trait HasClusterParameters {
    type Allocations: AllocationParameter;
    type Locations: LocationParameter;

    fn allocations(&self) -> &Self::Allocations;

    fn locations(&self) -> &Self::Locations;

    /// Borrow both parameters mutably at once
    fn cluster_parameters_mut(
        &mut self,
    ) -> (&mut Self::Allocations, &mut Self::Locations);
}

/// Allocation vector that records every write so the host can notify
/// dependents of exactly the items that changed.
///
/// Equality ignores the write log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Allocations {
    id: String,
    values: Vec<usize>,
    #[serde(skip)]
    changed: Vec<usize>,
}

impl Allocations {
    pub fn new(id: impl Into<String>, values: Vec<usize>) -> Self {
        Self {
            id: id.into(),
            values,
            changed: Vec::new(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.values
    }

    /// Indices written since the last call to `clear_changes`, in write order
    #[inline]
    pub fn changed(&self) -> &[usize] {
        &self.changed
    }

    pub fn clear_changes(&mut self) {
        self.changed.clear();
    }
}

impl PartialEq for Allocations {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}

impl AllocationParameter for Allocations {
    fn id(&self) -> &str {
        &self.id
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, ix: usize) -> usize {
        self.values[ix]
    }

    fn set(&mut self, ix: usize, k: usize) {
        self.values[ix] = k;
        self.changed.push(ix);
    }

    fn values(&self) -> Vec<usize> {
        self.values.clone()
    }
}

impl AllocationParameter for Vec<usize> {
    fn id(&self) -> &str {
        "allocations"
    }

    fn len(&self) -> usize {
        <[usize]>::len(self)
    }

    fn get(&self, ix: usize) -> usize {
        self[ix]
    }

    fn set(&mut self, ix: usize, k: usize) {
        self[ix] = k;
    }
}

/// Cluster locations, one row per slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterLocations {
    id: String,
    locations: Matrix<f64>,
}

impl ClusterLocations {
    pub fn new(id: impl Into<String>, locations: Matrix<f64>) -> Self {
        Self {
            id: id.into(),
            locations,
        }
    }

    pub fn from_vecs(id: impl Into<String>, rows: Vec<Vec<f64>>) -> Self {
        Self::new(id, Matrix::from_vecs(rows))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.locations
    }
}

impl LocationParameter for ClusterLocations {
    fn n_slots(&self) -> usize {
        self.locations.n_rows()
    }

    fn dim(&self) -> usize {
        self.locations.n_cols()
    }

    fn location(&self, k: usize) -> &[f64] {
        self.locations.row(k)
    }

    fn set_location(&mut self, k: usize, loc: &[f64]) {
        self.locations.set_row(k, loc);
    }
}

impl LocationParameter for Matrix<f64> {
    fn n_slots(&self) -> usize {
        self.n_rows()
    }

    fn dim(&self) -> usize {
        self.n_cols()
    }

    fn location(&self, k: usize) -> &[f64] {
        self.row(k)
    }

    fn set_location(&mut self, k: usize, loc: &[f64]) {
        self.set_row(k, loc);
    }
}

/// The pair of parameters a clustering model exposes to the move
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    pub allocations: Allocations,
    pub locations: ClusterLocations,
}

impl ClusterModel {
    pub fn new(allocations: Allocations, locations: ClusterLocations) -> Self {
        Self {
            allocations,
            locations,
        }
    }

    /// Draw a model from the prior: a CRP(`alpha`) allocation of `n_items`
    /// and N(0, `location_sd`²) locations for every one of `n_slots` slots.
    pub fn from_prior<R: Rng>(
        n_items: usize,
        n_slots: usize,
        dim: usize,
        alpha: f64,
        location_sd: f64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if n_items == 0 {
            return Err(ConfigError::EmptyAllocation {
                id: String::from("allocations"),
            });
        }
        if dim == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if n_slots < n_items {
            return Err(ConfigError::FewerSlotsThanItems { n_items, n_slots });
        }
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(ConfigError::InvalidConcentration(alpha));
        }
        if !(location_sd.is_finite() && location_sd > 0.0) {
            return Err(ConfigError::InvalidLocationSd(location_sd));
        }

        let asgn = crp::draw_allocation(n_items, alpha, rng);
        let g = Gaussian::new_unchecked(0.0, location_sd);
        let values: Vec<f64> = (0..n_slots * dim)
            .map(|_| {
                let x: f64 = g.draw(rng);
                x
            })
            .collect();

        Ok(Self {
            allocations: Allocations::new("allocations", asgn),
            locations: ClusterLocations::new(
                "locations",
                Matrix::from_raw_parts(values, n_slots),
            ),
        })
    }

    /// The number of distinct clusters in use
    pub fn n_occupied(&self) -> usize {
        let mut seen = vec![false; self.locations.n_slots()];
        self.allocations
            .as_slice()
            .iter()
            .filter(|&&k| !std::mem::replace(&mut seen[k], true))
            .count()
    }
}

impl HasClusterParameters for ClusterModel {
    type Allocations = Allocations;
    type Locations = ClusterLocations;

    fn allocations(&self) -> &Allocations {
        &self.allocations
    }

    fn locations(&self) -> &ClusterLocations {
        &self.locations
    }

    fn cluster_parameters_mut(
        &mut self,
    ) -> (&mut Allocations, &mut ClusterLocations) {
        (&mut self.allocations, &mut self.locations)
    }
}
