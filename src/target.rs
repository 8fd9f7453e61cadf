//! Log targets over cluster models
use serde::{Deserialize, Serialize};
use splitmerge_consts::{DEFAULT_CRP_ALPHA, DEFAULT_LOCATION_SD};
use splitmerge_kernel::{ClusterModel, ConfigError, LocationParameter};
use splitmerge_stats::crp::{lcrp, ln_labellings};
use splitmerge_stats::gauss::ln_location_density;
use splitmerge_stats::Occupancy;

/// An unnormalized log density over cluster models
pub trait LogTarget {
    fn ln_f(&self, model: &ClusterModel) -> f64;
}

/// Constant target. Every proposal is judged by its Hastings ratio alone.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Flat;

impl LogTarget for Flat {
    fn ln_f(&self, _model: &ClusterModel) -> f64 {
        0.0
    }
}

/// CRP(`alpha`) prior on the partition with independent N(0, `location_sd`²)
/// priors on the locations of the occupied clusters. Locations of free slots
/// do not enter the density.
///
/// The split-merge move samples labelled states: which slot each cluster
/// sits in matters. Splits always fill the lowest free slot, so only slots
/// `0..n_items` are ever occupied. The density spreads the probability of
/// each partition uniformly over its `n_items! / (n_items - K)!` placements
/// in those slots, which makes the partition marginal exactly CRP(`alpha`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CrpLocationPrior {
    pub alpha: f64,
    pub location_sd: f64,
}

impl Default for CrpLocationPrior {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_CRP_ALPHA,
            location_sd: DEFAULT_LOCATION_SD,
        }
    }
}

impl CrpLocationPrior {
    pub fn new(alpha: f64, location_sd: f64) -> Result<Self, ConfigError> {
        let prior = Self { alpha, location_sd };
        prior.validate()?;
        Ok(prior)
    }

    /// Both settings must be positive and finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            Err(ConfigError::InvalidConcentration(self.alpha))
        } else if !(self.location_sd.is_finite() && self.location_sd > 0.0) {
            Err(ConfigError::InvalidLocationSd(self.location_sd))
        } else {
            Ok(())
        }
    }
}

impl LogTarget for CrpLocationPrior {
    fn ln_f(&self, model: &ClusterModel) -> f64 {
        let asgn = model.allocations.as_slice();
        let n_slots = model.locations.n_slots();
        match Occupancy::from_allocation(asgn, n_slots) {
            Ok(occ) => {
                let ln_partition = lcrp(occ.n_items, &occ.counts, self.alpha)
                    - ln_labellings(occ.n_items, occ.n_occupied());
                let ln_locations: f64 = occ
                    .occupied
                    .iter()
                    .map(|&k| {
                        ln_location_density(
                            model.locations.location(k),
                            self.location_sd,
                        )
                    })
                    .sum();
                ln_partition + ln_locations
            }
            Err(err) => {
                log::warn!("Model is outside the support of the target: {err}");
                f64::NEG_INFINITY
            }
        }
    }
}

/// The targets a run can be configured with
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Flat,
    CrpLocationPrior(CrpLocationPrior),
}

impl Default for Target {
    fn default() -> Self {
        Self::CrpLocationPrior(CrpLocationPrior::default())
    }
}

impl LogTarget for Target {
    fn ln_f(&self, model: &ClusterModel) -> f64 {
        match self {
            Self::Flat => Flat.ln_f(model),
            Self::CrpLocationPrior(prior) => prior.ln_f(model),
        }
    }
}
