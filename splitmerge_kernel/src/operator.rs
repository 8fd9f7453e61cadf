use rand::Rng;
use serde::{Deserialize, Serialize};
use splitmerge_consts::{
    MAX_ACCEPTANCE_LEVEL, MAX_GOOD_ACCEPTANCE_LEVEL, MIN_ACCEPTANCE_LEVEL,
    MIN_GOOD_ACCEPTANCE_LEVEL, OPERATOR_NAME,
};
use splitmerge_stats::Occupancy;

use crate::config::{HastingsKind, SplitMergeConfig};
use crate::draw::{MergePair, SplitDraw};
use crate::error::{ConfigError, ProposalError, TuningError};
use crate::hastings::HastingsRatio;
use crate::merge::merge;
use crate::policy::{choose_move, MoveKind};
use crate::split::split;
use crate::state::{AllocationParameter, HasClusterParameters, LocationParameter};

/// Acceptance-rate bands an operator reports to the host's tuning layer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AcceptanceBounds {
    /// Below this the operator is mixing badly
    pub min: f64,
    /// Above this the operator is too timid
    pub max: f64,
    pub min_good: f64,
    pub max_good: f64,
}

impl Default for AcceptanceBounds {
    fn default() -> Self {
        Self {
            min: MIN_ACCEPTANCE_LEVEL,
            max: MAX_ACCEPTANCE_LEVEL,
            min_good: MIN_GOOD_ACCEPTANCE_LEVEL,
            max_good: MAX_GOOD_ACCEPTANCE_LEVEL,
        }
    }
}

impl AcceptanceBounds {
    /// `true` if `rate` is within the acceptable band
    pub fn contains(&self, rate: f64) -> bool {
        self.min <= rate && rate <= self.max
    }

    /// `true` if `rate` is within the good band
    pub fn is_good(&self, rate: f64) -> bool {
        self.min_good <= rate && rate <= self.max_good
    }
}

/// The protocol between a sampler and one of its transition operators.
///
/// The host owns the model `M`. It snapshots the model before `propose`,
/// accepts or rejects using the returned log Hastings ratio, and restores the
/// snapshot on rejection.
pub trait McmcOperator<M, R: Rng> {
    /// Name used in logs and operator reports
    fn name(&self) -> String;

    /// Relative frequency with which the host selects this operator
    fn weight(&self) -> f64;

    /// Mutate `model` and return the log Hastings ratio of the proposal
    fn propose(
        &mut self,
        model: &mut M,
        rng: &mut R,
    ) -> Result<f64, ProposalError>;

    fn acceptance_bounds(&self) -> AcceptanceBounds {
        AcceptanceBounds::default()
    }

    /// `true` if the operator adapts its step size
    fn is_optimizing(&self) -> bool {
        false
    }

    fn set_optimizing(&mut self, optimizing: bool) -> Result<(), TuningError>;

    /// Adapt the step size toward `target_acceptance`
    fn optimize(&mut self, target_acceptance: f64) -> Result<(), TuningError>;

    /// Number of elementary proposals made per call to `propose`
    fn step_count(&self) -> usize {
        1
    }

    /// A hint for the user when `acceptance_rate` is outside the acceptable
    /// band
    fn performance_suggestion(&self, acceptance_rate: f64) -> Option<String>;
}

/// What the last proposal did
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProposalSummary {
    pub kind: MoveKind,
    /// (source, destination) for a split; (survivor, absorbed) for a merge
    pub clusters: (usize, usize),
    pub n_occupied_before: usize,
    pub n_occupied_after: usize,
    pub ln_hastings: f64,
    /// Number of allocation entries that changed and were written
    pub n_allocation_writes: usize,
}

/// Reversible-jump split-merge move on a cluster allocation and the
/// locations of its clusters.
///
/// The operator is bound to the shapes of the host's parameters at
/// construction. It holds no reference to them; every proposal borrows them
/// from the host.
#[derive(Clone, Debug)]
pub struct ClusterSplitMerge<H = HastingsKind> {
    parameter_id: String,
    n_items: usize,
    n_slots: usize,
    dim: usize,
    weight: f64,
    scale: f64,
    max_draw_attempts: usize,
    hastings: H,
    last: Option<ProposalSummary>,
}

fn check_shapes<A, L>(asgn: &A, locations: &L) -> Result<(), ConfigError>
where
    A: AllocationParameter + ?Sized,
    L: LocationParameter + ?Sized,
{
    let n_items = asgn.len();
    let n_slots = locations.n_slots();

    if asgn.is_empty() {
        return Err(ConfigError::EmptyAllocation {
            id: asgn.id().to_owned(),
        });
    }
    if locations.dim() == 0 {
        return Err(ConfigError::ZeroDimension);
    }
    if n_slots < 2 {
        return Err(ConfigError::TooFewSlots { n_slots });
    }
    if n_slots < n_items {
        return Err(ConfigError::FewerSlotsThanItems { n_items, n_slots });
    }
    (0..n_items).try_for_each(|item| {
        let cluster = asgn.get(item);
        if cluster < n_slots {
            Ok(())
        } else {
            Err(ConfigError::AllocationOutOfBounds {
                item,
                cluster,
                n_slots,
            })
        }
    })
}

impl ClusterSplitMerge {
    /// Bind a move with default scale and the reversible-jump ratio
    pub fn new<A, L>(
        asgn: &A,
        locations: &L,
        weight: f64,
    ) -> Result<Self, ConfigError>
    where
        A: AllocationParameter + ?Sized,
        L: LocationParameter + ?Sized,
    {
        Self::from_config(asgn, locations, &SplitMergeConfig::new().weight(weight))
    }

    pub fn from_config<A, L>(
        asgn: &A,
        locations: &L,
        config: &SplitMergeConfig,
    ) -> Result<Self, ConfigError>
    where
        A: AllocationParameter + ?Sized,
        L: LocationParameter + ?Sized,
    {
        config.validate()?;
        check_shapes(asgn, locations)?;

        Ok(Self {
            parameter_id: asgn.id().to_owned(),
            n_items: asgn.len(),
            n_slots: locations.n_slots(),
            dim: locations.dim(),
            weight: config.weight,
            scale: config.scale,
            max_draw_attempts: config.max_draw_attempts,
            hastings: config.hastings,
            last: None,
        })
    }
}

impl<H> ClusterSplitMerge<H> {
    /// Replace the Hastings-ratio computation
    pub fn with_hastings<H2: HastingsRatio>(
        self,
        hastings: H2,
    ) -> ClusterSplitMerge<H2> {
        ClusterSplitMerge {
            parameter_id: self.parameter_id,
            n_items: self.n_items,
            n_slots: self.n_slots,
            dim: self.dim,
            weight: self.weight,
            scale: self.scale,
            max_draw_attempts: self.max_draw_attempts,
            hastings,
            last: self.last,
        }
    }

    pub fn parameter_id(&self) -> &str {
        &self.parameter_id
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn n_slots(&self) -> usize {
        self.n_slots
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn hastings(&self) -> &H {
        &self.hastings
    }

    /// Summary of the last successful proposal
    pub fn last_proposal(&self) -> Option<&ProposalSummary> {
        self.last.as_ref()
    }

    /// The allocation parameter this move acts on
    pub fn parameter<'m, M: HasClusterParameters>(
        &self,
        model: &'m M,
    ) -> &'m M::Allocations {
        model.allocations()
    }
}

impl<H: HastingsRatio> ClusterSplitMerge<H> {
    fn check_bound_shapes<A, L>(
        &self,
        asgn: &A,
        locations: &L,
    ) -> Result<(), ProposalError>
    where
        A: AllocationParameter + ?Sized,
        L: LocationParameter + ?Sized,
    {
        if asgn.len() != self.n_items {
            return Err(ProposalError::ItemCountChanged {
                expected: self.n_items,
                found: asgn.len(),
            });
        }
        if locations.n_slots() != self.n_slots || locations.dim() != self.dim
        {
            return Err(ProposalError::LocationShapeChanged {
                expected_slots: self.n_slots,
                expected_dim: self.dim,
                found_slots: locations.n_slots(),
                found_dim: locations.dim(),
            });
        }
        Ok(())
    }

    /// Propose a split or merge on borrowed parameters and return the log
    /// Hastings ratio.
    ///
    /// Only allocation entries whose cluster changed are written. On error
    /// nothing has been written.
    pub fn propose_on<A, L, R>(
        &mut self,
        asgn: &mut A,
        locations: &mut L,
        rng: &mut R,
    ) -> Result<f64, ProposalError>
    where
        A: AllocationParameter + ?Sized,
        L: LocationParameter + ?Sized,
        R: Rng,
    {
        self.check_bound_shapes(asgn, locations)?;

        let current = asgn.values();
        let occ = Occupancy::from_allocation(&current, self.n_slots)?;
        let n_occupied = occ.n_occupied();
        let kind = choose_move(n_occupied, self.n_slots, rng);

        let (proposed, clusters, n_occupied_after, ln_hastings) = match kind {
            MoveKind::Split => {
                let draw = SplitDraw::sample(
                    &occ,
                    self.dim,
                    self.max_draw_attempts,
                    rng,
                )?;
                let outcome =
                    split(&current, &occ, &*locations, &draw, self.scale)?;
                let ln_hastings =
                    self.hastings.ln_hastings(&outcome.context(&occ));

                locations
                    .set_location(outcome.source, &outcome.source_location);
                locations.set_location(
                    outcome.destination,
                    &outcome.destination_location,
                );

                let n_occupied_after = outcome.n_occupied_after(n_occupied);
                (
                    outcome.asgn,
                    (outcome.source, outcome.destination),
                    n_occupied_after,
                    ln_hastings,
                )
            }
            MoveKind::Merge => {
                let pair =
                    MergePair::sample(&occ, self.max_draw_attempts, rng)?;
                let outcome =
                    merge(&current, &occ, &*locations, &pair, self.scale)?;
                let ln_hastings =
                    self.hastings.ln_hastings(&outcome.context(&occ));

                locations.set_location(outcome.survivor, &outcome.location);

                (
                    outcome.asgn,
                    (outcome.survivor, outcome.absorbed),
                    n_occupied - 1,
                    ln_hastings,
                )
            }
        };

        let mut n_allocation_writes = 0;
        current
            .iter()
            .zip(proposed.iter())
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .for_each(|(ix, (_, &k))| {
                asgn.set(ix, k);
                n_allocation_writes += 1;
            });

        log::trace!(
            "{} {}: {:?}, K {} -> {}, {} writes, ln r = {}",
            OPERATOR_NAME,
            kind,
            clusters,
            n_occupied,
            n_occupied_after,
            n_allocation_writes,
            ln_hastings
        );

        self.last = Some(ProposalSummary {
            kind,
            clusters,
            n_occupied_before: n_occupied,
            n_occupied_after,
            ln_hastings,
            n_allocation_writes,
        });

        Ok(ln_hastings)
    }
}

impl<H> std::fmt::Display for ClusterSplitMerge<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({})", OPERATOR_NAME, self.parameter_id)
    }
}

impl<M, R, H> McmcOperator<M, R> for ClusterSplitMerge<H>
where
    M: HasClusterParameters,
    R: Rng,
    H: HastingsRatio,
{
    fn name(&self) -> String {
        self.to_string()
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn propose(
        &mut self,
        model: &mut M,
        rng: &mut R,
    ) -> Result<f64, ProposalError> {
        let (asgn, locations) = model.cluster_parameters_mut();
        self.propose_on(asgn, locations, rng)
    }

    fn set_optimizing(&mut self, _optimizing: bool) -> Result<(), TuningError> {
        Err(TuningError::NotTunable {
            operator: self.to_string(),
        })
    }

    fn optimize(&mut self, _target_acceptance: f64) -> Result<(), TuningError> {
        Err(TuningError::NotTunable {
            operator: self.to_string(),
        })
    }

    fn performance_suggestion(&self, acceptance_rate: f64) -> Option<String> {
        let bounds = AcceptanceBounds::default();
        if acceptance_rate < bounds.min {
            Some(format!(
                "Try decreasing the split scale to about {:.4}",
                self.scale / 2.0
            ))
        } else if acceptance_rate > bounds.max {
            Some(format!(
                "Try increasing the split scale to about {:.4}",
                self.scale * 2.0
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hastings::Neutral;
    use crate::state::{Allocations, ClusterLocations, ClusterModel};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn model(asgn: Vec<usize>, n_slots: usize) -> ClusterModel {
        let rows = (0..n_slots).map(|k| vec![k as f64, -(k as f64)]).collect();
        ClusterModel::new(
            Allocations::new("z", asgn),
            ClusterLocations::from_vecs("mu", rows),
        )
    }

    #[test]
    fn name_includes_parameter_id() {
        let m = model(vec![0, 0, 1], 4);
        let op =
            ClusterSplitMerge::new(&m.allocations, &m.locations, 2.0).unwrap();
        let op_ref: &dyn McmcOperator<ClusterModel, Xoshiro256Plus> = &op;
        assert_eq!(op_ref.name(), "clusterSplitMergeOperator(z)");
        assert_eq!(op_ref.weight(), 2.0);
        assert_eq!(op.to_string(), op_ref.name());
    }

    #[test]
    fn construction_rejects_bad_shapes() {
        let m = model(vec![0, 0, 1], 2);
        assert_eq!(
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0)
                .unwrap_err(),
            ConfigError::FewerSlotsThanItems {
                n_items: 3,
                n_slots: 2
            }
        );

        let m = model(vec![0], 1);
        assert_eq!(
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0)
                .unwrap_err(),
            ConfigError::TooFewSlots { n_slots: 1 }
        );

        let m = model(vec![0, 5], 3);
        assert_eq!(
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0)
                .unwrap_err(),
            ConfigError::AllocationOutOfBounds {
                item: 1,
                cluster: 5,
                n_slots: 3
            }
        );

        let m = model(vec![], 3);
        assert_eq!(
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0)
                .unwrap_err(),
            ConfigError::EmptyAllocation { id: "z".into() }
        );
    }

    #[test]
    fn construction_rejects_zero_dimension() {
        let asgn: Vec<usize> = vec![0, 1];
        let locs = splitmerge_utils::Matrix::<f64>::from_raw_parts(vec![], 3);
        assert_eq!(
            ClusterSplitMerge::new(&asgn, &locs, 1.0).unwrap_err(),
            ConfigError::ZeroDimension
        );
    }

    #[test]
    fn construction_rejects_bad_config() {
        let m = model(vec![0, 1], 3);
        let config = SplitMergeConfig::new().scale(0.0);
        assert_eq!(
            ClusterSplitMerge::from_config(&m.allocations, &m.locations, &config)
                .unwrap_err(),
            ConfigError::InvalidScale(0.0)
        );
    }

    #[test]
    fn resized_allocation_is_a_proposal_error() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let m = model(vec![0, 1], 3);
        let mut op =
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0).unwrap();
        let mut asgn: Vec<usize> = vec![0, 1, 0];
        let mut locs = m.locations.clone();
        assert_eq!(
            op.propose_on(&mut asgn, &mut locs, &mut rng).unwrap_err(),
            ProposalError::ItemCountChanged {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn summary_tracks_last_proposal() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let mut m = model(vec![0, 0, 0, 0], 4);
        let mut op =
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0).unwrap();
        assert!(op.last_proposal().is_none());

        op.propose(&mut m, &mut rng).unwrap();
        let summary = op.last_proposal().unwrap();
        assert_eq!(summary.kind, MoveKind::Split);
        assert_eq!(summary.clusters, (0, 1));
        assert_eq!(summary.n_occupied_before, 1);
        assert_eq!(summary.n_allocation_writes, m.allocations.changed().len());
    }

    #[test]
    fn neutral_ratio_is_zero() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        let mut m = model(vec![0, 1, 1, 2], 5);
        let mut op = ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0)
            .unwrap()
            .with_hastings(Neutral);
        for _ in 0..20 {
            assert_eq!(op.propose(&mut m, &mut rng).unwrap(), 0.0);
        }
    }

    #[test]
    fn tuning_is_refused() {
        let m = model(vec![0, 1], 3);
        let mut op =
            ClusterSplitMerge::new(&m.allocations, &m.locations, 1.0).unwrap();
        let expected = TuningError::NotTunable {
            operator: "clusterSplitMergeOperator(z)".into(),
        };
        let op_ref: &mut dyn McmcOperator<ClusterModel, Xoshiro256Plus> =
            &mut op;
        assert!(!op_ref.is_optimizing());
        assert_eq!(op_ref.set_optimizing(true), Err(expected.clone()));
        assert_eq!(op_ref.optimize(0.25), Err(expected));
        assert_eq!(op_ref.step_count(), 1);
    }

    #[test]
    fn suggestions_outside_acceptable_band() {
        let m = model(vec![0, 1], 3);
        let op = ClusterSplitMerge::from_config(
            &m.allocations,
            &m.locations,
            &SplitMergeConfig::new().scale(2.0),
        )
        .unwrap();
        let op_ref: &dyn McmcOperator<ClusterModel, Xoshiro256Plus> = &op;
        let low = op_ref.performance_suggestion(0.01).unwrap();
        assert!(low.contains("decreasing") && low.contains("1.0000"));
        let high = op_ref.performance_suggestion(0.9).unwrap();
        assert!(high.contains("increasing") && high.contains("4.0000"));
        assert!(op_ref.performance_suggestion(0.25).is_none());
    }

    #[test]
    fn acceptance_bounds_bands() {
        let bounds = AcceptanceBounds::default();
        assert!(bounds.contains(0.15));
        assert!(!bounds.is_good(0.15));
        assert!(bounds.is_good(0.25));
        assert!(!bounds.contains(0.5));
    }
}
