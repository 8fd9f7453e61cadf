//! Chinese restaurant process partition prior
use rand::Rng;
use special::Gamma;

use crate::rv::misc::pflip;

/// Log probability of a partition with occupied-cluster sizes `cts` of `n`
/// items under a CRP with concentration `alpha`.
///
/// Zero counts are skipped, so `cts` can hold one entry per slot.
pub fn lcrp(n: usize, cts: &[usize], alpha: f64) -> f64 {
    let (k, gsum) = cts
        .iter()
        .filter(|&&ct| ct > 0)
        .fold((0.0_f64, 0.0_f64), |(k, acc), &ct| {
            (k + 1.0, acc + Gamma::ln_gamma(ct as f64).0)
        });
    let cpnt_2 =
        Gamma::ln_gamma(alpha).0 - Gamma::ln_gamma(n as f64 + alpha).0;
    gsum + k.mul_add(alpha.ln(), cpnt_2)
}

/// Log of the number of ways to place `k` distinguishable clusters in
/// `n_slots` slots, `n_slots! / (n_slots - k)!`.
///
/// Returns `-inf` if `k > n_slots`.
///
/// # Example
///
/// ```rust
/// # use splitmerge_stats::crp::ln_labellings;
/// assert!((ln_labellings(4, 2) - 12_f64.ln()).abs() < 1E-12);
/// assert_eq!(ln_labellings(4, 0), 0.0);
/// ```
pub fn ln_labellings(n_slots: usize, k: usize) -> f64 {
    if k > n_slots {
        f64::NEG_INFINITY
    } else {
        (0..k).map(|i| ((n_slots - i) as f64).ln()).sum()
    }
}

/// Draw an allocation of `n` items from a CRP with concentration `alpha`.
///
/// Cluster indices are assigned in order of first appearance, so the
/// occupied slots are `0..K`.
pub fn draw_allocation<R: Rng>(n: usize, alpha: f64, rng: &mut R) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut n_cats: usize = 1;
    let mut ps = vec![1.0, alpha];
    let mut zs = vec![0; n];

    for z in zs.iter_mut().skip(1) {
        let zi = pflip(&ps, 1, rng)[0];
        *z = zi;
        if zi < n_cats {
            ps[zi] += 1.0;
        } else {
            ps[zi] = 1.0;
            ps.push(alpha);
            n_cats += 1;
        };
    }

    zs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const TOL: f64 = 1E-12;

    #[test]
    fn lcrp_all_ones() {
        let lcrp_1 = lcrp(4, &[1, 1, 1, 1], 1.0);
        assert_relative_eq!(lcrp_1, -3.1780538303479458, epsilon = TOL);

        let lcrp_2 = lcrp(4, &[1, 1, 1, 1], 2.1);
        assert_relative_eq!(lcrp_2, -1.945817590743511, epsilon = TOL);
    }

    #[test]
    fn lcrp_ignores_empty_slots() {
        let dense = lcrp(5, &[2, 3], 1.5);
        let sparse = lcrp(5, &[0, 2, 0, 3, 0], 1.5);
        assert_relative_eq!(dense, sparse, epsilon = TOL);
    }

    #[test]
    fn lcrp_partitions_of_three_sum_to_one() {
        // one 3-block, three 2+1 partitions, one 1+1+1
        let alpha = 0.7;
        let total = lcrp(3, &[3], alpha).exp()
            + 3.0 * lcrp(3, &[2, 1], alpha).exp()
            + lcrp(3, &[1, 1, 1], alpha).exp();
        assert_relative_eq!(total, 1.0, epsilon = 1E-10);
    }

    #[test]
    fn ln_labellings_counts_injective_placements() {
        assert_relative_eq!(ln_labellings(3, 3), 6_f64.ln(), epsilon = TOL);
        assert_relative_eq!(ln_labellings(5, 1), 5_f64.ln(), epsilon = TOL);
        assert_eq!(ln_labellings(2, 3), f64::NEG_INFINITY);
    }

    #[test]
    fn draw_allocation_is_first_appearance_ordered() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        for _ in 0..50 {
            let zs = draw_allocation(20, 2.0, &mut rng);
            assert_eq!(zs.len(), 20);
            assert_eq!(zs[0], 0);
            let mut max_seen = 0;
            for &z in zs.iter() {
                assert!(z <= max_seen + 1);
                max_seen = max_seen.max(z);
            }
        }
    }

    #[test]
    fn draw_allocation_of_zero_items() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1337);
        assert!(draw_allocation(0, 1.0, &mut rng).is_empty());
    }
}
