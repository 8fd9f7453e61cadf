//! Chi-square goodness of fit for sampled category counts
use special::Gamma;

/// Outcome of a chi-square goodness-of-fit test
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChiSquareTest {
    /// Pearson's statistic
    pub stat: f64,
    /// Probability of a statistic at least this large under the null
    pub p_value: f64,
}

/// Compare the sampled `counts` of each category against the category
/// probabilities `probs`.
///
/// `probs` should sum to one. Categories with zero probability must have
/// zero counts.
pub fn chi_square_test(counts: &[usize], probs: &[f64]) -> ChiSquareTest {
    debug_assert_eq!(counts.len(), probs.len(), "length mismatch");

    let n: usize = counts.iter().sum();
    let stat: f64 = counts
        .iter()
        .zip(probs.iter())
        .map(|(&ct, &p)| {
            let expected = p * n as f64;
            let diff = ct as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let dof = (counts.len() - 1) as f64;
    let cdf = if stat <= 0.0 {
        0.0
    } else {
        Gamma::inc_gamma(stat / 2.0, dof / 2.0)
    };

    ChiSquareTest {
        stat,
        p_value: 1.0 - cdf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    const TOL: f64 = 1E-8;

    #[test]
    fn exact_counts_give_zero_stat() {
        let test = chi_square_test(&[25, 25, 50], &[0.25, 0.25, 0.5]);
        assert_relative_eq!(test.stat, 0.0, epsilon = TOL);
        assert_relative_eq!(test.p_value, 1.0, epsilon = TOL);
    }

    #[test]
    fn known_value_four_categories() {
        // expected counts 2, 3, 4, 1
        let test = chi_square_test(&[1, 2, 3, 4], &[0.2, 0.3, 0.4, 0.1]);
        assert_relative_eq!(test.stat, 10.083333333333334, epsilon = TOL);
        assert_relative_eq!(test.p_value, 0.017870892893625558, epsilon = TOL);
    }

    #[test]
    fn known_value_coin() {
        // (60 - 50)^2 / 50 twice
        let test = chi_square_test(&[60, 40], &[0.5, 0.5]);
        assert_relative_eq!(test.stat, 4.0, epsilon = TOL);
        assert_relative_eq!(test.p_value, 0.04550026389635842, epsilon = 1E-6);
    }
}
