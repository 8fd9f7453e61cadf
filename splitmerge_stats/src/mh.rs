use rand::Rng;

/// Log Metropolis-Hastings acceptance ratio for a proposal with log Hastings
/// ratio `ln_hastings` that moves the target from `ln_f_cur` to `ln_f_prop`.
///
/// Returns `-inf` if the proposal has no reverse move or lands outside the
/// target's support.
#[inline]
pub fn ln_acceptance(ln_hastings: f64, ln_f_cur: f64, ln_f_prop: f64) -> f64 {
    if ln_hastings == f64::NEG_INFINITY || ln_f_prop == f64::NEG_INFINITY {
        f64::NEG_INFINITY
    } else {
        ln_hastings + ln_f_prop - ln_f_cur
    }
}

/// Metropolis-Hastings accept/reject: accept with probability
/// `min(1, exp(ln_alpha))`.
#[inline]
pub fn mh_accept<R: Rng>(ln_alpha: f64, rng: &mut R) -> bool {
    if ln_alpha >= 0.0 {
        true
    } else if ln_alpha.is_nan() || ln_alpha == f64::NEG_INFINITY {
        false
    } else {
        rng.gen::<f64>().ln() < ln_alpha
    }
}
