use rand::Rng;

/// Choose an ordered pair of distinct indices in [0, ..., n-1].
///
/// The first index is drawn uniformly, the second is redrawn until it
/// differs from the first. Every ordered pair is equally likely, including
/// when `n == 2`. Returns `None` if `n < 2` or if `max_attempts` redraws all
/// collided with the first index.
pub fn choose2ixs<R: Rng>(
    n: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }

    let i: usize = rng.gen_range(0..n);
    (0..max_attempts)
        .map(|_| rng.gen_range(0..n))
        .find(|&j| j != i)
        .map(|j| (i, j))
}

/// Draw `n` independent fair coins
pub fn coin_flips<R: Rng>(n: usize, rng: &mut R) -> Vec<bool> {
    (0..n).map(|_| rng.gen::<bool>()).collect()
}
