/// Componentwise midpoint of two equal-length vectors
///
/// # Example
///
/// ```rust
/// # use splitmerge_utils::midpoint;
/// assert_eq!(midpoint(&[1.0, 1.0], &[3.0, 3.0]), vec![2.0, 2.0]);
/// ```
#[inline]
pub fn midpoint(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xs.len(), ys.len(), "length mismatch");
    xs.iter().zip(ys.iter()).map(|(x, y)| (x + y) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_negative_values() {
        assert_eq!(midpoint(&[-1.0, 4.0], &[1.0, 0.0]), vec![0.0, 2.0]);
    }

    #[test]
    fn midpoint_of_identical_points_is_the_point() {
        assert_eq!(midpoint(&[0.5, -3.25], &[0.5, -3.25]), vec![0.5, -3.25]);
    }
}
