//! Summary statistics over ensemble members.

/// Arithmetic mean. Empty input yields NaN.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator).
///
/// A single-member group has no spread to estimate; it is defined as 0.0
/// rather than propagating a divide-by-zero.
pub fn sample_sd(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Empirical quantile with linear interpolation between order statistics
/// (R's default, type 7). `p` must be in [0, 1]. NaN values sort after
/// every ordered value.
pub fn quantile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_sd_single_member_is_zero() {
        assert_eq!(sample_sd(&[5.0]), 0.0);
        assert_eq!(sample_sd(&[]), 0.0);
    }

    #[test]
    fn test_sd_matches_sample_formula() {
        // var([2,4,4,4,5,5,7,9]) with n-1 = 32/7
        let sd = sample_sd(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_type7() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
        assert_eq!(quantile(&values, 0.5), 2.5);
        // h = 3 * 0.025 = 0.075 -> 1.0 + 0.075
        assert!((quantile(&values, 0.025) - 1.075).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_tolerates_nan() {
        let values = [2.0, f64::NAN, 1.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 0.5), 2.0);
    }
}
