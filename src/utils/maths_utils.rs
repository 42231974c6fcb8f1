use itertools::Itertools;

/// Simple period-over-period returns: `v[i] / v[i-1] - 1`.
/// Periods starting from a non-positive value contribute 0.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .tuple_windows()
        .map(|(prev, next)| {
            if *prev > f64::EPSILON {
                next / prev - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Percentage change from `from` to `to`, 0 when `from` is not positive.
#[inline]
pub fn pct_change(from: f64, to: f64) -> f64 {
    if from > f64::EPSILON {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

/// Replace NaN / infinities with `fallback` so nothing unprintable reaches a report.
#[inline]
pub fn finite_or(val: f64, fallback: f64) -> f64 {
    if val.is_finite() { val } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_skip_zero_base() {
        let r = period_returns(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(r.len(), 3);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert_eq!(r[1], -1.0);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn pct_change_handles_zero() {
        assert_eq!(pct_change(0.0, 10.0), 0.0);
        assert!((pct_change(200.0, 210.0) - 5.0).abs() < 1e-12);
        assert_eq!(finite_or(f64::NAN, 0.0), 0.0);
    }
}
