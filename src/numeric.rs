//! Null-safe reductions over sequences of optional numbers.
//!
//! Every reduction skips `None` and non-finite values and returns `None` when nothing
//! finite is left, so an all-missing input never turns into `0` or `NaN`.

fn finite<I, T>(values: I) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    values
        .into_iter()
        .filter_map(|v| v.into())
        .filter(|v| v.is_finite())
}

/// Sum of the finite values.
///
/// # Examples
///
/// ```
/// use climo::numeric::sum;
///
/// assert_eq!(sum([Some(1.5), None, Some(2.5)]), Some(4.0));
/// assert_eq!(sum([None::<f64>, None]), None);
/// ```
pub fn sum<I, T>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    finite(values).fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Arithmetic mean of the finite values; missing entries do not count as zero.
///
/// # Examples
///
/// ```
/// use climo::numeric::mean;
///
/// assert_eq!(mean([Some(2.0), None, Some(4.0), Some(f64::NAN)]), Some(3.0));
/// assert_eq!(mean(Vec::<f64>::new()), None);
/// ```
pub fn mean<I, T>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    let (total, count) = finite(values).fold((0.0, 0usize), |(t, n), v| (t + v, n + 1));
    (count > 0).then(|| total / count as f64)
}

/// Smallest finite value.
pub fn min<I, T>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    finite(values).reduce(f64::min)
}

/// Largest finite value.
pub fn max<I, T>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    finite(values).reduce(f64::max)
}

/// Number of finite values.
pub fn count<I, T>(values: I) -> usize
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    finite(values).count()
}

/// Above this magnitude every `f64` is already a multiple of 0.01.
const EXACT_HUNDREDTHS: f64 = 4_503_599_627_370_496.0 / 100.0;

/// Rounds to two decimals. Negative zero comes back as positive zero; values too
/// large to carry hundredths (and non-finite values) are returned unchanged.
///
/// # Examples
///
/// ```
/// use climo::numeric::round2;
///
/// assert_eq!(round2(53.333_333), 53.33);
/// assert_eq!(round2(1e307), 1e307);
/// ```
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= EXACT_HUNDREDTHS {
        return value;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// [`round2`] over an optional value; non-finite values become `None`.
pub fn round2_opt(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(round2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reductions_skip_missing_and_non_finite() {
        let values = [Some(1.0), None, Some(f64::NAN), Some(3.0), Some(f64::INFINITY)];
        assert_eq!(sum(values), Some(4.0));
        assert_eq!(mean(values), Some(2.0));
        assert_eq!(min(values), Some(1.0));
        assert_eq!(max(values), Some(3.0));
        assert_eq!(count(values), 2);
    }

    #[test]
    fn test_all_missing_yields_none_not_zero() {
        let values: [Option<f64>; 3] = [None, None, Some(f64::NAN)];
        assert_eq!(sum(values), None);
        assert_eq!(mean(values), None);
        assert_eq!(min(values), None);
        assert_eq!(max(values), None);

        let empty: Vec<f64> = Vec::new();
        assert_eq!(sum(empty.iter().copied()), None);
        assert_eq!(mean(empty), None);
    }

    #[test]
    fn test_plain_numbers_are_accepted() {
        assert_eq!(mean([30.0, 32.0, 28.0]), Some(30.0));
        assert_eq!(max(vec![-4.0, -1.5]), Some(-1.5));
    }

    #[test]
    fn test_order_does_not_change_extrema() {
        let a = [Some(5.0), Some(-2.0), None, Some(9.0)];
        let b = [Some(9.0), None, Some(5.0), Some(-2.0)];
        assert_eq!(min(a), min(b));
        assert_eq!(max(a), max(b));
        assert_eq!(sum(a), sum(b));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-2.0049), -2.0);
        assert!(round2(-0.0).is_sign_positive());
        assert!(round2(-0.001).is_sign_positive());
        for x in [0.1, 12.345_678, -7.777, 1e6 + 0.015, 99.995] {
            assert_eq!(round2(round2(x)), round2(x));
        }
        assert_eq!(round2_opt(Some(f64::NAN)), None);
        assert_eq!(round2_opt(Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_round2_large_magnitudes() {
        assert_eq!(round2(1e307), 1e307);
        assert_eq!(round2(-f64::MAX), -f64::MAX);
        assert_eq!(round2(1e16 + 2.0), 1e16 + 2.0);
        assert_eq!(round2_opt(Some(1e307)), Some(1e307));
        assert!(round2(f64::INFINITY).is_infinite());
        assert_eq!(round2_opt(None), None);
    }
}
