//! Order statistics over amplification factor samples.

use crate::errors::{HarmonicsError, Result};
use crate::math::Scalar;

/// `q`-th percentile of `values` (`q` in `[0, 100]`) using linear
/// interpolation between order statistics.
///
/// With the values sorted ascending as `v[0..n]`, the rank is
/// `k = q / 100 × (n − 1)` and the result is
/// `v[⌊k⌋] + (k − ⌊k⌋) × (v[⌊k⌋ + 1] − v[⌊k⌋])`. This is the default
/// ("linear") method of numpy and spreadsheet `PERCENTILE.INC`. Ties need no
/// special handling since equal values interpolate to themselves.
pub fn percentile(values: &[Scalar], q: Scalar) -> Result<Scalar> {
    if !(0.0..=100.0).contains(&q) {
        return Err(HarmonicsError::Configuration(format!(
            "percentile must lie in [0, 100], got {q}"
        )));
    }
    if values.is_empty() {
        return Err(HarmonicsError::Configuration(
            "percentile of an empty sample".into(),
        ));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(HarmonicsError::Configuration(
            "percentile sample contains undefined values".into(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q / 100.0 * (sorted.len() - 1) as Scalar;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as Scalar;
    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Largest value in `values`, ignoring `NaN`.
#[must_use]
pub fn max_value(values: &[Scalar]) -> Option<Scalar> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .max_by(Scalar::total_cmp)
}
