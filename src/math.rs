//! Shared numerical primitives anchored on `nalgebra` and `num_complex`.

use nalgebra::DMatrix;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for impedance phasors.
pub type CScalar = num_complex::Complex<Scalar>;
/// Dense real matrix holding one value per sweep cell.
pub type AfMatrix = DMatrix<Scalar>;

/// Number of evenly spaced samples needed to cover `[start, stop]` with `step`,
/// both endpoints included when `stop - start` is a whole multiple of `step`.
///
/// A small relative tolerance absorbs rounding in the span division so that
/// `[-5, 5]` with step `2.5` yields five samples.
#[must_use]
pub fn stepped_len(start: Scalar, stop: Scalar, step: Scalar) -> usize {
    let steps = (stop - start) / step;
    (steps + steps.abs().max(1.0) * 1.0e-9).floor() as usize + 1
}

/// Samples `[start, stop]` with a fixed `step`, inclusive of both endpoints.
#[must_use]
pub fn arange_inclusive(start: Scalar, stop: Scalar, step: Scalar) -> Vec<Scalar> {
    (0..stepped_len(start, stop, step))
        .map(|i| start + step * i as Scalar)
        .collect()
}

/// Index of the sample in `axis` closest to `value`, or `None` for an empty axis.
#[must_use]
pub fn nearest_index(axis: &[Scalar], value: Scalar) -> Option<usize> {
    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map(|(idx, _)| idx)
}
