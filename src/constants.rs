//! Default study parameters.
//!
//! NSP polygon workbooks usually cover harmonic orders 2 through 50, and the
//! amplification sweeps in planning studies span a few kilo-ohms around the
//! origin of the R–X plane. These defaults are only starting points: every
//! value here can be overridden through the corresponding configuration type.

use crate::math::Scalar;

/// Lowest harmonic order present in a standard NSP polygon workbook.
pub const DEFAULT_FIRST_HARMONIC: u32 = 2;
/// Highest harmonic order present in a standard NSP polygon workbook.
pub const DEFAULT_LAST_HARMONIC: u32 = 50;

/// Default network resistance span in ohms.
pub const DEFAULT_R_SPAN: (Scalar, Scalar) = (0.0, 1000.0);
/// Default network reactance span in ohms.
pub const DEFAULT_X_SPAN: (Scalar, Scalar) = (-1000.0, 1000.0);
/// Default sweep resolution in ohms.
pub const DEFAULT_SWEEP_STEP: Scalar = 1.0;

/// Default number of boundary segments interpolated along a polygon.
pub const DEFAULT_BOUNDARY_POINTS: usize = 100;
/// Default number of interior points sampled inside a polygon.
pub const DEFAULT_INTERIOR_POINTS: usize = 1000;
/// Default quantile (in percent) reported over a polygon envelope.
pub const DEFAULT_ENVELOPE_QUANTILE: Scalar = 95.0;

/// Rejection attempts allowed per requested interior point.
pub const SAMPLING_ATTEMPTS_PER_POINT: usize = 1000;
/// Lower bound on the rejection attempt budget.
pub const MIN_SAMPLING_ATTEMPTS: usize = 10_000;

/// Returns the inclusive number of harmonic orders between `first` and `last`.
#[inline]
#[must_use]
pub const fn harmonic_count(first: u32, last: u32) -> usize {
    if last < first {
        0
    } else {
        (last - first + 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_workbook_has_forty_nine_orders() {
        assert_eq!(
            harmonic_count(DEFAULT_FIRST_HARMONIC, DEFAULT_LAST_HARMONIC),
            49
        );
        assert_eq!(harmonic_count(5, 4), 0);
    }
}
