//! Network impedance sweep builders.

use nalgebra::DMatrix;
use tracing::debug;

use crate::constants::{DEFAULT_R_SPAN, DEFAULT_SWEEP_STEP, DEFAULT_X_SPAN};
use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::{arange_inclusive, Scalar};

/// Rectangular region of the R–X plane scanned with a fixed step.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSpec {
    /// Inclusive resistance span `(min, max)` in ohms.
    pub r_span: (Scalar, Scalar),
    /// Inclusive reactance span `(min, max)` in ohms.
    pub x_span: (Scalar, Scalar),
    /// Spacing between neighbouring samples on both axes, in ohms.
    pub step: Scalar,
}

impl SweepSpec {
    /// Creates a sweep specification.
    #[must_use]
    pub const fn new(r_span: (Scalar, Scalar), x_span: (Scalar, Scalar), step: Scalar) -> Self {
        Self {
            r_span,
            x_span,
            step,
        }
    }

    /// Checks the step and span ordering.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(HarmonicsError::Configuration(format!(
                "sweep step must be a positive number, got {}",
                self.step
            )));
        }
        for (axis, (lo, hi)) in [("R", self.r_span), ("X", self.x_span)] {
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(HarmonicsError::Configuration(format!(
                    "{axis} span must be finite, got [{lo}, {hi}]"
                )));
            }
            if lo > hi {
                return Err(HarmonicsError::Configuration(format!(
                    "{axis} span is inverted: [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    /// Builds the grid described by this specification.
    pub fn build(&self) -> Result<ImpedanceGrid> {
        ImpedanceGrid::generate(self)
    }
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self::new(DEFAULT_R_SPAN, DEFAULT_X_SPAN, DEFAULT_SWEEP_STEP)
    }
}

/// Evenly spaced resistance and reactance axes forming a 2-D mesh of
/// candidate network impedances.
///
/// Cell `(i, j)` of the mesh is the impedance `r_axis[i] + j·x_axis[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpedanceGrid {
    r_axis: Vec<Scalar>,
    x_axis: Vec<Scalar>,
}

impl ImpedanceGrid {
    /// Generates a fresh grid covering both spans of `spec`, endpoints included.
    pub fn generate(spec: &SweepSpec) -> Result<Self> {
        spec.validate()?;
        let r_axis = arange_inclusive(spec.r_span.0, spec.r_span.1, spec.step);
        let x_axis = arange_inclusive(spec.x_span.0, spec.x_span.1, spec.step);
        debug!(r_len = r_axis.len(), x_len = x_axis.len(), "generated impedance grid");
        Ok(Self { r_axis, x_axis })
    }

    /// Resistance axis (monotonically increasing).
    #[must_use]
    pub fn r_axis(&self) -> &[Scalar] {
        &self.r_axis
    }

    /// Reactance axis (monotonically increasing).
    #[must_use]
    pub fn x_axis(&self) -> &[Scalar] {
        &self.x_axis
    }

    /// Grid shape as `(r_len, x_len)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.r_axis.len(), self.x_axis.len())
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.r_axis.len() * self.x_axis.len()
    }

    /// True if either axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Impedance at cell `(i, j)`.
    #[must_use]
    pub fn impedance(&self, i: usize, j: usize) -> Impedance {
        Impedance::new(self.r_axis[i], self.x_axis[j])
    }

    /// Resistance and reactance meshes, each shaped `(r_len, x_len)`.
    #[must_use]
    pub fn mesh(&self) -> (DMatrix<Scalar>, DMatrix<Scalar>) {
        let (rows, cols) = self.shape();
        let r = DMatrix::from_fn(rows, cols, |i, _| self.r_axis[i]);
        let x = DMatrix::from_fn(rows, cols, |_, j| self.x_axis[j]);
        (r, x)
    }

    /// Iterates over every cell as `(i, j, impedance)`, X varying fastest.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Impedance)> + '_ {
        self.r_axis.iter().enumerate().flat_map(move |(i, &r)| {
            self.x_axis
                .iter()
                .enumerate()
                .map(move |(j, &x)| (i, j, Impedance::new(r, x)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_step_axis_has_eleven_values() {
        let grid = SweepSpec::new((0.0, 10.0), (0.0, 10.0), 1.0).build().unwrap();
        let expected: Vec<Scalar> = (0..=10).map(Scalar::from).collect();
        assert_eq!(grid.r_axis(), expected.as_slice());
    }

    #[test]
    fn fractional_step_spans_negative_range() {
        let grid = SweepSpec::new((0.0, 1.0), (-5.0, 5.0), 2.5).build().unwrap();
        assert_eq!(grid.x_axis(), &[-5.0, -2.5, 0.0, 2.5, 5.0]);
    }

    #[test]
    fn degenerate_span_yields_single_sample() {
        let grid = SweepSpec::new((3.0, 3.0), (-1.0, 1.0), 1.0).build().unwrap();
        assert_eq!(grid.shape(), (1, 3));
    }

    #[test]
    fn rejects_non_positive_step() {
        for step in [0.0, -1.0, Scalar::NAN] {
            let err = SweepSpec::new((0.0, 10.0), (0.0, 10.0), step).build().unwrap_err();
            assert!(matches!(err, HarmonicsError::Configuration(_)));
        }
    }

    #[test]
    fn rejects_inverted_span() {
        let err = SweepSpec::new((10.0, 0.0), (0.0, 10.0), 1.0).build().unwrap_err();
        assert!(err.to_string().contains("R span is inverted"));
    }

    #[test]
    fn mesh_pairs_every_r_with_every_x() {
        let grid = SweepSpec::new((0.0, 2.0), (-1.0, 1.0), 1.0).build().unwrap();
        let (r, x) = grid.mesh();
        assert_eq!(r.shape(), (3, 3));
        assert_eq!(r[(2, 0)], 2.0);
        assert_eq!(x[(2, 0)], -1.0);
        assert_eq!(grid.cells().count(), grid.len());
        assert_eq!(grid.impedance(1, 2), Impedance::new(1.0, 1.0));
    }
}
