//! Background harmonic amplification factor (AF) evaluation.
//!
//! A background harmonic voltage divides across the series combination of the
//! site impedance `Zs` and the network impedance `Zn`. The amplification factor is
//! the magnitude of the divider ratio:
//!
//! ```text
//! AF = | Zs / (Zs + Zn) |
//! ```
//!
//! The background voltage scales numerator and denominator of the voltage
//! split alike and cancels, so AF does not depend on its value. The voltage is
//! still accepted by every entry point so that callers describe the study they
//! are running; [`amplified_background_voltage`] returns the amplified voltage
//! itself for reports that need it.

use tracing::{debug, info, warn};

use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::{nearest_index, AfMatrix, CScalar, Scalar};
use crate::sweep::ImpedanceGrid;

/// Divider ratio `Zs / (Zs + Zn)`, or `None` when the denominator is exactly zero.
fn divider_ratio(site: Impedance, network: Impedance) -> Option<CScalar> {
    let zs = site.to_complex();
    let total = zs + network.to_complex();
    if total.re == 0.0 && total.im == 0.0 {
        None
    } else {
        Some(zs / total)
    }
}

/// Amplification factor at a single network impedance.
///
/// The background voltage (percent) cancels out of the ratio and does not
/// affect the result. Fails with [`HarmonicsError::DivisionSingularity`] when
/// `site + network` is exactly zero.
pub fn amplification_factor(
    site: Impedance,
    _background_voltage: Scalar,
    network: Impedance,
) -> Result<Scalar> {
    divider_ratio(site, network)
        .map(|ratio| ratio.norm())
        .ok_or(HarmonicsError::DivisionSingularity {
            r: network.r,
            x: network.x,
        })
}

/// Background voltage (percent) after amplification at `network`: `v_bkg × AF`.
pub fn amplified_background_voltage(
    site: Impedance,
    background_voltage: Scalar,
    network: Impedance,
) -> Result<Scalar> {
    Ok(background_voltage * amplification_factor(site, background_voltage, network)?)
}

/// Amplification factor at each of `points`, in order.
///
/// Unlike a grid sweep, a singular point aborts the whole evaluation.
pub fn amplification_at_points(
    site: Impedance,
    background_voltage: Scalar,
    points: &[Impedance],
) -> Result<Vec<Scalar>> {
    points
        .iter()
        .map(|&z| amplification_factor(site, background_voltage, z))
        .collect()
}

/// Location and value of the largest amplification factor in a field.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakAmplification {
    /// Network impedance where the peak occurs.
    pub network: Impedance,
    /// Peak amplification factor.
    pub value: Scalar,
}

/// Amplification factor over every cell of an [`ImpedanceGrid`].
///
/// Cell `(i, j)` holds AF at `(r_axis[i], x_axis[j])`. Cells where the site
/// impedance cancels the network impedance hold `NaN`.
#[derive(Debug, Clone)]
pub struct AmplificationField {
    site: Impedance,
    background_voltage: Scalar,
    r_axis: Vec<Scalar>,
    x_axis: Vec<Scalar>,
    values: AfMatrix,
    singular_cells: usize,
}

impl AmplificationField {
    /// Evaluates AF for `site` across `grid`.
    ///
    /// Singular cells are marked with `NaN` and the sweep continues.
    #[must_use]
    pub fn compute(site: Impedance, background_voltage: Scalar, grid: &ImpedanceGrid) -> Self {
        let (rows, cols) = grid.shape();
        let mut singular_cells = 0;
        let values = AfMatrix::from_fn(rows, cols, |i, j| {
            match divider_ratio(site, grid.impedance(i, j)) {
                Some(ratio) => ratio.norm(),
                None => {
                    singular_cells += 1;
                    Scalar::NAN
                }
            }
        });
        if singular_cells > 0 {
            warn!(singular_cells, %site, "sweep crossed the series resonance point");
        }
        debug!(rows, cols, "computed amplification field");
        Self {
            site,
            background_voltage,
            r_axis: grid.r_axis().to_vec(),
            x_axis: grid.x_axis().to_vec(),
            values,
            singular_cells,
        }
    }

    /// Site impedance the field was computed for.
    #[must_use]
    pub fn site(&self) -> Impedance {
        self.site
    }

    /// Background voltage (percent) supplied with the study.
    #[must_use]
    pub fn background_voltage(&self) -> Scalar {
        self.background_voltage
    }

    /// Resistance axis.
    #[must_use]
    pub fn r_axis(&self) -> &[Scalar] {
        &self.r_axis
    }

    /// Reactance axis.
    #[must_use]
    pub fn x_axis(&self) -> &[Scalar] {
        &self.x_axis
    }

    /// AF values shaped `(r_len, x_len)`.
    #[must_use]
    pub fn values(&self) -> &AfMatrix {
        &self.values
    }

    /// AF at cell `(i, j)`; `NaN` marks a singular cell.
    #[must_use]
    pub fn at(&self, i: usize, j: usize) -> Scalar {
        self.values[(i, j)]
    }

    /// Number of cells holding the undefined sentinel.
    #[must_use]
    pub fn singular_cells(&self) -> usize {
        self.singular_cells
    }

    /// Largest finite AF in the field, or `None` if no cell is defined.
    #[must_use]
    pub fn peak(&self) -> Option<PeakAmplification> {
        let mut best: Option<(usize, usize, Scalar)> = None;
        for j in 0..self.values.ncols() {
            for i in 0..self.values.nrows() {
                let v = self.values[(i, j)];
                if v.is_nan() {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| v > b) {
                    best = Some((i, j, v));
                }
            }
        }
        best.map(|(i, j, value)| PeakAmplification {
            network: Impedance::new(self.r_axis[i], self.x_axis[j]),
            value,
        })
    }

    /// Logs the peak AF for harmonic order `h` and returns it.
    pub fn report_peak(&self, h: u32) -> Option<PeakAmplification> {
        let peak = self.peak();
        match peak {
            Some(p) => info!(
                harmonic = h,
                af = p.value,
                r = p.network.r,
                x = p.network.x,
                "maximum amplification factor"
            ),
            None => warn!(harmonic = h, "amplification field has no defined cells"),
        }
        peak
    }

    /// Resolves a sensitivity point against the grid axes.
    pub fn sensitivity(&self, point: Impedance, policy: SnapPolicy) -> Result<SensitivityCut> {
        let i = resolve_axis("R", &self.r_axis, point.r, policy)?;
        let j = resolve_axis("X", &self.x_axis, point.x, policy)?;
        let used = Impedance::new(self.r_axis[i], self.x_axis[j]);
        let snapped = used != point;
        if snapped {
            warn!(
                requested = %point,
                used = %used,
                "sensitivity point is off the grid, snapped to nearest cell"
            );
        }
        Ok(SensitivityCut {
            requested: point,
            used,
            snapped,
            af_over_x: self.values.row(i).iter().copied().collect(),
            af_over_r: self.values.column(j).iter().copied().collect(),
        })
    }
}

/// How a sensitivity point that is not an exact grid coordinate is handled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapPolicy {
    /// Fail with a configuration error.
    Exact,
    /// Use the nearest grid coordinate and report the substitution.
    #[default]
    Nearest,
}

fn resolve_axis(name: &str, axis: &[Scalar], value: Scalar, policy: SnapPolicy) -> Result<usize> {
    if let Some(idx) = axis.iter().position(|&v| v == value) {
        return Ok(idx);
    }
    match policy {
        SnapPolicy::Exact => Err(HarmonicsError::Configuration(format!(
            "sensitivity {name} = {value} is not a grid coordinate"
        ))),
        SnapPolicy::Nearest => nearest_index(axis, value).ok_or_else(|| {
            HarmonicsError::Configuration(format!("{name} axis is empty"))
        }),
    }
}

/// One-dimensional AF slices through a sensitivity point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCut {
    /// Point asked for by the caller.
    pub requested: Impedance,
    /// Grid coordinate the slices pass through.
    pub used: Impedance,
    /// True when `used` differs from `requested`.
    pub snapped: bool,
    /// AF along the X axis at fixed `used.r`.
    pub af_over_x: Vec<Scalar>,
    /// AF along the R axis at fixed `used.x`.
    pub af_over_r: Vec<Scalar>,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::sweep::SweepSpec;

    #[test]
    fn open_network_gives_unity_factor() {
        let site = Impedance::new(100.0, 30.0);
        let af = amplification_factor(site, 0.75, Impedance::zero()).unwrap();
        assert_relative_eq!(af, 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn factor_ignores_background_voltage() {
        let site = Impedance::new(80.0, 450.0);
        let net = Impedance::new(12.0, -400.0);
        let reference = amplification_factor(site, 0.75, net).unwrap();
        for v in [0.0, 1.0e-6, 1.5, 100.0, -3.0] {
            assert_eq!(amplification_factor(site, v, net).unwrap(), reference);
        }
    }

    #[test]
    fn factor_is_scale_invariant() {
        let site = Impedance::new(100.0, 30.0);
        let net = Impedance::new(40.0, -70.0);
        let base = amplification_factor(site, 0.75, net).unwrap();
        for k in [0.001, 2.0, 1.0e4] {
            let scaled = amplification_factor(site.scaled(k), 0.75, net.scaled(k)).unwrap();
            assert_relative_eq!(scaled, base, max_relative = 1.0e-12);
        }
    }

    #[test]
    fn cancelling_impedance_is_singular() {
        let site = Impedance::new(10.0, 5.0);
        let err = amplification_factor(site, 0.75, Impedance::new(-10.0, -5.0)).unwrap_err();
        assert!(matches!(err, HarmonicsError::DivisionSingularity { .. }));
    }

    #[test]
    fn singular_point_aborts_point_set() {
        let site = Impedance::new(10.0, 5.0);
        let points = [
            Impedance::new(1.0, 1.0),
            Impedance::new(-10.0, -5.0),
            Impedance::new(3.0, 0.0),
        ];
        let err = amplification_at_points(site, 0.75, &points).unwrap_err();
        assert!(matches!(
            err,
            HarmonicsError::DivisionSingularity { r, x } if r == -10.0 && x == -5.0
        ));
    }

    #[test]
    fn amplified_voltage_scales_with_background() {
        let site = Impedance::new(10.0, 0.0);
        let v = amplified_background_voltage(site, 1.5, Impedance::new(-5.0, 0.0)).unwrap();
        assert_relative_eq!(v, 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn sweep_sentinels_singular_cell_and_continues() {
        let site = Impedance::new(2.0, 3.0);
        let grid = SweepSpec::new((-4.0, 0.0), (-5.0, 0.0), 1.0).build().unwrap();
        let field = AmplificationField::compute(site, 0.75, &grid);
        assert_eq!(field.singular_cells(), 1);
        // r = -2 is index 2, x = -3 is index 2
        assert!(field.at(2, 2).is_nan());
        assert!(field.at(0, 0).is_finite());
        assert!(field.peak().is_some());
    }

    #[test]
    fn peak_sits_where_denominator_is_smallest() {
        let site = Impedance::new(100.0, 30.0);
        let grid = SweepSpec::new((0.0, 100.0), (-100.0, 100.0), 1.0).build().unwrap();
        let peak = AmplificationField::compute(site, 0.75, &grid).peak().unwrap();
        assert_eq!(peak.network, Impedance::new(0.0, -30.0));
        assert_relative_eq!(peak.value, 10_900.0_f64.sqrt() / 100.0, epsilon = 1.0e-12);
    }

    #[test]
    fn sensitivity_exact_point_is_not_snapped() {
        let site = Impedance::new(100.0, 30.0);
        let grid = SweepSpec::new((0.0, 10.0), (-5.0, 5.0), 1.0).build().unwrap();
        let field = AmplificationField::compute(site, 0.75, &grid);
        let cut = field.sensitivity(Impedance::new(3.0, -2.0), SnapPolicy::Exact).unwrap();
        assert!(!cut.snapped);
        assert_eq!(cut.af_over_x.len(), 11);
        assert_eq!(cut.af_over_r.len(), 11);
        assert_eq!(cut.af_over_x[3], field.at(3, 3));
        assert_eq!(cut.af_over_r[3], field.at(3, 3));
    }

    #[test]
    fn sensitivity_off_grid_point_follows_policy() {
        let site = Impedance::new(100.0, 30.0);
        let grid = SweepSpec::new((0.0, 10.0), (-5.0, 5.0), 1.0).build().unwrap();
        let field = AmplificationField::compute(site, 0.75, &grid);
        let point = Impedance::new(2.6, 40.0);
        assert!(field.sensitivity(point, SnapPolicy::Exact).is_err());
        let cut = field.sensitivity(point, SnapPolicy::Nearest).unwrap();
        assert!(cut.snapped);
        assert_eq!(cut.used, Impedance::new(3.0, 5.0));
    }
}
