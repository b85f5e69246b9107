//! Hand-off to plotting and report back ends.
//!
//! The crate does not draw anything itself. A [`Renderer`] receives a
//! [`PlotPayload`] carrying the heatmap data, site marker, sensitivity slices and
//! optional polygon overlay, and decides how to present it. [`CsvRenderer`]
//! writes the payload as plain CSV files for external plotting tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::amplification::{AmplificationField, SensitivityCut};
use crate::errors::Result;
use crate::impedance::Impedance;
use crate::math::{AfMatrix, Scalar};

/// Everything a plotting back end needs to draw one harmonic order.
#[derive(Debug, Clone, Copy)]
pub struct PlotPayload<'a> {
    /// Resistance axis of the heatmap.
    pub r_axis: &'a [Scalar],
    /// Reactance axis of the heatmap.
    pub x_axis: &'a [Scalar],
    /// AF values shaped `(r_len, x_len)`; `NaN` marks undefined cells.
    pub af: &'a AfMatrix,
    /// Site impedance marker.
    pub site: Impedance,
    /// AF vs X and AF vs R slices.
    pub sensitivity: Option<&'a SensitivityCut>,
    /// Polygon vertices to overlay, in boundary order.
    pub polygon: Option<&'a [Impedance]>,
    /// Harmonic order shown.
    pub harmonic: u32,
    /// Output file stem chosen by the caller.
    pub output: &'a str,
}

impl<'a> PlotPayload<'a> {
    /// Payload for `field` without sensitivity slices or polygon overlay.
    #[must_use]
    pub fn new(field: &'a AmplificationField, harmonic: u32, output: &'a str) -> Self {
        Self {
            r_axis: field.r_axis(),
            x_axis: field.x_axis(),
            af: field.values(),
            site: field.site(),
            sensitivity: None,
            polygon: None,
            harmonic,
            output,
        }
    }

    /// Adds sensitivity slices.
    #[must_use]
    pub fn with_sensitivity(mut self, cut: &'a SensitivityCut) -> Self {
        self.sensitivity = Some(cut);
        self
    }

    /// Adds a polygon overlay.
    #[must_use]
    pub fn with_polygon(mut self, vertices: &'a [Impedance]) -> Self {
        self.polygon = Some(vertices);
        self
    }
}

/// Trait for plot and report back ends.
pub trait Renderer {
    /// Renders one payload.
    fn render(&mut self, payload: &PlotPayload<'_>) -> Result<()>;
}

/// Writes each payload as CSV files in a directory:
/// `<output>_af.csv`, plus `<output>_sensitivity.csv` and
/// `<output>_polygon.csv` when those parts are present.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvRenderer {
    /// Creates a renderer writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn create(&mut self, name: String) -> Result<BufWriter<File>> {
        let path = self.dir.join(name);
        let file = File::create(&path)?;
        debug!(path = %path.display(), "writing report artifact");
        self.written.push(path);
        Ok(BufWriter::new(file))
    }
}

impl Renderer for CsvRenderer {
    fn render(&mut self, payload: &PlotPayload<'_>) -> Result<()> {
        let mut w = self.create(format!("{}_af.csv", payload.output))?;
        write_af_grid_csv(&mut w, payload.r_axis, payload.x_axis, payload.af)?;
        w.flush()?;

        if let Some(cut) = payload.sensitivity {
            let mut w = self.create(format!("{}_sensitivity.csv", payload.output))?;
            write_sensitivity_csv(&mut w, cut, payload.r_axis, payload.x_axis)?;
            w.flush()?;
        }
        if let Some(vertices) = payload.polygon {
            let mut w = self.create(format!("{}_polygon.csv", payload.output))?;
            write_points_csv(&mut w, vertices)?;
            w.flush()?;
        }
        Ok(())
    }
}

/// Writes an AF grid as `r,x,af` rows, X varying fastest.
pub fn write_af_grid_csv<W: Write>(
    mut w: W,
    r_axis: &[Scalar],
    x_axis: &[Scalar],
    af: &AfMatrix,
) -> io::Result<()> {
    writeln!(w, "r,x,af")?;
    for (i, r) in r_axis.iter().enumerate() {
        for (j, x) in x_axis.iter().enumerate() {
            writeln!(w, "{r},{x},{:.16e}", af[(i, j)])?;
        }
    }
    Ok(())
}

/// Writes an [`AmplificationField`] as `r,x,af` rows.
pub fn write_field_csv<W: Write>(w: W, field: &AmplificationField) -> io::Result<()> {
    write_af_grid_csv(w, field.r_axis(), field.x_axis(), field.values())
}

/// Writes impedance points as `r,x` rows.
pub fn write_points_csv<W: Write>(mut w: W, points: &[Impedance]) -> io::Result<()> {
    writeln!(w, "r,x")?;
    for p in points {
        writeln!(w, "{:.16e},{:.16e}", p.r, p.x)?;
    }
    Ok(())
}

/// Writes both sensitivity slices as `slice,coordinate,af` rows; slice `X`
/// holds AF over X at the fixed R of the cut, slice `R` holds AF over R.
pub fn write_sensitivity_csv<W: Write>(
    mut w: W,
    cut: &SensitivityCut,
    r_axis: &[Scalar],
    x_axis: &[Scalar],
) -> io::Result<()> {
    writeln!(w, "slice,coordinate,af")?;
    for (x, af) in x_axis.iter().zip(&cut.af_over_x) {
        writeln!(w, "X,{x},{af:.16e}")?;
    }
    for (r, af) in r_axis.iter().zip(&cut.af_over_r) {
        writeln!(w, "R,{r},{af:.16e}")?;
    }
    Ok(())
}

/// Joins `dir` and a file stem the way [`CsvRenderer`] names its AF file.
#[must_use]
pub fn af_csv_path(dir: &Path, output: &str) -> PathBuf {
    dir.join(format!("{output}_af.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amplification::SnapPolicy;
    use crate::sweep::SweepSpec;

    fn field() -> AmplificationField {
        let grid = SweepSpec::new((0.0, 1.0), (-1.0, 1.0), 1.0).build().unwrap();
        AmplificationField::compute(Impedance::new(1.0, 1.0), 0.75, &grid)
    }

    #[test]
    fn field_csv_has_one_row_per_cell() {
        let mut buf = Vec::new();
        write_field_csv(&mut buf, &field()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "r,x,af");
        assert_eq!(lines.len(), 1 + 6);
        assert!(lines[1].starts_with("0,-1,"));
    }

    #[test]
    fn sensitivity_csv_lists_both_slices() {
        let field = field();
        let cut = field.sensitivity(Impedance::new(0.0, 0.0), SnapPolicy::Exact).unwrap();
        let mut buf = Vec::new();
        write_sensitivity_csv(&mut buf, &cut, field.r_axis(), field.x_axis()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("X,")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("R,")).count(), 2);
    }

    #[test]
    fn csv_renderer_writes_requested_parts() {
        let dir = std::env::temp_dir().join(format!("harmonic-af-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let field = field();
        let polygon = [
            Impedance::new(0.0, 0.0),
            Impedance::new(1.0, 0.0),
            Impedance::new(0.0, 1.0),
        ];
        let payload = PlotPayload::new(&field, 5, "h05").with_polygon(&polygon);
        let mut renderer = CsvRenderer::new(&dir);
        renderer.render(&payload).unwrap();
        assert_eq!(renderer.written().len(), 2);
        assert!(af_csv_path(&dir, "h05").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
