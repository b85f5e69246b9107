//! High-level orchestration of a single-harmonic amplification study.
//!
//! A run generates the network impedance grid, evaluates AF over it, optionally
//! characterises the NSP polygon envelope for the same harmonic order, and
//! finally hands the results to a [`Renderer`], in that order.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::amplification::{AmplificationField, PeakAmplification, SensitivityCut, SnapPolicy};
use crate::constants::{DEFAULT_BOUNDARY_POINTS, DEFAULT_ENVELOPE_QUANTILE, DEFAULT_INTERIOR_POINTS};
use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::Scalar;
use crate::polygon::SamplingBudget;
use crate::project::{EnvelopeSummary, Project};
use crate::report::{PlotPayload, Renderer};
use crate::store::TableOptions;
use crate::sweep::SweepSpec;

/// Where the NSP polygon table comes from and how it is sampled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStudy {
    /// Delimited-text export of the polygon workbook.
    pub path: PathBuf,
    /// Table layout, including the optional impedance base.
    pub table: TableOptions,
    /// Boundary segments to interpolate (`segments + 1` points).
    pub boundary_segments: usize,
    /// Interior points to sample.
    pub interior_points: usize,
    /// Percentile reported over the envelope.
    pub quantile: Scalar,
    /// Seed for the interior sampler.
    pub seed: u64,
    /// Attempt limit for the interior sampler.
    pub budget: SamplingBudget,
}

impl PolygonStudy {
    /// Study of the polygon table at `path` with default sampling parameters.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: TableOptions::default(),
            boundary_segments: DEFAULT_BOUNDARY_POINTS,
            interior_points: DEFAULT_INTERIOR_POINTS,
            quantile: DEFAULT_ENVELOPE_QUANTILE,
            seed: 0,
            budget: SamplingBudget::default(),
        }
    }
}

/// Run parameters of one amplification study.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Human-readable identifier (used as the project name).
    pub name: String,
    /// Harmonic order studied.
    pub harmonic: u32,
    /// Aggregate site impedance at `harmonic`.
    pub site: Impedance,
    /// Background harmonic voltage in percent.
    pub background_voltage: Scalar,
    /// Network impedance sweep.
    pub sweep: SweepSpec,
    /// Point through which sensitivity slices are taken.
    pub sensitivity: Option<Impedance>,
    /// Handling of a sensitivity point that is off the grid.
    pub snap: SnapPolicy,
    /// Optional polygon envelope evaluation.
    pub polygon: Option<PolygonStudy>,
    /// Output file stem handed to the renderer.
    pub output: Option<String>,
}

impl AnalysisConfig {
    /// Creates a configuration with the default sweep and no polygon study.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        harmonic: u32,
        site: Impedance,
        background_voltage: Scalar,
    ) -> Self {
        Self {
            name: name.into(),
            harmonic,
            site,
            background_voltage,
            sweep: SweepSpec::default(),
            sensitivity: None,
            snap: SnapPolicy::default(),
            polygon: None,
            output: None,
        }
    }

    /// Replaces the sweep.
    #[must_use]
    pub fn with_sweep(mut self, sweep: SweepSpec) -> Self {
        self.sweep = sweep;
        self
    }

    /// Requests sensitivity slices through `point`.
    #[must_use]
    pub fn with_sensitivity(mut self, point: Impedance, snap: SnapPolicy) -> Self {
        self.sensitivity = Some(point);
        self.snap = snap;
        self
    }

    /// Adds a polygon envelope study.
    #[must_use]
    pub fn with_polygon(mut self, study: PolygonStudy) -> Self {
        self.polygon = Some(study);
        self
    }

    /// Sets the output stem for rendering.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Default output stem, e.g. `amplification_plot_07`.
    #[must_use]
    pub fn output_stem(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("amplification_plot_{:02}", self.harmonic))
    }

    fn validate(&self) -> Result<()> {
        if self.harmonic == 0 {
            return Err(HarmonicsError::Configuration(
                "harmonic order must be at least 1".into(),
            ));
        }
        if !self.site.is_finite() {
            return Err(HarmonicsError::Configuration(format!(
                "site impedance must be finite, got {}",
                self.site
            )));
        }
        self.sweep.validate()?;
        if let Some(study) = &self.polygon {
            if !study.table.range.contains(self.harmonic) {
                return Err(HarmonicsError::MalformedInput(format!(
                    "harmonic {} is outside the polygon table range {}..={}",
                    self.harmonic, study.table.range.first, study.table.range.last
                )));
            }
        }
        Ok(())
    }
}

/// Results of one study.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// AF over the sweep grid.
    pub field: AmplificationField,
    /// Largest AF on the grid.
    pub peak: Option<PeakAmplification>,
    /// Sensitivity slices, when requested.
    pub sensitivity: Option<SensitivityCut>,
    /// Polygon envelope statistics, when a polygon study was configured.
    pub envelope: Option<EnvelopeSummary>,
    /// Project holding the polygon data and point sets.
    pub project: Project,
}

/// Executes an [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct HarmonicAnalysis {
    config: AnalysisConfig,
}

impl HarmonicAnalysis {
    /// Wraps a configuration.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Configuration being executed.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the study and, when given, renders the results.
    pub fn run(&self, renderer: Option<&mut dyn Renderer>) -> Result<AnalysisReport> {
        let cfg = &self.config;
        cfg.validate()?;
        info!(
            study = %cfg.name,
            harmonic = cfg.harmonic,
            site = %cfg.site,
            background_voltage = cfg.background_voltage,
            "starting amplification study"
        );

        let grid = cfg.sweep.build()?;
        let field = AmplificationField::compute(cfg.site, cfg.background_voltage, &grid);
        let peak = field.report_peak(cfg.harmonic);

        let sensitivity = cfg
            .sensitivity
            .map(|point| field.sensitivity(point, cfg.snap))
            .transpose()?;

        let mut project = Project::new(cfg.name.clone());
        let envelope = match &cfg.polygon {
            Some(study) => Some(self.evaluate_envelope(&mut project, study)?),
            None => None,
        };

        if let Some(renderer) = renderer {
            let output = cfg.output_stem();
            let mut payload = PlotPayload::new(&field, cfg.harmonic, &output);
            if let Some(cut) = &sensitivity {
                payload = payload.with_sensitivity(cut);
            }
            if envelope.is_some() {
                payload = payload.with_polygon(project.polygon_vertices(cfg.harmonic)?);
            }
            renderer.render(&payload)?;
        }

        Ok(AnalysisReport {
            field,
            peak,
            sensitivity,
            envelope,
            project,
        })
    }

    fn evaluate_envelope(
        &self,
        project: &mut Project,
        study: &PolygonStudy,
    ) -> Result<EnvelopeSummary> {
        let cfg = &self.config;
        let h = cfg.harmonic;
        project.load_network_data(&study.path, &study.table)?;
        project.interpolate_polygon_points(h, study.boundary_segments)?;
        let mut rng = ChaCha8Rng::seed_from_u64(study.seed);
        project.generate_points_inside_polygon(h, study.interior_points, study.budget, &mut rng)?;
        project.envelope_summary(h, cfg.site, cfg.background_voltage, study.quantile)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    struct CountingRenderer {
        calls: usize,
        had_sensitivity: bool,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, payload: &PlotPayload<'_>) -> Result<()> {
            self.calls += 1;
            self.had_sensitivity = payload.sensitivity.is_some();
            assert_eq!(payload.harmonic, 14);
            assert_eq!(payload.output, "amplification_plot_14");
            Ok(())
        }
    }

    fn small_study() -> AnalysisConfig {
        AnalysisConfig::new("study", 14, Impedance::new(100.0, 30.0), 0.75)
            .with_sweep(SweepSpec::new((0.0, 50.0), (-50.0, 50.0), 1.0))
    }

    #[test]
    fn run_reports_peak_and_renders() {
        let mut renderer = CountingRenderer {
            calls: 0,
            had_sensitivity: false,
        };
        let config =
            small_study().with_sensitivity(Impedance::new(0.0, 100.0), SnapPolicy::Nearest);
        let report = HarmonicAnalysis::new(config).run(Some(&mut renderer)).unwrap();
        let peak = report.peak.unwrap();
        assert_eq!(peak.network, Impedance::new(0.0, -30.0));
        assert_relative_eq!(peak.value, 10_900.0_f64.sqrt() / 100.0, epsilon = 1.0e-12);
        assert!(report.sensitivity.unwrap().snapped);
        assert!(report.envelope.is_none());
        assert_eq!(renderer.calls, 1);
        assert!(renderer.had_sensitivity);
    }

    #[test]
    fn invalid_sweep_fails_before_computation() {
        let config = small_study().with_sweep(SweepSpec::new((0.0, 1.0), (0.0, 1.0), 0.0));
        assert!(matches!(
            HarmonicAnalysis::new(config).run(None),
            Err(HarmonicsError::Configuration(_))
        ));
    }

    #[test]
    fn harmonic_outside_polygon_range_is_rejected() {
        let config = AnalysisConfig::new("study", 60, Impedance::new(1.0, 1.0), 0.75)
            .with_polygon(PolygonStudy::new("unused.csv"));
        let err = HarmonicAnalysis::new(config).run(None).unwrap_err();
        assert!(err.to_string().contains("harmonic 60"));
    }
}
