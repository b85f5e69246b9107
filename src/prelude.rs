//! Convenience re-exports for building amplification studies.

pub use crate::amplification::{
    amplification_at_points, amplification_factor, amplified_background_voltage,
    AmplificationField, PeakAmplification, SensitivityCut, SnapPolicy,
};
pub use crate::analysis::{AnalysisConfig, AnalysisReport, HarmonicAnalysis, PolygonStudy};
pub use crate::constants::*;
pub use crate::errors::{HarmonicsError, Result};
pub use crate::impedance::Impedance;
pub use crate::math::{AfMatrix, CScalar, Scalar};
pub use crate::polygon::{Bounds, Polygon, SamplingBudget};
pub use crate::project::{EnvelopeSummary, Project};
pub use crate::report::{
    write_field_csv, write_points_csv, write_sensitivity_csv, CsvRenderer, PlotPayload, Renderer,
};
pub use crate::stats::{max_value, percentile};
pub use crate::store::{HarmonicRange, PolygonTable, TableOptions};
pub use crate::sweep::{ImpedanceGrid, SweepSpec};
