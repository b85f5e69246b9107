#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Default study parameters and harmonic order ranges.
pub mod constants;
/// Shared numerical aliases and axis helpers.
pub mod math;
/// Resistance/reactance value type.
pub mod impedance;
/// Network impedance sweep grids.
pub mod sweep;
/// Amplification factor evaluation over points and grids.
pub mod amplification;
/// Polygon geometry, boundary interpolation and interior sampling.
pub mod polygon;
/// Percentile statistics over AF samples.
pub mod stats;
/// NSP polygon table parsing.
pub mod store;
/// Project aggregate for one analysis session.
pub mod project;
/// Plot payloads and CSV artifact writers.
pub mod report;
/// High-level study orchestration.
pub mod analysis;
/// Error types shared between modules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;

pub use errors::{HarmonicsError, Result};
