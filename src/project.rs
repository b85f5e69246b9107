//! Project aggregate holding the network polygons of one analysis session.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::amplification::amplification_at_points;
use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::Scalar;
use crate::polygon::SamplingBudget;
use crate::stats::{max_value, percentile};
use crate::store::{PolygonTable, TableOptions};

/// AF statistics over one harmonic polygon envelope.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSummary {
    /// Harmonic order.
    pub harmonic: u32,
    /// Number of polygon corners evaluated.
    pub corner_points: usize,
    /// Number of boundary points evaluated.
    pub boundary_points: usize,
    /// Number of interior points evaluated.
    pub interior_points: usize,
    /// Largest AF over the combined point set.
    pub max_af: Scalar,
    /// Percentile used for `quantile_af`.
    pub quantile: Scalar,
    /// AF exceeded by only `100 - quantile` percent of the points.
    pub quantile_af: Scalar,
}

/// A named site study: NSP polygons per harmonic order plus the point sets
/// derived from them.
#[derive(Debug, Clone, Default)]
pub struct Project {
    name: String,
    polygons: Option<PolygonTable>,
    boundary_points: BTreeMap<u32, Vec<Impedance>>,
    interior_points: BTreeMap<u32, Vec<Impedance>>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loads the NSP polygon table from `path`, replacing any previous data.
    pub fn load_network_data(
        &mut self,
        path: impl AsRef<Path>,
        options: &TableOptions,
    ) -> Result<()> {
        let table = PolygonTable::load(path, options)?;
        self.set_network_data(table);
        Ok(())
    }

    /// Installs an already parsed polygon table, clearing derived point sets.
    pub fn set_network_data(&mut self, table: PolygonTable) {
        info!(project = %self.name, harmonics = table.len(), "network polygons loaded");
        self.polygons = Some(table);
        self.boundary_points.clear();
        self.interior_points.clear();
    }

    /// The loaded polygon table.
    pub fn polygons(&self) -> Result<&PolygonTable> {
        self.polygons.as_ref().ok_or_else(|| {
            HarmonicsError::MalformedInput(format!("project {:?} has no network data", self.name))
        })
    }

    /// Polygon vertices for harmonic `h`.
    pub fn polygon_vertices(&self, h: u32) -> Result<&[Impedance]> {
        self.polygons()?.vertices(h)
    }

    /// Interpolates `segments + 1` points along the polygon boundary of harmonic
    /// `h` and stores them against `h`.
    pub fn interpolate_polygon_points(&mut self, h: u32, segments: usize) -> Result<&[Impedance]> {
        let points = self.polygons()?.polygon(h)?.interpolate_boundary(segments)?;
        let slot = self.boundary_points.entry(h).or_default();
        *slot = points;
        Ok(slot.as_slice())
    }

    /// Samples `count` interior points of the polygon of harmonic `h` and
    /// stores them against `h`.
    pub fn generate_points_inside_polygon<R: Rng + ?Sized>(
        &mut self,
        h: u32,
        count: usize,
        budget: SamplingBudget,
        rng: &mut R,
    ) -> Result<&[Impedance]> {
        let points = self
            .polygons()?
            .polygon(h)?
            .sample_interior(count, budget, rng)?;
        let slot = self.interior_points.entry(h).or_default();
        *slot = points;
        Ok(slot.as_slice())
    }

    /// Boundary points previously interpolated for `h`.
    #[must_use]
    pub fn boundary_points(&self, h: u32) -> Option<&[Impedance]> {
        self.boundary_points.get(&h).map(Vec::as_slice)
    }

    /// Interior points previously sampled for `h`.
    #[must_use]
    pub fn interior_points(&self, h: u32) -> Option<&[Impedance]> {
        self.interior_points.get(&h).map(Vec::as_slice)
    }

    /// Evaluates AF for `site` at the polygon corners and every stored boundary
    /// and interior point of harmonic `h` and summarises the combined set.
    ///
    /// Either generated point set may be absent, but not both.
    pub fn envelope_summary(
        &self,
        h: u32,
        site: Impedance,
        background_voltage: Scalar,
        quantile: Scalar,
    ) -> Result<EnvelopeSummary> {
        let boundary = self.boundary_points(h).unwrap_or_default();
        let interior = self.interior_points(h).unwrap_or_default();
        if boundary.is_empty() && interior.is_empty() {
            return Err(HarmonicsError::Configuration(format!(
                "no polygon points generated for harmonic {h}"
            )));
        }
        let corners = self.polygons()?.polygon(h)?;
        let mut af = amplification_at_points(site, background_voltage, corners.vertices())?;
        af.extend(amplification_at_points(site, background_voltage, boundary)?);
        af.extend(amplification_at_points(site, background_voltage, interior)?);

        let summary = EnvelopeSummary {
            harmonic: h,
            corner_points: corners.vertices().len(),
            boundary_points: boundary.len(),
            interior_points: interior.len(),
            max_af: max_value(&af).unwrap_or(Scalar::NAN),
            quantile,
            quantile_af: percentile(&af, quantile)?,
        };
        info!(
            harmonic = h,
            max_af = summary.max_af,
            quantile,
            quantile_af = summary.quantile_af,
            "polygon envelope amplification"
        );
        Ok(summary)
    }
}
