//! Network impedance polygons: validation, boundary interpolation and interior
//! sampling.
//!
//! A polygon is the closed region an NSP allows the network impedance to occupy
//! at one harmonic order. Vertices are kept in the order they were supplied;
//! the edge list is closed implicitly from the last vertex back to the first.

use rand::Rng;
use tracing::debug;

use crate::constants::{MIN_SAMPLING_ATTEMPTS, SAMPLING_ATTEMPTS_PER_POINT};
use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::Scalar;

/// Axis-aligned bounding box in the R–X plane.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower-left corner.
    pub min: Impedance,
    /// Upper-right corner.
    pub max: Impedance,
}

impl Bounds {
    /// Width (R extent) times height (X extent).
    #[must_use]
    pub fn area(&self) -> Scalar {
        (self.max.r - self.min.r) * (self.max.x - self.min.x)
    }
}

/// Simple closed polygon in the R–X plane.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Impedance>,
}

impl Polygon {
    /// Creates a polygon after checking it has at least three finite vertices,
    /// a non-zero perimeter and no crossing edges.
    ///
    /// Repeated consecutive vertices are collapsed, and a trailing vertex equal
    /// to the first is treated as an explicit ring closure and dropped.
    pub fn new(mut vertices: Vec<Impedance>) -> Result<Self> {
        vertices.dedup();
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(HarmonicsError::InvalidPolygon(format!(
                "need at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if let Some(idx) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(HarmonicsError::InvalidPolygon(format!(
                "vertex {idx} is not finite"
            )));
        }
        let polygon = Self { vertices };
        if polygon.perimeter() == 0.0 {
            return Err(HarmonicsError::InvalidPolygon("all vertices coincide".into()));
        }
        if let Some((a, b)) = polygon.first_crossing() {
            return Err(HarmonicsError::InvalidPolygon(format!(
                "edges {a} and {b} intersect"
            )));
        }
        Ok(polygon)
    }

    /// Vertices in supplied order.
    #[must_use]
    pub fn vertices(&self) -> &[Impedance] {
        &self.vertices
    }

    /// Edge `k` runs from vertex `k` to vertex `k + 1`, wrapping at the end.
    fn edge(&self, k: usize) -> (Impedance, Impedance) {
        let n = self.vertices.len();
        (self.vertices[k], self.vertices[(k + 1) % n])
    }

    fn edges(&self) -> impl Iterator<Item = (Impedance, Impedance)> + '_ {
        (0..self.vertices.len()).map(move |k| self.edge(k))
    }

    /// Length of the closed boundary.
    #[must_use]
    pub fn perimeter(&self) -> Scalar {
        self.edges().map(|(a, b)| a.distance(b)).sum()
    }

    /// Enclosed area (shoelace formula, always non-negative).
    #[must_use]
    pub fn area(&self) -> Scalar {
        let twice: Scalar = self.edges().map(|(a, b)| a.r * b.x - b.r * a.x).sum();
        twice.abs() / 2.0
    }

    /// Axis-aligned bounding box of the vertices.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min.r = min.r.min(v.r);
            min.x = min.x.min(v.x);
            max.r = max.r.max(v.r);
            max.x = max.x.max(v.x);
        }
        Bounds { min, max }
    }

    /// True when `p` lies on any edge, end points included.
    #[must_use]
    pub fn on_boundary(&self, p: Impedance) -> bool {
        self.edges().any(|(a, b)| on_segment(a, b, p))
    }

    /// True when `p` lies strictly inside the polygon; boundary points are outside.
    #[must_use]
    pub fn contains(&self, p: Impedance) -> bool {
        if self.on_boundary(p) {
            return false;
        }
        // even-odd ray cast towards +R
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.x > p.x) != (b.x > p.x) {
                let r_cross = a.r + (p.x - a.x) * (b.r - a.r) / (b.x - a.x);
                if p.r < r_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Returns the first pair of non-adjacent edges that touch, if any.
    fn first_crossing(&self) -> Option<(usize, usize)> {
        let n = self.vertices.len();
        for i in 0..n {
            for j in (i + 2)..n {
                // edges i and j share a vertex when they wrap around
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a, b) = self.edge(i);
                let (c, d) = self.edge(j);
                if segments_intersect(a, b, c, d) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Points evenly spaced by normalised arc length along the closed boundary.
    ///
    /// Returns `segments + 1` points at fractions `0, 1/segments, …, 1` of the
    /// perimeter, starting and ending at the first vertex. Spacing follows the
    /// cumulative edge length, not the vertex index.
    pub fn interpolate_boundary(&self, segments: usize) -> Result<Vec<Impedance>> {
        if segments == 0 {
            return Err(HarmonicsError::Configuration(
                "boundary interpolation needs at least one segment".into(),
            ));
        }
        let n = self.vertices.len();
        let mut cumulative = Vec::with_capacity(n + 1);
        cumulative.push(0.0);
        for (a, b) in self.edges() {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + a.distance(b));
        }
        let perimeter = cumulative[n];

        let mut points = Vec::with_capacity(segments + 1);
        let mut edge = 0;
        for step in 0..=segments {
            if step == segments {
                points.push(self.vertices[0]);
                break;
            }
            let target = perimeter * step as Scalar / segments as Scalar;
            while edge + 1 < n && cumulative[edge + 1] < target {
                edge += 1;
            }
            let (a, b) = self.edge(edge);
            let length = cumulative[edge + 1] - cumulative[edge];
            let t = if length > 0.0 {
                ((target - cumulative[edge]) / length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            points.push(lerp(a, b, t));
        }
        Ok(points)
    }

    /// Draws `count` points uniformly from the polygon interior.
    ///
    /// Candidates are drawn uniformly from the bounding box and kept when
    /// strictly inside. Fails with [`HarmonicsError::SamplingExhausted`] once
    /// `budget` attempts have been spent.
    pub fn sample_interior<R: Rng + ?Sized>(
        &self,
        count: usize,
        budget: SamplingBudget,
        rng: &mut R,
    ) -> Result<Vec<Impedance>> {
        let max_attempts = budget.max_attempts(count);
        let Bounds { min, max } = self.bounds();
        let mut points = Vec::with_capacity(count);
        let mut attempts = 0;
        while points.len() < count {
            if attempts >= max_attempts {
                return Err(HarmonicsError::SamplingExhausted {
                    attempts,
                    accepted: points.len(),
                    requested: count,
                });
            }
            attempts += 1;
            let candidate = Impedance::new(
                min.r + (max.r - min.r) * rng.random::<Scalar>(),
                min.x + (max.x - min.x) * rng.random::<Scalar>(),
            );
            if self.contains(candidate) {
                points.push(candidate);
            }
        }
        debug!(count, attempts, "sampled polygon interior");
        Ok(points)
    }
}

/// Attempt limit for rejection sampling.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingBudget {
    /// `max(requested × 1000, 10 000)` attempts.
    #[default]
    Proportional,
    /// A fixed number of attempts.
    Fixed(usize),
}

impl SamplingBudget {
    /// Attempts allowed when `requested` points are wanted.
    #[must_use]
    pub fn max_attempts(self, requested: usize) -> usize {
        match self {
            SamplingBudget::Proportional => requested
                .saturating_mul(SAMPLING_ATTEMPTS_PER_POINT)
                .max(MIN_SAMPLING_ATTEMPTS),
            SamplingBudget::Fixed(n) => n,
        }
    }
}

fn lerp(a: Impedance, b: Impedance, t: Scalar) -> Impedance {
    if t >= 1.0 {
        return b;
    }
    Impedance::new(a.r + (b.r - a.r) * t, a.x + (b.x - a.x) * t)
}

/// Twice the signed area of triangle `abc`.
fn cross(a: Impedance, b: Impedance, c: Impedance) -> Scalar {
    (b.r - a.r) * (c.x - a.x) - (b.x - a.x) * (c.r - a.r)
}

fn within_box(a: Impedance, b: Impedance, p: Impedance) -> bool {
    p.r >= a.r.min(b.r) && p.r <= a.r.max(b.r) && p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x)
}

fn on_segment(a: Impedance, b: Impedance, p: Impedance) -> bool {
    cross(a, b, p) == 0.0 && within_box(a, b, p)
}

fn segments_intersect(a: Impedance, b: Impedance, c: Impedance, d: Impedance) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    on_segment(c, d, a) || on_segment(c, d, b) || on_segment(a, b, c) || on_segment(a, b, d)
}
