//! Resistance/reactance pairs in the R–X plane.

use std::fmt;

use crate::math::{CScalar, Scalar};

/// Harmonic impedance stored as independent resistance and reactance components.
///
/// Sweep axes and polygon vertices manipulate R and X separately, so the pair is
/// kept real-valued and only converted to a complex phasor when an
/// amplification ratio is evaluated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Impedance {
    /// Resistance in ohms.
    pub r: Scalar,
    /// Signed reactance in ohms (positive inductive, negative capacitive).
    pub x: Scalar,
}

impl Impedance {
    /// Creates an impedance from resistance and reactance in ohms.
    #[must_use]
    pub const fn new(r: Scalar, x: Scalar) -> Self {
        Self { r, x }
    }

    /// The origin of the R–X plane.
    #[must_use]
    pub const fn zero() -> Self {
        Self { r: 0.0, x: 0.0 }
    }

    /// Complex phasor `r + jx`.
    #[must_use]
    pub fn to_complex(self) -> CScalar {
        CScalar::new(self.r, self.x)
    }

    /// Magnitude `|r + jx|`.
    #[must_use]
    pub fn magnitude(self) -> Scalar {
        self.to_complex().norm()
    }

    /// Scales both components by `factor` (e.g. converting per-unit data to ohms).
    #[must_use]
    pub fn scaled(self, factor: Scalar) -> Self {
        Self::new(self.r * factor, self.x * factor)
    }

    /// Euclidean distance to `other` in the R–X plane.
    #[must_use]
    pub fn distance(self, other: Self) -> Scalar {
        (self.r - other.r).hypot(self.x - other.x)
    }

    /// True when both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.x.is_finite()
    }
}

impl std::ops::Add for Impedance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.x + rhs.x)
    }
}

impl From<(Scalar, Scalar)> for Impedance {
    fn from((r, x): (Scalar, Scalar)) -> Self {
        Self::new(r, x)
    }
}

impl From<Impedance> for CScalar {
    fn from(z: Impedance) -> Self {
        z.to_complex()
    }
}

impl fmt::Display for Impedance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x < 0.0 {
            write!(f, "{} - j{} Ω", self.r, -self.x)
        } else {
            write!(f, "{} + j{} Ω", self.r, self.x)
        }
    }
}
