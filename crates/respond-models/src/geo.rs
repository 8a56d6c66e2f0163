//! Planar coordinates shared by incidents, resources and venue layouts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the venue plane. `y` grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    /// Creates a location from coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another point.
    pub fn distance_to(&self, other: &Location) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle in degrees from this point toward `other`, in (-180, 180].
    ///
    /// 0° is east, 90° is north.
    pub fn bearing_degrees_to(&self, other: &Location) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
