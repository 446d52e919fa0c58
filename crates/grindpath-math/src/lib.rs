#![warn(missing_docs)]

//! Math types for the grindpath toolpath engine.
//!
//! Thin wrappers around nalgebra providing the domain types used by every
//! pipeline stage: points, vectors, unit directions, the planar banding axis
//! and axis-aligned bounds.

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// One of the two planar axes a toolpath can be banded along.
///
/// The remaining planar axis is the "cross" axis and Z is always the
/// displacement (height) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Band along X; lines run parallel to Y.
    X,
    /// Band along Y; lines run parallel to X.
    Y,
}

impl Axis {
    /// Component index of this axis in a point.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    /// The other planar axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Coordinate of `p` along this axis.
    pub fn along(self, p: &Point3) -> f64 {
        p[self.index()]
    }

    /// Coordinate of `p` along the cross axis.
    pub fn cross(self, p: &Point3) -> f64 {
        p[self.other().index()]
    }

    /// Build a point from along/cross/height coordinates.
    pub fn compose(self, along: f64, cross: f64, height: f64) -> Point3 {
        match self {
            Axis::X => Point3::new(along, cross, height),
            Axis::Y => Point3::new(cross, along, height),
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds3 {
    /// Bounds of a set of points, or `None` if the set is empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// `(min, max)` along a planar axis.
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        (axis.along(&self.min), axis.along(&self.max))
    }

    /// Box dimensions.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Below this length a vector is treated as degenerate.
    pub degenerate: f64,
}

impl Tolerance {
    /// Default tolerance: vectors shorter than 1e-12 are degenerate.
    pub const DEFAULT: Self = Self { degenerate: 1e-12 };

    /// Normalize `v`, or `None` if it is too short to carry a direction.
    pub fn try_normalize(&self, v: &Vec3) -> Option<Dir3> {
        Unit::try_new(*v, self.degenerate)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
