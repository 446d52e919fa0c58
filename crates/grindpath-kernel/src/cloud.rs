//! Point cloud container.

use std::collections::HashSet;

use grindpath_math::{Axis, Bounds3, Point3};
use serde::{Deserialize, Serialize};

/// An unordered set of scan points with no connectivity.
///
/// Constructed clouds hold unique points: exact duplicates are dropped on
/// construction, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    /// Create an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cloud from points, removing exact duplicates.
    pub fn from_points(points: Vec<Point3>) -> Self {
        let mut seen = HashSet::with_capacity(points.len());
        let points = points
            .into_iter()
            .filter(|p| seen.insert(point_key(p)))
            .collect();
        Self { points }
    }

    /// Wrap points already known to be unique (e.g. a filtered subset).
    pub(crate) fn from_unique(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points, in storage order.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }

    /// Consume the cloud, returning its points.
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    /// Axis-aligned bounds, or `None` for an empty cloud.
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(&self.points)
    }

    /// `(min, max)` along a planar axis, or `None` for an empty cloud.
    pub fn range(&self, axis: Axis) -> Option<(f64, f64)> {
        self.bounds().map(|b| b.range(axis))
    }
}

impl FromIterator<Point3> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Bit-exact identity of a point; `-0.0` and `0.0` are the same point.
fn point_key(p: &Point3) -> [u64; 3] {
    let bits = |v: f64| if v == 0.0 { 0u64 } else { v.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}
