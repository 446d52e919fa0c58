//! Edge trimming: drop points too close to the scan boundary for the stone
//! to contact them safely.

use grindpath_math::{Axis, Point3};
use serde::{Deserialize, Serialize};

use crate::cloud::PointCloud;

/// The open XY rectangle of points kept after trimming.
///
/// Computed once from the raw scan; filtering an already-trimmed cloud with
/// the same window is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Lower X limit (exclusive).
    pub min_x: f64,
    /// Upper X limit (exclusive).
    pub max_x: f64,
    /// Lower Y limit (exclusive).
    pub min_y: f64,
    /// Upper Y limit (exclusive).
    pub max_y: f64,
}

impl TrimWindow {
    /// Shrink the cloud's XY bounding box by `margin` on every side.
    ///
    /// Returns `None` for an empty cloud.
    pub fn from_cloud(cloud: &PointCloud, margin: f64) -> Option<Self> {
        let (min_x, max_x) = cloud.range(Axis::X)?;
        let (min_y, max_y) = cloud.range(Axis::Y)?;
        Some(Self {
            min_x: min_x + margin,
            max_x: max_x - margin,
            min_y: min_y + margin,
            max_y: max_y - margin,
        })
    }

    /// Check if `p` lies strictly inside the window.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x > self.min_x && p.x < self.max_x && p.y > self.min_y && p.y < self.max_y
    }

    /// Keep the points of `cloud` inside the window.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        PointCloud::from_unique(cloud.iter().filter(|p| self.contains(p)).copied().collect())
    }
}

/// Remove every point within `margin` of the cloud's XY bounding box.
///
/// An empty result is valid output, not an error.
pub fn trim_edges(cloud: &PointCloud, margin: f64) -> PointCloud {
    let Some(window) = TrimWindow::from_cloud(cloud, margin) else {
        return PointCloud::new();
    };
    let trimmed = window.apply(cloud);
    if trimmed.is_empty() {
        tracing::warn!(
            input = cloud.len(),
            margin,
            "Edge trim removed every point"
        );
    } else {
        tracing::debug!(input = cloud.len(), kept = trimmed.len(), margin, "Trimmed edges");
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> PointCloud {
        (0..n)
            .flat_map(|i| (0..n).map(move |j| Point3::new(i as f64, j as f64, 0.0)))
            .collect()
    }

    #[test]
    fn test_trim_grid() {
        let cloud = grid(10);
        let trimmed = trim_edges(&cloud, 1.5);
        // x, y in (1.5, 7.5) -> 2..=7
        assert_eq!(trimmed.len(), 36);
        assert!(trimmed.iter().all(|p| p.x >= 2.0 && p.x <= 7.0));
        assert!(trimmed.iter().all(|p| p.y >= 2.0 && p.y <= 7.0));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let cloud = grid(10);
        // window (1, 8): points at exactly 1 and 8 are dropped
        let trimmed = trim_edges(&cloud, 1.0);
        assert_eq!(trimmed.len(), 36);
    }

    #[test]
    fn test_window_idempotent() {
        let cloud = grid(12);
        let window = TrimWindow::from_cloud(&cloud, 2.3).unwrap();
        let once = window.apply(&cloud);
        let twice = window.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_large_margin_empties_cloud() {
        let cloud = grid(4);
        assert!(trim_edges(&cloud, 10.0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(trim_edges(&PointCloud::new(), 0.5).is_empty());
        assert!(TrimWindow::from_cloud(&PointCloud::new(), 0.5).is_none());
    }
}
