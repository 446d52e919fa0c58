//! Band averaging: collapse each band into one ordered toolpath line.
//!
//! The banding coordinate is averaged over the whole band. Height is
//! averaged per distinct cross-axis value, giving one output point per
//! value.

use grindpath_math::Point3;

use crate::bands::Band;
use crate::toolpath::ToolpathLine;

/// How cross-axis values are grouped before averaging heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossGrouping {
    /// Group by exact floating-point equality.
    Exact,
    /// Group values that round to the same multiple of the quantum.
    Snap(f64),
}

impl CrossGrouping {
    /// `Exact` for a zero quantum, `Snap` otherwise.
    pub fn from_quantum(quantum: f64) -> Self {
        if quantum > 0.0 {
            CrossGrouping::Snap(quantum)
        } else {
            CrossGrouping::Exact
        }
    }

    fn same_group(self, a: f64, b: f64) -> bool {
        match self {
            CrossGrouping::Exact => a == b,
            CrossGrouping::Snap(q) => (a / q).round() == (b / q).round(),
        }
    }
}

/// Collapse one band into a line ordered by ascending cross value.
///
/// Each output point carries the band's mean banding coordinate, the mean
/// cross value of its group and the mean height of its group.
pub fn average_band(band: &Band, grouping: CrossGrouping) -> ToolpathLine {
    let axis = band.axis;
    let along = band.points.iter().map(|p| axis.along(p)).sum::<f64>() / band.points.len() as f64;

    let mut samples: Vec<(f64, f64)> = band
        .points
        .iter()
        .map(|p| (axis.cross(p), p.z))
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut points: Vec<Point3> = Vec::new();
    let mut start = 0;
    while start < samples.len() {
        let first = samples[start].0;
        let end = samples[start..]
            .iter()
            .position(|s| !grouping.same_group(first, s.0))
            .map_or(samples.len(), |off| start + off);

        let group = &samples[start..end];
        let n = group.len() as f64;
        let cross = group.iter().map(|s| s.0).sum::<f64>() / n;
        let height = group.iter().map(|s| s.1).sum::<f64>() / n;
        points.push(axis.compose(along, cross, height));
        start = end;
    }

    ToolpathLine {
        axis,
        along,
        points,
    }
}

/// Collapse every band; output order follows band order.
pub fn average_bands(bands: &[Band], grouping: CrossGrouping) -> Vec<ToolpathLine> {
    bands
        .iter()
        .filter(|b| !b.points.is_empty())
        .map(|b| average_band(b, grouping))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grindpath_math::Axis;

    fn band(axis: Axis, points: Vec<Point3>) -> Band {
        Band {
            axis,
            center: 0.0,
            points,
        }
    }

    #[test]
    fn test_average_along_x() {
        let b = band(
            Axis::X,
            vec![
                Point3::new(0.9, 1.0, 1.0),
                Point3::new(1.1, 1.0, 3.0),
                Point3::new(1.0, 0.0, 5.0),
            ],
        );
        let line = average_band(&b, CrossGrouping::Exact);
        assert_eq!(line.len(), 2);
        assert_relative_eq!(line.along, 1.0, epsilon = 1e-12);
        // sorted by y: y=0 first
        assert_relative_eq!(line.points[0], Point3::new(1.0, 0.0, 5.0), epsilon = 1e-12);
        assert_relative_eq!(line.points[1], Point3::new(1.0, 1.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_average_along_y_swaps_coordinates() {
        let b = band(
            Axis::Y,
            vec![Point3::new(3.0, 2.0, 1.0), Point3::new(1.0, 2.2, 2.0)],
        );
        let line = average_band(&b, CrossGrouping::Exact);
        assert_eq!(line.axis, Axis::Y);
        assert_relative_eq!(line.points[0], Point3::new(1.0, 2.1, 2.0), epsilon = 1e-12);
        assert_relative_eq!(line.points[1], Point3::new(3.0, 2.1, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_exact_grouping_keeps_near_values_apart() {
        let b = band(
            Axis::X,
            vec![Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 1.0 + 1e-9, 2.0)],
        );
        assert_eq!(average_band(&b, CrossGrouping::Exact).len(), 2);
    }

    #[test]
    fn test_snap_grouping_merges_near_values() {
        let b = band(
            Axis::X,
            vec![Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 1.0 + 1e-9, 2.0)],
        );
        let line = average_band(&b, CrossGrouping::from_quantum(1e-6));
        assert_eq!(line.len(), 1);
        assert_relative_eq!(line.points[0].z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_band_has_zero_height() {
        let pts: Vec<Point3> = (0..10)
            .flat_map(|j| [Point3::new(1.95, j as f64, 0.0), Point3::new(2.05, j as f64, 0.0)])
            .collect();
        let line = average_band(&band(Axis::X, pts), CrossGrouping::Snap(1e-6));
        assert_eq!(line.len(), 10);
        assert!(line.points.iter().all(|p| p.z.abs() < 1e-12));
        assert!(line.points.windows(2).all(|w| w[0].y < w[1].y));
    }

    #[test]
    fn test_from_quantum() {
        assert_eq!(CrossGrouping::from_quantum(0.0), CrossGrouping::Exact);
        assert_eq!(CrossGrouping::from_quantum(0.5), CrossGrouping::Snap(0.5));
    }

    #[test]
    fn test_average_bands_empty() {
        assert!(average_bands(&[], CrossGrouping::Exact).is_empty());
    }
}
