//! Toolpath output types.

use grindpath_math::{Axis, Point3};
use serde::{Deserialize, Serialize};

/// One ordered grinding line: a band collapsed to one point per distinct
/// cross-axis value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathLine {
    /// Axis the source band was cut along.
    pub axis: Axis,
    /// Mean banding coordinate shared by every point of the line.
    pub along: f64,
    /// Points ordered by ascending cross-axis coordinate.
    pub points: Vec<Point3>,
}

impl ToolpathLine {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the line has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// The lines computed on one surface: boundary and interior lines along the
/// primary axis, plus the cross-cut lines along the secondary axis when
/// enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassLines {
    /// Lines offset `initial_stepover` from the extremes of the primary axis.
    pub boundary: Vec<ToolpathLine>,
    /// Regularly spaced primary-axis lines.
    pub interior: Vec<ToolpathLine>,
    /// Boundary lines along the secondary axis.
    pub cross_boundary: Vec<ToolpathLine>,
    /// Interior lines along the secondary axis.
    pub cross_interior: Vec<ToolpathLine>,
}

impl PassLines {
    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.boundary.len()
            + self.interior.len()
            + self.cross_boundary.len()
            + self.cross_interior.len()
    }

    /// Check if no line was produced.
    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    /// All lines in output order: boundary, interior, cross boundary, cross
    /// interior.
    pub fn iter(&self) -> impl Iterator<Item = &ToolpathLine> {
        self.boundary
            .iter()
            .chain(&self.interior)
            .chain(&self.cross_boundary)
            .chain(&self.cross_interior)
    }

    /// Total number of points across all lines.
    pub fn point_count(&self) -> usize {
        self.iter().map(ToolpathLine::len).sum()
    }

    /// Summed polyline length of all lines.
    pub fn path_length(&self) -> f64 {
        self.iter().map(ToolpathLine::length).sum()
    }
}

/// One offset pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    /// Zero-based pass index.
    pub index: usize,
    /// Normal displacement of this pass, `(index + 1) * z_offset`.
    pub offset: f64,
    /// Lines extracted from the displaced cloud.
    pub lines: PassLines,
}

/// The complete output of a job: lines on the unmodified surface followed by
/// every offset pass in index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathPlan {
    /// Lines on the trimmed surface before any offset.
    pub surface: PassLines,
    /// Offset passes, ordered by index.
    pub passes: Vec<Pass>,
}

impl ToolpathPlan {
    /// Number of offset passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Total number of lines, surface included.
    pub fn line_count(&self) -> usize {
        self.surface.line_count() + self.passes.iter().map(|p| p.lines.line_count()).sum::<usize>()
    }

    /// Total number of points, surface included.
    pub fn point_count(&self) -> usize {
        self.surface.point_count()
            + self.passes.iter().map(|p| p.lines.point_count()).sum::<usize>()
    }

    /// Total polyline length, surface included.
    pub fn path_length(&self) -> f64 {
        self.surface.path_length()
            + self.passes.iter().map(|p| p.lines.path_length()).sum::<f64>()
    }
}
