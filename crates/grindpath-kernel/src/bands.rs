//! Coordinate banding: slice a cloud into thin slabs perpendicular to one
//! planar axis, one slab per toolpath line.

use grindpath_math::{Axis, Point3};

use crate::cloud::PointCloud;
use crate::error::{GrindError, Result};
use crate::params::GrindParameters;

/// Points whose banding coordinate lies within the tolerance of a center.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Axis the band was cut along.
    pub axis: Axis,
    /// Target coordinate of the band.
    pub center: f64,
    /// Member points, in cloud order. Never empty.
    pub points: Vec<Point3>,
}

/// Banding settings for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    /// Spacing between interior band centers.
    pub stepover: f64,
    /// Band half-width; membership is `|coord - center| < tolerance`.
    pub tolerance: f64,
    /// Offset of the two boundary bands from the cloud extremes.
    pub initial_stepover: f64,
}

impl BandSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.stepover.is_finite() && self.stepover > 0.0) {
            return Err(GrindError::invalid(
                "stepover",
                self.stepover,
                "must be positive",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(GrindError::invalid(
                "tolerance",
                self.tolerance,
                "must be positive",
            ));
        }
        if !(self.initial_stepover.is_finite() && self.initial_stepover >= 0.0) {
            return Err(GrindError::invalid(
                "initial_stepover",
                self.initial_stepover,
                "must be zero or positive",
            ));
        }
        Ok(())
    }
}

impl From<&GrindParameters> for BandSettings {
    fn from(params: &GrindParameters) -> Self {
        Self {
            stepover: params.derived.stepover,
            tolerance: params.derived.tolerance,
            initial_stepover: params.derived.initial_stepover,
        }
    }
}

/// Bands extracted along one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedBands {
    /// Regularly spaced bands between the boundary bands.
    pub interior: Vec<Band>,
    /// The two bands offset `initial_stepover` in from each extreme.
    pub initial: Vec<Band>,
}

impl ExtractedBands {
    /// Check if no band captured any point.
    pub fn is_empty(&self) -> bool {
        self.interior.is_empty() && self.initial.is_empty()
    }
}

/// Upper bound on the interior bands cut along one axis.
pub const MAX_BANDS: usize = 100_000;

/// Interior band centers: `start + k * step` for every `k` with the value
/// below `stop` (half-open, like a numeric range).
///
/// Fails with [`GrindError::TooManyBands`] when the range holds more than
/// [`MAX_BANDS`] centers.
pub fn interior_centers(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if stop <= start || step <= 0.0 {
        return Ok(Vec::new());
    }
    let count = ((stop - start) / step).ceil();
    if count > MAX_BANDS as f64 {
        return Err(GrindError::TooManyBands {
            bands: count as usize,
            limit: MAX_BANDS,
        });
    }
    Ok((0..count as usize)
        .map(|k| start + k as f64 * step)
        .filter(|&c| c < stop)
        .collect())
}

/// Band the cloud along `axis`.
///
/// Boundary bands sit at `min + initial_stepover` and
/// `max - initial_stepover`; interior bands run from
/// `min + 2 * initial_stepover` towards `max - 2 * initial_stepover` every
/// `stepover`. Bands that capture no point are dropped.
pub fn extract_bands(
    cloud: &PointCloud,
    axis: Axis,
    settings: &BandSettings,
) -> Result<ExtractedBands> {
    settings.validate()?;
    let Some((min, max)) = cloud.range(axis) else {
        return Ok(ExtractedBands::default());
    };

    let initial_centers = [
        min + settings.initial_stepover,
        max - settings.initial_stepover,
    ];
    let centers = interior_centers(
        min + 2.0 * settings.initial_stepover,
        max - 2.0 * settings.initial_stepover,
        settings.stepover,
    )?;

    let band_at = |center: f64| -> Option<Band> {
        let points: Vec<Point3> = cloud
            .iter()
            .filter(|p| (axis.along(p) - center).abs() < settings.tolerance)
            .copied()
            .collect();
        (!points.is_empty()).then_some(Band {
            axis,
            center,
            points,
        })
    };

    let bands = ExtractedBands {
        interior: centers.iter().filter_map(|&c| band_at(c)).collect(),
        initial: initial_centers.iter().filter_map(|&c| band_at(c)).collect(),
    };
    tracing::debug!(
        ?axis,
        interior = bands.interior.len(),
        initial = bands.initial.len(),
        candidates = centers.len(),
        "Extracted bands"
    );
    Ok(bands)
}
