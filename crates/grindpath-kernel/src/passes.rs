//! Multi-pass offsetting: displace the surface along its normals by growing
//! multiples of the per-pass offset and re-extract lines at every depth.

use grindpath_math::Axis;
use rayon::prelude::*;

use crate::average::{average_bands, CrossGrouping};
use crate::bands::{extract_bands, BandSettings};
use crate::cloud::PointCloud;
use crate::error::{GrindError, Result};
use crate::normals::NormalField;
use crate::params::GrindParameters;
use crate::toolpath::{Pass, PassLines};

/// Axis the primary lines are banded along.
pub const PRIMARY_AXIS: Axis = Axis::X;

/// Displace every point by `distance` along its normal.
///
/// The field must be index-aligned with the cloud.
pub fn offset_cloud(
    cloud: &PointCloud,
    normals: &NormalField,
    distance: f64,
) -> Result<PointCloud> {
    check_alignment(cloud, normals)?;
    Ok(cloud
        .iter()
        .zip(normals.iter())
        .map(|(p, n)| p + n.into_inner() * distance)
        .collect())
}

/// Slack on `anomaly_height / z_offset` so that a height that is an exact
/// multiple of the offset does not round up to an extra pass.
const PASS_COUNT_SLACK: f64 = 1e-9;

/// Offsets of every pass, `(k + 1) * z_offset` for
/// `k < ceil(anomaly_height / z_offset)`.
pub fn pass_offsets(z_offset: f64, anomaly_height: f64, max_passes: usize) -> Result<Vec<f64>> {
    if !(z_offset.is_finite() && z_offset > 0.0) {
        return Err(GrindError::invalid("z_offset", z_offset, "must be positive"));
    }
    if !(anomaly_height.is_finite() && anomaly_height > 0.0) {
        return Err(GrindError::invalid(
            "anomaly_height",
            anomaly_height,
            "must be positive",
        ));
    }

    let count = (anomaly_height / z_offset - PASS_COUNT_SLACK).ceil().max(1.0);
    if count > max_passes as f64 {
        return Err(GrindError::TooManyPasses {
            passes: count as usize,
            limit: max_passes,
        });
    }
    Ok((1..=count as usize).map(|k| k as f64 * z_offset).collect())
}

/// Boundary and interior lines along the primary axis, plus the cross-cut
/// lines when enabled.
pub fn extract_lines(cloud: &PointCloud, params: &GrindParameters) -> Result<PassLines> {
    let settings = BandSettings::from(params);
    let grouping = CrossGrouping::from_quantum(params.cross_snap);

    let primary = extract_bands(cloud, PRIMARY_AXIS, &settings)?;
    let mut lines = PassLines {
        boundary: average_bands(&primary.initial, grouping),
        interior: average_bands(&primary.interior, grouping),
        ..Default::default()
    };
    if params.cross_cut_enabled {
        let cross = extract_bands(cloud, PRIMARY_AXIS.other(), &settings)?;
        lines.cross_boundary = average_bands(&cross.initial, grouping);
        lines.cross_interior = average_bands(&cross.interior, grouping);
    }
    Ok(lines)
}

fn check_alignment(cloud: &PointCloud, normals: &NormalField) -> Result<()> {
    if cloud.len() != normals.len() {
        return Err(GrindError::NormalCountMismatch {
            points: cloud.len(),
            normals: normals.len(),
        });
    }
    Ok(())
}

fn run_pass(
    cloud: &PointCloud,
    normals: &NormalField,
    params: &GrindParameters,
    index: usize,
    offset: f64,
) -> Result<Pass> {
    let moved = offset_cloud(cloud, normals, offset)?;
    let lines = extract_lines(&moved, params)?;
    tracing::debug!(
        index,
        offset,
        lines = lines.line_count(),
        points = lines.point_count(),
        "Pass complete"
    );
    Ok(Pass {
        index,
        offset,
        lines,
    })
}

/// Lazy pass sequence; each call to `next` computes one pass.
///
/// Dropping the iterator early abandons the remaining passes.
pub struct PassIter<'a> {
    cloud: &'a PointCloud,
    normals: &'a NormalField,
    params: &'a GrindParameters,
    offsets: Vec<f64>,
    next: usize,
}

impl<'a> PassIter<'a> {
    /// Prepare the pass sequence. Fails before any pass is computed if the
    /// field does not match the cloud or the pass budget is exceeded.
    pub fn new(
        cloud: &'a PointCloud,
        normals: &'a NormalField,
        params: &'a GrindParameters,
    ) -> Result<Self> {
        check_alignment(cloud, normals)?;
        BandSettings::from(params).validate()?;
        let offsets = pass_offsets(params.z_offset(), params.anomaly_height, params.max_passes)?;
        Ok(Self {
            cloud,
            normals,
            params,
            offsets,
            next: 0,
        })
    }

    /// Offsets of all passes, including those already produced.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }
}

impl Iterator for PassIter<'_> {
    type Item = Result<Pass>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        let offset = *self.offsets.get(index)?;
        self.next += 1;
        Some(run_pass(self.cloud, self.normals, self.params, index, offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.offsets.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PassIter<'_> {}

/// Compute every pass in parallel and return them in index order.
pub fn generate_passes(
    cloud: &PointCloud,
    normals: &NormalField,
    params: &GrindParameters,
) -> Result<Vec<Pass>> {
    let iter = PassIter::new(cloud, normals, params)?;
    let passes = iter
        .offsets()
        .par_iter()
        .enumerate()
        .map(|(index, &offset)| run_pass(cloud, normals, params, index, offset))
        .collect::<Result<Vec<Pass>>>()?;

    tracing::info!(
        passes = passes.len(),
        points = cloud.len(),
        z_offset = params.z_offset(),
        anomaly_height = params.anomaly_height,
        "Generated offset passes"
    );
    Ok(passes)
}
