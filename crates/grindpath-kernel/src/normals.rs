//! Surface normal estimation and orientation for scanned point clouds.
//!
//! Each normal comes from a PCA plane fit over the point's neighborhood: the
//! eigenvector of the neighborhood covariance with the smallest eigenvalue.
//! A plane fit only fixes a normal up to sign, so the field is then oriented
//! as a whole against its own mean direction.

use grindpath_math::{Dir3, Point3, Tolerance, Vec3};
use nalgebra::{Matrix3, SymmetricEigen};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cloud::PointCloud;
use crate::error::{GrindError, Result};
use crate::neighbors::NeighborIndex;

/// Per-point unit normals, index-aligned with the cloud they were estimated
/// from.
///
/// Every normal satisfies `dot(normal, mean) >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalField {
    normals: Vec<Dir3>,
    mean: Dir3,
}

impl NormalField {
    /// An empty field (the normals of an empty cloud).
    pub fn empty() -> Self {
        Self {
            normals: Vec::new(),
            mean: Vec3::z_axis(),
        }
    }

    /// Orient raw unit normals consistently: compute their normalized mean
    /// and flip every normal pointing away from it.
    ///
    /// If the normals cancel out the mean falls back to +Z.
    pub fn orient(mut normals: Vec<Dir3>) -> Self {
        let sum: Vec3 = normals.iter().map(|n| n.into_inner()).sum();
        let mean = Tolerance::DEFAULT
            .try_normalize(&sum)
            .unwrap_or_else(Vec3::z_axis);
        for n in &mut normals {
            if n.dot(mean.as_ref()) < 0.0 {
                *n = -*n;
            }
        }
        Self { normals, mean }
    }

    /// Number of normals.
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    /// Check if the field is empty.
    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    /// The normalized mean direction the field is oriented against.
    pub fn mean(&self) -> Dir3 {
        self.mean
    }

    /// Normal of the `i`-th point.
    pub fn get(&self, i: usize) -> Option<&Dir3> {
        self.normals.get(i)
    }

    /// All normals, index-aligned with the source cloud.
    pub fn normals(&self) -> &[Dir3] {
        &self.normals
    }

    /// Iterate over the normals.
    pub fn iter(&self) -> std::slice::Iter<'_, Dir3> {
        self.normals.iter()
    }
}

impl Default for NormalField {
    fn default() -> Self {
        Self::empty()
    }
}

/// Estimate an outward normal for every point of `cloud`.
///
/// Neighborhoods are the points within `region_size`, capped at the
/// `max_neighbors` nearest. Points with fewer than three neighbors cannot be
/// fitted and take the field's mean direction.
pub fn estimate_normals(
    cloud: &PointCloud,
    region_size: f64,
    max_neighbors: usize,
) -> Result<NormalField> {
    if !(region_size.is_finite() && region_size > 0.0) {
        return Err(GrindError::invalid(
            "region_size",
            region_size,
            "must be positive",
        ));
    }
    if max_neighbors < 3 {
        return Err(GrindError::invalid(
            "max_neighbors",
            max_neighbors as f64,
            "a plane fit needs at least 3 neighbors",
        ));
    }
    if cloud.is_empty() {
        return Ok(NormalField::empty());
    }

    let points = cloud.points();
    let index = NeighborIndex::new(points, region_size);

    let fitted: Vec<Option<Dir3>> = points
        .par_iter()
        .map(|p| {
            let neighbors = index.within(p, region_size, max_neighbors);
            fit_plane_normal(points, &neighbors).map(upper_hemisphere)
        })
        .collect();

    let degenerate = fitted.iter().filter(|n| n.is_none()).count();
    let valid: Vec<Dir3> = fitted.iter().flatten().copied().collect();
    let mean = NormalField::orient(valid).mean();
    if degenerate > 0 {
        tracing::warn!(
            degenerate,
            total = points.len(),
            region_size,
            "Points with too few neighbors for a plane fit; using the mean normal"
        );
    }

    let field = NormalField::orient(fitted.into_iter().map(|n| n.unwrap_or(mean)).collect());
    tracing::info!(
        points = field.len(),
        cells = index.cell_count(),
        mean_x = field.mean().x,
        mean_y = field.mean().y,
        mean_z = field.mean().z,
        "Estimated normals"
    );
    Ok(field)
}

/// Smallest-eigenvalue eigenvector of the neighborhood covariance.
fn fit_plane_normal(points: &[Point3], neighbors: &[usize]) -> Option<Dir3> {
    if neighbors.len() < 3 {
        return None;
    }

    let centroid: Vec3 = neighbors.iter().map(|&i| points[i].coords).sum::<Vec3>()
        / neighbors.len() as f64;

    let mut cov = Matrix3::zeros();
    for &i in neighbors {
        let diff = points[i].coords - centroid;
        cov += diff * diff.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let min_idx = eigen.eigenvalues.imin();
    let column = eigen.eigenvectors.column(min_idx);
    Tolerance::DEFAULT.try_normalize(&Vec3::new(column[0], column[1], column[2]))
}

/// Pick the sign of a plane normal deterministically: +Z first, then +Y,
/// then +X.
fn upper_hemisphere(n: Dir3) -> Dir3 {
    let eps = Tolerance::DEFAULT.degenerate;
    let flip = if n.z.abs() > eps {
        n.z < 0.0
    } else if n.y.abs() > eps {
        n.y < 0.0
    } else {
        n.x < 0.0
    };
    if flip {
        -n
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_grid(n: usize, spacing: f64) -> PointCloud {
        (0..n)
            .flat_map(|i| {
                (0..n).map(move |j| Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0))
            })
            .collect()
    }

    #[test]
    fn test_flat_grid_normals_face_up() {
        let cloud = flat_grid(10, 1.0);
        let field = estimate_normals(&cloud, 1.5, 30).unwrap();
        assert_eq!(field.len(), cloud.len());
        for n in field.iter() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-9);
        }
        assert_relative_eq!(field.mean().z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tilted_plane_normal() {
        // z = x: normal is (-1, 0, 1) / sqrt(2)
        let cloud: PointCloud = (0..8)
            .flat_map(|i| {
                (0..8).map(move |j| Point3::new(i as f64 * 0.2, j as f64 * 0.2, i as f64 * 0.2))
            })
            .collect();
        let field = estimate_normals(&cloud, 0.5, 30).unwrap();
        let expected = Vec3::new(-1.0, 0.0, 1.0).normalize();
        for n in field.iter() {
            assert_relative_eq!(n.into_inner(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_orientation_invariant_on_curved_surface() {
        // Half cylinder of radius 2 about the X axis.
        let cloud: PointCloud = (0..20)
            .flat_map(|i| {
                (0..30).map(move |j| {
                    let theta = std::f64::consts::PI * j as f64 / 29.0;
                    Point3::new(i as f64 * 0.2, 2.0 * theta.cos(), 2.0 * theta.sin())
                })
            })
            .collect();
        let field = estimate_normals(&cloud, 0.5, 30).unwrap();
        let mean = field.mean();
        for n in field.iter() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
            assert!(n.dot(mean.as_ref()) >= 0.0);
        }
    }

    #[test]
    fn test_orient_flips_against_mean() {
        let up = Vec3::z_axis();
        let field = NormalField::orient(vec![up, up, -up]);
        assert!(field.iter().all(|n| n.z > 0.0));
        assert_relative_eq!(field.mean().z, 1.0);
    }

    #[test]
    fn test_isolated_points_take_mean() {
        let mut pts: Vec<Point3> = flat_grid(5, 0.1).into_points();
        pts.push(Point3::new(10.0, 10.0, 0.0));
        let cloud = PointCloud::from_points(pts);
        let field = estimate_normals(&cloud, 0.15, 30).unwrap();
        let last = field.get(cloud.len() - 1).unwrap();
        assert_relative_eq!(last.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_cloud_gives_empty_field() {
        let field = estimate_normals(&PointCloud::new(), 0.5, 30).unwrap();
        assert!(field.is_empty());
    }

    #[test]
    fn test_rejects_bad_region() {
        let cloud = flat_grid(3, 1.0);
        assert!(estimate_normals(&cloud, 0.0, 30).is_err());
        assert!(estimate_normals(&cloud, 1.0, 2).is_err());
    }
}
