//! Synthetic scan surfaces for demos and tests.

use grindpath_math::Point3;
use serde::{Deserialize, Serialize};

use crate::cloud::PointCloud;
use crate::error::{GrindError, Result};

/// A parametric surface sampled on a regular grid.
///
/// Square surfaces are centered on the origin and span `size` in X and Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Surface {
    /// The plane `z = 0`.
    Flat {
        /// Side length.
        size: f64,
        /// Samples per side.
        resolution: usize,
    },
    /// Upper half of a cylinder lying along X.
    HalfCylinder {
        /// Cylinder radius.
        radius: f64,
        /// Length along X.
        length: f64,
        /// Samples along X and around the arc.
        resolution: usize,
    },
    /// Flat plane with a Gaussian bump at the center.
    Bump {
        /// Side length.
        size: f64,
        /// Peak height of the bump.
        height: f64,
        /// Standard deviation of the bump.
        sigma: f64,
        /// Samples per side.
        resolution: usize,
    },
    /// The plane `z = slope_x * x + slope_y * y`.
    Tilted {
        /// Side length.
        size: f64,
        /// dz/dx.
        slope_x: f64,
        /// dz/dy.
        slope_y: f64,
        /// Samples per side.
        resolution: usize,
    },
}

impl Surface {
    /// Samples per side.
    pub fn resolution(&self) -> usize {
        match self {
            Surface::Flat { resolution, .. }
            | Surface::HalfCylinder { resolution, .. }
            | Surface::Bump { resolution, .. }
            | Surface::Tilted { resolution, .. } => *resolution,
        }
    }

    /// Sample the surface into a point cloud.
    pub fn sample(&self) -> Result<PointCloud> {
        let n = self.resolution();
        if n < 2 {
            return Err(GrindError::invalid(
                "resolution",
                n as f64,
                "needs at least 2 samples per side",
            ));
        }

        let points: Vec<Point3> = match *self {
            Surface::Flat { size, .. } => {
                positive("size", size)?;
                grid(size, n, |_, _| 0.0)
            }
            Surface::HalfCylinder { radius, length, .. } => {
                positive("radius", radius)?;
                positive("length", length)?;
                let xs = linspace(-length / 2.0, length / 2.0, n);
                let thetas = linspace(0.0, std::f64::consts::PI, n);
                xs.iter()
                    .flat_map(|&x| {
                        thetas
                            .iter()
                            .map(move |&t| Point3::new(x, radius * t.cos(), radius * t.sin()))
                    })
                    .collect()
            }
            Surface::Bump {
                size,
                height,
                sigma,
                ..
            } => {
                positive("size", size)?;
                positive("sigma", sigma)?;
                let two_s2 = 2.0 * sigma * sigma;
                grid(size, n, |x, y| height * (-(x * x + y * y) / two_s2).exp())
            }
            Surface::Tilted {
                size,
                slope_x,
                slope_y,
                ..
            } => {
                positive("size", size)?;
                grid(size, n, |x, y| slope_x * x + slope_y * y)
            }
        };
        Ok(PointCloud::from_points(points))
    }
}

/// An `nx` by `ny` grid of points at `z = 0`, `spacing` apart, starting at the
/// origin.
pub fn flat_grid(nx: usize, ny: usize, spacing: f64) -> PointCloud {
    (0..nx)
        .flat_map(|i| {
            (0..ny).map(move |j| Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0))
        })
        .collect()
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GrindError::invalid(name, value, "must be positive"))
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + i as f64 * step).collect()
}

fn grid(size: f64, n: usize, height: impl Fn(f64, f64) -> f64) -> Vec<Point3> {
    let axis = linspace(-size / 2.0, size / 2.0, n);
    let mut points = Vec::with_capacity(n * n);
    for &x in &axis {
        for &y in &axis {
            points.push(Point3::new(x, y, height(x, y)));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_surface() {
        let cloud = Surface::Flat {
            size: 10.0,
            resolution: 11,
        }
        .sample()
        .unwrap();
        assert_eq!(cloud.len(), 121);
        let b = cloud.bounds().unwrap();
        assert_relative_eq!(b.min.x, -5.0);
        assert_relative_eq!(b.max.y, 5.0);
        assert!(cloud.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_half_cylinder_on_radius() {
        let cloud = Surface::HalfCylinder {
            radius: 2.0,
            length: 4.0,
            resolution: 20,
        }
        .sample()
        .unwrap();
        for p in cloud.iter() {
            assert_relative_eq!((p.y * p.y + p.z * p.z).sqrt(), 2.0, epsilon = 1e-12);
            assert!(p.z >= -1e-12);
        }
    }

    #[test]
    fn test_bump_peak_at_center() {
        let cloud = Surface::Bump {
            size: 4.0,
            height: 0.5,
            sigma: 0.5,
            resolution: 21,
        }
        .sample()
        .unwrap();
        let peak = cloud.iter().map(|p| p.z).fold(f64::MIN, f64::max);
        assert_relative_eq!(peak, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_plane() {
        let cloud = Surface::Tilted {
            size: 2.0,
            slope_x: 0.5,
            slope_y: 0.0,
            resolution: 5,
        }
        .sample()
        .unwrap();
        for p in cloud.iter() {
            assert_relative_eq!(p.z, 0.5 * p.x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_tiny_resolution() {
        let s = Surface::Flat {
            size: 1.0,
            resolution: 1,
        };
        assert!(s.sample().is_err());
    }

    #[test]
    fn test_flat_grid() {
        let cloud = flat_grid(10, 4, 1.0);
        assert_eq!(cloud.len(), 40);
        assert_eq!(cloud.range(grindpath_math::Axis::Y), Some((0.0, 3.0)));
    }

    #[test]
    fn test_serde_tag() {
        let s: Surface =
            serde_json::from_str(r#"{"type":"Flat","size":2.0,"resolution":3}"#).unwrap();
        assert_eq!(
            s,
            Surface::Flat {
                size: 2.0,
                resolution: 3
            }
        );
    }
}
