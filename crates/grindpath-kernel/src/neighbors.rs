//! 3D grid-based spatial hashing for fixed-radius neighbor queries.

use std::collections::HashMap;

use grindpath_math::{Point3, Vec3};

type CellKey = (i64, i64, i64);

/// Uniform-grid spatial hash over a borrowed point slice.
///
/// The cell size equals the query radius, so a radius query touches at most
/// the 27 cells around the query point.
pub struct NeighborIndex<'a> {
    points: &'a [Point3],
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl<'a> NeighborIndex<'a> {
    /// Build an index with the given cell size (must be positive).
    pub fn new(points: &'a [Point3], cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0);
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            cells.entry(cell_of(p, cell_size)).or_default().push(i);
        }
        Self {
            points,
            cell_size,
            cells,
        }
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Indices of up to `cap` points within `radius` of `query`, nearest
    /// first. Ties are broken by index so results are deterministic.
    ///
    /// The query point itself is included when it belongs to the slice.
    pub fn within(&self, query: &Point3, radius: f64, cap: usize) -> Vec<usize> {
        let r2 = radius * radius;
        let span = Vec3::repeat(radius);
        let lo = cell_of(&(query - span), self.cell_size);
        let hi = cell_of(&(query + span), self.cell_size);

        let mut found: Vec<(f64, usize)> = Vec::new();
        for cx in lo.0..=hi.0 {
            for cy in lo.1..=hi.1 {
                for cz in lo.2..=hi.2 {
                    let Some(bucket) = self.cells.get(&(cx, cy, cz)) else {
                        continue;
                    };
                    for &i in bucket {
                        let d2 = (self.points[i] - query).norm_squared();
                        if d2 <= r2 {
                            found.push((d2, i));
                        }
                    }
                }
            }
        }

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.truncate(cap);
        found.into_iter().map(|(_, i)| i).collect()
    }
}

fn cell_of(p: &Point3, cell_size: f64) -> CellKey {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_points(n: usize) -> Vec<Point3> {
        (0..n).map(|i| Point3::new(i as f64 * 0.5, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_radius_query() {
        let pts = line_points(10);
        let index = NeighborIndex::new(&pts, 1.0);
        let found = index.within(&pts[4], 1.0, 30);
        // 1.0, 1.5, 2.0, 2.5, 3.0
        assert_eq!(found.len(), 5);
        assert_eq!(found[0], 4);
        assert!(found.contains(&2));
        assert!(found.contains(&6));
    }

    #[test]
    fn test_cap_keeps_nearest() {
        let pts = line_points(10);
        let index = NeighborIndex::new(&pts, 1.0);
        let found = index.within(&pts[4], 1.0, 3);
        assert_eq!(found, vec![4, 3, 5]);
    }

    #[test]
    fn test_negative_coordinates() {
        let pts = vec![
            Point3::new(-0.1, -0.1, 0.0),
            Point3::new(0.1, 0.1, 0.0),
            Point3::new(-5.0, -5.0, 0.0),
        ];
        let index = NeighborIndex::new(&pts, 0.5);
        let found = index.within(&Point3::origin(), 0.5, 10);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_empty_index() {
        let pts: Vec<Point3> = Vec::new();
        let index = NeighborIndex::new(&pts, 1.0);
        assert_eq!(index.cell_count(), 0);
        assert!(index.within(&Point3::origin(), 1.0, 10).is_empty());
    }
}
