//! Delimited-text point clouds.
//!
//! One point per row, comma separated. The first row is a header and is
//! always skipped. Rows need at least three numeric fields; any further
//! columns (colors, intensities) are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use grindpath_kernel::PointCloud;
use grindpath_math::Point3;

use crate::error::{IoError, IoResult};

/// Header written by [`write_point_cloud`].
pub const POINT_HEADER: &str = "x,y,z";

/// Parse a point cloud from text.
pub fn parse_point_cloud(text: &str) -> IoResult<PointCloud> {
    read_point_cloud(text.as_bytes())
}

/// Read a point cloud from any buffered reader.
///
/// A header-only input gives an empty cloud. Exact duplicate points are
/// dropped.
pub fn read_point_cloud<R: BufRead>(reader: R) -> IoResult<PointCloud> {
    let mut lines = reader.lines();
    match lines.next() {
        Some(header) => {
            header?;
        }
        None => return Err(IoError::EmptyFile),
    }

    let mut points = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        let row = line.trim();
        if row.is_empty() {
            continue;
        }
        // header is line 1
        points.push(parse_row(row, i + 2)?);
    }

    let raw = points.len();
    let cloud = PointCloud::from_points(points);
    if cloud.len() < raw {
        tracing::debug!(duplicates = raw - cloud.len(), "Dropped duplicate points");
    }
    Ok(cloud)
}

/// Load a point cloud file.
pub fn load_point_cloud<P: AsRef<Path>>(path: P) -> IoResult<PointCloud> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let cloud = read_point_cloud(BufReader::new(file))?;
    tracing::info!(path = %path.display(), points = cloud.len(), "Loaded point cloud");
    Ok(cloud)
}

/// Write a point cloud with a header row, in the format
/// [`read_point_cloud`] accepts.
pub fn write_point_cloud<W: Write>(cloud: &PointCloud, mut writer: W) -> IoResult<()> {
    writeln!(writer, "{POINT_HEADER}")?;
    for p in cloud {
        writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save a point cloud file.
pub fn save_point_cloud<P: AsRef<Path>>(cloud: &PointCloud, path: P) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    write_point_cloud(cloud, BufWriter::new(file))
}

fn parse_row(row: &str, line: usize) -> IoResult<Point3> {
    let mut fields = row.split(',').map(str::trim);
    let mut coords = [0.0; 3];
    for (axis, slot) in ["x", "y", "z"].iter().zip(coords.iter_mut()) {
        let field = fields.next().ok_or_else(|| IoError::Parse {
            line,
            reason: format!("expected at least 3 fields, missing {axis}"),
        })?;
        let value: f64 = field.parse().map_err(|_| IoError::Parse {
            line,
            reason: format!("{axis} is not a number: {field:?}"),
        })?;
        if !value.is_finite() {
            return Err(IoError::Parse {
                line,
                reason: format!("{axis} is not finite: {field:?}"),
            });
        }
        *slot = value;
    }
    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_header_and_extra_columns() {
        let cloud = parse_point_cloud("x,y,z,r\n0,0,1,255\n1.5, 2, -3,0\n").unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points()[1], Point3::new(1.5, 2.0, -3.0));
    }

    #[test]
    fn test_numeric_first_row_is_still_a_header() {
        let cloud = parse_point_cloud("9,9,9\n1,2,3\n").unwrap();
        assert_eq!(cloud.points(), &[Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_blank_lines_and_duplicates() {
        let cloud = parse_point_cloud("h\n\n1,1,1\n   \n1,1,1\n2,2,2\n").unwrap();
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_header_only_is_empty_cloud() {
        assert!(parse_point_cloud("x,y,z\n").unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_point_cloud(""), Err(IoError::EmptyFile)));
    }

    #[test]
    fn test_short_row_reports_line() {
        let err = parse_point_cloud("x,y,z\n1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse_point_cloud("x,y,z\n\n1,abc,3\n").unwrap_err();
        match err {
            IoError::Parse { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_nan() {
        assert!(parse_point_cloud("x,y,z\nNaN,0,0\n").is_err());
    }

    #[test]
    fn test_write_then_read() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.5, -1.0, 2.25),
            Point3::new(3.0, 4.0, 5.0),
        ]);
        let mut buf = Vec::new();
        write_point_cloud(&cloud, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("x,y,z\n"));
        assert_eq!(parse_point_cloud(&text).unwrap(), cloud);
    }
}
