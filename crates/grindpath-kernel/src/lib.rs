#![warn(missing_docs)]

//! Surface-normal offset toolpaths for robotic grinding.
//!
//! Turns a scanned surface (a point cloud) and stone/process parameters into
//! ordered grinding lines, offset away from the surface along its normals
//! one pass at a time.
//!
//! # Pipeline
//!
//! 1. [`derive_parameters`] - stepover, band tolerance, edge margin and
//!    per-pass offset from the stone geometry
//! 2. [`trim_edges`] - drop points the stone cannot reach near the scan edge
//! 3. [`estimate_normals`] - PCA plane-fit normals, oriented as a field
//! 4. [`extract_bands`] / [`average_bands`] - slice the cloud into bands and
//!    collapse each band into a [`ToolpathLine`]
//! 5. [`generate_passes`] / [`PassIter`] - repeat 4 on the cloud displaced by
//!    each pass offset
//!
//! # Example
//!
//! ```
//! use grindpath_kernel::{flat_grid, GrindInputs, GrindJob};
//!
//! let cloud = flat_grid(10, 10, 1.0);
//! let job = GrindJob::new(&GrindInputs::default()).unwrap();
//! let report = job.run(&cloud).unwrap();
//!
//! assert_eq!(report.plan.pass_count(), 1);
//! for line in report.plan.passes[0].lines.iter() {
//!     assert!(line.points.iter().all(|p| (p.z - 0.25).abs() < 1e-9));
//! }
//! ```

mod average;
mod bands;
mod cloud;
mod error;
mod job;
mod neighbors;
mod normals;
mod params;
mod passes;
pub mod surface;
mod toolpath;
mod trim;

// Re-exports
pub use average::{average_band, average_bands, CrossGrouping};
pub use bands::{
    extract_bands, interior_centers, Band, BandSettings, ExtractedBands, MAX_BANDS,
};
pub use cloud::PointCloud;
pub use error::{GrindError, Result};
pub use job::{GrindJob, JobReport};
pub use neighbors::NeighborIndex;
pub use normals::{estimate_normals, NormalField};
pub use params::{
    derive_parameters, DerivedParameters, GrindInputs, GrindParameters, InstepOption,
    SurfaceResolution, ToleranceResolution,
};
pub use passes::{
    extract_lines, generate_passes, offset_cloud, pass_offsets, PassIter, PRIMARY_AXIS,
};
pub use surface::{flat_grid, Surface};
pub use toolpath::{Pass, PassLines, ToolpathLine, ToolpathPlan};
pub use trim::{trim_edges, TrimWindow};
