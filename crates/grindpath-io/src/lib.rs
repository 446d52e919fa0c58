#![warn(missing_docs)]

//! File I/O for grindpath.
//!
//! - **Scans**: comma-delimited text, one point per row after a header row
//! - **Toolpaths**: `x,y,z` text (one point per line) or a JSON job report
//! - **Jobs**: TOML or JSON configuration files
//!
//! # Example
//!
//! ```no_run
//! use grindpath_io::{load_point_cloud, save_report, JobConfig, OutputFormat};
//! use grindpath_kernel::GrindJob;
//!
//! let config = JobConfig::load("job.toml").unwrap();
//! let cloud = load_point_cloud("scan.csv").unwrap();
//! let report = GrindJob::new(&config.params).unwrap().run(&cloud).unwrap();
//! save_report(&report, "lines.txt", OutputFormat::Text).unwrap();
//! ```

mod config;
mod error;
mod scan;
mod toolpath;

pub use config::JobConfig;
pub use error::{IoError, IoResult};
pub use scan::{
    load_point_cloud, parse_point_cloud, read_point_cloud, save_point_cloud, write_point_cloud,
    POINT_HEADER,
};
pub use toolpath::{save_report, write_plan_text, write_report_json, OutputFormat};
