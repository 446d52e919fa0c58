//! Toolpath output.
//!
//! Text output is one `x,y,z` point per line with no header, the surface
//! lines first and then every pass in order. Within a pass, lines follow
//! boundary, interior, cross boundary, cross interior. JSON output carries
//! the whole job report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use grindpath_kernel::{JobReport, PassLines, ToolpathPlan};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// Output encoding of a toolpath file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `x,y,z` point per line.
    #[default]
    Text,
    /// Pretty-printed JSON job report.
    Json,
}

impl OutputFormat {
    /// Pick a format from a file extension: `.json` is JSON; `.txt`, `.csv`
    /// and no extension are text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(OutputFormat::Json),
            Some("txt") | Some("csv") | None => Ok(OutputFormat::Text),
            Some(other) => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn write_lines<W: Write>(lines: &PassLines, writer: &mut W) -> IoResult<()> {
    for line in lines.iter() {
        for p in &line.points {
            writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
        }
    }
    Ok(())
}

/// Write every point of the plan as `x,y,z` text.
pub fn write_plan_text<W: Write>(plan: &ToolpathPlan, mut writer: W) -> IoResult<()> {
    write_lines(&plan.surface, &mut writer)?;
    for pass in &plan.passes {
        write_lines(&pass.lines, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the job report as pretty-printed JSON.
pub fn write_report_json<W: Write>(report: &JobReport, mut writer: W) -> IoResult<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Save a job report in the given format.
pub fn save_report<P: AsRef<Path>>(
    report: &JobReport,
    path: P,
    format: OutputFormat,
) -> IoResult<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Text => write_plan_text(&report.plan, writer)?,
        OutputFormat::Json => write_report_json(report, writer)?,
    }
    tracing::info!(
        path = %path.display(),
        ?format,
        points = report.plan.point_count(),
        "Wrote toolpaths"
    );
    Ok(())
}
