//! End-to-end grinding job: derive, trim, estimate normals, extract the
//! surface lines and run the offset passes.

use grindpath_math::Dir3;
use serde::Serialize;

use crate::cloud::PointCloud;
use crate::error::Result;
use crate::normals::{estimate_normals, NormalField};
use crate::params::{derive_parameters, GrindInputs, GrindParameters};
use crate::passes::{extract_lines, generate_passes};
use crate::toolpath::ToolpathPlan;
use crate::trim::{trim_edges, TrimWindow};

/// A validated job, ready to run against any number of scans.
#[derive(Debug, Clone)]
pub struct GrindJob {
    params: GrindParameters,
}

/// Everything a job produced, for reporting and serialization.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Parameters the job ran with.
    pub parameters: GrindParameters,
    /// Points in the scan as given.
    pub input_points: usize,
    /// Window kept by edge trimming; `None` for an empty scan.
    pub trim_window: Option<TrimWindow>,
    /// Points left after edge trimming.
    pub trimmed_points: usize,
    /// Mean direction of the oriented normal field.
    pub mean_normal: Dir3,
    /// Total polyline length of every line in the plan.
    pub path_length: f64,
    /// Surface lines and offset passes.
    pub plan: ToolpathPlan,
}

impl GrindJob {
    /// Validate inputs and derive the job parameters.
    pub fn new(inputs: &GrindInputs) -> Result<Self> {
        Ok(Self {
            params: derive_parameters(inputs)?,
        })
    }

    /// The derived parameters.
    pub fn parameters(&self) -> &GrindParameters {
        &self.params
    }

    /// Trim the scan to the stone's reachable area.
    pub fn trim(&self, cloud: &PointCloud) -> PointCloud {
        trim_edges(cloud, self.params.derived.edge_margin)
    }

    /// Estimate the normal field of an already-trimmed cloud.
    pub fn normals(&self, trimmed: &PointCloud) -> Result<NormalField> {
        estimate_normals(trimmed, self.params.region_size, self.params.max_neighbors)
    }

    /// Run the full pipeline on a raw scan.
    pub fn run(&self, cloud: &PointCloud) -> Result<JobReport> {
        let params = &self.params;
        tracing::info!(
            points = cloud.len(),
            stepover = params.stepover(),
            z_offset = params.z_offset(),
            anomaly_height = params.anomaly_height,
            cross_cut = params.cross_cut_enabled,
            "Starting grind job"
        );

        let trim_window = TrimWindow::from_cloud(cloud, params.derived.edge_margin);
        let trimmed = self.trim(cloud);
        let normals = self.normals(&trimmed)?;
        let surface = extract_lines(&trimmed, params)?;
        let passes = generate_passes(&trimmed, &normals, params)?;
        let plan = ToolpathPlan { surface, passes };

        tracing::info!(
            trimmed = trimmed.len(),
            passes = plan.pass_count(),
            lines = plan.line_count(),
            points = plan.point_count(),
            path_length = plan.path_length(),
            "Grind job complete"
        );
        Ok(JobReport {
            parameters: params.clone(),
            input_points: cloud.len(),
            trim_window,
            trimmed_points: trimmed.len(),
            mean_normal: normals.mean(),
            path_length: plan.path_length(),
            plan,
        })
    }
}
