//! grindpath CLI - grinding toolpaths from scanned point clouds
//!
//! Reads a scan and tool parameters, writes ordered offset toolpaths.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use grindpath_io::{
    load_point_cloud, save_point_cloud, save_report, write_plan_text, write_report_json,
    JobConfig, OutputFormat,
};
use grindpath_kernel::{
    GrindInputs, GrindJob, InstepOption, Surface, SurfaceResolution, ToleranceResolution,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grindpath")]
#[command(about = "Surface-normal offset grinding toolpaths from point clouds", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate toolpaths for a scan
    Run {
        /// Job configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Point cloud file (overrides the config)
        input: Option<PathBuf>,
        /// Output file (.txt, .csv or .json); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (default: from the output extension)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Print the parameters derived from the stone geometry
    Derive {
        /// Job configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Write a synthetic scan surface
    Generate {
        /// Surface shape
        #[arg(value_enum)]
        shape: Shape,
        /// Output point cloud file
        output: PathBuf,
        /// Side length (length along X for a half cylinder)
        #[arg(long, default_value_t = 10.0)]
        size: f64,
        /// Samples per side
        #[arg(long, default_value_t = 200)]
        resolution: usize,
        /// Half-cylinder radius
        #[arg(long, default_value_t = 2.0)]
        radius: f64,
        /// Bump peak height
        #[arg(long, default_value_t = 0.5)]
        height: f64,
        /// Bump standard deviation
        #[arg(long, default_value_t = 1.0)]
        sigma: f64,
        /// Tilted plane dz/dx
        #[arg(long, default_value_t = 0.1)]
        slope_x: f64,
        /// Tilted plane dz/dy
        #[arg(long, default_value_t = 0.0)]
        slope_y: f64,
    },
}

/// Parameter overrides shared by `run` and `derive`.
#[derive(Args)]
struct ParamArgs {
    /// Stone diameter
    #[arg(long)]
    diameter: Option<f64>,
    /// Grind depth
    #[arg(long)]
    depth: Option<f64>,
    /// Grind angle in degrees, strictly between 0 and 90
    #[arg(long)]
    angle: Option<f64>,
    /// Stepover preset
    #[arg(long, value_enum, conflicts_with = "resolution_percent")]
    resolution: Option<Preset>,
    /// Custom stepover, percent of the maximum grind width
    #[arg(long)]
    resolution_percent: Option<f64>,
    /// Band tolerance preset
    #[arg(long, value_enum, conflicts_with = "tolerance_value")]
    tolerance: Option<Preset>,
    /// Custom band tolerance
    #[arg(long)]
    tolerance_value: Option<f64>,
    /// Boundary line offset, percent of the stepover
    #[arg(long)]
    initial_stepover: Option<f64>,
    /// Normal estimation radius
    #[arg(long)]
    region_size: Option<f64>,
    /// Target cumulative offset depth
    #[arg(long)]
    anomaly_height: Option<f64>,
    /// Also cut lines along Y
    #[arg(long)]
    cross_cut: bool,
    /// Edge margin as a percent of the instep (default: full instep)
    #[arg(long)]
    instep_percent: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Flat,
    HalfCylinder,
    Bump,
    Tilted,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

impl ParamArgs {
    fn apply(&self, inputs: &mut GrindInputs) {
        if let Some(v) = self.diameter {
            inputs.stone_diameter = v;
        }
        if let Some(v) = self.depth {
            inputs.grind_depth = v;
        }
        if let Some(v) = self.angle {
            inputs.grind_angle_degrees = v;
        }
        if let Some(preset) = self.resolution {
            inputs.surface_resolution = match preset {
                Preset::Low => SurfaceResolution::Low,
                Preset::Medium => SurfaceResolution::Medium,
                Preset::High => SurfaceResolution::High,
            };
        }
        if let Some(percent) = self.resolution_percent {
            inputs.surface_resolution = SurfaceResolution::Custom { percent };
        }
        if let Some(preset) = self.tolerance {
            inputs.tolerance_resolution = match preset {
                Preset::Low => ToleranceResolution::Low,
                Preset::Medium => ToleranceResolution::Medium,
                Preset::High => ToleranceResolution::High,
            };
        }
        if let Some(value) = self.tolerance_value {
            inputs.tolerance_resolution = ToleranceResolution::Custom { value };
        }
        if let Some(v) = self.initial_stepover {
            inputs.initial_stepover_factor = v;
        }
        if let Some(v) = self.region_size {
            inputs.region_size = v;
        }
        if let Some(v) = self.anomaly_height {
            inputs.anomaly_height = v;
        }
        if self.cross_cut {
            inputs.cross_cut_enabled = true;
        }
        if let Some(percent) = self.instep_percent {
            inputs.instep_option = InstepOption::Custom { percent };
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            input,
            output,
            format,
            params,
        } => run_job(config.as_deref(), input, output, format, &params),
        Commands::Derive {
            config,
            json,
            params,
        } => show_derived(config.as_deref(), json, &params),
        Commands::Generate {
            shape,
            output,
            size,
            resolution,
            radius,
            height,
            sigma,
            slope_x,
            slope_y,
        } => {
            let surface = match shape {
                Shape::Flat => Surface::Flat { size, resolution },
                Shape::HalfCylinder => Surface::HalfCylinder {
                    radius,
                    length: size,
                    resolution,
                },
                Shape::Bump => Surface::Bump {
                    size,
                    height,
                    sigma,
                    resolution,
                },
                Shape::Tilted => Surface::Tilted {
                    size,
                    slope_x,
                    slope_y,
                    resolution,
                },
            };
            generate_surface(&surface, &output)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<JobConfig> {
    match path {
        Some(path) => JobConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(JobConfig::default()),
    }
}

fn run_job(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<Format>,
    params: &ParamArgs,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    params.apply(&mut config.params);
    if input.is_some() {
        config.input = input;
    }
    if output.is_some() {
        config.output = output;
    }
    if let Some(format) = format {
        config.format = Some(format.into());
    }

    let Some(input) = config.input.clone() else {
        anyhow::bail!("No input point cloud given (pass a path or set `input` in the config)");
    };
    let cloud = load_point_cloud(&input)
        .with_context(|| format!("failed to read point cloud {}", input.display()))?;
    let job = GrindJob::new(&config.params).context("invalid grind parameters")?;
    let report = job.run(&cloud)?;
    let format = config.output_format()?;

    match &config.output {
        Some(path) => {
            save_report(&report, path, format)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} passes ({} lines, {} points, path length {:.3}) to {}",
                report.plan.pass_count(),
                report.plan.line_count(),
                report.plan.point_count(),
                report.path_length,
                path.display()
            );
        }
        None => {
            let stdout = BufWriter::new(io::stdout().lock());
            match format {
                OutputFormat::Text => write_plan_text(&report.plan, stdout)?,
                OutputFormat::Json => write_report_json(&report, stdout)?,
            }
        }
    }
    Ok(())
}

fn show_derived(config_path: Option<&Path>, json: bool, params: &ParamArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    params.apply(&mut config.params);
    let derived = config
        .params
        .derive()
        .context("invalid grind parameters")?
        .derived;

    if json {
        println!("{}", serde_json::to_string_pretty(&derived)?);
    } else {
        println!("{derived}");
    }
    Ok(())
}

fn generate_surface(surface: &Surface, output: &Path) -> Result<()> {
    let cloud = surface.sample()?;
    save_point_cloud(&cloud, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(points = cloud.len(), path = %output.display(), "Generated surface");
    Ok(())
}
