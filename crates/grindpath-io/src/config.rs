//! Job configuration files.
//!
//! ```toml
//! input = "scan.csv"
//! output = "lines.txt"
//!
//! [params]
//! stone_diameter = 1.0
//! grind_depth = 0.1
//! grind_angle_degrees = 30.0
//! anomaly_height = 0.2
//! surface_resolution = { type = "Custom", percent = 40.0 }
//! ```
//!
//! Every parameter is optional and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use grindpath_kernel::GrindInputs;
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};
use crate::toolpath::OutputFormat;

/// A grinding job as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Point cloud to read.
    pub input: Option<PathBuf>,
    /// Toolpath file to write.
    pub output: Option<PathBuf>,
    /// Output format; inferred from `output` when absent.
    pub format: Option<OutputFormat>,
    /// Tool and process parameters.
    pub params: GrindInputs,
}

impl JobConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> IoResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> IoResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a `.toml` or `.json` file.
    ///
    /// Relative `input`/`output` paths are resolved against the file's
    /// directory.
    pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let mut config = match ext.as_deref() {
            Some("toml") => Self::from_toml(&text)?,
            Some("json") => Self::from_json(&text)?,
            other => {
                return Err(IoError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        if let Some(base) = path.parent() {
            config.input = config.input.map(|p| base.join(p));
            config.output = config.output.map(|p| base.join(p));
        }
        tracing::debug!(path = %path.display(), "Loaded job config");
        Ok(config)
    }

    /// Output format: the explicit one, or the one implied by `output`.
    pub fn output_format(&self) -> IoResult<OutputFormat> {
        match (self.format, &self.output) {
            (Some(format), _) => Ok(format),
            (None, Some(path)) => OutputFormat::from_path(path),
            (None, None) => Ok(OutputFormat::default()),
        }
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> IoResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grindpath_kernel::{InstepOption, SurfaceResolution, ToleranceResolution};

    #[test]
    fn test_parse_toml() {
        let config = JobConfig::from_toml(
            r#"
            input = "scan.csv"
            output = "plan.json"

            [params]
            stone_diameter = 2.0
            cross_cut_enabled = true
            surface_resolution = { type = "Custom", percent = 40.0 }
            tolerance_resolution = { type = "High" }
            instep_option = { type = "Custom", percent = 50.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.input, Some(PathBuf::from("scan.csv")));
        assert_eq!(config.params.stone_diameter, 2.0);
        assert!(config.params.cross_cut_enabled);
        assert_eq!(
            config.params.surface_resolution,
            SurfaceResolution::Custom { percent: 40.0 }
        );
        assert_eq!(config.params.tolerance_resolution, ToleranceResolution::High);
        assert_eq!(
            config.params.instep_option,
            InstepOption::Custom { percent: 50.0 }
        );
        // untouched fields keep defaults
        assert_eq!(config.params.grind_depth, GrindInputs::default().grind_depth);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = JobConfig::from_toml("").unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.output_format().unwrap(), OutputFormat::Text);
    }

    #[test]
    fn test_parse_json() {
        let config =
            JobConfig::from_json(r#"{"format":"json","params":{"anomaly_height":0.5}}"#).unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.params.anomaly_height, 0.5);
    }

    #[test]
    fn test_unknown_selector_variant() {
        let err = JobConfig::from_toml("[params]\nsurface_resolution = { type = \"Ultra\" }\n");
        assert!(matches!(err, Err(IoError::Toml(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = JobConfig {
            input: Some(PathBuf::from("a.csv")),
            params: GrindInputs {
                cross_cut_enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(JobConfig::from_toml(&text).unwrap(), config);
    }
}
