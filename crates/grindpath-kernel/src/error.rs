//! Error types for toolpath generation.

use thiserror::Error;

/// Errors that can occur while deriving parameters or generating toolpaths.
///
/// Empty clouds, bands and passes are not errors; every stage treats them as
/// valid degenerate input and returns empty output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrindError {
    /// A raw or derived parameter is outside its valid range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// The chord geometry implied by depth, angle and diameter cannot be
    /// realised by the stone.
    #[error(
        "chord height {chord_height} is not achievable with stone radius {stone_radius} \
         (must be below the stone diameter)"
    )]
    GeometryOutOfRange {
        /// Chord height derived from grind depth and angle.
        chord_height: f64,
        /// Stone radius.
        stone_radius: f64,
    },

    /// A normal field was paired with a cloud of a different size.
    #[error("normal field has {normals} normals but the cloud has {points} points")]
    NormalCountMismatch {
        /// Points in the cloud.
        points: usize,
        /// Normals in the field.
        normals: usize,
    },

    /// Reaching the anomaly height would take more passes than allowed.
    #[error("{passes} passes required, limit is {limit}")]
    TooManyPasses {
        /// Passes the job would need.
        passes: usize,
        /// Configured pass budget.
        limit: usize,
    },

    /// The stepover is so small relative to the scan that one axis would
    /// need more bands than allowed.
    #[error("{bands} bands required along one axis, limit is {limit}")]
    TooManyBands {
        /// Bands the axis would need.
        bands: usize,
        /// Band limit per axis.
        limit: usize,
    },
}

impl GrindError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        GrindError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Result type for toolpath operations.
pub type Result<T> = std::result::Result<T, GrindError>;
