//! Error types for grindpath I/O.

use grindpath_kernel::GrindError;
use thiserror::Error;

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading scans, writing toolpaths or loading
/// job configuration.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A point cloud row could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number in the file.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The file has no content at all, not even a header row.
    #[error("point cloud file is empty")]
    EmptyFile,

    /// Invalid TOML configuration.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML encoding failure.
    #[error("cannot encode TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// JSON serialization or parse failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not one we read or write.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Toolpath generation failed.
    #[error(transparent)]
    Kernel(#[from] GrindError),
}
