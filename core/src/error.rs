//! Error types for report editing and export

use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors surfaced to the user as a blocking notification.
///
/// None of them are fatal: the document is left unchanged and the action can
/// be retried immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The selected file is not an image
    #[error("Please select an image file (got {0})")]
    InvalidFileType(String),

    /// The selected image exceeds the upload ceiling
    #[error("Image is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// The file could not be read or decoded
    #[error("Failed to read image: {0}")]
    FileReadError(String),

    /// The host could not deliver the exported file
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Rendering the report to an image failed
    #[error("Export failed: {0}")]
    ExportFailure(String),

    /// A test date that is not `YYYY-MM-DD`
    #[error("Invalid test date: {0}")]
    InvalidDate(String),

    /// Settings could not be read or written
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<image::ImageError> for ReportError {
    fn from(err: image::ImageError) -> Self {
        ReportError::ExportFailure(err.to_string())
    }
}
