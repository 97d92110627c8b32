use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Resource '{name}' not found (missing {path})")]
    NotFound { name: String, path: PathBuf },

    #[error("No model loader registered for extension '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Image '{name}' ({width}x{height}) exceeds maximum atlas size ({max_size}x{max_size})")]
    SpriteTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_size: u32,
    },

    #[error("Atlas '{key}' does not fit in {max_size}x{max_size}")]
    AtlasOverflow { key: String, max_size: u32 },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("GPU upload failed: {0}")]
    Upload(String),
}

impl StitchError {
    /// Build a `Format` error for a line of a text resource file.
    pub fn format(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        StitchError::Format {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// True for failures caused by unreadable or undecodable files.
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            StitchError::Io { .. } | StitchError::ImageLoad { .. } | StitchError::OutputWrite { .. }
        )
    }
}

pub type Result<T, E = StitchError> = std::result::Result<T, E>;
