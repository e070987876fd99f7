//! Error types for drawing-to-solid conversion.

use std::path::PathBuf;
use thiserror::Error;

use crate::kernel::KernelError;
use crate::model::ElementId;

/// Error codes for conversion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found or unreadable (-1)
    FileNotFound = -1,
    /// Malformed JSON input (-2)
    InvalidJson = -2,
    /// Invalid configuration or layer table (-3)
    InvalidConfig = -3,
    /// Element handle not present in the drawing (-4)
    ElementNotFound = -4,
    /// Curve could not be turned into a region (E100)
    InvalidRegion = 100,
    /// Kernel operation failed (E101)
    KernelFailure = 101,
    /// Nothing to compose (E200)
    NoSolids = 200,
    /// Drawing refused committed geometry (E300)
    PersistFailed = 300,
    /// Collaborator panicked inside a part (E301)
    Panicked = 301,
}

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Layer alias '{alias}' is listed more than once")]
    DuplicateLayerAlias { alias: String },

    #[error("Layer rule {index} has no aliases")]
    EmptyLayerRule { index: usize },

    #[error("Invalid depth {depth} for layer '{alias}': must be positive")]
    InvalidLayerDepth { alias: String, depth: f64 },

    #[error("Element {id} not found in drawing")]
    ElementNotFound { id: ElementId },

    #[error("Failed to create region from {element}: {source}")]
    InvalidRegion {
        element: ElementId,
        #[source]
        source: KernelError,
    },

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("No solids to compose")]
    NoSolids,

    #[error("None of the {count} solids has a positive volume")]
    NoPositiveVolume { count: usize },

    #[error("Failed to persist geometry: {message}")]
    PersistFailed { message: String },

    #[error("Part processing panicked: {message}")]
    Panicked { message: String },
}

impl ConvertError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ConvertError::Io(_) => ErrorCode::FileNotFound,
            ConvertError::Json(_) => ErrorCode::InvalidJson,
            ConvertError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            ConvertError::DuplicateLayerAlias { .. } => ErrorCode::InvalidConfig,
            ConvertError::EmptyLayerRule { .. } => ErrorCode::InvalidConfig,
            ConvertError::InvalidLayerDepth { .. } => ErrorCode::InvalidConfig,
            ConvertError::ElementNotFound { .. } => ErrorCode::ElementNotFound,
            ConvertError::InvalidRegion { .. } => ErrorCode::InvalidRegion,
            ConvertError::Kernel(_) => ErrorCode::KernelFailure,
            ConvertError::NoSolids => ErrorCode::NoSolids,
            ConvertError::NoPositiveVolume { .. } => ErrorCode::NoSolids,
            ConvertError::PersistFailed { .. } => ErrorCode::PersistFailed,
            ConvertError::Panicked { .. } => ErrorCode::Panicked,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
