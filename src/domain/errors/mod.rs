//! Error types for edit and export operations

use thiserror::Error;

/// Main error type for Cutline operations
#[derive(Error, Debug)]
pub enum EditError {
    /// Time range validation error (start must precede end)
    #[error("Invalid range: start ({start}) must be less than end ({end})")]
    InvalidRange { start: String, end: String },

    /// Export would produce zero output
    #[error("Empty export: total output duration is zero")]
    EmptyExport,

    /// Input media has no readable path
    #[error("Unresolved source: {path}")]
    UnresolvedSource { path: String },

    /// Malformed time or number text. Recovered locally at input
    /// boundaries; only surfaces when a caller parses directly.
    #[error("Invalid time format: {text}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    Parse { text: String },

    /// Selected track index outside the available track count
    #[error("Track index {index} out of range ({available} available)")]
    UnsupportedTrackIndex { index: usize, available: usize },

    /// Media probe failure
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// Transcoding engine failure (non-zero completion status)
    #[error("Export execution failed: {message}")]
    Execution { message: String },

    /// Preference store failure
    #[error("Preference store error: {message}")]
    Prefs { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Cutline operations
pub type EditResult<T> = std::result::Result<T, EditError>;
