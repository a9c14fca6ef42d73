//! Subwright Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Time Codec Errors
    // =========================================================================
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    // =========================================================================
    // AI Operation Errors
    // =========================================================================
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("No audio generated: every chunk came back empty")]
    NoAudioGenerated,

    #[error("Dubbing failed: {0}")]
    DubbingFailed(String),

    // =========================================================================
    // Project Errors
    // =========================================================================
    #[error("Operation already in progress: {0}")]
    OperationInProgress(String),

    #[error("Cue not found: {0}")]
    CueNotFound(String),

    #[error("Invalid split point: {0} seconds")]
    InvalidSplitPoint(f64),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Login rejected")]
    LoginRejected,

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
