//! Error handling for cliptrim
//!
//! Every failure is caught at the preview/export boundary; the previously
//! committed clip stays valid and usable after any error.

use thiserror::Error;

/// Result type alias for cliptrim operations
pub type Result<T> = std::result::Result<T, ClipError>;

/// Main error type for cliptrim operations
#[derive(Error, Debug)]
pub enum ClipError {
    // Load Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to decode audio: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Clip contains no samples")]
    EmptyClip,

    // Export Errors
    #[error("MP3 encoder capability is not available")]
    EncoderUnavailable,

    #[error("Encoding aborted: {reason}")]
    EncodeAbort { reason: String },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Unsupported bitrate: {kbps} kbps (expected 96, 128, 192, 256 or 320)")]
    InvalidBitrate { kbps: u32 },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClipError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ClipError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ClipError::Decode { .. } => "DECODE_ERROR",
            ClipError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ClipError::EmptyClip => "EMPTY_CLIP",
            ClipError::EncoderUnavailable => "ENCODER_UNAVAILABLE",
            ClipError::EncodeAbort { .. } => "ENCODE_ABORT",
            ClipError::ExportInProgress => "EXPORT_IN_PROGRESS",
            ClipError::InvalidBitrate { .. } => "INVALID_BITRATE",
            ClipError::Io(_) => "IO_ERROR",
            ClipError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session in a usable state; the caller
    /// can retry the operation or continue with the committed clip.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClipError::FileNotFound { .. } => true,
            ClipError::Decode { .. } => true,
            ClipError::UnsupportedFormat { .. } => true,
            ClipError::EncoderUnavailable => true,
            ClipError::EncodeAbort { .. } => true,
            ClipError::ExportInProgress => true,
            ClipError::InvalidBitrate { .. } => true,
            _ => false,
        }
    }
}
