//! Error handling for pcmloop
//!
//! Buffer validation errors plus the file errors raised by the WAV codec.

use thiserror::Error;

/// Result type alias for pcmloop operations
pub type Result<T> = std::result::Result<T, PcmError>;

/// Main error type for pcmloop operations
#[derive(Error, Debug)]
pub enum PcmError {
    // Buffer Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error(
        "Invalid loop range {loop_start}-{loop_end}: the file has {total_frames} frames. \
         Double-check the program that generated this data."
    )]
    InvalidLoopRange {
        loop_start: usize,
        loop_end: usize,
        total_frames: usize,
    },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PcmError {
    /// Shorthand for an [`PcmError::InvalidArgument`] with the given reason
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        PcmError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PcmError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            PcmError::InvalidLoopRange { .. } => "INVALID_LOOP_RANGE",
            PcmError::FileNotFound { .. } => "FILE_NOT_FOUND",
            PcmError::InvalidAudio { .. } => "INVALID_AUDIO",
            PcmError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            PcmError::Io(_) => "IO_ERROR",
            PcmError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PcmError::InvalidLoopRange { .. } => vec![
                "Check the loop points written by the tool that produced the file",
                "Use --loop to override the loop points",
                "Use --no-loop to ignore the loop entirely",
            ],
            PcmError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            PcmError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            PcmError::UnsupportedFormat { .. } => vec![
                "Convert to uncompressed 16-bit PCM WAV first",
                "Only a single forward loop (type 0) is supported in smpl chunks",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PcmError::invalid_argument("Sample rate must be a positive integer");
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");

        let err = PcmError::InvalidLoopRange {
            loop_start: 0,
            loop_end: 12,
            total_frames: 10,
        };
        assert_eq!(err.error_code(), "INVALID_LOOP_RANGE");
    }

    #[test]
    fn test_loop_range_message() {
        let err = PcmError::InvalidLoopRange {
            loop_start: 2,
            loop_end: 12,
            total_frames: 10,
        };
        let message = err.to_string();
        assert!(message.contains("2-12"));
        assert!(message.contains("10 frames"));
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = PcmError::UnsupportedFormat {
            format: "32-bit float".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(PcmError::invalid_argument("x").recovery_suggestions().is_empty());
    }
}
