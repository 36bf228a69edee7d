//! Error types and recovery strategies for vidshell
//!
//! The playback session never treats a failure as fatal. Every error carries one of two
//! severity tiers:
//! - **Silent**: the operation is rejected as a no-op and nothing is shown (duplicate add,
//!   out-of-range index, failed resume-position write)
//! - **Warning**: the user is told, playback state is left as it was or stopped
//!
//! Each error also names the recovery action the session controller applies.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions the session applies when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Drop the request, nothing to undo
    Ignore,
    /// Leave the transport and playlist exactly as they were
    KeepCurrentState,
    /// Stop the transport and forget the loaded item
    StopPlayback,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "Ignoring request"),
            Self::KeepCurrentState => write!(f, "Keeping current playback"),
            Self::StopPlayback => write!(f, "Stopping playback"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Rejected without telling the user
    Silent,
    /// Surfaced to the user as a warning
    Warning,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => write!(f, "Silent"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Main error type for vidshell
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Media Errors =====
    /// Path missing or unreadable at open time
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The transport rejected the loaded file
    #[error("Invalid media {path}: {reason}")]
    InvalidMedia { path: PathBuf, reason: String },

    /// File extension is not one of the supported video formats
    #[error("Unsupported format: {path}")]
    UnsupportedFormat { path: PathBuf },

    // ===== Playlist Errors =====
    /// Path is already present in the playlist
    #[error("Duplicate playlist item: {path}")]
    DuplicateItem { path: PathBuf },

    /// Move/remove/activate with an index outside the playlist
    #[error("Index {index} out of range (playlist length: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== Configuration Errors =====
    /// Invalid configuration value
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    // ===== Persistence Errors =====
    /// Resume position could not be stored or flushed
    #[error("Persistence failed: {message}")]
    PersistenceFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateItem { .. }
            | Self::IndexOutOfRange { .. }
            | Self::PersistenceFailed { .. } => ErrorSeverity::Silent,

            Self::FileNotFound { .. }
            | Self::InvalidMedia { .. }
            | Self::UnsupportedFormat { .. }
            | Self::InvalidConfiguration { .. }
            | Self::IoError { .. } => ErrorSeverity::Warning,
        }
    }

    /// Returns the recovery action the session applies for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::InvalidMedia { .. } => RecoveryAction::StopPlayback,

            Self::FileNotFound { .. } | Self::IoError { .. } => RecoveryAction::KeepCurrentState,

            _ => RecoveryAction::Ignore,
        }
    }

    /// Returns a user-friendly error message suitable for a warning dialog
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound { .. } => {
                "The file does not exist or cannot be accessed.".to_string()
            }
            Self::InvalidMedia { .. } => "This media file cannot be played.".to_string(),
            Self::UnsupportedFormat { path } => format!(
                "{} is not a supported video file.",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            Self::DuplicateItem { .. } => "The video is already in the playlist.".to_string(),
            Self::IndexOutOfRange { .. } => "No such playlist entry.".to_string(),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::PersistenceFailed { .. } => {
                "The playback position could not be saved.".to_string()
            }
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
        }
    }

    /// Returns true if the user should be told about this error
    pub fn is_user_visible(&self) -> bool {
        self.severity() == ErrorSeverity::Warning
    }

    /// Helper to create a persistence error from any error type
    pub fn persistence<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::PersistenceFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an invalid configuration error
    pub fn invalid_config(
        setting: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            setting: setting.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}
