//! Error types for the session crate

use std::path::PathBuf;
use thiserror::Error;
use vidshell_core::AppError;

/// Failures of a resume store backing
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read resume store at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write resume store at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse resume store at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize resume store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Resume store is read-only")]
    ReadOnly,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::persistence("resume store", err)
    }
}

/// Failures talking to a running session task
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session task has stopped")]
    Stopped,

    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidshell_core::ErrorSeverity;

    #[test]
    fn test_store_error_becomes_silent_persistence_error() {
        let err: AppError = StoreError::ReadOnly.into();
        assert!(matches!(err, AppError::PersistenceFailed { .. }));
        assert_eq!(err.severity(), ErrorSeverity::Silent);
    }

    #[test]
    fn test_write_error_names_path() {
        let err = StoreError::Write {
            path: PathBuf::from("/cfg/resume.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/cfg/resume.json"));
    }
}
