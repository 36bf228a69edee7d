//! Content identity of a video file
//!
//! The id is the hex MD5 digest of `"{absolute path}_{size}_{mtime}"`, with the modification
//! time rendered as ISO 8601 in UTC to whole seconds. Same path, size and mtime give the same
//! id on every call; replacing the file's contents changes it.

use crate::fs::{FileStat, FileSystem};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use vidshell_core::{AppError, Result};

/// Key under which a resume position is stored
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Derives the id of the file at `path` as it is right now
    pub fn compute(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            return Err(AppError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let stat = fs.stat(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => AppError::IoError {
                message: format!("Failed to stat {}", path.display()),
                source: e,
            },
        })?;

        let absolute = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
        Ok(Self::from_stat(&absolute, &stat))
    }

    /// Derives the id from already known file facts
    pub fn from_stat(absolute_path: &Path, stat: &FileStat) -> Self {
        let modified: DateTime<Utc> = stat.modified.into();
        let source = format!(
            "{}_{}_{}",
            absolute_path.display(),
            stat.size_bytes,
            modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        Self(format!("{:x}", md5::compute(source.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
