//! File system seam used by the session
//!
//! The controller only needs three questions answered: does a file exist, what are its size
//! and modification time, and which video files does a folder hold. [`LocalFileSystem`]
//! answers them from disk, [`MemoryFileSystem`] from a shared in-memory table.

use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Size and modification time of a regular file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size_bytes: u64,
    pub modified: SystemTime,
}

/// File system operations the session depends on
pub trait FileSystem: Send {
    /// True if `path` is a readable regular file
    fn exists(&self, path: &Path) -> bool;

    /// Size and modification time of `path`
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Readable regular files directly inside `dir` whose extension is one of `extensions`
    /// (case-insensitive), in file name order
    fn list_directory(&self, dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>>;
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(FileStat {
            size_bytes: metadata.len(),
            modified: metadata.modified()?,
        })
    }

    fn list_directory(&self, dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_file() && has_extension(path, extensions) && self.exists(path)
            {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }
}

/// In-memory file table, cloned handles share the same files
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, FileStat>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, FileStat>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds or replaces a file
    pub fn insert(&self, path: impl Into<PathBuf>, size_bytes: u64, modified: SystemTime) {
        self.files().insert(
            path.into(),
            FileStat {
                size_bytes,
                modified,
            },
        );
    }

    /// Removes a file, returning whether it existed
    pub fn remove(&self, path: &Path) -> bool {
        self.files().remove(path).is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.files().get(path).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn list_directory(&self, dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
        let files = self.files();
        let listed: Vec<PathBuf> = files
            .keys()
            .filter(|p| p.parent() == Some(dir) && has_extension(p, extensions))
            .cloned()
            .collect();

        if listed.is_empty() && !files.keys().any(|p| p.starts_with(dir)) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            ));
        }
        Ok(listed)
    }
}
