//! Resume positions
//!
//! A [`ResumeStore`] maps a [`ContentId`] to the last saved position in milliseconds, last
//! write wins. Whether a position is worth saving or offering is decided by [`ResumePolicy`],
//! not by the store.

use crate::content_id::ContentId;
use crate::error::{StoreError, StoreResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use vidshell_config::PlayerConfig;

/// Key/value persistence of resume positions
pub trait ResumeStore: Send {
    /// Stored position for `id`, if any
    fn get(&self, id: &ContentId) -> Option<i64>;

    /// Stores `position_ms` for `id`, replacing any previous value
    fn put(&mut self, id: &ContentId, position_ms: i64) -> StoreResult<()>;

    /// Forgets `id`, returning whether an entry existed
    fn remove(&mut self, id: &ContentId) -> StoreResult<bool>;

    /// Makes every accepted write durable
    fn flush(&mut self) -> StoreResult<()>;
}

/// When positions are saved and offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    /// Positions this close to either end of a title are not saved
    pub margin_ms: i64,
}

impl ResumePolicy {
    pub const DEFAULT_MARGIN_MS: i64 = 30_000;

    pub fn new(margin_ms: i64) -> Self {
        Self {
            margin_ms: margin_ms.max(0),
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.resume_margin_secs.saturating_mul(1000) as i64)
    }

    /// True if `position_ms` lies strictly inside `(margin, duration - margin)`
    pub fn should_save(&self, position_ms: i64, duration_ms: i64) -> bool {
        duration_ms > 0 && position_ms > self.margin_ms && position_ms < duration_ms - self.margin_ms
    }

    /// The stored position if it deserves a resume prompt
    pub fn should_offer(&self, stored: Option<i64>) -> Option<i64> {
        stored.filter(|&p| p > 0)
    }
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARGIN_MS)
    }
}

/// Volatile store, clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryResumeStore {
    entries: Arc<Mutex<HashMap<ContentId, i64>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<ContentId, i64>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every following write fail with [`StoreError::ReadOnly`]
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl ResumeStore for MemoryResumeStore {
    fn get(&self, id: &ContentId) -> Option<i64> {
        self.entries().get(id).copied()
    }

    fn put(&mut self, id: &ContentId, position_ms: i64) -> StoreResult<()> {
        self.check_writable()?;
        self.entries().insert(id.clone(), position_ms);
        Ok(())
    }

    fn remove(&mut self, id: &ContentId) -> StoreResult<bool> {
        self.check_writable()?;
        Ok(self.entries().remove(id).is_some())
    }

    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

const RESUME_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ResumeFile {
    version: u32,
    positions: BTreeMap<ContentId, i64>,
}

/// Store backed by a JSON file, written through on every change
///
/// Writes go to a temp file in the same directory which is then renamed over the target, so
/// a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct JsonResumeStore {
    path: PathBuf,
    positions: BTreeMap<ContentId, i64>,
    dirty: bool,
}

impl JsonResumeStore {
    /// Opens the store at `path`; a missing or empty file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let positions = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::Read {
                path: path.clone(),
                source: e,
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                let file: ResumeFile =
                    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
                        path: path.clone(),
                        source: e,
                    })?;
                file.positions
            }
        } else {
            BTreeMap::new()
        };

        info!(
            "Opened resume store {} ({} entries)",
            path.display(),
            positions.len()
        );
        Ok(Self {
            path,
            positions,
            dirty: false,
        })
    }

    /// Opens the store, starting empty if the file cannot be read or parsed
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("{}, starting with an empty resume store", e);
                Self {
                    path,
                    positions: BTreeMap::new(),
                    dirty: false,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All entries in id order
    pub fn entries(&self) -> impl Iterator<Item = (&ContentId, i64)> {
        self.positions.iter().map(|(k, v)| (k, *v))
    }

    fn write_file(&self) -> StoreResult<()> {
        let file = ResumeFile {
            version: RESUME_FILE_VERSION,
            positions: self.positions.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let write_err = |e: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source: e,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!("Wrote {} resume entries to {}", self.positions.len(), self.path.display());
        Ok(())
    }
}

impl ResumeStore for JsonResumeStore {
    fn get(&self, id: &ContentId) -> Option<i64> {
        self.positions.get(id).copied()
    }

    fn put(&mut self, id: &ContentId, position_ms: i64) -> StoreResult<()> {
        if self.positions.get(id) == Some(&position_ms) && !self.dirty {
            return Ok(());
        }
        self.positions.insert(id.clone(), position_ms);
        self.dirty = true;
        self.flush()
    }

    fn remove(&mut self, id: &ContentId) -> StoreResult<bool> {
        let existed = self.positions.remove(id).is_some();
        if existed {
            self.dirty = true;
            self.flush()?;
        }
        Ok(existed)
    }

    fn flush(&mut self) -> StoreResult<()> {
        if self.dirty {
            self.write_file()?;
            self.dirty = false;
        }
        Ok(())
    }
}
