//! Core domain types for the vidshell playback session

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    format_clock, is_supported_video, EditActions, ItemId, MediaItem, Playlist,
    PlaylistEntry, RemovedEntry, Validator, SUPPORTED_EXTENSIONS,
};
