//! Playback session for vidshell
//!
//! - [`SessionController`]: playlist, resume positions and seek input behind one `handle` entry
//! - [`SessionRuntime`]: a tokio task that owns a controller and runs its timers
//! - seams for the outside world: [`FileSystem`], [`ResumeStore`], [`MediaTransport`]

pub mod content_id;
pub mod controller;
pub mod error;
pub mod fs;
pub mod resume;
pub mod runtime;
pub mod seek;
pub mod transport;

pub use content_id::ContentId;
pub use controller::{
    OfferResolution, ResumeOffer, ResumePrompt, SessionController, SessionEvent,
    SessionNotification, SessionOutput, SessionPreferences, SessionSettings, SessionSnapshot,
    SessionState, TimerKind, TimerRequest,
};
pub use error::{RuntimeError, StoreError, StoreResult};
pub use fs::{FileStat, FileSystem, LocalFileSystem, MemoryFileSystem};
pub use resume::{JsonResumeStore, MemoryResumeStore, ResumePolicy, ResumeStore};
pub use runtime::{SessionHandle, SessionRuntime};
pub use seek::{SeekDirection, SeekEffect, SeekInput, SeekSpeeds, SeekState, SeekTimings};
pub use transport::{
    perceptual_to_linear, MediaStatus, MediaTransport, PlaybackStatus, RecordingTransport,
    TransportCommand, TransportEvent,
};
