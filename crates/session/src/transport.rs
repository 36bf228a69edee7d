//! Media transport seam
//!
//! The session drives an opaque media engine through [`MediaTransport`] commands and learns
//! what it did from [`TransportEvent`]s delivered back through the session's event loop.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Load status of the transport's current media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    NoMedia,
    Loading,
    Loaded,
    Invalid,
    EndOfMedia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Events the transport reports back
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    PositionChanged(i64),
    DurationChanged(i64),
    StatusChanged(MediaStatus),
    PlaybackStateChanged(PlaybackStatus),
}

/// Commands the session sends to the media engine
///
/// Commands are fire-and-forget; their outcome arrives later as a [`TransportEvent`]. A new
/// `load` supersedes any load still in progress.
pub trait MediaTransport: Send {
    fn load(&mut self, path: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_position(&mut self, position_ms: i64);
    fn set_playback_rate(&mut self, rate: f64);
    /// Linear gain in `0.0..=1.0`
    fn set_volume(&mut self, gain: f32);
}

/// A recorded transport command
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Load(PathBuf),
    Play,
    Pause,
    Stop,
    SetPosition(i64),
    SetPlaybackRate(f64),
    SetVolume(f32),
}

/// Transport that records every command it receives
///
/// Clones share the same log, so a test can keep one handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    commands: Arc<Mutex<Vec<TransportCommand>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<TransportCommand>> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, command: TransportCommand) {
        self.log().push(command);
    }

    /// Every command received so far
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.log().clone()
    }

    /// Drains the log
    pub fn take(&self) -> Vec<TransportCommand> {
        std::mem::take(&mut *self.log())
    }

    /// Target of the most recent `set_position`
    pub fn last_position(&self) -> Option<i64> {
        self.log().iter().rev().find_map(|c| match c {
            TransportCommand::SetPosition(ms) => Some(*ms),
            _ => None,
        })
    }
}

impl MediaTransport for RecordingTransport {
    fn load(&mut self, path: &Path) {
        self.record(TransportCommand::Load(path.to_path_buf()));
    }

    fn play(&mut self) {
        self.record(TransportCommand::Play);
    }

    fn pause(&mut self) {
        self.record(TransportCommand::Pause);
    }

    fn stop(&mut self) {
        self.record(TransportCommand::Stop);
    }

    fn set_position(&mut self, position_ms: i64) {
        self.record(TransportCommand::SetPosition(position_ms));
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.record(TransportCommand::SetPlaybackRate(rate));
    }

    fn set_volume(&mut self, gain: f32) {
        self.record(TransportCommand::SetVolume(gain));
    }
}

/// Maps a perceptual (logarithmic) slider value in `0.0..=1.0` to a linear gain
pub fn perceptual_to_linear(value: f64) -> f64 {
    let value = value.clamp(0.0, 1.0);
    if value >= 0.99 {
        1.0
    } else {
        -(1.0 - value).ln() / 100f64.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_shared_between_clones() {
        let recorder = RecordingTransport::new();
        let mut transport = recorder.clone();
        transport.load(Path::new("/v/a.mp4"));
        transport.play();
        transport.set_position(1_500);

        assert_eq!(
            recorder.commands(),
            vec![
                TransportCommand::Load(PathBuf::from("/v/a.mp4")),
                TransportCommand::Play,
                TransportCommand::SetPosition(1_500),
            ]
        );
        assert_eq!(recorder.last_position(), Some(1_500));
        assert_eq!(recorder.take().len(), 3);
        assert!(recorder.commands().is_empty());
        assert_eq!(recorder.last_position(), None);
    }

    #[test]
    fn test_perceptual_to_linear_endpoints() {
        assert_eq!(perceptual_to_linear(0.0), 0.0);
        assert_eq!(perceptual_to_linear(1.0), 1.0);
        assert_eq!(perceptual_to_linear(0.995), 1.0);
        assert_eq!(perceptual_to_linear(-1.0), 0.0);
    }

    #[test]
    fn test_perceptual_to_linear_midpoint() {
        // -ln(0.5) / ln(100)
        let gain = perceptual_to_linear(0.5);
        assert!((gain - 0.150_514_997).abs() < 1e-6);
    }

    #[test]
    fn test_perceptual_to_linear_monotonic() {
        let mut previous = -1.0;
        for step in 0..=100 {
            let gain = perceptual_to_linear(step as f64 / 100.0);
            assert!(gain >= previous);
            previous = gain;
        }
    }
}
