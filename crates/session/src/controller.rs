//! Playback session controller
//!
//! [`SessionController`] owns the playlist, the resume store, the seek input machine and the
//! media transport. Everything that can change session state arrives as a [`SessionEvent`]
//! through [`SessionController::handle`], one at a time; the controller answers with the
//! notifications the UI should see and the timers the host should run.
//!
//! Protocols it implements:
//! - save the outgoing item's position before switching or closing
//! - offer (never auto-apply) a saved position once a new item reports loaded
//! - advance to the next item on end of media, stopping at the end of the list
//! - stop the transport when the loaded item is removed from the playlist

use crate::content_id::ContentId;
use crate::fs::FileSystem;
use crate::resume::{ResumePolicy, ResumeStore};
use crate::seek::{SeekDirection, SeekEffect, SeekInput, SeekSpeeds, SeekState, SeekTimings};
use crate::transport::{
    perceptual_to_linear, MediaStatus, MediaTransport, PlaybackStatus, TransportEvent,
};
use log::{debug, info, trace, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vidshell_config::{Config, PLAYBACK_RATES};
use vidshell_core::{
    format_clock, is_supported_video, AppError, EditActions, ErrorSeverity, ItemId, MediaItem,
    Playlist, RecoveryAction, Result, SUPPORTED_EXTENSIONS,
};

/// Playback state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// Timers the controller asks its host to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Distinguishes a tap from a hold
    SeekArm,
    /// Drives continuous seeking while a key is held
    SeekRepeat,
    /// Auto-declines an unanswered resume offer
    ResumeOffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// Start (or restart) the timer of this kind
    Start {
        kind: TimerKind,
        after: Duration,
        repeating: bool,
    },
    Cancel(TimerKind),
}

/// How a resume offer was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferResolution {
    Jump,
    Decline,
    TimedOut,
}

/// Input to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Replace the playlist with the supported videos of a folder
    LoadFolder(PathBuf),
    /// Append files and open the first one
    AddFiles(Vec<PathBuf>),
    /// Make the entry at this index current and open it
    ActivateItem(usize),
    RemoveItem(usize),
    MoveUp(usize),
    MoveDown(usize),
    PlayNext,
    Play,
    Pause,
    Stop,
    TogglePlayPause,
    /// Absolute position in milliseconds
    SetPosition(i64),
    /// Slider position, 0-100
    SeekToPercent(u8),
    SetPlaybackRate(f64),
    /// Perceptual volume, 0-100
    SetVolume(u8),
    ToggleMute,
    SetSeekSpeeds {
        backward: f64,
        forward: f64,
    },
    KeyDown {
        direction: SeekDirection,
        auto_repeat: bool,
    },
    KeyUp {
        direction: SeekDirection,
        auto_repeat: bool,
    },
    Transport(TransportEvent),
    TimerFired(TimerKind),
    ResolveResumeOffer {
        offer_id: u64,
        resolution: OfferResolution,
    },
    Close,
}

/// What the UI shows while an offer is pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePrompt {
    pub offer_id: u64,
    pub video_display_name: String,
    pub formatted_last_position: String,
    pub auto_decline_after: Duration,
}

/// A saved position waiting for the user's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeOffer {
    /// Load generation the offer belongs to
    pub offer_id: u64,
    pub content_id: ContentId,
    pub position_ms: i64,
}

/// Notifications for the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotification {
    PlaylistChanged,
    CurrentChanged(Option<usize>),
    StateChanged(SessionState),
    ResumeOffered(ResumePrompt),
    ResumeOfferClosed { offer_id: u64 },
    PlaylistComplete,
    Warning { message: String },
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutput {
    Notify(SessionNotification),
    Timer(TimerRequest),
}

/// Controller settings derived from the user's configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub speeds: SeekSpeeds,
    pub timings: SeekTimings,
    pub policy: ResumePolicy,
    pub offer_timeout: Duration,
    pub volume: u8,
    pub playback_rate: f64,
    pub last_folder: Option<PathBuf>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        let rate = config.player.playback_rate;
        let playback_rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };

        Self {
            speeds: SeekSpeeds::from_config(&config.player),
            timings: SeekTimings::from_config(&config.player),
            policy: ResumePolicy::from_config(&config.player),
            offer_timeout: Duration::from_secs(config.player.resume_offer_secs.max(1)),
            volume: config.player.volume.min(100),
            playback_rate,
            last_folder: config.app.last_folder.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Preferences the host persists when the session ends
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPreferences {
    pub last_folder: Option<PathBuf>,
    pub volume: u8,
    pub muted: bool,
    pub playback_rate: f64,
    pub seek_speeds: SeekSpeeds,
}

impl SessionPreferences {
    /// Writes the preferences into `config`, keeping values the config file cannot hold out
    pub fn apply_to(&self, config: &mut Config) {
        config.app.last_folder = self.last_folder.clone();
        config.player.volume = self.volume;
        if PLAYBACK_RATES.contains(&self.playback_rate) {
            config.player.playback_rate = self.playback_rate;
        }
        config.player.left_key_speed = self.seek_speeds.backward().clamp(0.5, 3.0);
        config.player.right_key_speed = self.seek_speeds.forward().clamp(0.5, 3.0);
    }
}

/// Everything a UI needs to redraw, captured at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub items: Vec<MediaItem>,
    pub current_index: Option<usize>,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub time_label: String,
    pub slider_value: u8,
    pub now_playing_title: Option<String>,
    pub resume_prompt: Option<ResumePrompt>,
    pub seek_state: SeekState,
    pub preferences: SessionPreferences,
}

/// The playback session
pub struct SessionController {
    playlist: Playlist,
    fs: Box<dyn FileSystem>,
    store: Box<dyn ResumeStore>,
    transport: Box<dyn MediaTransport>,
    seek: SeekInput,
    policy: ResumePolicy,
    offer_timeout: Duration,

    state: SessionState,
    loaded: Option<PlaylistSlot>,
    content_id: Option<ContentId>,
    awaiting_load: bool,
    duration_ms: i64,
    position_ms: i64,
    pending_offer: Option<ResumeOffer>,
    load_generation: u64,

    volume: u8,
    muted: bool,
    playback_rate: f64,
    last_folder: Option<PathBuf>,

    closed: bool,
    outputs: Vec<SessionOutput>,
}

/// The item held by the transport and the playlist entry it came from
#[derive(Debug, Clone)]
struct PlaylistSlot {
    entry_id: ItemId,
    item: MediaItem,
}

impl SessionController {
    /// Creates a stopped session with an empty playlist
    ///
    /// The configured volume and playback rate are pushed to the transport immediately.
    pub fn new(
        settings: SessionSettings,
        fs: Box<dyn FileSystem>,
        store: Box<dyn ResumeStore>,
        transport: Box<dyn MediaTransport>,
    ) -> Self {
        let mut controller = Self {
            playlist: Playlist::new(),
            fs,
            store,
            transport,
            seek: SeekInput::new(settings.speeds, settings.timings),
            policy: settings.policy,
            offer_timeout: settings.offer_timeout,
            state: SessionState::Stopped,
            loaded: None,
            content_id: None,
            awaiting_load: false,
            duration_ms: 0,
            position_ms: 0,
            pending_offer: None,
            load_generation: 0,
            volume: settings.volume.min(100),
            muted: false,
            playback_rate: settings.playback_rate,
            last_folder: settings.last_folder,
            closed: false,
            outputs: Vec::new(),
        };
        controller.apply_volume();
        controller.transport.set_playback_rate(controller.playback_rate);
        controller
    }

    /// Dispatches one event
    ///
    /// Failures never escape: silent ones are logged, the rest become
    /// [`SessionNotification::Warning`] outputs. Events after `Close` are ignored.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionOutput> {
        if self.closed {
            debug!("Session closed, ignoring {:?}", event);
            return Vec::new();
        }

        match &event {
            SessionEvent::Transport(TransportEvent::PositionChanged(_)) => {
                trace!("Event {:?}", event)
            }
            _ => debug!("Event {:?}", event),
        }

        if let Err(err) = self.dispatch(event) {
            self.report(err);
        }
        std::mem::take(&mut self.outputs)
    }

    /// Loads the remembered folder, if it is still there
    pub fn restore_last_folder(&mut self) -> Vec<SessionOutput> {
        if let Some(folder) = self.last_folder.clone() {
            if let Err(err) = self.load_folder(&folder) {
                debug!("Not restoring {}: {}", folder.display(), err);
                self.last_folder = None;
            }
        }
        std::mem::take(&mut self.outputs)
    }

    fn dispatch(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::LoadFolder(folder) => self.load_folder(&folder),
            SessionEvent::AddFiles(paths) => self.add_files(paths),
            SessionEvent::ActivateItem(index) => self.open_index(index),
            SessionEvent::RemoveItem(index) => self.remove_item(index),
            SessionEvent::MoveUp(index) => self.move_item(index, true),
            SessionEvent::MoveDown(index) => self.move_item(index, false),
            SessionEvent::PlayNext => self.play_next(),
            SessionEvent::Play => {
                self.play();
                Ok(())
            }
            SessionEvent::Pause => {
                self.pause();
                Ok(())
            }
            SessionEvent::Stop => {
                self.stop();
                Ok(())
            }
            SessionEvent::TogglePlayPause => {
                if self.state == SessionState::Playing {
                    self.pause();
                } else {
                    self.play();
                }
                Ok(())
            }
            SessionEvent::SetPosition(ms) => {
                self.seek_absolute(ms);
                Ok(())
            }
            SessionEvent::SeekToPercent(percent) => {
                if self.duration_ms > 0 {
                    let target =
                        self.duration_ms.saturating_mul(i64::from(percent.min(100))) / 100;
                    self.seek_absolute(target);
                }
                Ok(())
            }
            SessionEvent::SetPlaybackRate(rate) => self.set_playback_rate(rate),
            SessionEvent::SetVolume(volume) => {
                self.volume = volume.min(100);
                self.muted = false;
                self.apply_volume();
                Ok(())
            }
            SessionEvent::ToggleMute => {
                self.muted = !self.muted;
                self.apply_volume();
                Ok(())
            }
            SessionEvent::SetSeekSpeeds { backward, forward } => {
                let speeds = SeekSpeeds::new(backward, forward)?;
                self.seek.set_speeds(speeds);
                info!("Seek speeds set to {} / {}", backward, forward);
                Ok(())
            }
            SessionEvent::KeyDown {
                direction,
                auto_repeat,
            } => {
                let effects = self.seek.key_down(direction, auto_repeat);
                self.apply_seek_effects(effects);
                Ok(())
            }
            SessionEvent::KeyUp {
                direction,
                auto_repeat,
            } => {
                let effects = self.seek.key_up(direction, auto_repeat);
                self.apply_seek_effects(effects);
                Ok(())
            }
            SessionEvent::Transport(event) => self.on_transport(event),
            SessionEvent::TimerFired(kind) => {
                self.on_timer(kind);
                Ok(())
            }
            SessionEvent::ResolveResumeOffer {
                offer_id,
                resolution,
            } => {
                self.resolve_offer(offer_id, resolution);
                Ok(())
            }
            SessionEvent::Close => {
                self.close();
                Ok(())
            }
        }
    }

    fn report(&mut self, err: AppError) {
        if err.recovery_action() == RecoveryAction::StopPlayback {
            self.unload();
        }

        match err.severity() {
            ErrorSeverity::Silent => debug!("Ignored: {}", err),
            ErrorSeverity::Warning => {
                warn!("{} ({})", err, err.recovery_action());
                self.notify(SessionNotification::Warning {
                    message: err.user_message(),
                });
            }
        }
    }

    fn notify(&mut self, notification: SessionNotification) {
        self.outputs.push(SessionOutput::Notify(notification));
    }

    fn timer(&mut self, request: TimerRequest) {
        debug!("Timer {:?}", request);
        self.outputs.push(SessionOutput::Timer(request));
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("State {:?} -> {:?}", self.state, state);
            self.state = state;
            self.notify(SessionNotification::StateChanged(state));
        }
    }

    // ===== Playlist operations =====

    fn load_folder(&mut self, folder: &Path) -> Result<()> {
        let files = self
            .fs
            .list_directory(folder, SUPPORTED_EXTENSIONS)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AppError::FileNotFound {
                    path: folder.to_path_buf(),
                },
                _ => AppError::IoError {
                    message: format!("Failed to list {}", folder.display()),
                    source: e,
                },
            })?;

        self.playlist.clear();
        for file in files {
            self.playlist.add(MediaItem::from_path(file));
        }
        self.last_folder = Some(folder.to_path_buf());

        // the loaded item follows its path into the rebuilt list
        if let Some(slot) = self.loaded.as_mut() {
            if let Some(index) = self.playlist.position_of_path(&slot.item.path) {
                slot.entry_id = self.playlist.set_current(index)?.id;
            }
        }

        info!(
            "Loaded {} videos from {}",
            self.playlist.len(),
            folder.display()
        );
        self.notify(SessionNotification::PlaylistChanged);
        let current = self.playlist.current_index();
        self.notify(SessionNotification::CurrentChanged(current));
        Ok(())
    }

    fn add_files(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        let Some(first) = paths.first().cloned() else {
            return Ok(());
        };

        let mut added = 0;
        for path in paths {
            if !is_supported_video(&path) {
                self.report(AppError::UnsupportedFormat { path });
                continue;
            }
            if !self.fs.exists(&path) {
                debug!("Skipping missing file {}", path.display());
                continue;
            }
            match self.playlist.add(MediaItem::from_path(&path)) {
                Some(_) => added += 1,
                None => self.report(AppError::DuplicateItem { path }),
            }
        }

        if let Some(parent) = first.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.last_folder = Some(parent.to_path_buf());
        }
        if added > 0 {
            self.notify(SessionNotification::PlaylistChanged);
        }

        match self.playlist.position_of_path(&first) {
            Some(index) => self.open_index(index),
            None => Ok(()),
        }
    }

    fn remove_item(&mut self, index: usize) -> Result<()> {
        let removed = self.playlist.remove_at(index)?;
        let was_loaded = self
            .loaded
            .as_ref()
            .is_some_and(|slot| slot.entry_id == removed.entry.id);

        if removed.was_current || was_loaded || self.playlist.is_empty() {
            self.unload();
        }

        self.notify(SessionNotification::PlaylistChanged);
        if removed.was_current {
            self.notify(SessionNotification::CurrentChanged(None));
        }
        Ok(())
    }

    fn move_item(&mut self, index: usize, up: bool) -> Result<()> {
        let len = self.playlist.len();
        if index >= len {
            return Err(AppError::IndexOutOfRange { index, len });
        }

        let before = self.playlist.current_index();
        let moved = if up {
            self.playlist.move_up(index)
        } else {
            self.playlist.move_down(index)
        };

        if moved {
            self.notify(SessionNotification::PlaylistChanged);
            let after = self.playlist.current_index();
            if after != before {
                self.notify(SessionNotification::CurrentChanged(after));
            }
        }
        Ok(())
    }

    fn play_next(&mut self) -> Result<()> {
        match self.playlist.next_index_after(self.playlist.current_index()) {
            Some(next) => self.open_index(next),
            None => Ok(()),
        }
    }

    fn advance_on_end_of_media(&mut self) -> Result<()> {
        match self.playlist.current_index() {
            Some(index) if !self.playlist.is_last(index) => self.open_index(index + 1),
            _ => {
                self.transport.stop();
                self.position_ms = 0;
                self.set_state(SessionState::Stopped);
                info!("Playlist complete");
                self.notify(SessionNotification::PlaylistComplete);
                Ok(())
            }
        }
    }

    /// Opens the entry at `index`, leaving everything untouched if its file is gone
    fn open_index(&mut self, index: usize) -> Result<()> {
        let entry = self
            .playlist
            .get(index)
            .cloned()
            .ok_or(AppError::IndexOutOfRange {
                index,
                len: self.playlist.len(),
            })?;

        let path = entry.item.path.clone();
        if !self.fs.exists(&path) {
            return Err(AppError::FileNotFound { path });
        }
        let content_id = ContentId::compute(self.fs.as_ref(), &path)?;

        self.save_position();
        self.discard_offer();
        self.playlist.set_current(index)?;

        self.transport.load(&path);
        self.transport.play();
        self.load_generation += 1;
        self.content_id = Some(content_id);
        self.loaded = Some(PlaylistSlot {
            entry_id: entry.id,
            item: entry.item,
        });
        self.awaiting_load = true;
        self.duration_ms = 0;
        self.position_ms = 0;

        info!("Opened {}", path.display());
        self.set_state(SessionState::Loading);
        self.notify(SessionNotification::CurrentChanged(Some(index)));
        Ok(())
    }

    /// Stops the transport and forgets the loaded item without saving its position
    fn unload(&mut self) {
        self.transport.stop();
        self.discard_offer();
        self.loaded = None;
        self.content_id = None;
        self.awaiting_load = false;
        self.duration_ms = 0;
        self.position_ms = 0;
        self.set_state(SessionState::Stopped);
    }

    // ===== Transport =====

    fn play(&mut self) {
        if self.loaded.is_none() {
            debug!("Nothing loaded, ignoring play");
            return;
        }
        self.transport.play();
        if self.state != SessionState::Loading {
            self.set_state(SessionState::Playing);
        }
    }

    fn pause(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.transport.pause();
        self.set_state(SessionState::Paused);
    }

    fn stop(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.transport.stop();
        self.position_ms = 0;
        self.set_state(SessionState::Stopped);
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AppError::invalid_config(
                "playback_rate",
                rate,
                "must be a positive number",
            ));
        }
        self.playback_rate = rate;
        self.transport.set_playback_rate(rate);
        Ok(())
    }

    fn apply_volume(&mut self) {
        let gain = if self.muted {
            0.0
        } else {
            perceptual_to_linear(f64::from(self.volume) / 100.0) as f32
        };
        self.transport.set_volume(gain);
    }

    /// Moves to an absolute position, clamped into the known duration
    fn seek_absolute(&mut self, position_ms: i64) {
        if self.loaded.is_none() {
            return;
        }
        let target = if self.duration_ms > 0 {
            position_ms.clamp(0, self.duration_ms)
        } else {
            position_ms.max(0)
        };
        self.transport.set_position(target);
        self.position_ms = target;
    }

    /// Moves by `delta_ms`; ignored until a duration is known
    fn seek_relative(&mut self, delta_ms: i64) {
        if self.loaded.is_none() || self.duration_ms <= 0 {
            debug!("No duration yet, ignoring seek of {} ms", delta_ms);
            return;
        }
        let target = self
            .position_ms
            .saturating_add(delta_ms)
            .clamp(0, self.duration_ms);
        self.transport.set_position(target);
        self.position_ms = target;
    }

    fn on_transport(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::PositionChanged(ms) => self.position_ms = ms.max(0),
            TransportEvent::DurationChanged(ms) => self.duration_ms = ms.max(0),
            TransportEvent::StatusChanged(status) => return self.on_media_status(status),
            TransportEvent::PlaybackStateChanged(status) => match status {
                PlaybackStatus::Playing => self.set_state(SessionState::Playing),
                PlaybackStatus::Paused => self.set_state(SessionState::Paused),
                // the transport reports Stopped while swapping media
                PlaybackStatus::Stopped if self.awaiting_load => {}
                PlaybackStatus::Stopped => self.set_state(SessionState::Stopped),
            },
        }
        Ok(())
    }

    fn on_media_status(&mut self, status: MediaStatus) -> Result<()> {
        match status {
            MediaStatus::Loaded if self.awaiting_load => {
                self.awaiting_load = false;
                if self.state == SessionState::Loading {
                    self.set_state(SessionState::Playing);
                }
                self.offer_resume();
                Ok(())
            }
            MediaStatus::Invalid => match &self.loaded {
                Some(slot) => Err(AppError::InvalidMedia {
                    path: slot.item.path.clone(),
                    reason: "the media engine rejected the file".to_string(),
                }),
                None => Ok(()),
            },
            MediaStatus::EndOfMedia => self.advance_on_end_of_media(),
            MediaStatus::Loaded | MediaStatus::Loading | MediaStatus::NoMedia => Ok(()),
        }
    }

    // ===== Resume positions =====

    /// Persists the loaded item's position if the policy wants it; failures are only logged
    fn save_position(&mut self) {
        let Some(id) = self.content_id.as_ref() else {
            return;
        };
        if !self.policy.should_save(self.position_ms, self.duration_ms) {
            debug!(
                "Not saving position {} of {} for {}",
                self.position_ms, self.duration_ms, id
            );
            return;
        }

        match self.store.put(id, self.position_ms) {
            Ok(()) => debug!("Saved position {} for {}", self.position_ms, id),
            Err(e) => warn!("Failed to save resume position for {}: {}", id, e),
        }
    }

    fn offer_resume(&mut self) {
        let Some(id) = self.content_id.clone() else {
            return;
        };
        let Some(position_ms) = self.policy.should_offer(self.store.get(&id)) else {
            return;
        };

        self.pending_offer = Some(ResumeOffer {
            offer_id: self.load_generation,
            content_id: id,
            position_ms,
        });
        self.timer(TimerRequest::Start {
            kind: TimerKind::ResumeOffer,
            after: self.offer_timeout,
            repeating: false,
        });
        if let Some(prompt) = self.resume_prompt() {
            info!(
                "Offering to resume {} at {}",
                prompt.video_display_name, prompt.formatted_last_position
            );
            self.notify(SessionNotification::ResumeOffered(prompt));
        }
    }

    fn resolve_offer(&mut self, offer_id: u64, resolution: OfferResolution) {
        let Some(offer) = self.pending_offer.take_if(|o| o.offer_id == offer_id) else {
            debug!("Discarding answer to stale resume offer {}", offer_id);
            return;
        };

        if resolution != OfferResolution::TimedOut {
            self.timer(TimerRequest::Cancel(TimerKind::ResumeOffer));
        }
        if resolution == OfferResolution::Jump {
            self.seek_absolute(offer.position_ms);
        }
        debug!("Resume offer {} resolved: {:?}", offer_id, resolution);
        self.notify(SessionNotification::ResumeOfferClosed { offer_id });
    }

    fn discard_offer(&mut self) {
        if let Some(offer) = self.pending_offer.take() {
            self.timer(TimerRequest::Cancel(TimerKind::ResumeOffer));
            self.notify(SessionNotification::ResumeOfferClosed {
                offer_id: offer.offer_id,
            });
        }
    }

    // ===== Seek input and timers =====

    fn apply_seek_effects(&mut self, effects: Vec<SeekEffect>) {
        for effect in effects {
            match effect {
                SeekEffect::StartArmTimer(after) => self.timer(TimerRequest::Start {
                    kind: TimerKind::SeekArm,
                    after,
                    repeating: false,
                }),
                SeekEffect::CancelArmTimer => self.timer(TimerRequest::Cancel(TimerKind::SeekArm)),
                SeekEffect::StartRepeatTimer(after) => self.timer(TimerRequest::Start {
                    kind: TimerKind::SeekRepeat,
                    after,
                    repeating: true,
                }),
                SeekEffect::CancelRepeatTimer => {
                    self.timer(TimerRequest::Cancel(TimerKind::SeekRepeat))
                }
                SeekEffect::Jump(delta_ms) => self.seek_relative(delta_ms),
            }
        }
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::SeekArm => {
                let effects = self.seek.arm_elapsed();
                self.apply_seek_effects(effects);
            }
            TimerKind::SeekRepeat => {
                let effects = self.seek.repeat_tick();
                self.apply_seek_effects(effects);
            }
            TimerKind::ResumeOffer => {
                if let Some(offer_id) = self.pending_offer.as_ref().map(|o| o.offer_id) {
                    self.resolve_offer(offer_id, OfferResolution::TimedOut);
                }
            }
        }
    }

    fn close(&mut self) {
        self.save_position();
        if let Err(e) = self.store.flush() {
            warn!("Failed to flush resume store: {}", e);
        }

        let effects = self.seek.reset();
        self.apply_seek_effects(effects);
        self.discard_offer();

        self.transport.stop();
        self.set_state(SessionState::Stopped);
        self.closed = true;
        info!("Session closed");
        self.notify(SessionNotification::Closed);
    }

    // ===== Projections =====

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn position_ms(&self) -> i64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Content id of the item in the transport
    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id.as_ref()
    }

    pub fn pending_offer(&self) -> Option<&ResumeOffer> {
        self.pending_offer.as_ref()
    }

    pub fn seek_state(&self) -> SeekState {
        self.seek.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `"<current> / <total>"`
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.position_ms),
            format_clock(self.duration_ms)
        )
    }

    /// Position as a whole percentage of the duration
    pub fn slider_value(&self) -> u8 {
        if self.duration_ms <= 0 {
            return 0;
        }
        (self.position_ms.saturating_mul(100) / self.duration_ms).clamp(0, 100) as u8
    }

    /// File stem of the loaded item
    pub fn now_playing_title(&self) -> Option<String> {
        self.loaded.as_ref().map(|slot| slot.item.title())
    }

    pub fn edit_actions(&self, selected: Option<usize>) -> EditActions {
        self.playlist.edit_actions(selected)
    }

    pub fn resume_prompt(&self) -> Option<ResumePrompt> {
        let offer = self.pending_offer.as_ref()?;
        Some(ResumePrompt {
            offer_id: offer.offer_id,
            video_display_name: self.now_playing_title().unwrap_or_default(),
            formatted_last_position: format_clock(offer.position_ms),
            auto_decline_after: self.offer_timeout,
        })
    }

    pub fn preferences(&self) -> SessionPreferences {
        SessionPreferences {
            last_folder: self.last_folder.clone(),
            volume: self.volume,
            muted: self.muted,
            playback_rate: self.playback_rate,
            seek_speeds: self.seek.speeds(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            items: self.playlist.items().cloned().collect(),
            current_index: self.playlist.current_index(),
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            time_label: self.time_label(),
            slider_value: self.slider_value(),
            now_playing_title: self.now_playing_title(),
            resume_prompt: self.resume_prompt(),
            seek_state: self.seek.state(),
            preferences: self.preferences(),
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("items", &self.playlist.len())
            .field("current", &self.playlist.current_index())
            .field("content_id", &self.content_id)
            .field("position_ms", &self.position_ms)
            .field("duration_ms", &self.duration_ms)
            .field("pending_offer", &self.pending_offer)
            .field("closed", &self.closed)
            .finish()
    }
}
