//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Playback rates offered by the rate selector
pub const PLAYBACK_RATES: &[f64] = &[
    0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75, 3.0,
];

/// Player preferences and seek behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume slider position (0-100)
    pub volume: u8,

    /// Playback rate, one of [`PLAYBACK_RATES`]
    pub playback_rate: f64,

    /// Long-press backward seek speed, in seconds of media per second held
    pub left_key_speed: f64,

    /// Long-press forward seek speed, in seconds of media per second held
    pub right_key_speed: f64,

    /// Jump applied by a short tap on a direction key
    pub tap_seek_secs: u64,

    /// How long a key must be held before continuous seeking starts
    pub long_press_ms: u64,

    /// Tick of the continuous seek timer
    pub repeat_interval_ms: u64,

    /// Auto-decline deadline of the resume prompt
    pub resume_offer_secs: u64,

    /// Positions within this many seconds of either end are not saved
    pub resume_margin_secs: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 70,
            playback_rate: 1.0,
            left_key_speed: 2.0,
            right_key_speed: 2.0,
            tap_seek_secs: 15,
            long_press_ms: 500,
            repeat_interval_ms: 100,
            resume_offer_secs: 10,
            resume_margin_secs: 30,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.volume, 0, 100, "player.volume"),
            Validator::one_of(&self.playback_rate, PLAYBACK_RATES, "player.playback_rate"),
            Validator::finite_in_range(self.left_key_speed, 0.5, 3.0, "player.left_key_speed"),
            Validator::finite_in_range(self.right_key_speed, 0.5, 3.0, "player.right_key_speed"),
            Validator::in_range(self.tap_seek_secs, 1, 120, "player.tap_seek_secs"),
            Validator::in_range(self.long_press_ms, 100, 2000, "player.long_press_ms"),
            Validator::in_range(self.repeat_interval_ms, 16, 1000, "player.repeat_interval_ms"),
            Validator::in_range(self.resume_offer_secs, 1, 60, "player.resume_offer_secs"),
            Validator::in_range(self.resume_margin_secs, 0, 300, "player.resume_margin_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.volume = other.volume;
        self.playback_rate = other.playback_rate;
        self.left_key_speed = other.left_key_speed;
        self.right_key_speed = other.right_key_speed;
        self.tap_seek_secs = other.tap_seek_secs;
        self.long_press_ms = other.long_press_ms;
        self.repeat_interval_ms = other.repeat_interval_ms;
        self.resume_offer_secs = other.resume_offer_secs;
        self.resume_margin_secs = other.resume_margin_secs;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
