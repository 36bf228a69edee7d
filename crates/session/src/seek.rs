//! Tap vs long-press seek input
//!
//! Raw key edges for the two direction keys drive a small state machine:
//!
//! ```text
//! Idle --down--> Armed(dir) --arm timer--> Repeating(dir)
//!   ^               |                          |
//!   +----up(dir)----+ (one fixed jump)         |
//!   +----------------------up(dir)-------------+ (no extra jump)
//! ```
//!
//! The machine owns no timers. It returns [`SeekEffect`]s asking its owner to start or cancel
//! them, and to apply position jumps.

use log::debug;
use std::time::Duration;
use vidshell_config::PlayerConfig;
use vidshell_core::{AppError, Result};

/// Which key is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    Backward,
    Forward,
}

impl SeekDirection {
    fn sign(self) -> i64 {
        match self {
            SeekDirection::Backward => -1,
            SeekDirection::Forward => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekState {
    #[default]
    Idle,
    Armed(SeekDirection),
    Repeating(SeekDirection),
}

/// Per-direction long-press speeds, always finite and positive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekSpeeds {
    backward: f64,
    forward: f64,
}

impl SeekSpeeds {
    /// Floor applied when clamping unusable speeds
    pub const MIN_SPEED: f64 = 0.1;
    pub const DEFAULT_SPEED: f64 = 2.0;

    /// Rejects zero, negative and non-finite speeds
    pub fn new(backward: f64, forward: f64) -> Result<Self> {
        for (setting, value) in [("backward_speed", backward), ("forward_speed", forward)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::invalid_config(
                    setting,
                    value,
                    "must be a positive number",
                ));
            }
        }
        Ok(Self { backward, forward })
    }

    /// Replaces unusable speeds with [`Self::MIN_SPEED`]
    pub fn clamped(backward: f64, forward: f64) -> Self {
        let fix = |v: f64| {
            if v.is_finite() && v >= Self::MIN_SPEED {
                v
            } else {
                Self::MIN_SPEED
            }
        };
        Self {
            backward: fix(backward),
            forward: fix(forward),
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::clamped(config.left_key_speed, config.right_key_speed)
    }

    pub fn backward(&self) -> f64 {
        self.backward
    }

    pub fn forward(&self) -> f64 {
        self.forward
    }

    pub fn for_direction(&self, direction: SeekDirection) -> f64 {
        match direction {
            SeekDirection::Backward => self.backward,
            SeekDirection::Forward => self.forward,
        }
    }
}

impl Default for SeekSpeeds {
    fn default() -> Self {
        Self {
            backward: Self::DEFAULT_SPEED,
            forward: Self::DEFAULT_SPEED,
        }
    }
}

/// Timer lengths and the tap jump size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekTimings {
    /// Hold time before a press counts as long
    pub long_press: Duration,
    /// Period of the continuous seek while held
    pub repeat_interval: Duration,
    /// Jump applied by a tap
    pub tap_jump_ms: i64,
}

impl SeekTimings {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            long_press: Duration::from_millis(config.long_press_ms.max(1)),
            repeat_interval: Duration::from_millis(config.repeat_interval_ms.max(1)),
            tap_jump_ms: config.tap_seek_secs.saturating_mul(1000) as i64,
        }
    }
}

impl Default for SeekTimings {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(500),
            repeat_interval: Duration::from_millis(100),
            tap_jump_ms: 15_000,
        }
    }
}

/// What the owner of the machine must do after an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekEffect {
    StartArmTimer(Duration),
    CancelArmTimer,
    StartRepeatTimer(Duration),
    CancelRepeatTimer,
    /// Move the position by this many milliseconds
    Jump(i64),
}

/// The seek input state machine
#[derive(Debug, Clone, Default)]
pub struct SeekInput {
    state: SeekState,
    speeds: SeekSpeeds,
    timings: SeekTimings,
}

impl SeekInput {
    pub fn new(speeds: SeekSpeeds, timings: SeekTimings) -> Self {
        Self {
            state: SeekState::Idle,
            speeds,
            timings,
        }
    }

    pub fn state(&self) -> SeekState {
        self.state
    }

    pub fn speeds(&self) -> SeekSpeeds {
        self.speeds
    }

    pub fn set_speeds(&mut self, speeds: SeekSpeeds) {
        self.speeds = speeds;
    }

    pub fn timings(&self) -> SeekTimings {
        self.timings
    }

    /// Jump emitted per repeat tick while `direction` is held
    pub fn repeat_jump_ms(&self, direction: SeekDirection) -> i64 {
        direction.sign() * (self.speeds.for_direction(direction) * 1000.0).round() as i64
    }

    /// Key pressed. Auto-repeat presses are ignored; a real press always re-arms, superseding
    /// whatever press was in progress.
    pub fn key_down(&mut self, direction: SeekDirection, auto_repeat: bool) -> Vec<SeekEffect> {
        if auto_repeat {
            return Vec::new();
        }

        let mut effects = self.reset();
        self.state = SeekState::Armed(direction);
        effects.push(SeekEffect::StartArmTimer(self.timings.long_press));
        debug!("Seek input armed {:?}", direction);
        effects
    }

    /// Key released. Releases of a key that is not the held one are ignored.
    pub fn key_up(&mut self, direction: SeekDirection, auto_repeat: bool) -> Vec<SeekEffect> {
        if auto_repeat {
            return Vec::new();
        }

        match self.state {
            SeekState::Armed(held) if held == direction => {
                self.state = SeekState::Idle;
                debug!("Seek tap {:?}", direction);
                vec![
                    SeekEffect::CancelArmTimer,
                    SeekEffect::Jump(direction.sign() * self.timings.tap_jump_ms),
                ]
            }
            SeekState::Repeating(held) if held == direction => {
                self.state = SeekState::Idle;
                debug!("Seek hold released {:?}", direction);
                vec![SeekEffect::CancelRepeatTimer]
            }
            _ => Vec::new(),
        }
    }

    /// The arm timer expired
    pub fn arm_elapsed(&mut self) -> Vec<SeekEffect> {
        match self.state {
            SeekState::Armed(direction) => {
                self.state = SeekState::Repeating(direction);
                debug!("Seek hold started {:?}", direction);
                vec![SeekEffect::StartRepeatTimer(self.timings.repeat_interval)]
            }
            _ => Vec::new(),
        }
    }

    /// The repeat timer ticked
    pub fn repeat_tick(&mut self) -> Vec<SeekEffect> {
        match self.state {
            SeekState::Repeating(direction) => vec![SeekEffect::Jump(self.repeat_jump_ms(direction))],
            _ => Vec::new(),
        }
    }

    /// Returns to `Idle`, cancelling whichever timer the current state owns
    pub fn reset(&mut self) -> Vec<SeekEffect> {
        let effects = match self.state {
            SeekState::Idle => Vec::new(),
            SeekState::Armed(_) => vec![SeekEffect::CancelArmTimer],
            SeekState::Repeating(_) => vec![SeekEffect::CancelRepeatTimer],
        };
        self.state = SeekState::Idle;
        effects
    }
}
