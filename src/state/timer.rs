//! Timer entity: a single countdown and its lifecycle

use serde::{Deserialize, Serialize};

/// Duration given to freshly created timers, in seconds
pub const DEFAULT_DURATION_SECS: u64 = 60;

/// Sound a timer plays when it finishes.
///
/// Persisted lowercase. Any unknown value reads back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum SoundKind {
    #[default]
    None,
    Beep,
    Beep2,
    Alarm,
}

impl SoundKind {
    /// Parse a sound name, falling back to `None` for anything unknown
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "beep" => SoundKind::Beep,
            "beep2" => SoundKind::Beep2,
            "alarm" => SoundKind::Alarm,
            _ => SoundKind::None,
        }
    }

    /// The alert to dispatch on completion, if any
    pub fn alert(self) -> Option<AlertKind> {
        match self {
            SoundKind::None => None,
            SoundKind::Beep => Some(AlertKind::Beep),
            SoundKind::Beep2 => Some(AlertKind::Beep2),
            SoundKind::Alarm => Some(AlertKind::Alarm),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoundKind::None => "none",
            SoundKind::Beep => "beep",
            SoundKind::Beep2 => "beep2",
            SoundKind::Alarm => "alarm",
        }
    }
}

impl From<Option<String>> for SoundKind {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(SoundKind::parse).unwrap_or_default()
    }
}

/// A sound that can actually be played. `none` has no counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Beep,
    Beep2,
    Alarm,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Beep => "beep",
            AlertKind::Beep2 => "beep2",
            AlertKind::Alarm => "alarm",
        }
    }
}

/// What a single tick did to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    Decremented,
    JustFinished,
}

/// Settable timer properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerField {
    Name(String),
    Sound(SoundKind),
}

/// A countdown timer.
///
/// Invariants kept by every method here: `remaining <= total_duration`, and a
/// timer whose countdown reaches zero during a tick stops running in that tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub total_duration: u64,
    pub remaining: u64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub is_editing: bool,
    #[serde(default)]
    pub sound: SoundKind,
}

impl Timer {
    /// Create a stopped timer named after its position, e.g. "Timer 3"
    pub fn new(id: u64, duration: u64, ordinal: usize) -> Self {
        Self {
            id,
            name: format!("Timer {}", ordinal),
            total_duration: duration,
            remaining: duration,
            is_running: false,
            is_editing: false,
            sound: SoundKind::None,
        }
    }

    /// Start or pause. Starting a finished timer refills it first.
    ///
    /// A timer in edit mode can be paused but not started; returns whether
    /// anything changed.
    pub fn toggle_run(&mut self) -> bool {
        if self.is_editing && !self.is_running {
            return false;
        }
        if self.remaining == 0 {
            self.remaining = self.total_duration;
        }
        self.is_running = !self.is_running;
        true
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.remaining = self.total_duration;
    }

    /// Enter edit mode. The countdown keeps going unless `pause` is set.
    pub fn begin_edit(&mut self, pause: bool) {
        self.is_editing = true;
        if pause {
            self.is_running = false;
        }
    }

    /// Apply a new duration from hour/minute/second inputs.
    ///
    /// Negative inputs count as zero. Progress is discarded: the timer stops
    /// and is refilled to the new duration.
    pub fn commit_edit(&mut self, hours: i64, minutes: i64, seconds: i64) {
        let total = (hours.max(0) as u64)
            .saturating_mul(3600)
            .saturating_add((minutes.max(0) as u64).saturating_mul(60))
            .saturating_add(seconds.max(0) as u64);

        self.total_duration = total;
        self.remaining = total;
        self.is_running = false;
        self.is_editing = false;
    }

    pub fn set_field(&mut self, field: TimerField) {
        match field {
            TimerField::Name(name) => self.name = name,
            TimerField::Sound(sound) => self.sound = sound,
        }
    }

    /// Advance this timer by one second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Unchanged;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining > 0 {
                return TickOutcome::Decremented;
            }
        }

        self.is_running = false;
        self.remaining = 0;
        TickOutcome::JustFinished
    }

    /// Restore `remaining <= total_duration` on data read from outside
    pub(crate) fn clamp_remaining(&mut self) -> bool {
        if self.remaining > self.total_duration {
            self.remaining = self.total_duration;
            return true;
        }
        false
    }
}
