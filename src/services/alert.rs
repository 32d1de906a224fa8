//! Completion alerts
//!
//! The tick pass hands each finished timer's [`AlertKind`] to an
//! [`AlertDispatcher`]. Dispatching never blocks the tick: players are
//! spawned and left to finish on their own, and overlapping alerts simply
//! overlap.

use std::{
    io::Write,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::state::AlertKind;

/// Oscillator shape of a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

impl Waveform {
    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

/// How an alert sounds. Players are free to approximate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    /// Exponential ramp target; equal to `start_hz` for a flat tone
    pub end_hz: f32,
    pub gain: f32,
    pub duration: Duration,
    pub repeats: u8,
    /// Start-to-start spacing between repeats
    pub spacing: Duration,
}

impl ToneSpec {
    pub fn for_kind(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Beep => Self {
                waveform: Waveform::Sine,
                start_hz: 800.0,
                end_hz: 800.0,
                gain: 0.1,
                duration: Duration::from_millis(300),
                repeats: 1,
                spacing: Duration::ZERO,
            },
            AlertKind::Beep2 => Self {
                waveform: Waveform::Square,
                start_hz: 1200.0,
                end_hz: 1200.0,
                gain: 0.05,
                duration: Duration::from_millis(100),
                repeats: 2,
                spacing: Duration::from_millis(150),
            },
            AlertKind::Alarm => Self {
                waveform: Waveform::Sawtooth,
                start_hz: 600.0,
                end_hz: 100.0,
                gain: 0.1,
                duration: Duration::from_millis(600),
                repeats: 1,
                spacing: Duration::ZERO,
            },
        }
    }
}

/// Plays alerts. Must return promptly.
pub trait AlertDispatcher: Send + Sync {
    fn play_alert(&self, kind: AlertKind);
}

/// Only logs the alert
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl AlertDispatcher for LogAlert {
    fn play_alert(&self, kind: AlertKind) {
        info!("Timer finished, alert: {}", kind.as_str());
    }
}

/// Rings the terminal bell once per tone repeat
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertDispatcher for TerminalBell {
    fn play_alert(&self, kind: AlertKind) {
        let bells = "\x07".repeat(ToneSpec::for_kind(kind).repeats as usize);
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(bells.as_bytes()).and_then(|_| stderr.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
        debug!("Rang terminal bell for {}", kind.as_str());
    }
}

/// Runs an external player: `<program> <args..> <kind>`.
///
/// The tone is described to the player through `TAB_TIMERS_*` environment
/// variables. The child is not awaited by the caller.
#[derive(Debug, Clone)]
pub struct CommandAlert {
    program: String,
    args: Vec<String>,
}

impl CommandAlert {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace into program and arguments
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    fn command(&self, kind: AlertKind) -> Command {
        let tone = ToneSpec::for_kind(kind);
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(kind.as_str())
            .env("TAB_TIMERS_WAVEFORM", tone.waveform.as_str())
            .env("TAB_TIMERS_START_HZ", tone.start_hz.to_string())
            .env("TAB_TIMERS_END_HZ", tone.end_hz.to_string())
            .env("TAB_TIMERS_GAIN", tone.gain.to_string())
            .env("TAB_TIMERS_DURATION_MS", tone.duration.as_millis().to_string())
            .env("TAB_TIMERS_REPEATS", tone.repeats.to_string())
            .env("TAB_TIMERS_SPACING_MS", tone.spacing.as_millis().to_string())
            .kill_on_drop(false);
        command
    }
}

impl AlertDispatcher for CommandAlert {
    fn play_alert(&self, kind: AlertKind) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, skipping {} alert", kind.as_str());
            return;
        };

        let mut command = self.command(kind);
        let program = self.program.clone();
        runtime.spawn(async move {
            match command.status().await {
                Ok(status) if status.success() => debug!("{} played {}", program, kind.as_str()),
                Ok(status) => warn!("{} exited with {} while playing {}", program, status, kind.as_str()),
                Err(e) => warn!("Failed to run alert command {}: {}", program, e),
            }
        });
    }
}

/// Remembers every alert it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingAlert {
    played: Arc<Mutex<Vec<AlertKind>>>,
}

impl RecordingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<AlertKind> {
        self.played.lock().map(|played| played.clone()).unwrap_or_default()
    }
}

impl AlertDispatcher for RecordingAlert {
    fn play_alert(&self, kind: AlertKind) {
        if let Ok(mut played) = self.played.lock() {
            played.push(kind);
        }
    }
}
