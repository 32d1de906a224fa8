//! Change summaries handed back by mutators
//!
//! Mutators never render. They describe what moved and the caller decides
//! whether to persist and which part of the view to redraw.

use serde::{Deserialize, Serialize};

use super::timer::Timer;
use crate::utils::format::{format_hms, progress_percent, LOW_PERCENT};

/// Which part of the view must be redrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderScope {
    #[default]
    None,
    /// The theme only
    Theme,
    /// The tab strip and current tab name
    Tabs,
    /// The timer list of the active group
    Timers,
    /// Tabs and timers
    All,
}

/// Side effects a mutation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Change {
    pub save: bool,
    pub render: RenderScope,
}

impl Change {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn save_and_render(render: RenderScope) -> Self {
        Self { save: true, render }
    }

    pub fn save_only() -> Self {
        Self { save: true, render: RenderScope::None }
    }
}

/// Per-timer values a renderer patches in place on the cheap tick path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerTick {
    pub id: u64,
    pub remaining: u64,
    pub display: String,
    pub percent: f64,
    /// Less than a tenth of the duration left
    pub low: bool,
}

impl TimerTick {
    pub fn from_timer(timer: &Timer) -> Self {
        let percent = progress_percent(timer.remaining, timer.total_duration);
        Self {
            id: timer.id,
            remaining: timer.remaining,
            display: format_hms(timer.remaining),
            percent,
            low: percent < LOW_PERCENT,
        }
    }
}

/// Notifications published to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    /// A mutator changed structure; re-read state and redraw `scope`
    Structure { action: String, scope: RenderScope },
    /// Active-group timers counted down; patch just these
    TimerValues { timers: Vec<TimerTick> },
    /// A timer finished somewhere; redraw the active timer list
    TimerList,
    /// Soonest countdown changed
    Title { title: String },
}

impl RenderEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            RenderEvent::Structure { .. } => "structure",
            RenderEvent::TimerValues { .. } => "timer_values",
            RenderEvent::TimerList => "timer_list",
            RenderEvent::Title { .. } => "title",
        }
    }
}
