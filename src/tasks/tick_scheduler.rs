//! Tick scheduler: advances every running timer once per second
//!
//! [`tick_board`] is the whole per-tick pass over a board and is pure apart
//! from alert dispatch. [`tick_scheduler_task`] drives it from a tokio
//! interval for the lifetime of the process.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    error::{AppError, AppResult},
    services::AlertDispatcher,
    state::{AlertKind, AppState, TickOutcome, TimerBoard},
};

/// Nominal tick period
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How the renderer should reflect a tick
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TickRender {
    #[default]
    None,
    /// Patch the displayed values of these active-group timers
    Targeted(Vec<u64>),
    /// Redraw the active group's timer list
    Full,
}

/// Summary of one or more tick passes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickReport {
    /// At least one timer was running; the board must be saved
    pub mutated: bool,
    /// At least one timer finished
    pub completed: bool,
    /// Active-group timers that ran during the pass, in display order
    pub active_changed: Vec<u64>,
    /// Alerts dispatched, by timer id
    pub alerts: Vec<(u64, AlertKind)>,
    pub render: TickRender,
    /// Smallest remaining time among timers still running
    pub soonest_remaining: Option<u64>,
}

impl TickReport {
    /// Fold a later pass into this one
    fn absorb(&mut self, later: TickReport) {
        self.mutated |= later.mutated;
        self.completed |= later.completed;
        for id in later.active_changed {
            if !self.active_changed.contains(&id) {
                self.active_changed.push(id);
            }
        }
        self.alerts.extend(later.alerts);
        self.soonest_remaining = later.soonest_remaining;
        self.render = self.decide_render();
    }

    fn decide_render(&self) -> TickRender {
        if self.completed {
            TickRender::Full
        } else if !self.active_changed.is_empty() {
            TickRender::Targeted(self.active_changed.clone())
        } else {
            TickRender::None
        }
    }
}

/// Advance every timer in every group by one second.
///
/// Background groups count down too. Each timer finishing with a sound set
/// gets exactly one alert, with no de-duplication across timers.
pub fn tick_board(board: &mut TimerBoard, alerts: &dyn AlertDispatcher) -> TickReport {
    let mut report = TickReport::default();
    let active = board.active_group_id;

    for group in &mut board.groups {
        for timer in &mut group.timers {
            let outcome = timer.tick();
            if outcome == TickOutcome::Unchanged {
                continue;
            }

            report.mutated = true;
            if group.id == active {
                report.active_changed.push(timer.id);
            }

            if outcome == TickOutcome::JustFinished {
                report.completed = true;
                info!("Timer {} ({}) finished", timer.id, timer.name);
                if let Some(kind) = timer.sound.alert() {
                    alerts.play_alert(kind);
                    report.alerts.push((timer.id, kind));
                }
            }
        }
    }

    report.soonest_remaining = board
        .timers()
        .filter(|timer| timer.is_running)
        .map(|timer| timer.remaining)
        .min();
    report.render = report.decide_render();
    report
}

/// Run `steps` consecutive passes, as one atomic update
pub fn tick_board_steps(board: &mut TimerBoard, alerts: &dyn AlertDispatcher, steps: u32) -> TickReport {
    let mut report = TickReport::default();
    for _ in 0..steps {
        let pass = tick_board(board, alerts);
        report.absorb(pass);
    }
    report
}

/// Turns measured wall-clock time into whole logical seconds.
///
/// Sub-second remainders are carried to the next measurement so nothing is
/// lost to rounding.
#[derive(Debug, Clone)]
pub struct CatchUpClock {
    last: Instant,
    carry: Duration,
}

impl CatchUpClock {
    pub fn new(start: Instant) -> Self {
        Self {
            last: start,
            carry: Duration::ZERO,
        }
    }

    /// Whole seconds elapsed since the previous call
    pub fn steps(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now;

        let whole = elapsed.as_secs();
        self.carry = elapsed - Duration::from_secs(whole);
        u32::try_from(whole).unwrap_or(u32::MAX)
    }
}

/// Background task ticking the board every [`TICK_INTERVAL`].
///
/// By default each tick is one logical second even if the tick fired late.
/// With `catch_up` the measured elapsed time is applied instead.
/// Run one tick on the blocking pool.
///
/// The tick holds the board lock while it saves, and a file store syncs to
/// disk, so it stays off the async workers.
pub async fn run_tick(state: &Arc<AppState>, steps: u32) -> AppResult<TickReport> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.tick(steps))
        .await
        .map_err(|e| AppError::Task(e.to_string()))?
}

pub async fn tick_scheduler_task(state: Arc<AppState>, catch_up: bool) {
    info!("Starting tick scheduler (catch-up: {})", catch_up);

    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;
    let mut clock = CatchUpClock::new(Instant::now());

    loop {
        ticker.tick().await;

        let steps = if catch_up { clock.steps(Instant::now()) } else { 1 };
        if steps == 0 {
            continue;
        }
        if steps > 1 {
            debug!("Catching up {} seconds", steps);
        }

        match run_tick(&state, steps).await {
            Ok(report) if report.mutated => {
                debug!(
                    "Tick: {} active timers changed, {} alerts, render {:?}",
                    report.active_changed.len(),
                    report.alerts.len(),
                    report.render
                );
            }
            Ok(_) => {}
            Err(e) => error!("Tick failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordingAlert;
    use crate::state::{Group, Layout, SoundKind, Timer};

    fn timer(id: u64, remaining: u64, running: bool, sound: SoundKind) -> Timer {
        let mut timer = Timer::new(id, remaining.max(1), 1);
        timer.remaining = remaining;
        timer.is_running = running;
        timer.sound = sound;
        timer
    }

    fn board(groups: Vec<Group>, active: u64) -> TimerBoard {
        TimerBoard::from_parts("theme-dark".to_string(), Layout::List, Some(active), groups)
    }

    #[test]
    fn idle_board_needs_nothing() {
        let mut board = TimerBoard::new();
        let alerts = RecordingAlert::new();
        let report = tick_board(&mut board, &alerts);
        assert_eq!(report, TickReport::default());
        assert!(alerts.played().is_empty());
    }

    #[test]
    fn two_second_timer_finishes_on_second_tick() {
        let mut board = board(
            vec![Group {
                id: 1,
                name: "Tab 1".to_string(),
                timers: vec![timer(2, 2, true, SoundKind::Beep)],
            }],
            1,
        );
        let alerts = RecordingAlert::new();

        let first = tick_board(&mut board, &alerts);
        assert!(first.mutated);
        assert!(!first.completed);
        assert_eq!(first.render, TickRender::Targeted(vec![2]));
        assert_eq!(first.soonest_remaining, Some(1));

        let second = tick_board(&mut board, &alerts);
        assert!(second.completed);
        assert_eq!(second.render, TickRender::Full);
        assert_eq!(second.alerts, [(2, AlertKind::Beep)]);
        assert_eq!(second.soonest_remaining, None);

        let finished = &board.groups[0].timers[0];
        assert_eq!(finished.remaining, 0);
        assert!(!finished.is_running);
        assert_eq!(alerts.played(), [AlertKind::Beep]);

        let third = tick_board(&mut board, &alerts);
        assert!(!third.mutated);
        assert_eq!(alerts.played().len(), 1);
    }

    #[test]
    fn background_group_keeps_counting() {
        let mut board = board(
            vec![
                Group {
                    id: 1,
                    name: "A".to_string(),
                    timers: vec![timer(10, 30, false, SoundKind::None)],
                },
                Group {
                    id: 2,
                    name: "B".to_string(),
                    timers: vec![timer(20, 1, true, SoundKind::None)],
                },
            ],
            1,
        );
        let alerts = RecordingAlert::new();

        let report = tick_board(&mut board, &alerts);
        assert!(report.mutated);
        assert!(report.completed);
        assert!(report.active_changed.is_empty());
        assert_eq!(report.render, TickRender::Full);
        assert!(report.alerts.is_empty());

        let background = &board.groups[1].timers[0];
        assert_eq!(background.remaining, 0);
        assert!(!background.is_running);
    }

    #[test]
    fn simultaneous_completions_each_alert() {
        let mut board = board(
            vec![Group {
                id: 1,
                name: "A".to_string(),
                timers: vec![
                    timer(2, 1, true, SoundKind::Beep),
                    timer(3, 1, true, SoundKind::Beep),
                    timer(4, 1, true, SoundKind::None),
                    timer(5, 1, true, SoundKind::Alarm),
                ],
            }],
            1,
        );
        let alerts = RecordingAlert::new();
        let report = tick_board(&mut board, &alerts);
        assert_eq!(alerts.played(), [AlertKind::Beep, AlertKind::Beep, AlertKind::Alarm]);
        assert_eq!(report.active_changed, [2, 3, 4, 5]);
    }

    #[test]
    fn zero_duration_running_timer_finishes() {
        let mut zero = Timer::new(2, 0, 1);
        zero.toggle_run();
        zero.sound = SoundKind::Beep2;
        let mut board = board(
            vec![Group {
                id: 1,
                name: "A".to_string(),
                timers: vec![zero],
            }],
            1,
        );
        let alerts = RecordingAlert::new();
        let report = tick_board(&mut board, &alerts);
        assert!(report.completed);
        assert_eq!(alerts.played(), [AlertKind::Beep2]);
        assert!(!board.groups[0].timers[0].is_running);
    }

    #[test]
    fn soonest_remaining_spans_all_groups() {
        let mut board = board(
            vec![
                Group {
                    id: 1,
                    name: "A".to_string(),
                    timers: vec![timer(10, 50, true, SoundKind::None)],
                },
                Group {
                    id: 2,
                    name: "B".to_string(),
                    timers: vec![timer(20, 9, true, SoundKind::None), timer(21, 3, false, SoundKind::None)],
                },
            ],
            1,
        );
        let report = tick_board(&mut board, &RecordingAlert::new());
        assert_eq!(report.soonest_remaining, Some(8));
        assert_eq!(report.render, TickRender::Targeted(vec![10]));
    }

    #[test]
    fn multiple_steps_merge_reports() {
        let mut board = board(
            vec![Group {
                id: 1,
                name: "A".to_string(),
                timers: vec![timer(2, 3, true, SoundKind::Beep), timer(3, 10, true, SoundKind::None)],
            }],
            1,
        );
        let alerts = RecordingAlert::new();
        let report = tick_board_steps(&mut board, &alerts, 5);
        assert!(report.completed);
        assert_eq!(report.render, TickRender::Full);
        assert_eq!(report.active_changed, [2, 3]);
        assert_eq!(report.soonest_remaining, Some(5));
        assert_eq!(alerts.played(), [AlertKind::Beep]);
        assert_eq!(board.groups[0].timers[1].remaining, 5);
    }

    #[test]
    fn catch_up_clock_carries_remainders() {
        let start = Instant::now();
        let mut clock = CatchUpClock::new(start);
        assert_eq!(clock.steps(start + Duration::from_millis(1500)), 1);
        assert_eq!(clock.steps(start + Duration::from_millis(2100)), 1);
        assert_eq!(clock.steps(start + Duration::from_millis(2500)), 0);
        assert_eq!(clock.steps(start + Duration::from_millis(6500)), 4);
    }

    #[tokio::test]
    async fn run_tick_advances_shared_board() {
        let board = board(vec![Group::new(1, "A", 2)], 1);
        let persistence = crate::storage::Persistence::new(Box::new(crate::storage::MemoryStore::new()));
        let state = Arc::new(AppState::new(board, persistence, Arc::new(RecordingAlert::new())));
        state.update_board("toggle", |board| board.toggle_timer(2)).unwrap();

        let report = run_tick(&state, 3).await.unwrap();
        assert!(report.mutated);
        assert_eq!(report.active_changed, [2]);
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.active_group().timers[0].remaining, 57);
    }
}
