//! Display helpers for remaining time

/// Title shown when no timer is running
pub const IDLE_TITLE: &str = "Tab Timers";

/// Percentage below which a countdown is shown as running low
pub const LOW_PERCENT: f64 = 10.0;

/// Format a second count as `HH:MM:SS`.
///
/// Hours are not wrapped, so counts of 100 hours or more widen the first field.
pub fn format_hms(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Remaining share of the total duration as a percentage in `[0, 100]`.
///
/// A zero-length timer reports 0, it has nothing left to show.
pub fn progress_percent(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (remaining.min(total) as f64 / total as f64) * 100.0
}

/// Window/tab title advertising the soonest finishing timer
pub fn window_title(soonest_remaining: Option<u64>) -> String {
    match soonest_remaining {
        Some(seconds) => format!("{} · {}", format_hms(seconds), IDLE_TITLE),
        None => IDLE_TITLE.to_string(),
    }
}
