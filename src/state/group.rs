//! Group (tab) entity: a named, ordered collection of timers

use serde::{Deserialize, Serialize};

use super::timer::{Timer, DEFAULT_DURATION_SECS};

/// A tab of timers, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timers: Vec<Timer>,
}

impl Group {
    /// Create a group holding one default one-minute timer
    pub fn new(id: u64, name: impl Into<String>, first_timer_id: u64) -> Self {
        Self {
            id,
            name: name.into(),
            timers: vec![Timer::new(first_timer_id, DEFAULT_DURATION_SECS, 1)],
        }
    }

    /// Append a default timer. Its name uses the position it lands at, so
    /// names can repeat after deletions.
    pub fn add_timer(&mut self, id: u64) -> &Timer {
        let ordinal = self.timers.len() + 1;
        self.timers.push(Timer::new(id, DEFAULT_DURATION_SECS, ordinal));
        &self.timers[self.timers.len() - 1]
    }

    /// Remove a timer by id. Returns whether anything was removed.
    pub fn remove_timer(&mut self, id: u64) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn timer(&self, id: u64) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    pub fn timer_mut(&mut self, id: u64) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|timer| timer.id == id)
    }
}
