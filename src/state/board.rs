//! The timer board: every group and timer plus the display settings
//!
//! All collaborator-facing mutators live here. None of them touch storage or
//! the renderer; each returns a [`Change`] describing the side effects the
//! caller has to carry out.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    change::{Change, RenderScope},
    group::Group,
    timer::{Timer, TimerField},
};
use crate::error::BoardError;

/// Theme applied when none was stored
pub const DEFAULT_THEME: &str = "theme-dark";

/// How the renderer lays out timer cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    List,
    Grid,
}

/// Whole application state, serialized as the persisted document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerBoard {
    pub theme: String,
    pub layout: Layout,
    #[serde(rename = "activeTabId")]
    pub active_group_id: u64,
    #[serde(rename = "tabs")]
    pub groups: Vec<Group>,
    /// Highest id handed out so far
    #[serde(skip)]
    last_id: u64,
}

impl TimerBoard {
    /// Fresh board: one tab holding one default timer
    pub fn new() -> Self {
        let mut board = Self {
            theme: DEFAULT_THEME.to_string(),
            layout: Layout::default(),
            active_group_id: 0,
            groups: Vec::new(),
            last_id: 0,
        };
        board.push_default_group("Tab 1");
        board
    }

    /// Assemble a board from stored parts, restoring the structural invariants:
    /// at least one group exists and the active id points at one of them.
    pub fn from_parts(theme: String, layout: Layout, active_group_id: Option<u64>, groups: Vec<Group>) -> Self {
        let last_id = groups
            .iter()
            .flat_map(|group| std::iter::once(group.id).chain(group.timers.iter().map(|t| t.id)))
            .max()
            .unwrap_or(0);

        let mut board = Self {
            theme,
            layout,
            active_group_id: active_group_id.unwrap_or(0),
            groups,
            last_id,
        };

        if board.groups.is_empty() {
            debug!("Stored board has no groups, creating the default one");
            board.push_default_group("Tab 1");
        }
        if board.group(board.active_group_id).is_none() {
            board.active_group_id = board.groups[0].id;
        }
        if board.last_id == u64::MAX {
            warn!("Stored ids leave no room for new ones, renumbering");
            board.renumber_ids();
        }
        board
    }

    /// Hand out a fresh id: wall-clock milliseconds, bumped past anything issued
    pub fn next_id(&mut self) -> u64 {
        let floor = match self.last_id.checked_add(1) {
            Some(floor) => floor,
            None => {
                warn!("Id space exhausted, renumbering every group and timer");
                self.renumber_ids();
                self.last_id + 1
            }
        };
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(floor);
        self.last_id
    }

    /// Give every group and timer a small sequential id, in display order.
    ///
    /// The active group stays selected.
    fn renumber_ids(&mut self) {
        let active = self
            .groups
            .iter()
            .position(|group| group.id == self.active_group_id)
            .unwrap_or(0);

        let mut id = 0;
        for group in &mut self.groups {
            id += 1;
            group.id = id;
            for timer in &mut group.timers {
                id += 1;
                timer.id = id;
            }
        }

        self.active_group_id = self.groups.get(active).map_or(0, |group| group.id);
        self.last_id = id;
    }

    fn push_default_group(&mut self, name: &str) -> u64 {
        let group_id = self.next_id();
        let timer_id = self.next_id();
        self.groups.push(Group::new(group_id, name, timer_id));
        if self.groups.len() == 1 {
            self.active_group_id = group_id;
        }
        group_id
    }

    pub fn group(&self, id: u64) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// The group currently selected for display
    pub fn active_group(&self) -> &Group {
        // from_parts and every mutator keep the active id valid
        self.group(self.active_group_id).unwrap_or(&self.groups[0])
    }

    fn active_group_mut(&mut self) -> &mut Group {
        let active = self.active_group_id;
        let index = self.groups.iter().position(|group| group.id == active).unwrap_or(0);
        &mut self.groups[index]
    }

    fn active_timer_mut(&mut self, id: u64) -> Result<&mut Timer, BoardError> {
        self.active_group_mut()
            .timer_mut(id)
            .ok_or(BoardError::TimerNotFound(id))
    }

    /// Every timer across every group, in display order
    pub fn timers(&self) -> impl Iterator<Item = &Timer> {
        self.groups.iter().flat_map(|group| group.timers.iter())
    }

    /// Create a group with one default timer and make it active.
    ///
    /// Without a name it is called "Tab N" after its position.
    pub fn create_group(&mut self, name: Option<String>) -> Change {
        let name = name.unwrap_or_else(|| format!("Tab {}", self.groups.len() + 1));
        let id = self.push_default_group(&name);
        self.active_group_id = id;
        info!("Created group {} ({})", id, name);
        Change::save_and_render(RenderScope::All)
    }

    pub fn switch_group(&mut self, id: u64) -> Result<Change, BoardError> {
        if self.group(id).is_none() {
            return Err(BoardError::GroupNotFound(id));
        }
        self.active_group_id = id;
        debug!("Switched to group {}", id);
        Ok(Change::save_and_render(RenderScope::All))
    }

    /// Delete the active group and select the first remaining one.
    ///
    /// The last group can never be deleted; that check runs before the
    /// confirmation check so the user hears about it first.
    pub fn delete_active_group(&mut self, confirmed: bool) -> Result<Change, BoardError> {
        if self.groups.len() <= 1 {
            return Err(BoardError::LastGroup);
        }
        if !confirmed {
            return Err(BoardError::ConfirmationRequired("Deleting a tab and all its timers"));
        }

        let removed = self.active_group_id;
        self.groups.retain(|group| group.id != removed);
        self.active_group_id = self.groups[0].id;
        info!("Deleted group {}, active group is now {}", removed, self.active_group_id);
        Ok(Change::save_and_render(RenderScope::All))
    }

    pub fn rename_active_group(&mut self, name: impl Into<String>) -> Change {
        self.active_group_mut().rename(name);
        Change::save_and_render(RenderScope::Tabs)
    }

    /// Append a default timer to the active group, returning its id
    pub fn add_timer(&mut self) -> (u64, Change) {
        let id = self.next_id();
        self.active_group_mut().add_timer(id);
        (id, Change::save_and_render(RenderScope::All))
    }

    /// Remove a timer from the active group. Unknown ids are ignored.
    pub fn delete_timer(&mut self, id: u64) -> Change {
        if !self.active_group_mut().remove_timer(id) {
            debug!("Timer {} not in active group, nothing deleted", id);
        }
        Change::save_and_render(RenderScope::Timers)
    }

    pub fn toggle_timer(&mut self, id: u64) -> Result<Change, BoardError> {
        if !self.active_timer_mut(id)?.toggle_run() {
            return Err(BoardError::TimerEditing(id));
        }
        Ok(Change::save_and_render(RenderScope::Timers))
    }

    pub fn reset_timer(&mut self, id: u64) -> Result<Change, BoardError> {
        self.active_timer_mut(id)?.reset();
        Ok(Change::save_and_render(RenderScope::Timers))
    }

    pub fn begin_edit_timer(&mut self, id: u64, pause: bool) -> Result<Change, BoardError> {
        self.active_timer_mut(id)?.begin_edit(pause);
        Ok(Change::save_and_render(RenderScope::Timers))
    }

    pub fn commit_edit_timer(&mut self, id: u64, hours: i64, minutes: i64, seconds: i64) -> Result<Change, BoardError> {
        let timer = self.active_timer_mut(id)?;
        timer.commit_edit(hours, minutes, seconds);
        debug!("Timer {} duration set to {}s", id, timer.total_duration);
        Ok(Change::save_and_render(RenderScope::Timers))
    }

    /// Name and sound edits are shown in place by the renderer already
    pub fn set_timer_field(&mut self, id: u64, field: TimerField) -> Result<Change, BoardError> {
        self.active_timer_mut(id)?.set_field(field);
        Ok(Change::save_only())
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) -> Change {
        self.theme = theme.into();
        Change::save_and_render(RenderScope::Theme)
    }

    pub fn set_layout(&mut self, layout: Layout) -> Change {
        self.layout = layout;
        Change::save_and_render(RenderScope::Timers)
    }
}

impl Default for TimerBoard {
    fn default() -> Self {
        Self::new()
    }
}
