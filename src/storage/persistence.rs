//! Persistence adapter: the timer board as one JSON document
//!
//! Saving writes the entire board every time. Loading accepts older or
//! partial documents and fills in whatever top-level field is missing:
//!
//! | Field | Missing → |
//! |-------|-----------|
//! | `theme` | `"theme-dark"` |
//! | `layout` | `"list"` |
//! | `tabs` | a flat `timers` list wrapped in one tab, else no tabs |
//! | `activeTabId` | first tab |
//!
//! A board with no tabs gets the default tab. Text that is not a JSON
//! object at all is reported as [`StorageError::Corrupt`] and left in place;
//! only [`Persistence::clear`] gets rid of it.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{KeyValueStore, StorageError, StorageResult};
use crate::state::{Group, Layout, Timer, TimerBoard, DEFAULT_THEME};

/// Key the board is stored under
pub const STATE_KEY: &str = "tab-timers-state";

/// Stored document with every top-level field optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBoard {
    theme: Option<String>,
    layout: Option<Layout>,
    active_tab_id: Option<u64>,
    tabs: Option<Vec<Group>>,
    /// Single-list documents predating tabs
    timers: Option<Vec<Timer>>,
}

impl StoredBoard {
    fn into_board(self) -> TimerBoard {
        let groups = match (self.tabs, self.timers) {
            (Some(tabs), _) => tabs,
            (None, Some(timers)) => {
                info!("Migrating {} timers from a single-list document", timers.len());
                // An id of u64::MAX leaves nothing above it; from_parts renumbers
                let id = timers
                    .iter()
                    .map(|t| t.id)
                    .max()
                    .unwrap_or(0)
                    .checked_add(1)
                    .unwrap_or(0);
                vec![Group {
                    id,
                    name: "Tab 1".to_string(),
                    timers,
                }]
            }
            (None, None) => Vec::new(),
        };

        let mut board = TimerBoard::from_parts(
            self.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
            self.layout.unwrap_or_default(),
            self.active_tab_id,
            groups,
        );

        for group in &mut board.groups {
            for timer in &mut group.timers {
                if timer.clamp_remaining() {
                    warn!("Timer {} had more time left than its duration, clamped", timer.id);
                }
            }
        }
        board
    }
}

/// Reads and writes the board through a [`KeyValueStore`]
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    /// Load the stored board. `Ok(None)` means nothing has been saved yet.
    pub fn load(&self) -> StorageResult<Option<TimerBoard>> {
        let Some(raw) = self.store.get(STATE_KEY)? else {
            debug!("No stored state in {}", self.store.name());
            return Ok(None);
        };

        let stored: StoredBoard = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let board = stored.into_board();

        info!(
            "Loaded {} groups with {} timers from {}",
            board.groups.len(),
            board.timers().count(),
            self.store.name()
        );
        Ok(Some(board))
    }

    /// Load the stored board or build the default one
    pub fn load_or_default(&self) -> StorageResult<TimerBoard> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Overwrite the stored document with the whole board
    pub fn save(&self, board: &TimerBoard) -> StorageResult<()> {
        let json = serde_json::to_string(board)?;
        self.store.set(STATE_KEY, &json)
    }

    /// Drop the stored document. The caller rebuilds the in-memory board.
    pub fn clear(&self) -> StorageResult<()> {
        info!("Clearing stored state from {}", self.store.name());
        self.store.remove(STATE_KEY)
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("backend", &self.store.name())
            .finish()
    }
}
