mod persistence;

pub use persistence::{Preferences, PreferencesError, PreferencesResult};

use serde::{Deserialize, Serialize};

/// Undo depth used when no preference has been saved
pub const DEFAULT_UNDO_LEVELS: usize = 5;

/// Undo depth for test runs, deep enough for multi-step scenarios
pub const TEST_UNDO_LEVELS: usize = 15;

/// Settings of the history engine.
///
/// We derive Deserialize/Serialize so the settings can be persisted with the
/// user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct HistoryConfig {
    /// Maximum number of edits kept in the history
    pub undo_levels: usize,
    /// Run the consistency checks after every added edit and panic on a
    /// violation
    pub consistency_checks: bool,
    /// Upper bound for the bytes held by undo snapshots. When exceeded,
    /// snapshots of older edits are released.
    pub snapshot_memory_budget: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_levels: DEFAULT_UNDO_LEVELS,
            consistency_checks: cfg!(debug_assertions),
            snapshot_memory_budget: None,
        }
    }
}

impl HistoryConfig {
    pub fn for_tests() -> Self {
        Self {
            undo_levels: TEST_UNDO_LEVELS,
            consistency_checks: true,
            snapshot_memory_budget: None,
        }
    }

    pub fn with_undo_levels(mut self, undo_levels: usize) -> Self {
        self.undo_levels = undo_levels;
        self
    }

    pub fn with_snapshot_memory_budget(mut self, budget: usize) -> Self {
        self.snapshot_memory_budget = Some(budget);
        self
    }
}
