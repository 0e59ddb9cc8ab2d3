use serde::Serialize;

use crate::edit::Edit;
use crate::layer::LayerId;

/// Serializable snapshot of the history state, for debugging and bug reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDebugInfo {
    pub num_edits: usize,
    pub edits: Vec<EditDebugInfo>,
    pub cursor: usize,
    pub limit: usize,
    pub num_undone_edits: usize,
    pub ignore_edits: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub can_repeat: bool,
    /// The layer the last edit can be faded on, if any
    pub fade_layer: Option<LayerId>,
    pub memory_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditDebugInfo {
    pub id: usize,
    pub name: String,
    pub done: bool,
    pub alive: bool,
    pub memory_size: usize,
    pub sub_edits: Vec<EditDebugInfo>,
}

impl EditDebugInfo {
    pub fn from_edit(edit: &dyn Edit) -> Self {
        let core = edit.core();
        Self {
            id: core.id(),
            name: edit.name().to_string(),
            done: core.is_done(),
            alive: core.is_alive(),
            memory_size: edit.memory_size(),
            sub_edits: edit
                .sub_edits()
                .iter()
                .map(|child| Self::from_edit(child.as_ref()))
                .collect(),
        }
    }
}

impl HistoryDebugInfo {
    pub fn to_json(&self) -> String {
        match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Could not serialize the history state: {}", err);
                String::new()
            }
        }
    }
}
