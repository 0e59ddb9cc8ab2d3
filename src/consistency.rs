//! Internal consistency checks.
//!
//! These run after every recorded edit when
//! [`HistoryConfig::consistency_checks`](crate::config::HistoryConfig) is
//! on (the default in debug builds) and turn silent corruption, such as a
//! composite edit that failed halfway, into an immediate failure.

use std::collections::HashSet;
use thiserror::Error;

use crate::document::Document;
use crate::edit::Edit;
use crate::history::UndoManager;
use crate::layer::LayerId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("active layer {0} is not part of the document")]
    ActiveLayerMissing(LayerId),

    #[error("layer id {0} is used more than once")]
    DuplicateLayerId(LayerId),

    #[error("raster layer {0} has no pixels")]
    EmptyRaster(LayerId),

    #[error("history cursor {cursor} is beyond its {len} edits")]
    CursorOutOfRange { cursor: usize, len: usize },

    #[error("history holds {len} edits but the limit is {limit}")]
    LimitExceeded { len: usize, limit: usize },

    #[error("edit '{name}' is undone although the history counts it as done")]
    DoneEditUndone { name: String },

    #[error("edit '{name}' is done although the history counts it as undone")]
    UndoneEditDone { name: String },
}

/// Checks the invariants of a document
pub fn check_document(doc: &Document) -> Result<(), ConsistencyError> {
    if let Some(active) = doc.active_layer_id() {
        if doc.layer(active).is_none() {
            return Err(ConsistencyError::ActiveLayerMissing(active));
        }
    }

    let mut seen = HashSet::new();
    for layer in doc.layers() {
        if !seen.insert(layer.id) {
            return Err(ConsistencyError::DuplicateLayerId(layer.id));
        }
        if let Some(bounds) = layer.bounds() {
            if bounds.is_empty() {
                return Err(ConsistencyError::EmptyRaster(layer.id));
            }
        }
    }
    Ok(())
}

/// Checks the cursor and capacity invariants of the log, and that every
/// live edit agrees with the cursor about whether it is done
pub fn check_manager(manager: &UndoManager) -> Result<(), ConsistencyError> {
    let len = manager.len();
    let cursor = manager.cursor();
    if cursor > len {
        return Err(ConsistencyError::CursorOutOfRange { cursor, len });
    }
    if len > manager.limit() {
        return Err(ConsistencyError::LimitExceeded {
            len,
            limit: manager.limit(),
        });
    }

    for (index, edit) in manager.edits().enumerate() {
        check_done_state(edit, index < cursor)?;
    }
    Ok(())
}

// Composite edits must agree with all of their children
fn check_done_state(edit: &dyn Edit, expect_done: bool) -> Result<(), ConsistencyError> {
    let core = edit.core();
    if !core.is_alive() {
        return Ok(());
    }
    if expect_done && !core.is_done() {
        return Err(ConsistencyError::DoneEditUndone {
            name: edit.name().to_string(),
        });
    }
    if !expect_done && core.is_done() {
        return Err(ConsistencyError::UndoneEditDone {
            name: edit.name().to_string(),
        });
    }
    for child in edit.sub_edits() {
        check_done_state(child.as_ref(), expect_done)?;
    }
    Ok(())
}

/// Runs all checks that concern one document and the log
pub fn check_all(doc: &Document, manager: &UndoManager) -> Result<(), ConsistencyError> {
    check_document(doc)?;
    check_manager(manager)
}
