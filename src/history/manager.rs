use std::collections::VecDeque;
use std::fmt;

use crate::edit::Edit;
use crate::error::{EditResult, HistoryError};

/// What [`UndoManager::add_edit`] did with an edit
#[derive(Debug)]
pub enum AddOutcome {
    /// The edit was appended; `evicted` old entries were dropped to stay
    /// within the limit
    Recorded { evicted: usize },
    /// The edit could not be undone, so the whole history was discarded.
    /// The edit is handed back untouched.
    HistoryDiscarded(Box<dyn Edit>),
}

/// A bounded log of edits with a cursor separating done from undone.
///
/// Entries before the cursor are done, entries at and after it are undone
/// and can be redone. Adding an edit drops everything after the cursor;
/// exceeding the limit drops the oldest entry. Dropped edits free their
/// snapshots immediately.
pub struct UndoManager {
    entries: VecDeque<Box<dyn Edit>>,
    cursor: usize,
    limit: usize,
}

impl UndoManager {
    /// `limit` is clamped to at least one entry
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: clamp_limit(limit),
        }
    }

    /// Records an edit that has just been performed
    pub fn add_edit(&mut self, edit: Box<dyn Edit>) -> AddOutcome {
        if !edit.can_undo() {
            log::debug!("'{}' cannot be undone, discarding the history", edit.name());
            self.discard_all_edits();
            return AddOutcome::HistoryDiscarded(edit);
        }

        let redo_tail = self.entries.len() - self.cursor;
        if redo_tail > 0 {
            log::debug!("Dropping {} undone edits", redo_tail);
            self.entries.truncate(self.cursor);
        }

        log::debug!("Adding '{}'", edit.name());
        self.entries.push_back(edit);
        self.cursor = self.entries.len();

        let evicted = self.trim_for_limit();
        AddOutcome::Recorded { evicted }
    }

    /// Undoes the edit before the cursor.
    ///
    /// If the edit itself refuses, the cursor is left where it was.
    pub fn undo(&mut self) -> EditResult {
        if self.cursor == 0 {
            return Err(HistoryError::cannot_undo("there is nothing to undo"));
        }
        self.cursor -= 1;
        let edit = &mut self.entries[self.cursor];
        log::debug!("Undoing '{}'", edit.name());
        if let Err(err) = edit.undo() {
            self.cursor += 1;
            return Err(err);
        }
        Ok(())
    }

    /// Redoes the edit at the cursor
    pub fn redo(&mut self) -> EditResult {
        if self.cursor == self.entries.len() {
            return Err(HistoryError::cannot_redo("there is nothing to redo"));
        }
        let edit = &mut self.entries[self.cursor];
        log::debug!("Redoing '{}'", edit.name());
        edit.redo()?;
        self.cursor += 1;
        Ok(())
    }

    /// Changes the capacity, evicting the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        let limit = clamp_limit(limit);
        if limit != self.limit {
            log::info!("Undo levels changed from {} to {}", self.limit, limit);
        }
        self.limit = limit;
        self.trim_for_limit();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drops every edit
    pub fn discard_all_edits(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Discarding {} edits", self.entries.len());
        }
        self.entries.clear();
        self.cursor = 0;
    }

    fn trim_for_limit(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.limit {
            if let Some(oldest) = self.entries.pop_front() {
                log::debug!(
                    "Evicting '{}', freeing {} bytes",
                    oldest.name(),
                    oldest.memory_size()
                );
            }
            self.cursor = self.cursor.saturating_sub(1);
            evicted += 1;
        }
        evicted
    }

    pub fn can_undo(&self) -> bool {
        self.edit_to_be_undone().is_some_and(|edit| edit.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.edit_to_be_redone().is_some_and(|edit| edit.can_redo())
    }

    /// The most recently added edit, regardless of the cursor
    pub fn last_edit(&self) -> Option<&dyn Edit> {
        self.entries.back().map(|edit| edit.as_ref())
    }

    pub fn last_edit_mut(&mut self) -> Option<&mut (dyn Edit + 'static)> {
        self.entries.back_mut().map(|edit| edit.as_mut())
    }

    pub fn edit_to_be_undone(&self) -> Option<&dyn Edit> {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .map(|edit| edit.as_ref())
    }

    pub fn edit_to_be_redone(&self) -> Option<&dyn Edit> {
        self.entries.get(self.cursor).map(|edit| edit.as_ref())
    }

    /// Menu label for the undo action, e.g. "Undo Brush Tool"
    pub fn undo_presentation_name(&self) -> String {
        presentation_name("Undo", self.edit_to_be_undone())
    }

    /// Menu label for the redo action, e.g. "Redo Brush Tool"
    pub fn redo_presentation_name(&self) -> String {
        presentation_name("Redo", self.edit_to_be_redone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_edits(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of done edits
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Edits from oldest to newest
    pub fn edits(&self) -> impl Iterator<Item = &(dyn Edit + 'static)> + '_ {
        self.entries.iter().map(|edit| edit.as_ref())
    }

    pub fn edit_names(&self) -> Vec<String> {
        self.edits().map(|edit| edit.name().to_string()).collect()
    }

    /// Bytes retained by all snapshots in the log
    pub fn memory_size(&self) -> usize {
        self.entries.iter().map(|edit| edit.memory_size()).sum()
    }

    /// Releases snapshots, oldest first, until the retained total fits in
    /// `budget`. The newest edit keeps its snapshots so that it stays
    /// undoable and fadeable. Returns the bytes freed.
    pub fn trim_snapshot_memory(&mut self, budget: usize) -> usize {
        let mut total = self.memory_size();
        let mut freed = 0;
        let keep = self.entries.len().saturating_sub(1);
        for edit in self.entries.iter_mut().take(keep) {
            if total <= budget {
                break;
            }
            let released = edit.release_snapshots();
            total = total.saturating_sub(released);
            freed += released;
        }
        if freed > 0 {
            log::info!("Released {} bytes of undo snapshots, {} bytes retained", freed, total);
        }
        freed
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_UNDO_LEVELS)
    }
}

impl fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("edits", &self.edit_names())
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .finish()
    }
}

fn clamp_limit(limit: usize) -> usize {
    if limit == 0 {
        log::warn!("Undo levels must be at least 1, using 1");
        1
    } else {
        limit
    }
}

fn presentation_name(action: &str, edit: Option<&dyn Edit>) -> String {
    match edit {
        Some(edit) if !edit.name().is_empty() => format!("{} {}", action, edit.name()),
        _ => action.to_string(),
    }
}
