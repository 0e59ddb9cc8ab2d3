use std::fmt;

use crate::document::{DocumentId, DocumentRef};
use crate::error::{EditResult, HistoryError};
use crate::id_generator::next_edit_id;

use super::FadeableEdit;

/// A single reversible change to a document (Command pattern).
///
/// An edit is created after the mutation it describes has already been
/// performed, so a fresh edit is in the "done" state. The history only ever
/// calls [`undo`](Self::undo) on a done edit and [`redo`](Self::redo) on an
/// undone one; the checks in [`EditCore`] exist to report misuse, not to
/// order calls.
///
/// Both directions must leave the target document dirty and request an
/// update of its composed image.
pub trait Edit: fmt::Debug + Send {
    /// Shared lifecycle state
    fn core(&self) -> &EditCore;

    fn core_mut(&mut self) -> &mut EditCore;

    /// Reverts the effect of the edit
    fn undo(&mut self) -> EditResult;

    /// Reapplies the effect of the edit after an undo
    fn redo(&mut self) -> EditResult;

    /// Display name, used for menu labels and by tests
    fn name(&self) -> &str {
        self.core().name()
    }

    /// The document this edit applies to
    fn document(&self) -> &DocumentRef {
        self.core().document()
    }

    fn can_undo(&self) -> bool {
        self.core().can_undo()
    }

    fn can_redo(&self) -> bool {
        self.core().can_redo()
    }

    /// Whether the operation behind this edit can be repeated on another
    /// target ("Repeat <name>")
    fn can_repeat(&self) -> bool {
        true
    }

    fn is_animatable(&self) -> bool {
        false
    }

    /// Edits grouped under this one, in execution order
    fn sub_edits(&self) -> &[Box<dyn Edit>] {
        &[]
    }

    /// Permanently disables the edit, dropping its retained snapshots
    fn die(&mut self) {
        self.release_snapshots();
        self.core_mut().die();
    }

    /// Bytes held by pixel snapshots
    fn memory_size(&self) -> usize {
        0
    }

    /// Drops retained snapshots to save memory, returning the bytes freed.
    /// An edit without its snapshots can no longer be undone or faded.
    fn release_snapshots(&mut self) -> usize {
        0
    }

    fn as_fadeable(&self) -> Option<&dyn FadeableEdit> {
        None
    }

    fn as_fadeable_mut(&mut self) -> Option<&mut dyn FadeableEdit> {
        None
    }
}

/// State every edit carries: its name, target, and whether it is currently
/// done and still alive.
pub struct EditCore {
    id: usize,
    name: String,
    document: DocumentRef,
    document_id: DocumentId,
    done: bool,
    alive: bool,
}

impl EditCore {
    /// Must not be called while `document` is write-locked
    pub fn new(name: impl Into<String>, document: &DocumentRef) -> Self {
        let document_id = document.read().id();
        Self::with_document_id(name, document, document_id)
    }

    /// For callers that already hold a lock on the document and know its id
    pub fn with_document_id(
        name: impl Into<String>,
        document: &DocumentRef,
        document_id: DocumentId,
    ) -> Self {
        Self {
            id: next_edit_id(),
            name: name.into(),
            document: document.clone(),
            document_id,
            done: true,
            alive: true,
        }
    }

    /// Process-unique sequence number
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn can_undo(&self) -> bool {
        self.alive && self.done
    }

    pub fn can_redo(&self) -> bool {
        self.alive && !self.done
    }

    /// Fails with `CannotUndo` unless the edit is alive and done
    pub fn check_undo(&self) -> EditResult {
        if self.can_undo() {
            Ok(())
        } else if !self.alive {
            Err(HistoryError::cannot_undo(format!("'{}' is no longer available", self.name)))
        } else {
            Err(HistoryError::cannot_undo(format!("'{}' is already undone", self.name)))
        }
    }

    /// Fails with `CannotRedo` unless the edit is alive and undone
    pub fn check_redo(&self) -> EditResult {
        if self.can_redo() {
            Ok(())
        } else if !self.alive {
            Err(HistoryError::cannot_redo(format!("'{}' is no longer available", self.name)))
        } else {
            Err(HistoryError::cannot_redo(format!("'{}' has not been undone", self.name)))
        }
    }

    pub fn mark_undone(&mut self) {
        self.done = false;
    }

    pub fn mark_redone(&mut self) {
        self.done = true;
    }

    pub fn die(&mut self) {
        self.alive = false;
    }
}

impl fmt::Debug for EditCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditCore")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("document", &self.document_id)
            .field("done", &self.done)
            .field("alive", &self.alive)
            .finish()
    }
}
