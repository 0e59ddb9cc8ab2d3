use thiserror::Error;

/// Errors that can occur while moving through the edit history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing left to undo, or the edit is not in an undoable state
    #[error("Cannot undo: {0}")]
    CannotUndo(String),

    /// Nothing left to redo, or the edit is not in a redoable state
    #[error("Cannot redo: {0}")]
    CannotRedo(String),

    /// The edit can no longer be blended with its pre-edit pixels
    #[error("Cannot fade: {0}")]
    CannotFade(String),
}

impl HistoryError {
    pub fn cannot_undo(reason: impl Into<String>) -> Self {
        Self::CannotUndo(reason.into())
    }

    pub fn cannot_redo(reason: impl Into<String>) -> Self {
        Self::CannotRedo(reason.into())
    }

    pub fn cannot_fade(reason: impl Into<String>) -> Self {
        Self::CannotFade(reason.into())
    }

    /// Returns true for the undo flavour of the error
    pub fn is_undo(&self) -> bool {
        matches!(self, Self::CannotUndo(_))
    }
}

/// Result type for edit operations
pub type EditResult = Result<(), HistoryError>;
