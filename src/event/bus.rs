use std::fmt;

use super::EditListener;
use crate::edit::Edit;

/// Broadcasts history changes to registered listeners
pub struct EditBus {
    listeners: Vec<Box<dyn EditListener>>,
}

impl fmt::Debug for EditBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditBus")
            .field("listeners", &format!("<{} listeners>", self.listeners.len()))
            .finish()
    }
}

impl Default for EditBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EditBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Subscribe a listener to receive posted edits
    pub fn subscribe(&mut self, listener: Box<dyn EditListener>) {
        self.listeners.push(listener);
    }

    /// Post an edit, or `None` for a cleared history, to all listeners
    pub fn post(&mut self, edit: Option<&dyn Edit>) {
        for listener in &mut self.listeners {
            listener.edit_posted(edit);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
