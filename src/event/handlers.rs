use parking_lot::Mutex;
use std::sync::Arc;

use super::EditListener;
use crate::edit::Edit;

/// Logs every posted edit at debug level
#[derive(Debug, Default)]
pub struct EditLogger;

impl EditListener for EditLogger {
    fn edit_posted(&mut self, edit: Option<&dyn Edit>) {
        match edit {
            Some(edit) => log::debug!("History: posted '{}'", edit.name()),
            None => log::debug!("History: cleared"),
        }
    }
}

/// Remembers the names of posted edits.
///
/// Clones share the same record, so one clone can be subscribed while
/// another is kept to look at what arrived (`None` for a cleared history).
#[derive(Debug, Clone, Default)]
pub struct PostedEdits {
    names: Arc<Mutex<Vec<Option<String>>>>,
}

impl PostedEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<Option<String>> {
        self.names.lock().clone()
    }

    pub fn last(&self) -> Option<Option<String>> {
        self.names.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }
}

impl EditListener for PostedEdits {
    fn edit_posted(&mut self, edit: Option<&dyn Edit>) {
        self.names
            .lock()
            .push(edit.map(|edit| edit.name().to_string()));
    }
}
