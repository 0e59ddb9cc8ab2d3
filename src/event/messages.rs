use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::HistoryError;

/// A message meant for the person using the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    Info { title: String, message: String },
    Error(String),
}

/// Where the history reports failed undo and redo requests.
///
/// A failed undo is expected (the snapshot may have been dropped to save
/// memory) and shown as information; a failed redo is unexpected and shown
/// as an error. Neither ends the session.
pub trait UserMessages: Send {
    fn show_info(&mut self, title: &str, message: &str);

    fn show_error(&mut self, error: &HistoryError);
}

/// Default sink that writes messages to the log
#[derive(Debug, Default)]
pub struct LogMessages;

impl UserMessages for LogMessages {
    fn show_info(&mut self, title: &str, message: &str) {
        log::info!("{}: {}", title, message);
    }

    fn show_error(&mut self, error: &HistoryError) {
        log::error!("{}", error);
    }
}

/// Collects messages instead of showing them. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordedMessages {
    messages: Arc<Mutex<Vec<UserMessage>>>,
}

impl RecordedMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<UserMessage> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl UserMessages for RecordedMessages {
    fn show_info(&mut self, title: &str, message: &str) {
        self.messages.lock().push(UserMessage::Info {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn show_error(&mut self, error: &HistoryError) {
        self.messages.lock().push(UserMessage::Error(error.to_string()));
    }
}
