mod bus;
mod handlers;
mod messages;

pub use bus::EditBus;
pub use handlers::{EditLogger, PostedEdits};
pub use messages::{LogMessages, RecordedMessages, UserMessage, UserMessages};

use crate::edit::Edit;

/// Something interested in changes of the history, typically the undo/redo
/// and fade/repeat menu items.
pub trait EditListener: Send {
    /// Called after an edit was recorded. `None` means the history was
    /// cleared.
    fn edit_posted(&mut self, edit: Option<&dyn Edit>);
}
