//! The undo/redo history: a bounded log of edits with a cursor, and the
//! service that the rest of the application talks to.

mod debug;
mod manager;
mod service;

pub use debug::{EditDebugInfo, HistoryDebugInfo};
pub use manager::{AddOutcome, UndoManager};
pub use service::{HistoryService, SharedHistory};
