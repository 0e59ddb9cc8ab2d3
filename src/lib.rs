#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod consistency;
pub mod document;
pub mod edit;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod layer;
mod id_generator;

pub use config::{HistoryConfig, Preferences};
pub use document::{Document, DocumentId, DocumentRef};
pub use edit::{CompositeEdit, Edit, EditCore, FadeableEdit, PartialImageEdit};
pub use error::{EditResult, HistoryError};
pub use event::{EditBus, EditListener, UserMessages};
pub use geometry::PixelRect;
pub use history::{AddOutcome, HistoryService, SharedHistory, UndoManager};
pub use layer::{Layer, LayerId};
