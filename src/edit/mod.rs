mod composite;
mod fade;
mod layer_edits;
mod partial;
mod trait_def;

pub use composite::CompositeEdit;
pub use fade::{FadeableEdit, blend};
pub use layer_edits::{IsolateEdit, MoveLayerEdit, RenameLayerEdit};
pub use partial::PartialImageEdit;
pub use trait_def::{Edit, EditCore};
