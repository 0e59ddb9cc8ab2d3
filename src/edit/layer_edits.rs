use crate::document::DocumentRef;
use crate::error::{EditResult, HistoryError};
use crate::layer::LayerId;

use super::{Edit, EditCore};

/// Showing a single layer and hiding all the others
#[derive(Debug)]
pub struct IsolateEdit {
    core: EditCore,
    layer: LayerId,
    backup_visibility: Vec<bool>,
}

impl IsolateEdit {
    /// Isolates `layer` and returns the edit describing it, or `None` if the
    /// layer is not part of the document
    pub fn apply(document: &DocumentRef, layer: LayerId) -> Option<Self> {
        let mut doc = document.write();
        let backup_visibility = doc.layer_visibilities();
        if !doc.isolate(layer) {
            return None;
        }
        doc.update();
        let core = EditCore::with_document_id("Isolate", document, doc.id());
        Some(Self {
            core,
            layer,
            backup_visibility,
        })
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }
}

impl Edit for IsolateEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        let mut doc = self.core.document().write();
        if !doc.set_layer_visibilities(&self.backup_visibility) {
            return Err(HistoryError::cannot_undo(format!(
                "expected {} layers, found {}",
                self.backup_visibility.len(),
                doc.num_layers()
            )));
        }
        doc.touch();
        drop(doc);
        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        let mut doc = self.core.document().write();
        if !doc.isolate(self.layer) {
            return Err(HistoryError::cannot_redo(format!("layer {} was removed", self.layer)));
        }
        doc.touch();
        drop(doc);
        self.core.mark_redone();
        Ok(())
    }

    fn can_repeat(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct RenameLayerEdit {
    core: EditCore,
    layer: LayerId,
    old_name: String,
    new_name: String,
}

impl RenameLayerEdit {
    /// Renames the layer, returning `None` if it does not exist or already
    /// has that name
    pub fn apply(document: &DocumentRef, layer: LayerId, new_name: &str) -> Option<Self> {
        let mut doc = document.write();
        let document_id = doc.id();
        let target = doc.layer_mut(layer)?;
        if target.name == new_name {
            return None;
        }
        let old_name = std::mem::replace(&mut target.name, new_name.to_string());
        doc.update();
        Some(Self {
            core: EditCore::with_document_id("Rename Layer", document, document_id),
            layer,
            old_name,
            new_name: new_name.to_string(),
        })
    }

    fn set_name(&self, name: &str) -> bool {
        let mut doc = self.core.document().write();
        let Some(target) = doc.layer_mut(self.layer) else {
            return false;
        };
        target.set_name(name.to_string());
        doc.touch();
        true
    }
}

impl Edit for RenameLayerEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        if !self.set_name(&self.old_name) {
            return Err(HistoryError::cannot_undo(format!("layer {} was removed", self.layer)));
        }
        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        if !self.set_name(&self.new_name) {
            return Err(HistoryError::cannot_redo(format!("layer {} was removed", self.layer)));
        }
        self.core.mark_redone();
        Ok(())
    }

    fn can_repeat(&self) -> bool {
        false
    }
}

/// Translating the pixels of a raster layer on the canvas
#[derive(Debug)]
pub struct MoveLayerEdit {
    core: EditCore,
    layer: LayerId,
    old_offset: (i32, i32),
    new_offset: (i32, i32),
}

impl MoveLayerEdit {
    /// Moves the layer by `(dx, dy)`. Returns `None` for a zero move or a
    /// layer without pixels.
    pub fn apply(document: &DocumentRef, layer: LayerId, dx: i32, dy: i32) -> Option<Self> {
        if dx == 0 && dy == 0 {
            return None;
        }
        let mut doc = document.write();
        let document_id = doc.id();
        let target = doc.layer_mut(layer)?;
        let old_offset = target.offset();
        let new_offset = (old_offset.0 + dx, old_offset.1 + dy);
        if !target.set_offset(new_offset) {
            return None;
        }
        doc.update();
        Some(Self {
            core: EditCore::with_document_id("Move Layer", document, document_id),
            layer,
            old_offset,
            new_offset,
        })
    }

    fn set_offset(&self, offset: (i32, i32)) -> bool {
        let mut doc = self.core.document().write();
        let moved = doc
            .layer_mut(self.layer)
            .is_some_and(|target| target.set_offset(offset));
        if moved {
            doc.touch();
        }
        moved
    }
}

impl Edit for MoveLayerEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        if !self.set_offset(self.old_offset) {
            return Err(HistoryError::cannot_undo(format!("layer {} was removed", self.layer)));
        }
        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        if !self.set_offset(self.new_offset) {
            return Err(HistoryError::cannot_redo(format!("layer {} was removed", self.layer)));
        }
        self.core.mark_redone();
        Ok(())
    }
}
