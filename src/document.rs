use image::{RgbaImage, imageops};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::geometry::PixelRect;
use crate::layer::{Layer, LayerId};

/// Shared handle to an open document.
///
/// Edits hold one of these so that undo and redo can reach the pixels they
/// restore. Never call into the history while holding the write lock.
pub type DocumentRef = Arc<RwLock<Document>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open image: an ordered stack of layers plus the bookkeeping the
/// history needs (dirty flag, active layer, update revision).
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    name: String,
    layers: Vec<Layer>,
    active_layer: Option<LayerId>,
    dirty: bool,
    revision: u64,
}

impl Document {
    pub fn new(name: &str) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.to_string(),
            layers: Vec::new(),
            active_layer: None,
            dirty: false,
            revision: 0,
        }
    }

    /// Wraps the document in a shared handle
    pub fn into_ref(self) -> DocumentRef {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a layer on top of the stack and makes it the active one
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        self.layers.push(layer);
        self.active_layer = Some(id);
        id
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer.and_then(|id| self.layer(id))
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer
    }

    /// Returns false if the layer is not part of this document
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.layer(id).is_some() {
            self.active_layer = Some(id);
            true
        } else {
            false
        }
    }

    /// The active layer, if it is one that can be painted on
    pub fn active_drawable(&self) -> Option<LayerId> {
        self.active_layer()
            .filter(|layer| layer.is_drawable())
            .map(|layer| layer.id)
    }

    /// Image-space bounds of a raster layer
    pub fn layer_bounds(&self, id: LayerId) -> Option<PixelRect> {
        self.layer(id).and_then(Layer::bounds)
    }

    /// Copies the pixels of `region` out of a raster layer.
    ///
    /// Returns `None` if the layer has no pixels or the region is not fully
    /// inside its bounds.
    pub fn read_region(&self, id: LayerId, region: PixelRect) -> Option<RgbaImage> {
        let pixels = self.layer(id)?.pixels()?;
        let bounds = PixelRect::from_size(pixels.width(), pixels.height());
        if !bounds.contains_rect(&region) {
            return None;
        }
        let view = imageops::crop_imm(
            pixels,
            region.x as u32,
            region.y as u32,
            region.width as u32,
            region.height as u32,
        );
        Some(view.to_image())
    }

    /// Writes `source` into a raster layer with its top-left corner at the
    /// region origin. The source must match the region size exactly.
    pub fn write_region(&mut self, id: LayerId, region: PixelRect, source: &RgbaImage) -> bool {
        if source.dimensions() != (region.width.max(0) as u32, region.height.max(0) as u32) {
            log::warn!(
                "Snapshot of {:?} does not match region {:?}",
                source.dimensions(),
                region
            );
            return false;
        }
        let Some(pixels) = self.layer_mut(id).and_then(Layer::pixels_mut) else {
            return false;
        };
        let bounds = PixelRect::from_size(pixels.width(), pixels.height());
        if !bounds.contains_rect(&region) {
            return false;
        }
        imageops::replace(pixels, source, region.x as i64, region.y as i64);
        true
    }

    /// Current visibility of every layer, bottom to top
    pub fn layer_visibilities(&self) -> Vec<bool> {
        self.layers.iter().map(|layer| layer.visible).collect()
    }

    /// Restores visibilities captured by [`Self::layer_visibilities`].
    /// Fails if the layer count changed in between.
    pub fn set_layer_visibilities(&mut self, visibilities: &[bool]) -> bool {
        if visibilities.len() != self.layers.len() {
            return false;
        }
        for (layer, visible) in self.layers.iter_mut().zip(visibilities) {
            layer.visible = *visible;
        }
        true
    }

    /// Shows only the given layer and hides every other one
    pub fn isolate(&mut self, id: LayerId) -> bool {
        if self.layer(id).is_none() {
            return false;
        }
        for layer in &mut self.layers {
            layer.visible = layer.id == id;
        }
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Requests a recomposition of the visible image.
    ///
    /// Rendering happens elsewhere; observers compare revisions to find out
    /// whether they have to redraw.
    pub fn update(&mut self) {
        self.revision += 1;
        log::trace!("Document '{}' updated to revision {}", self.name, self.revision);
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Marks the document dirty and requests an update, which is what every
    /// undo and redo has to do after touching the document
    pub fn touch(&mut self) {
        self.set_dirty(true);
        self.update();
    }
}
