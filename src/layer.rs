use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::PixelRect;

/// A unique identifier for a layer.
///
/// Edits refer to layers by id rather than by reference, so an edit never
/// keeps a layer alive and identity comparisons survive layer reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a layer holds
#[derive(Clone)]
pub enum LayerContent {
    /// Pixel data positioned on the canvas by a translation offset
    Raster {
        pixels: RgbaImage,
        offset: (i32, i32),
    },
    /// A non-drawable layer that only changes how layers below are shown
    Adjustment { kind: String },
}

impl PartialEq for LayerContent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                LayerContent::Raster { pixels: a, offset: oa },
                LayerContent::Raster { pixels: b, offset: ob },
            ) => oa == ob && a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw(),
            (LayerContent::Adjustment { kind: a }, LayerContent::Adjustment { kind: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for LayerContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerContent::Raster { pixels, offset } => f
                .debug_struct("Raster")
                .field("size", &pixels.dimensions())
                .field("offset", offset)
                .field("pixels", &"<pixels>")
                .finish(),
            LayerContent::Adjustment { kind } => {
                f.debug_struct("Adjustment").field("kind", kind).finish()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Whether the layer is currently visible
    pub visible: bool,
    /// Content of the layer
    pub content: LayerContent,
}

impl Layer {
    pub fn new_raster(name: &str, pixels: RgbaImage) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            content: LayerContent::Raster {
                pixels,
                offset: (0, 0),
            },
        }
    }

    pub fn new_adjustment(name: &str, kind: &str) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            content: LayerContent::Adjustment {
                kind: kind.to_string(),
            },
        }
    }

    /// Builder-style canvas offset for raster layers
    pub fn with_offset(mut self, dx: i32, dy: i32) -> Self {
        self.set_offset((dx, dy));
        self
    }

    /// True for layers that can be painted on
    pub fn is_drawable(&self) -> bool {
        matches!(self.content, LayerContent::Raster { .. })
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        match &self.content {
            LayerContent::Raster { pixels, .. } => Some(pixels),
            LayerContent::Adjustment { .. } => None,
        }
    }

    pub fn pixels_mut(&mut self) -> Option<&mut RgbaImage> {
        match &mut self.content {
            LayerContent::Raster { pixels, .. } => Some(pixels),
            LayerContent::Adjustment { .. } => None,
        }
    }

    /// Translation of the pixel data relative to the canvas
    pub fn offset(&self) -> (i32, i32) {
        match &self.content {
            LayerContent::Raster { offset, .. } => *offset,
            LayerContent::Adjustment { .. } => (0, 0),
        }
    }

    /// Returns false for layers without pixel data
    pub fn set_offset(&mut self, new_offset: (i32, i32)) -> bool {
        match &mut self.content {
            LayerContent::Raster { offset, .. } => {
                *offset = new_offset;
                true
            }
            LayerContent::Adjustment { .. } => false,
        }
    }

    /// Bounds of the pixel data in image space
    pub fn bounds(&self) -> Option<PixelRect> {
        self.pixels()
            .map(|pixels| PixelRect::from_size(pixels.width(), pixels.height()))
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
