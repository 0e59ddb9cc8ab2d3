// Shared by several integration test crates, not all of them use everything
#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use paint_history::{
    Document, DocumentRef, Edit, EditCore, EditResult, HistoryConfig, HistoryError,
    HistoryService, Layer, LayerId, PixelRect,
};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn new_history() -> HistoryService {
    init_logging();
    HistoryService::new(HistoryConfig::for_tests())
}

/// A document with one white raster layer of the given size
pub fn document_with_layer(width: u32, height: u32) -> (DocumentRef, LayerId) {
    let mut doc = Document::new("test.png");
    let layer = doc.add_layer(Layer::new_raster(
        "background",
        RgbaImage::from_pixel(width, height, WHITE),
    ));
    (doc.into_ref(), layer)
}

pub fn layer_pixels(doc: &DocumentRef, layer: LayerId) -> RgbaImage {
    doc.read()
        .layer(layer)
        .and_then(|layer| layer.pixels().cloned())
        .unwrap()
}

/// Fills `rect` (image space) with `color` the way a brush tool would, then
/// records the change. Returns whether an edit was added.
pub fn paint(
    history: &mut HistoryService,
    doc: &DocumentRef,
    layer: LayerId,
    rect: PixelRect,
    color: Rgba<u8>,
    name: &str,
) -> bool {
    let original = layer_pixels(doc, layer);
    {
        let mut doc = doc.write();
        let pixels = doc.layer_mut(layer).and_then(Layer::pixels_mut).unwrap();
        for y in rect.y.max(0)..rect.bottom().min(pixels.height() as i32) {
            for x in rect.x.max(0)..rect.right().min(pixels.width() as i32) {
                pixels.put_pixel(x as u32, y as u32, color);
            }
        }
        doc.update();
    }
    history.add_tool_area(rect, &original, doc, layer, true, name)
}

/// An edit that only tracks its state and optionally refuses to undo
#[derive(Debug)]
pub struct NamedEdit {
    core: EditCore,
    fail_undo: bool,
    fail_redo: bool,
}

impl NamedEdit {
    pub fn new(name: &str, doc: &DocumentRef) -> Self {
        Self {
            core: EditCore::new(name, doc),
            fail_undo: false,
            fail_redo: false,
        }
    }

    pub fn boxed(name: &str, doc: &DocumentRef) -> Box<dyn Edit> {
        Box::new(Self::new(name, doc))
    }

    pub fn failing_undo(mut self) -> Self {
        self.fail_undo = true;
        self
    }

    pub fn failing_redo(mut self) -> Self {
        self.fail_redo = true;
        self
    }
}

impl Edit for NamedEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        if self.fail_undo {
            return Err(HistoryError::cannot_undo(format!("{} refuses", self.core.name())));
        }
        self.core.document().write().touch();
        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        if self.fail_redo {
            return Err(HistoryError::cannot_redo(format!("{} refuses", self.core.name())));
        }
        self.core.document().write().touch();
        self.core.mark_redone();
        Ok(())
    }
}
