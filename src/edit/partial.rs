use image::RgbaImage;
use std::fmt;

use crate::document::{Document, DocumentRef};
use crate::error::{EditResult, HistoryError};
use crate::geometry::PixelRect;
use crate::layer::LayerId;

use super::fade::{self, FadeableEdit};
use super::{Edit, EditCore};

/// Undo data for a change confined to a rectangle of one raster layer.
///
/// Only the pixels inside the region are kept, which bounds the memory a
/// local brush stroke costs. The `after` pixels are captured on the first
/// undo or fade, since until then the live layer holds them. After a fade,
/// `faded` holds what the layer shows and is what a redo brings back.
pub struct PartialImageEdit {
    core: EditCore,
    layer: LayerId,
    region: PixelRect,
    before: Option<RgbaImage>,
    after: Option<RgbaImage>,
    faded: Option<RgbaImage>,
}

impl PartialImageEdit {
    /// Captures the pixels of `rect` from `original`, the full layer image as
    /// it was before the change.
    ///
    /// `rect` is in canvas space unless `relative_to_image` is set, in which
    /// case it is already in image space. The region is clipped to the image
    /// bounds; `None` means nothing was captured and nothing should be added
    /// to the history.
    ///
    /// Must not be called while `document` is locked.
    pub fn create(
        name: &str,
        rect: PixelRect,
        original: &RgbaImage,
        document: &DocumentRef,
        layer: LayerId,
        relative_to_image: bool,
    ) -> Option<Self> {
        let doc = document.read();
        let edit = Self::create_locked(name, rect, original, &doc, document, layer, relative_to_image);
        drop(doc);
        edit
    }

    fn create_locked(
        name: &str,
        rect: PixelRect,
        original: &RgbaImage,
        doc: &Document,
        document: &DocumentRef,
        layer: LayerId,
        relative_to_image: bool,
    ) -> Option<Self> {
        if rect.is_empty() {
            log::warn!("'{}': refusing to capture degenerate region {:?}", name, rect);
            return None;
        }

        let Some(target) = doc.layer(layer) else {
            log::warn!("'{}': layer {} is not part of '{}'", name, layer, doc.name());
            return None;
        };
        let mut region = rect;
        if !relative_to_image {
            let (tx, ty) = target.offset();
            region = region.translate(-tx, -ty);
        }

        let bounds = PixelRect::from_size(original.width(), original.height());
        let region = bounds.intersect(&region);
        if region.is_empty() {
            log::debug!("'{}': {:?} lies outside the layer, no edit created", name, rect);
            return None;
        }

        let before = image::imageops::crop_imm(
            original,
            region.x as u32,
            region.y as u32,
            region.width as u32,
            region.height as u32,
        )
        .to_image();
        log::trace!("'{}': captured {:?} ({} bytes)", name, region, before.as_raw().len());

        Some(Self {
            core: EditCore::with_document_id(name, document, doc.id()),
            layer,
            region,
            before: Some(before),
            after: None,
            faded: None,
        })
    }

    /// Image-space region covered by the snapshots
    pub fn region(&self) -> PixelRect {
        self.region
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn before_image(&self) -> Option<&RgbaImage> {
        self.before.as_ref()
    }

    pub fn after_image(&self) -> Option<&RgbaImage> {
        self.after.as_ref()
    }

    /// Makes sure the post-edit pixels are held, reading them from the live
    /// layer if they have not been captured yet
    fn ensure_after(&mut self, doc: &Document) -> Option<&RgbaImage> {
        if self.after.is_none() {
            self.after = doc.read_region(self.layer, self.region);
        }
        self.after.as_ref()
    }
}

impl Edit for PartialImageEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        if self.before.is_none() {
            return Err(HistoryError::cannot_undo(format!(
                "the undo image of '{}' was discarded to save memory",
                self.core.name()
            )));
        }

        let document = self.core.document().clone();
        let mut doc = document.write();
        if self.ensure_after(&doc).is_none() {
            return Err(HistoryError::cannot_undo(format!(
                "layer of '{}' no longer holds {:?}",
                self.core.name(),
                self.region
            )));
        }
        let restored = match &self.before {
            Some(before) => doc.write_region(self.layer, self.region, before),
            None => false,
        };
        if !restored {
            return Err(HistoryError::cannot_undo(format!(
                "could not restore {:?} of '{}'",
                self.region,
                self.core.name()
            )));
        }
        doc.touch();
        drop(doc);

        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        let Some(result) = self.faded.as_ref().or(self.after.as_ref()) else {
            return Err(HistoryError::cannot_redo(format!(
                "the redo image of '{}' is missing",
                self.core.name()
            )));
        };

        let mut doc = self.core.document().write();
        if !doc.write_region(self.layer, self.region, result) {
            return Err(HistoryError::cannot_redo(format!(
                "could not reapply {:?} of '{}'",
                self.region,
                self.core.name()
            )));
        }
        doc.touch();
        drop(doc);

        self.core.mark_redone();
        Ok(())
    }

    fn memory_size(&self) -> usize {
        let size = |image: &Option<RgbaImage>| image.as_ref().map_or(0, |i| i.as_raw().len());
        size(&self.before) + size(&self.after) + size(&self.faded)
    }

    fn release_snapshots(&mut self) -> usize {
        let freed = self.memory_size();
        self.before = None;
        self.after = None;
        self.faded = None;
        if freed > 0 {
            log::debug!("'{}': released {} bytes of snapshots", self.core.name(), freed);
        }
        freed
    }

    fn as_fadeable(&self) -> Option<&dyn FadeableEdit> {
        Some(self)
    }

    fn as_fadeable_mut(&mut self) -> Option<&mut dyn FadeableEdit> {
        Some(self)
    }
}

impl FadeableEdit for PartialImageEdit {
    fn is_fadeable(&self) -> bool {
        self.before.is_some()
    }

    fn fading_layer(&self) -> LayerId {
        self.layer
    }

    fn fade(&mut self, opacity: f32) -> EditResult {
        if !self.core.can_undo() {
            return Err(HistoryError::cannot_fade(format!(
                "'{}' is not the current state of its layer",
                self.core.name()
            )));
        }
        if self.before.is_none() {
            return Err(HistoryError::cannot_fade(format!(
                "the undo image of '{}' was discarded",
                self.core.name()
            )));
        }

        let document = self.core.document().clone();
        let mut doc = document.write();
        self.ensure_after(&doc);
        let blended = match (&self.before, &self.after) {
            (Some(before), Some(after)) => fade::blend(before, after, opacity),
            _ => {
                return Err(HistoryError::cannot_fade(format!(
                    "layer of '{}' no longer holds {:?}",
                    self.core.name(),
                    self.region
                )));
            }
        };
        if !doc.write_region(self.layer, self.region, &blended) {
            return Err(HistoryError::cannot_fade(format!(
                "could not write {:?} of '{}'",
                self.region,
                self.core.name()
            )));
        }
        doc.touch();
        drop(doc);
        self.faded = Some(blended);
        log::debug!("Faded '{}' to {:.0}%", self.core.name(), opacity.clamp(0.0, 1.0) * 100.0);
        Ok(())
    }
}

impl fmt::Debug for PartialImageEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialImageEdit")
            .field("core", &self.core)
            .field("layer", &self.layer)
            .field("region", &self.region)
            .field("has_before", &self.before.is_some())
            .field("has_after", &self.after.is_some())
            .field("faded", &self.faded.is_some())
            .finish()
    }
}
