use image::{Rgba, RgbaImage};

use crate::error::EditResult;
use crate::layer::LayerId;

/// An edit whose result can be blended back toward the pre-edit pixels
/// ("Fade <name>") without recording a new edit.
pub trait FadeableEdit {
    /// False once the pre-edit snapshot has been discarded
    fn is_fadeable(&self) -> bool;

    /// The layer whose pixels would be blended
    fn fading_layer(&self) -> LayerId;

    /// Replaces the edited pixels with `before` blended toward the edit's
    /// result: 1.0 keeps the full effect, 0.0 restores the pre-edit pixels.
    /// Fading again starts from the unfaded result, so fades never compound.
    fn fade(&mut self, opacity: f32) -> EditResult;
}

/// Linear blend of two equally sized images, `opacity` weighting `after`
pub fn blend(before: &RgbaImage, after: &RgbaImage, opacity: f32) -> RgbaImage {
    debug_assert_eq!(before.dimensions(), after.dimensions());
    let opacity = opacity.clamp(0.0, 1.0);
    RgbaImage::from_fn(before.width(), before.height(), |x, y| {
        let b = before.get_pixel(x, y).0;
        let a = after.get_pixel(x, y).0;
        let mut out = [0u8; 4];
        for channel in 0..4 {
            let value = b[channel] as f32 + (a[channel] as f32 - b[channel] as f32) * opacity;
            out[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    })
}
