mod rect;

pub use rect::PixelRect;
