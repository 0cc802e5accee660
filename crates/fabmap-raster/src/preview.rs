//! 8-bit preview of a heightmap for on-screen display.

use crate::RasterTile;

/// An 8-bit RGBA image, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// RGBA bytes, four per pixel.
    pub pixels: Vec<u8>,
}

/// Convert a bottom-first canvas to a grey RGBA preview.
///
/// Each sample keeps its top 8 bits, replicated into red, green and blue
/// with an opaque alpha. Rows are flipped so the preview is top row first.
pub fn preview_rgba(tile: &RasterTile) -> PreviewImage {
    let mut pixels = Vec::with_capacity(tile.width() * tile.height() * 4);
    for row in tile.rows().rev() {
        for &sample in row {
            let grey = (sample >> 8) as u8;
            pixels.extend_from_slice(&[grey, grey, grey, u8::MAX]);
        }
    }

    PreviewImage {
        width: tile.width(),
        height: tile.height(),
        pixels,
    }
}
