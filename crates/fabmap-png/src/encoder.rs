//! 16-bit greyscale PNG heightmap writer.

use crate::PngError;
use fabmap_raster::{HeightmapEncoder, PreviewImage, RasterError, RowPointers};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Text chunk keywords for the six bounds, in encoder array order.
pub const BOUNDS_KEYS: [&str; 6] = ["xmin", "ymin", "zmin", "xmax", "ymax", "zmax"];

/// Writes heightmaps as 16-bit greyscale PNGs.
///
/// The image's top row is the last row handed over (rows arrive bottom row
/// first), and each bound is stored in its own `tEXt` chunk keyed by
/// [`BOUNDS_KEYS`].
#[derive(Debug, Clone, Copy)]
pub struct Png16Encoder {
    compression: png::Compression,
}

impl Default for Png16Encoder {
    fn default() -> Self {
        Self {
            compression: png::Compression::Default,
        }
    }
}

impl Png16Encoder {
    /// Create an encoder with default compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different zlib compression level.
    pub fn with_compression(mut self, compression: png::Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Encode a heightmap into `writer`.
    pub fn write_heightmap<W: Write>(
        &self,
        writer: W,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> Result<(), PngError> {
        if rows.len() != height || rows.width() != width {
            return Err(PngError::RowMismatch {
                width,
                height,
                rows_width: rows.width(),
                rows: rows.len(),
            });
        }
        let (w, h) = png_dimensions(width, height)?;

        let mut encoder = png::Encoder::new(writer, w, h);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Sixteen);
        encoder.set_compression(self.compression);
        for (key, value) in BOUNDS_KEYS.iter().zip(bounds) {
            encoder.add_text_chunk(key.to_string(), value.to_string())?;
        }

        let mut data = Vec::with_capacity(width * height * 2);
        for row in (0..rows.len()).rev().filter_map(|index| rows.get(index)) {
            for sample in row {
                data.extend_from_slice(&sample.to_be_bytes());
            }
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
        Ok(())
    }

    /// Encode a heightmap into a new file at `path`.
    pub fn write_file(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> Result<(), PngError> {
        let file = BufWriter::new(File::create(path)?);
        self.write_heightmap(file, width, height, bounds, rows)?;
        debug!(path = %path.display(), width, height, "wrote 16-bit heightmap");
        Ok(())
    }
}

impl HeightmapEncoder for Png16Encoder {
    fn encode(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> fabmap_raster::Result<()> {
        self.write_file(path, width, height, bounds, rows)
            .map_err(RasterError::from)
    }
}

/// Write an 8-bit RGBA preview image to `path`.
pub fn write_preview(path: &Path, preview: &PreviewImage) -> Result<(), PngError> {
    let file = BufWriter::new(File::create(path)?);
    let (w, h) = png_dimensions(preview.width, preview.height)?;

    let mut encoder = png::Encoder::new(file, w, h);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&preview.pixels)?;
    writer.finish()?;
    debug!(path = %path.display(), w, h, "wrote preview");
    Ok(())
}

fn png_dimensions(width: usize, height: usize) -> Result<(u32, u32), PngError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(PngError::TooLarge { width, height }),
    }
}
