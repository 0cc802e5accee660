//! Reading heightmap PNGs back into tiles.

use crate::encoder::BOUNDS_KEYS;
use crate::PngError;
use fabmap_raster::{Bounds, RasterTile};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Load a greyscale PNG as a tile.
///
/// Rows keep file order (top row first), which is the raster order the
/// compositor expects from a source tile. 8-bit images are widened by
/// shifting each sample into the high byte. Bounds are restored when all six
/// bounds text chunks are present.
pub fn read_tile<P: AsRef<Path>>(path: P) -> Result<RasterTile, PngError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let tile = decode_tile(BufReader::new(file))?;

    if tile.bounds().is_none() {
        warn!(path = %path.display(), "PNG has no bounds metadata");
    }
    debug!(
        path = %path.display(),
        width = tile.width(),
        height = tile.height(),
        "read tile"
    );
    Ok(tile)
}

/// Decode a greyscale PNG stream as a tile. See [`read_tile`].
pub fn decode_tile<R: Read>(input: R) -> Result<RasterTile, PngError> {
    let mut decoder = png::Decoder::new(input);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let (color, depth) = reader.output_color_type();
    if color != png::ColorType::Grayscale
        || !matches!(depth, png::BitDepth::Eight | png::BitDepth::Sixteen)
    {
        return Err(PngError::UnsupportedFormat { color, depth });
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let width = frame.width as usize;
    let height = frame.height as usize;

    let mut grid = Vec::with_capacity(width * height);
    for line in buf.chunks(frame.line_size).take(height) {
        match depth {
            png::BitDepth::Sixteen => grid.extend(
                line[..width * 2]
                    .chunks_exact(2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]])),
            ),
            _ => grid.extend(line[..width].iter().map(|&b| u16::from(b) << 8)),
        }
    }

    let bounds = bounds_from_text(
        reader
            .info()
            .uncompressed_latin1_text
            .iter()
            .map(|chunk| (chunk.keyword.as_str(), chunk.text.as_str())),
    );

    let mut tile = RasterTile::from_grid(width, height, grid)?;
    tile.set_bounds(bounds);
    Ok(tile)
}

/// Collect the six bounds from `(keyword, text)` pairs.
///
/// Returns `None` unless every key is present and parses as a number.
pub fn bounds_from_text<'a, I>(chunks: I) -> Option<Bounds>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut values: [Option<f32>; 6] = [None; 6];
    for (keyword, text) in chunks {
        if let Some(slot) = BOUNDS_KEYS.iter().position(|key| *key == keyword) {
            values[slot] = text.trim().parse().ok();
        }
    }

    let mut out = [0.0f32; 6];
    for (dst, value) in out.iter_mut().zip(values) {
        *dst = value?;
    }
    Some(Bounds::from_encoder_array(out))
}
