//! Error types for PNG heightmap I/O.

use fabmap_raster::RasterError;
use thiserror::Error;

/// Errors that can occur when reading or writing heightmap PNGs.
#[derive(Debug, Error)]
pub enum PngError {
    /// I/O error opening or creating a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding error.
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),

    /// PNG decoding error.
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    /// The image is not single-channel greyscale at 8 or 16 bits.
    #[error("Unsupported PNG format: {color:?} at {depth:?}")]
    UnsupportedFormat {
        /// Colour type found in the file.
        color: png::ColorType,
        /// Bit depth found in the file.
        depth: png::BitDepth,
    },

    /// Image dimensions do not fit the PNG header.
    #[error("Image too large: {width}x{height}")]
    TooLarge {
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },

    /// The rows handed to the encoder do not match the declared size.
    #[error("Row buffer is {rows_width}x{rows}, expected {width}x{height}")]
    RowMismatch {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Samples per supplied row.
        rows_width: usize,
        /// Number of supplied rows.
        rows: usize,
    },

    /// The decoded tile could not be built.
    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl From<PngError> for RasterError {
    fn from(err: PngError) -> Self {
        match err {
            PngError::Raster(inner) => inner,
            other => RasterError::Encoder(other.to_string()),
        }
    }
}
