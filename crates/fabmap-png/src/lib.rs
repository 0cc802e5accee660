//! # fabmap-png
//!
//! PNG I/O for fabmap heightmaps.
//!
//! Heightmaps are stored as 16-bit single-channel greyscale PNGs. The
//! physical bounds travel with the image as six `tEXt` chunks (`xmin`,
//! `ymin`, `zmin`, `xmax`, `ymax`, `zmax`, in millimetres), so a file can be
//! read back as a placed tile.
//!
//! ```no_run
//! use fabmap_png::{read_tile, Png16Encoder};
//!
//! let tile = read_tile("part.png")?;
//! tile.save("copy.png", &Png16Encoder::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod encoder;
mod error;
mod reader;

pub use encoder::{write_preview, Png16Encoder, BOUNDS_KEYS};
pub use error::PngError;
pub use reader::{bounds_from_text, decode_tile, read_tile};
