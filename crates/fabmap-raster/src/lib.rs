//! # fabmap-raster
//!
//! 16-bit height-field tiles and the compositor that assembles them into a
//! single machine-readable heightmap.
//!
//! ## Overview
//!
//! A fabrication job renders its model as several independent tiles, each at
//! whatever resolution and elevation range its own region implies. This
//! crate merges them onto one canvas:
//!
//! 1. The source is resampled (nearest neighbour) to the canvas's pixels per
//!    millimetre, and its samples are rescaled into the canvas's z range.
//! 2. It is trimmed to the canvas bounds and placed by its physical offset.
//! 3. Overlapping samples are max-merged: the taller surface wins, which acts
//!    as a simple depth buffer.
//!
//! The finished canvas is handed to a [`HeightmapEncoder`] as row pointers
//! into its own buffer.
//!
//! ## Orientation
//!
//! Rendered tiles are rasters with row 0 at the top. A canvas is stored
//! bottom row first (row 0 at `ymin`); [`blit_onto`] flips each source while
//! resampling it.
//!
//! ## Example
//!
//! ```
//! use fabmap_raster::{blit_onto, BlitOutcome, Bounds, RasterTile};
//!
//! let mut canvas = RasterTile::new(4, 4).with_bounds(Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 10.0));
//!
//! let tile = RasterTile::from_grid(2, 2, vec![1000; 4])?
//!     .with_bounds(Bounds::new(1.0, 3.0, 1.0, 3.0, 5.0, 15.0));
//!
//! let outcome = blit_onto(&tile, &mut canvas)?;
//! assert!(matches!(outcome, BlitOutcome::Merged(_)));
//! assert_eq!(canvas.get(1, 1), Some(1500));
//! assert_eq!(canvas.get(0, 0), Some(0));
//! # Ok::<(), fabmap_raster::RasterError>(())
//! ```

mod blit;
mod bounds;
mod error;
mod export;
#[cfg(feature = "native")]
mod native;
mod preview;
mod resample;
mod tile;
mod trim;

pub use blit::{blit_onto, pixel_scale, z_scale, BlitOutcome, Compositor, Placement};
pub use bounds::{Bounds, GridRegion, Region};
pub use error::RasterError;
pub use export::{HeightmapEncoder, RowPointers};
#[cfg(feature = "native")]
pub use native::{FnSavePng16L, NativeEncoder, SAVE_PNG16L_SYMBOL};
pub use preview::{preview_rgba, PreviewImage};
pub use resample::{quantize, resample, scaled_len};
pub use tile::RasterTile;
pub use trim::trim_to;

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
