//! Error types for the raster crate.

use thiserror::Error;

/// Errors that can occur when building, compositing or exporting tiles.
#[derive(Debug, Error)]
pub enum RasterError {
    /// A tile taking part in an operation has no physical bounds.
    #[error("Tile has no bounds set ({role})")]
    MissingBounds {
        /// Which side of the operation the tile was on ("source", "target", ...).
        role: &'static str,
    },

    /// Bounds with an empty or inverted x or y range.
    #[error("Degenerate {role} bounds: x {xmin}..{xmax}, y {ymin}..{ymax}")]
    DegenerateBounds {
        /// Which side of the operation the tile was on.
        role: &'static str,
        /// Minimum x.
        xmin: f64,
        /// Maximum x.
        xmax: f64,
        /// Minimum y.
        ymin: f64,
        /// Maximum y.
        ymax: f64,
    },

    /// A sample buffer does not match the declared tile dimensions.
    #[error("Grid has {actual} samples, expected {width}x{height}")]
    GridShape {
        /// Declared width in pixels.
        width: usize,
        /// Declared height in pixels.
        height: usize,
        /// Number of samples actually supplied.
        actual: usize,
    },

    /// A region axis has fewer coordinate boundaries than its cell count needs.
    #[error("Region axis {axis} has {len} coordinates, need at least {needed}")]
    RegionAxis {
        /// Axis name ("x", "y" or "z").
        axis: char,
        /// Length of the coordinate slice.
        len: usize,
        /// Required length (cell count + 1).
        needed: usize,
    },

    /// A resampled tile would not fit in memory.
    #[error("Resampled tile of {rows}x{cols} pixels is too large")]
    TooLarge {
        /// Rows requested.
        rows: usize,
        /// Columns requested.
        cols: usize,
    },

    /// The heightmap encoder failed.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Failed to load the native encoder library.
    #[error("Failed to load encoder library: {0}")]
    LibraryLoad(String),

    /// The native encoder library does not export the expected symbol.
    #[error("Symbol not found in encoder library: {0}")]
    SymbolNotFound(String),
}
