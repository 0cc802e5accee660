//! Handing a tile's samples to a heightmap encoder.
//!
//! Encoders receive one pointer per row into the tile's own buffer, so
//! nothing is copied on the way out. The pointers borrow the tile and cannot
//! outlive it.

use crate::{RasterTile, Result};
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// One pointer per row into a tile's sample buffer.
///
/// Built by [`RasterTile::row_pointers`]. The layout matches a C
/// `uint16_t**`: [`RowPointers::as_ptr`] can be passed straight to a native
/// encoder.
#[derive(Debug)]
pub struct RowPointers<'a> {
    ptrs: Vec<*const u16>,
    width: usize,
    _tile: PhantomData<&'a [u16]>,
}

impl<'a> RowPointers<'a> {
    /// Pointer to the first row pointer.
    pub fn as_ptr(&self) -> *const *const u16 {
        self.ptrs.as_ptr()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ptrs.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.ptrs.is_empty()
    }

    /// Samples per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the `index`th row in pointer order.
    pub fn get(&self, index: usize) -> Option<&'a [u16]> {
        // SAFETY: every pointer addresses `width` samples of a buffer
        // borrowed for `'a`.
        self.ptrs
            .get(index)
            .map(|&ptr| unsafe { std::slice::from_raw_parts(ptr, self.width) })
    }

    /// Iterate over the rows in pointer order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u16]> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

/// A sink that writes a heightmap to disk.
///
/// `bounds` is `(xmin, ymin, zmin, xmax, ymax, zmax)` and `rows` holds the
/// bottom row first. Any `Fn` with the same signature is an encoder, which
/// lets callers pass a plain closure.
pub trait HeightmapEncoder {
    /// Write `height` rows of `width` samples to `path`.
    fn encode(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> Result<()>;
}

impl<F> HeightmapEncoder for F
where
    F: Fn(&Path, usize, usize, [f32; 6], &RowPointers<'_>) -> Result<()>,
{
    fn encode(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> Result<()> {
        self(path, width, height, bounds, rows)
    }
}

impl RasterTile {
    /// Build row pointers into this tile.
    ///
    /// With `flip_y` the rows come in storage order, which for a canvas is
    /// bottom row first; without it they come last row first.
    pub fn row_pointers(&self, flip_y: bool) -> RowPointers<'_> {
        let mut ptrs: Vec<*const u16> = self.rows().map(|row| row.as_ptr()).collect();
        if self.height() > 0 && ptrs.is_empty() {
            // Zero-width rows still need one (dangling, never read) pointer each
            ptrs = vec![self.as_slice().as_ptr(); self.height()];
        }
        if !flip_y {
            ptrs.reverse();
        }
        RowPointers {
            ptrs,
            width: self.width(),
            _tile: PhantomData,
        }
    }

    /// Write the tile with `encoder`.
    ///
    /// The tile must have bounds; they are passed to the encoder together
    /// with the rows in storage (bottom-first) order.
    pub fn save<E>(&self, path: impl AsRef<Path>, encoder: &E) -> Result<()>
    where
        E: HeightmapEncoder + ?Sized,
    {
        let path = path.as_ref();
        let bounds = self.require_bounds("exported")?;
        let rows = self.row_pointers(true);

        debug!(
            path = %path.display(),
            width = self.width(),
            height = self.height(),
            "saving heightmap"
        );
        encoder.encode(
            path,
            self.width(),
            self.height(),
            bounds.to_encoder_array(),
            &rows,
        )
    }
}
