//! The 16-bit height-field tile.

use crate::bounds::{axis_range, Bounds, Region};
use crate::{RasterError, Result};

/// A 16-bit single-channel height field with optional physical bounds.
///
/// Samples are stored row-major in one contiguous buffer of
/// `width * height` values. Row 0 is the first row of the raster: tiles fresh
/// from a renderer or a PNG file are top-first, while a compositing canvas is
/// bottom-first (row 0 at `ymin`), see [`crate::blit_onto`].
///
/// `Clone` produces a deep copy; a clone never shares samples with the
/// original.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    /// Samples in row-major order.
    grid: Vec<u16>,
    /// Width of the tile in pixels (columns).
    width: usize,
    /// Height of the tile in pixels (rows).
    height: usize,
    /// Physical bounds, in millimetres.
    bounds: Option<Bounds>,
}

impl RasterTile {
    /// Create a zero-filled tile without bounds.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: vec![0; width * height],
            width,
            height,
            bounds: None,
        }
    }

    /// Adopt an existing row-major sample buffer.
    pub fn from_grid(width: usize, height: usize, grid: Vec<u16>) -> Result<Self> {
        if grid.len() != width * height {
            return Err(RasterError::GridShape {
                width,
                height,
                actual: grid.len(),
            });
        }
        Ok(Self {
            grid,
            width,
            height,
            bounds: None,
        })
    }

    /// Create a zero-filled tile covering a region.
    ///
    /// The tile is `ni x nj` pixels and its bounds are the first and last
    /// boundary of each axis multiplied by `unit_scale` (millimetres per
    /// region unit).
    pub fn from_region<R: Region + ?Sized>(region: &R, unit_scale: f64) -> Result<Self> {
        let (xmin, xmax) = axis_range('x', region.x(), region.ni(), unit_scale)?;
        let (ymin, ymax) = axis_range('y', region.y(), region.nj(), unit_scale)?;
        let (zmin, zmax) = axis_range('z', region.z(), region.nk(), unit_scale)?;

        Ok(Self::new(region.ni(), region.nj())
            .with_bounds(Bounds::new(xmin, xmax, ymin, ymax, zmin, zmax)))
    }

    /// Builder-style setter for the bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Get the physical bounds, if set.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Get mutable access to the bounds, if set.
    pub fn bounds_mut(&mut self) -> Option<&mut Bounds> {
        self.bounds.as_mut()
    }

    /// Replace (or clear) the bounds.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    /// Get the bounds or fail with [`RasterError::MissingBounds`].
    pub(crate) fn require_bounds(&self, role: &'static str) -> Result<Bounds> {
        self.bounds.ok_or(RasterError::MissingBounds { role })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// True when the tile holds no samples.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Get the sample at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<u16> {
        if row < self.height && col < self.width {
            Some(self.grid[row * self.width + col])
        } else {
            None
        }
    }

    /// Set the sample at `(row, col)`. Out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: u16) {
        if row < self.height && col < self.width {
            self.grid[row * self.width + col] = value;
        }
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: u16) {
        self.grid.fill(value);
    }

    /// Borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    pub fn row(&self, row: usize) -> &[u16] {
        let start = row * self.width;
        &self.grid[start..start + self.width]
    }

    /// Mutably borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    pub fn row_mut(&mut self, row: usize) -> &mut [u16] {
        let start = row * self.width;
        &mut self.grid[start..start + self.width]
    }

    /// Iterate over the rows in storage order.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u16]> + ExactSizeIterator {
        // chunks_exact(0) panics, and an empty grid has no rows anyway
        let width = self.width.max(1);
        self.grid.chunks_exact(width).take(self.height)
    }

    /// The whole sample buffer in row-major order.
    pub fn as_slice(&self) -> &[u16] {
        &self.grid
    }

    /// Reverse the row order in place, converting between top-first and
    /// bottom-first layouts.
    pub fn flip_rows(&mut self) {
        let width = self.width;
        if width == 0 {
            return;
        }
        let (mut top, mut bottom) = (0, self.height);
        while top + 1 < bottom {
            bottom -= 1;
            let (head, tail) = self.grid.split_at_mut(bottom * width);
            head[top * width..(top + 1) * width].swap_with_slice(&mut tail[..width]);
            top += 1;
        }
    }

    /// Largest sample, or `None` for an empty tile.
    pub fn max_sample(&self) -> Option<u16> {
        self.grid.iter().copied().max()
    }

    /// Replace the samples and dimensions together.
    pub(crate) fn replace_grid(&mut self, width: usize, height: usize, grid: Vec<u16>) {
        debug_assert_eq!(grid.len(), width * height);
        self.grid = grid;
        self.width = width;
        self.height = height;
    }

    /// Keep only the window of rows `rows` and columns `cols`.
    ///
    /// Ranges are clamped to the current shape; an inverted range leaves an
    /// empty dimension.
    pub(crate) fn crop(&mut self, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) {
        let row_end = rows.end.min(self.height);
        let row_start = rows.start.min(row_end);
        let col_end = cols.end.min(self.width);
        let col_start = cols.start.min(col_end);

        if row_start == 0 && row_end == self.height && col_start == 0 && col_end == self.width {
            return;
        }

        let new_width = col_end - col_start;
        let new_height = row_end - row_start;
        let mut grid = Vec::with_capacity(new_width * new_height);
        for j in row_start..row_end {
            let start = j * self.width;
            grid.extend_from_slice(&self.grid[start + col_start..start + col_end]);
        }
        self.replace_grid(new_width, new_height, grid);
    }
}
