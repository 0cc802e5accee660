//! Nearest-neighbour resampling with a linear rescale of the sample values.

use crate::{RasterError, RasterTile, Result};
use std::ops::Range;

/// Output length for an axis of `len` samples zoomed by `scale`.
///
/// Ties round to even, so a 5 pixel axis zoomed by 0.5 becomes 2 pixels.
pub fn scaled_len(len: usize, scale: f64) -> usize {
    let n = (len as f64 * scale).round_ties_even();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Source index read by output index `out` on an axis zoomed by `scale`.
fn source_index(out: usize, scale: f64, len: usize) -> usize {
    let idx = (out as f64 / scale).floor();
    if idx.is_finite() && idx > 0.0 {
        (idx as usize).min(len.saturating_sub(1))
    } else {
        0
    }
}

/// Convert a rescaled sample back to 16 bits.
///
/// Values round half up and saturate at both ends of the `u16` range; NaN
/// becomes zero.
pub fn quantize(value: f64) -> u16 {
    let v = (value + 0.5).floor();
    if v.is_nan() || v <= 0.0 {
        0
    } else if v >= u16::MAX as f64 {
        u16::MAX
    } else {
        v as u16
    }
}

/// Output shape `(rows, cols)` of resampling `tile` by the given scales.
pub(crate) fn scaled_shape(tile: &RasterTile, row_scale: f64, col_scale: f64) -> (usize, usize) {
    if tile.is_empty() {
        (0, 0)
    } else {
        (
            scaled_len(tile.height(), row_scale),
            scaled_len(tile.width(), col_scale),
        )
    }
}

/// Resample a tile by `(row_scale, col_scale)` and multiply every sample by
/// `z_scale`.
///
/// The source is read bottom row first: output row `j` samples flipped row
/// `floor(j / row_scale)`, output column `i` samples column
/// `floor(i / col_scale)`, both clamped to the last index. This converts a
/// top-first raster into the bottom-first layout of a compositing canvas.
///
/// The returned tile keeps the source bounds; only its pixel dimensions
/// change. Fails with [`RasterError::TooLarge`] when the output cannot be
/// allocated.
pub fn resample(
    tile: &RasterTile,
    row_scale: f64,
    col_scale: f64,
    z_scale: f64,
) -> Result<RasterTile> {
    let (rows, cols) = scaled_shape(tile, row_scale, col_scale);
    let mut out = resample_window(tile, row_scale, col_scale, z_scale, 0..rows, 0..cols)?;
    out.set_bounds(tile.bounds().copied());
    Ok(out)
}

/// Resample only the output rows `rows` and columns `cols` of what
/// [`resample`] would produce. The result has no bounds.
pub(crate) fn resample_window(
    tile: &RasterTile,
    row_scale: f64,
    col_scale: f64,
    z_scale: f64,
    rows: Range<usize>,
    cols: Range<usize>,
) -> Result<RasterTile> {
    let (src_rows, src_cols) = tile.shape();
    let (height, width) = if tile.is_empty() {
        (0, 0)
    } else {
        (rows.len(), cols.len())
    };

    let mut out = RasterTile::new(0, 0);
    let too_large = || RasterError::TooLarge {
        rows: height,
        cols: width,
    };
    let len = height.checked_mul(width).ok_or_else(too_large)?;
    if len == 0 {
        out.replace_grid(width, height, Vec::new());
        return Ok(out);
    }

    let mut col_lookup = Vec::new();
    col_lookup.try_reserve_exact(width).map_err(|_| too_large())?;
    col_lookup.extend(cols.map(|i| source_index(i, col_scale, src_cols)));

    let mut grid = Vec::new();
    grid.try_reserve_exact(len).map_err(|_| too_large())?;
    for j in rows {
        let flipped = src_rows - 1 - source_index(j, row_scale, src_rows);
        let src = tile.row(flipped);
        grid.extend(
            col_lookup
                .iter()
                .map(|&i| quantize(src[i] as f64 * z_scale)),
        );
    }

    out.replace_grid(width, height, grid);
    Ok(out)
}
