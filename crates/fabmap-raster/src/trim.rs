//! Clipping a tile to the bounds of another.

use crate::{Bounds, RasterTile};
use std::ops::Range;

/// Number of whole pixels covering `distance` on an axis of `len` pixels
/// spanning `span` physical units. Truncates toward zero and never exceeds
/// `len`.
fn pixels_for(len: usize, distance: f64, span: f64) -> usize {
    let n = (len as f64 * distance / span).trunc();
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        (n as usize).min(len)
    }
}

/// Rows and columns of a tile that survive clipping, with the clipped bounds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrimWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
    pub bounds: Bounds,
}

/// Work out which part of a `width x height` tile with `bounds` survives
/// clipping to `target`, without touching any samples.
///
/// The four edges are handled in order (left, right, bottom, top), and each
/// only when the target edge lies strictly inside the tile. Every step sees
/// the window and bounds left by the previous one.
pub(crate) fn trim_window(
    width: usize,
    height: usize,
    bounds: Bounds,
    target: &Bounds,
) -> TrimWindow {
    let mut b = bounds;
    let mut cols = 0..width;
    let mut rows = 0..height;

    if target.xmin > b.xmin {
        cols.start += pixels_for(cols.len(), target.xmin - b.xmin, b.x_span());
        b.xmin = target.xmin;
    }

    if target.xmax < b.xmax {
        cols.end -= pixels_for(cols.len(), b.xmax - target.xmax, b.x_span());
        b.xmax = target.xmax;
    }

    if target.ymin > b.ymin {
        rows.start += pixels_for(rows.len(), target.ymin - b.ymin, b.y_span());
        b.ymin = target.ymin;
    }

    if target.ymax < b.ymax {
        rows.end -= pixels_for(rows.len(), b.ymax - target.ymax, b.y_span());
        b.ymax = target.ymax;
    }

    TrimWindow { rows, cols, bounds: b }
}

/// Clip a bottom-first tile to `target`.
///
/// Edges are cut in order (left, right, bottom, top); tiles that do not
/// overlap the target end up with an empty grid. A right or top overhang of
/// less than one pixel keeps the edge column or row instead of emptying the
/// axis.
///
/// Tiles without bounds are left untouched.
pub fn trim_to(tile: &mut RasterTile, target: &Bounds) {
    let Some(bounds) = tile.bounds().copied() else {
        return;
    };

    let window = trim_window(tile.width(), tile.height(), bounds, target);
    tile.crop(window.rows, window.cols);
    tile.set_bounds(Some(window.bounds));
}
