//! Max-merge compositing of height-field tiles.
//!
//! A source tile is painted onto a target after reconciling the two tiles'
//! pixel density and elevation range. Where both have a sample the larger
//! value wins, so a tile that is physically closer to the viewer covers the
//! one behind it without any depth bookkeeping beyond the bounds.

use crate::resample::{resample_window, scaled_shape};
use crate::trim::trim_window;
use crate::{Bounds, RasterTile, Result};
use tracing::{debug, trace};

/// Where a source tile landed in the target grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// First target row written.
    pub row: usize,
    /// First target column written.
    pub col: usize,
    /// Number of rows in the merge window.
    pub rows: usize,
    /// Number of columns in the merge window.
    pub cols: usize,
}

impl Placement {
    /// True when the merge window holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Check whether the target pixel `(row, col)` is inside the window.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.rows).contains(&row)
            && (self.col..self.col + self.cols).contains(&col)
    }
}

/// Result of a single [`blit_onto`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitOutcome {
    /// A pixel density ratio was zero; the target was left untouched.
    Skipped,
    /// The source was merged into this window (which may be empty).
    Merged(Placement),
}

/// Factor that maps source samples into the target's elevation range.
///
/// A flat target (`zmax == zmin`) uses a factor of 1.
pub fn z_scale(source: &Bounds, target: &Bounds) -> f64 {
    let span = target.z_span();
    if span == 0.0 {
        1.0
    } else {
        (source.zmax - target.zmin) / span
    }
}

/// Ratio of target to source pixels per physical unit, as
/// `(row_scale, col_scale)`.
pub fn pixel_scale(
    source: &RasterTile,
    source_bounds: &Bounds,
    target: &RasterTile,
    target_bounds: &Bounds,
) -> (f64, f64) {
    let row_scale = (target.height() as f64 / target_bounds.y_span())
        / (source.height() as f64 / source_bounds.y_span());
    let col_scale = (target.width() as f64 / target_bounds.x_span())
        / (source.width() as f64 / source_bounds.x_span());
    (row_scale, col_scale)
}

/// Offset in target pixels of physical coordinate `at` on an axis of `len`
/// pixels starting at `origin` and spanning `span`.
fn offset(len: usize, at: f64, origin: f64, span: f64) -> usize {
    let n = (len as f64 * (at - origin) / span).trunc();
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        (n as usize).min(len)
    }
}

/// Paint `source` onto `target`, keeping the larger sample wherever they
/// overlap.
///
/// `source` is a top-first raster; `target` is a bottom-first canvas with
/// row 0 at its `ymin` edge. The source is resampled to the target's pixel
/// density (flipping it into canvas order and rescaling its values into the
/// target's z range), trimmed to the target's bounds, placed, and
/// max-merged. The target is modified in place.
///
/// Both tiles must have bounds with non-empty x and y ranges. When either
/// pixel density ratio is zero nothing happens and [`BlitOutcome::Skipped`]
/// is returned. Rounding at the edges can make the source a pixel larger
/// than the space left in the target; the source is then cut down to fit.
pub fn blit_onto(source: &RasterTile, target: &mut RasterTile) -> Result<BlitOutcome> {
    let source_bounds = source.require_bounds("source")?;
    let target_bounds = target.require_bounds("target")?;
    source_bounds.validate("source")?;
    target_bounds.validate("target")?;

    let z = z_scale(&source_bounds, &target_bounds);
    let (row_scale, col_scale) = pixel_scale(source, &source_bounds, target, &target_bounds);

    if row_scale == 0.0 || col_scale == 0.0 {
        trace!(row_scale, col_scale, "zero pixel scale, skipping tile");
        return Ok(BlitOutcome::Skipped);
    }

    // Only the part of the resampled source that lands on the target is ever
    // built; the full resampled size can be far larger than either tile.
    let (full_rows, full_cols) = scaled_shape(source, row_scale, col_scale);
    let window = trim_window(full_cols, full_rows, source_bounds, &target_bounds);

    let col = offset(
        target.width(),
        window.bounds.xmin,
        target_bounds.xmin,
        target_bounds.x_span(),
    );
    let row = offset(
        target.height(),
        window.bounds.ymin,
        target_bounds.ymin,
        target_bounds.y_span(),
    );

    let rows = window.rows.len().min(target.height() - row);
    let cols = window.cols.len().min(target.width() - col);
    let placed = resample_window(
        source,
        row_scale,
        col_scale,
        z,
        window.rows.start..window.rows.start + rows,
        window.cols.start..window.cols.start + cols,
    )?;

    for j in 0..rows {
        let src = placed.row(j);
        let dst = &mut target.row_mut(row + j)[col..col + cols];
        for (d, &s) in dst.iter_mut().zip(src) {
            if s > *d {
                *d = s;
            }
        }
    }

    let placement = Placement { row, col, rows, cols };
    debug!(
        z_scale = z,
        row_scale,
        col_scale,
        row,
        col,
        rows,
        cols,
        "merged tile"
    );
    Ok(BlitOutcome::Merged(placement))
}

/// Accumulates tiles onto one canvas.
///
/// A thin wrapper around [`blit_onto`] that owns the canvas and keeps count
/// of what happened to each tile.
#[derive(Debug, Clone)]
pub struct Compositor {
    canvas: RasterTile,
    merged: usize,
    skipped: usize,
}

impl Compositor {
    /// Start compositing onto `canvas`, which must have bounds.
    pub fn new(canvas: RasterTile) -> Result<Self> {
        canvas.require_bounds("target")?.validate("target")?;
        Ok(Self {
            canvas,
            merged: 0,
            skipped: 0,
        })
    }

    /// Merge one tile onto the canvas.
    pub fn blit(&mut self, source: &RasterTile) -> Result<BlitOutcome> {
        let outcome = blit_onto(source, &mut self.canvas)?;
        match outcome {
            BlitOutcome::Skipped => self.skipped += 1,
            BlitOutcome::Merged(_) => self.merged += 1,
        }
        Ok(outcome)
    }

    /// The canvas as composited so far.
    pub fn canvas(&self) -> &RasterTile {
        &self.canvas
    }

    /// Number of tiles merged (including ones whose window was empty).
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Number of tiles skipped because of a zero pixel scale.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish compositing and return the canvas.
    pub fn finish(self) -> RasterTile {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RasterError;
    use approx::assert_relative_eq;

    fn canvas(width: usize, height: usize, bounds: Bounds) -> RasterTile {
        RasterTile::new(width, height).with_bounds(bounds)
    }

    fn filled(width: usize, height: usize, value: u16, bounds: Bounds) -> RasterTile {
        RasterTile::from_grid(width, height, vec![value; width * height])
            .unwrap()
            .with_bounds(bounds)
    }

    #[test]
    fn test_z_scale() {
        let target = Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 10.0);
        let source = Bounds::new(0.0, 1.0, 0.0, 1.0, 5.0, 15.0);
        assert_relative_eq!(z_scale(&source, &target), 1.5);

        let flat = Bounds::new(0.0, 1.0, 0.0, 1.0, 3.0, 3.0);
        assert_eq!(z_scale(&source, &flat), 1.0);
    }

    #[test]
    fn test_pixel_scale() {
        let target = canvas(8, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0));
        let source = canvas(2, 2, Bounds::new(0.0, 2.0, 0.0, 2.0, 0.0, 1.0));
        let (row_scale, col_scale) = pixel_scale(
            &source,
            source.bounds().unwrap(),
            &target,
            target.bounds().unwrap(),
        );
        assert_relative_eq!(row_scale, 1.0);
        assert_relative_eq!(col_scale, 2.0);
    }

    #[test]
    fn test_centered_tile() {
        let mut target = canvas(4, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 10.0));
        let source = filled(2, 2, 1000, Bounds::new(1.0, 3.0, 1.0, 3.0, 5.0, 15.0));

        let outcome = blit_onto(&source, &mut target).unwrap();
        assert_eq!(
            outcome,
            BlitOutcome::Merged(Placement { row: 1, col: 1, rows: 2, cols: 2 })
        );

        for j in 0..4 {
            for i in 0..4 {
                let expected = if (1..=2).contains(&j) && (1..=2).contains(&i) { 1500 } else { 0 };
                assert_eq!(target.get(j, i), Some(expected), "pixel ({j}, {i})");
            }
        }
        assert_eq!(target.bounds().unwrap().zmax, 10.0);
    }

    #[test]
    fn test_lower_samples_do_not_overwrite() {
        let bounds = Bounds::new(0.0, 2.0, 0.0, 2.0, 0.0, 10.0);
        let mut target = filled(2, 2, 500, bounds);
        target.set(0, 0, 100);

        // Same z range: scale factor 1
        let source = RasterTile::from_grid(2, 2, vec![300, 300, 300, 800])
            .unwrap()
            .with_bounds(bounds);
        blit_onto(&source, &mut target).unwrap();

        // Source is flipped into canvas order: its bottom row [300, 800] lands on row 0
        assert_eq!(target.as_slice(), &[300, 800, 500, 500]);
    }

    #[test]
    fn test_overhanging_tile_is_trimmed() {
        let mut target = canvas(4, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0));
        let source = filled(4, 4, 7, Bounds::new(2.0, 6.0, 2.0, 6.0, 0.0, 1.0));

        let outcome = blit_onto(&source, &mut target).unwrap();
        assert_eq!(
            outcome,
            BlitOutcome::Merged(Placement { row: 2, col: 2, rows: 2, cols: 2 })
        );
        assert_eq!(target.get(3, 3), Some(7));
        assert_eq!(target.get(1, 3), Some(0));
        assert_eq!(target.get(3, 1), Some(0));
    }

    #[test]
    fn test_disjoint_tile_is_noop() {
        let mut target = canvas(4, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0));
        let before = target.clone();
        let source = filled(2, 2, 9, Bounds::new(10.0, 12.0, 10.0, 12.0, 0.0, 1.0));

        let outcome = blit_onto(&source, &mut target).unwrap();
        match outcome {
            BlitOutcome::Merged(p) => assert!(p.is_empty()),
            BlitOutcome::Skipped => panic!("disjoint tile should still be placed"),
        }
        assert_eq!(target, before);
    }

    #[test]
    fn test_zero_scale_skips() {
        let mut target = canvas(4, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0));
        target.set(2, 2, 42);
        let before = target.clone();

        // So dense along x that the density ratio underflows to zero
        let tiny = f64::from_bits(1);
        let source = filled(2, 2, 9, Bounds::new(0.0, tiny, 0.0, 2.0, 0.0, 1.0));
        assert_eq!(blit_onto(&source, &mut target).unwrap(), BlitOutcome::Skipped);
        assert_eq!(target, before);

        // A target without columns
        let mut empty = canvas(0, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0));
        let source = filled(2, 2, 9, Bounds::new(0.0, 2.0, 0.0, 2.0, 0.0, 1.0));
        assert_eq!(blit_onto(&source, &mut empty).unwrap(), BlitOutcome::Skipped);
        assert_eq!(empty.shape(), (4, 0));
    }

    #[test]
    fn test_coarse_source_builds_only_the_overlap() {
        // Resampled in full this would be 1e13 x 1e13 pixels
        let mut target = canvas(1000, 1000, Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0));
        let source = filled(1, 1, 40, Bounds::new(0.0, 1e10, 0.0, 1e10, 0.0, 1.0));

        let outcome = blit_onto(&source, &mut target).unwrap();
        assert_eq!(
            outcome,
            BlitOutcome::Merged(Placement { row: 0, col: 0, rows: 1000, cols: 1000 })
        );
        assert!(target.as_slice().iter().all(|&v| v == 40));
        assert_eq!(target.shape(), (1000, 1000));
    }

    #[test]
    fn test_missing_bounds_fail_fast() {
        let mut target = canvas(2, 2, Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0));
        let source = RasterTile::new(2, 2);
        let err = blit_onto(&source, &mut target).unwrap_err();
        assert!(matches!(err, RasterError::MissingBounds { role: "source" }));

        let mut unbounded = RasterTile::new(2, 2);
        let source = filled(1, 1, 1, Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0));
        let err = blit_onto(&source, &mut unbounded).unwrap_err();
        assert!(matches!(err, RasterError::MissingBounds { role: "target" }));
    }

    #[test]
    fn test_compositor_counts() {
        let mut compositor =
            Compositor::new(canvas(4, 4, Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0))).unwrap();
        compositor
            .blit(&filled(2, 2, 5, Bounds::new(0.0, 2.0, 0.0, 2.0, 0.0, 1.0)))
            .unwrap();
        compositor
            .blit(&filled(2, 2, 9, Bounds::new(0.0, f64::from_bits(1), 0.0, 2.0, 0.0, 1.0)))
            .unwrap();

        assert_eq!(compositor.merged(), 1);
        assert_eq!(compositor.skipped(), 1);
        assert_eq!(compositor.canvas().get(0, 0), Some(5));
        assert_eq!(compositor.finish().get(3, 3), Some(0));
    }

    #[test]
    fn test_compositor_requires_bounds() {
        assert!(Compositor::new(RasterTile::new(2, 2)).is_err());
    }
}
