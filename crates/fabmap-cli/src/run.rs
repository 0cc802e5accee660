//! Running composite jobs.

use crate::job::{Job, JobError};
use fabmap_png::{read_tile, write_preview, Png16Encoder};
use fabmap_raster::{preview_rgba, BlitOutcome, Compositor, RasterTile};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of a finished job.
#[derive(Debug, Clone)]
pub struct CompositeReport {
    /// Where the heightmap was written.
    pub output: PathBuf,
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Tiles merged onto the canvas.
    pub merged: usize,
    /// Tiles skipped because they were too dense to show at canvas resolution.
    pub skipped: usize,
    /// Tiles that fell entirely outside the canvas.
    pub outside: usize,
}

/// Composite all tiles of `job` onto its canvas, without writing anything.
pub fn composite(job: &Job) -> Result<(RasterTile, CompositeCounts), JobError> {
    let canvas = job.canvas.build()?;
    let canvas_bounds = canvas.bounds().copied();
    let mut compositor = Compositor::new(canvas)?;
    let mut outside = 0;
    let mut empty = 0;

    for spec in &job.tiles {
        let mut tile = read_tile(&spec.path)?;
        if let Some(bounds) = spec.bounds {
            tile.set_bounds(Some(bounds));
        }
        let Some(tile_bounds) = tile.bounds().copied() else {
            return Err(JobError::TileBounds(spec.path.clone()));
        };

        if canvas_bounds.is_some_and(|canvas| !canvas.overlaps(&tile_bounds)) {
            outside += 1;
            warn!(path = %spec.path.display(), "tile does not overlap the canvas");
            continue;
        }

        let start = Instant::now();
        match compositor.blit(&tile)? {
            BlitOutcome::Skipped => {
                warn!(path = %spec.path.display(), "tile below canvas resolution, skipped");
            }
            BlitOutcome::Merged(placement) if placement.is_empty() => {
                empty += 1;
                outside += 1;
                warn!(path = %spec.path.display(), "tile rounds to no canvas pixels");
            }
            BlitOutcome::Merged(placement) => {
                debug!(
                    path = %spec.path.display(),
                    row = placement.row,
                    col = placement.col,
                    rows = placement.rows,
                    cols = placement.cols,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "merged tile"
                );
            }
        }
    }

    let counts = CompositeCounts {
        merged: compositor.merged() - empty,
        skipped: compositor.skipped(),
        outside,
    };
    Ok((compositor.finish(), counts))
}

/// Per-outcome tile counts from [`composite`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeCounts {
    /// Tiles merged with a non-empty window.
    pub merged: usize,
    /// Tiles skipped at a zero pixel scale.
    pub skipped: usize,
    /// Tiles with no overlap.
    pub outside: usize,
}

/// Run a job: composite it and write the heightmap (and preview, if asked).
///
/// `output` and `preview` override the paths in the job file.
pub fn run_job(
    job: &Job,
    output: Option<&Path>,
    preview: Option<&Path>,
) -> Result<CompositeReport, JobError> {
    let output = output
        .map(Path::to_path_buf)
        .or_else(|| job.output.clone())
        .ok_or(JobError::MissingOutput)?;
    let preview = preview.map(Path::to_path_buf).or_else(|| job.preview.clone());

    let start = Instant::now();
    let (canvas, counts) = composite(job)?;
    canvas.save(&output, &Png16Encoder::new())?;

    if let Some(preview) = &preview {
        write_preview(preview, &preview_rgba(&canvas))?;
        info!(path = %preview.display(), "wrote preview");
    }

    info!(
        path = %output.display(),
        width = canvas.width(),
        height = canvas.height(),
        merged = counts.merged,
        skipped = counts.skipped,
        outside = counts.outside,
        elapsed_s = start.elapsed().as_secs_f64(),
        "composited heightmap"
    );

    Ok(CompositeReport {
        output,
        width: canvas.width(),
        height: canvas.height(),
        merged: counts.merged,
        skipped: counts.skipped,
        outside: counts.outside,
    })
}
