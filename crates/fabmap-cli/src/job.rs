//! Composite job files.
//!
//! A job names the output canvas and the tiles to merge onto it:
//!
//! ```yaml
//! output: part.png
//! canvas:
//!   width: 400
//!   height: 300
//!   bounds: { xmin: 0, xmax: 40, ymin: 0, ymax: 30, zmin: 0, zmax: 10 }
//! tiles:
//!   - path: base.png
//!   - path: boss.png
//!     bounds: { xmin: 10, xmax: 20, ymin: 10, ymax: 20, zmin: 0, zmax: 10 }
//! ```
//!
//! The canvas may instead be given by a `region` (boundary lists plus
//! `unit_scale`) or by `bounds` and `pixels_per_mm`.

use fabmap_png::PngError;
use fabmap_raster::{Bounds, GridRegion, RasterError, RasterTile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or running a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// I/O error reading the job file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The job file is not valid YAML or does not match the job schema.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The canvas section cannot be turned into a canvas.
    #[error("Invalid canvas: {0}")]
    Canvas(String),

    /// A tile has bounds neither in its PNG metadata nor in the job.
    #[error("Tile {0} has no bounds in its metadata or the job file")]
    TileBounds(PathBuf),

    /// No output path in the job file or on the command line.
    #[error("No output path given in the job file or on the command line")]
    MissingOutput,

    /// Compositing or export failed.
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Reading or writing a PNG failed.
    #[error("PNG error: {0}")]
    Png(#[from] PngError),
}

/// A parsed job file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Where to write the composited heightmap.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Optional 8-bit preview of the result.
    #[serde(default)]
    pub preview: Option<PathBuf>,
    /// The canvas to composite onto.
    pub canvas: CanvasSpec,
    /// Tiles, merged in order.
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
}

/// How the canvas is sized and placed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasSpec {
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<usize>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<usize>,
    /// Resolution used to derive width and height from the bounds.
    #[serde(default)]
    pub pixels_per_mm: Option<f64>,
    /// Physical bounds in millimetres.
    #[serde(default)]
    pub bounds: Option<Bounds>,
    /// Region descriptor; replaces the fields above.
    #[serde(default)]
    pub region: Option<GridRegion>,
    /// Millimetres per region unit.
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,
}

fn default_unit_scale() -> f64 {
    1.0
}

/// One tile to merge.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileSpec {
    /// PNG file, relative to the job file.
    pub path: PathBuf,
    /// Bounds overriding the file's metadata.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl Job {
    /// Parse a job from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, JobError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a job file. Relative tile, output and preview paths are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path)?;
        let mut job = Self::from_yaml(&text)?;
        if let Some(base) = path.parent() {
            job.resolve_paths(base);
        }
        Ok(job)
    }

    /// Make every relative path in the job relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(output) = self.output.as_mut() {
            resolve(output);
        }
        if let Some(preview) = self.preview.as_mut() {
            resolve(preview);
        }
        for tile in &mut self.tiles {
            resolve(&mut tile.path);
        }
    }
}

impl CanvasSpec {
    /// Build the blank canvas this spec describes.
    pub fn build(&self) -> Result<RasterTile, JobError> {
        if let Some(region) = &self.region {
            return Ok(RasterTile::from_region(region, self.unit_scale)?);
        }

        let bounds = self
            .bounds
            .ok_or_else(|| JobError::Canvas("either `region` or `bounds` is required".into()))?;
        bounds
            .validate("canvas")
            .map_err(|e| JobError::Canvas(e.to_string()))?;

        let (width, height) = match (self.width, self.height, self.pixels_per_mm) {
            (Some(w), Some(h), _) => (w, h),
            (None, None, Some(ppmm)) if ppmm > 0.0 => (
                (bounds.x_span() * ppmm).round() as usize,
                (bounds.y_span() * ppmm).round() as usize,
            ),
            _ => {
                return Err(JobError::Canvas(
                    "give both `width` and `height`, or a positive `pixels_per_mm`".into(),
                ))
            }
        };
        if width == 0 || height == 0 {
            return Err(JobError::Canvas(format!("canvas is {width}x{height} pixels")));
        }

        Ok(RasterTile::new(width, height).with_bounds(bounds))
    }
}
