//! Physical bounding boxes and the region descriptor tiles are built from.

use crate::{RasterError, Result};

/// Physical bounds of a tile, in millimetres.
///
/// The six values are always present together; a tile without bounds holds
/// `None` rather than a partially filled box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Left edge.
    pub xmin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Bottom edge.
    pub ymin: f64,
    /// Top edge.
    pub ymax: f64,
    /// Lowest elevation.
    pub zmin: f64,
    /// Highest elevation.
    pub zmax: f64,
}

impl Bounds {
    /// Create bounds from the three axis ranges.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    /// Width of the box along x.
    pub fn x_span(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box along y.
    pub fn y_span(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Depth of the box along z. Zero for a flat tile.
    pub fn z_span(&self) -> f64 {
        self.zmax - self.zmin
    }

    /// Check whether `other` lies entirely within this box on x and y.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// Check whether the two boxes overlap on x and y with a non-zero area.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    /// Reject boxes whose x or y range is empty, inverted or not finite.
    ///
    /// `role` names the tile in the returned error. The z range is allowed to
    /// be empty.
    pub fn validate(&self, role: &'static str) -> Result<()> {
        let ok = self.x_span() > 0.0
            && self.y_span() > 0.0
            && self.x_span().is_finite()
            && self.y_span().is_finite();
        if ok {
            Ok(())
        } else {
            Err(RasterError::DegenerateBounds {
                role,
                xmin: self.xmin,
                xmax: self.xmax,
                ymin: self.ymin,
                ymax: self.ymax,
            })
        }
    }

    /// Pack the bounds in the order the heightmap encoder expects:
    /// `(xmin, ymin, zmin, xmax, ymax, zmax)`.
    pub fn to_encoder_array(&self) -> [f32; 6] {
        [
            self.xmin as f32,
            self.ymin as f32,
            self.zmin as f32,
            self.xmax as f32,
            self.ymax as f32,
            self.zmax as f32,
        ]
    }

    /// Inverse of [`Bounds::to_encoder_array`].
    pub fn from_encoder_array(values: [f32; 6]) -> Self {
        Self {
            xmin: values[0] as f64,
            ymin: values[1] as f64,
            zmin: values[2] as f64,
            xmax: values[3] as f64,
            ymax: values[4] as f64,
            zmax: values[5] as f64,
        }
    }
}

/// A rectilinear grid descriptor in physical units.
///
/// Each axis is described by its cell count and an ordered sequence of cell
/// boundaries, which holds at least `count + 1` entries. Tiles only read the
/// first and last boundary of each axis.
pub trait Region {
    /// Cell count along x.
    fn ni(&self) -> usize;
    /// Cell count along y.
    fn nj(&self) -> usize;
    /// Cell count along z.
    fn nk(&self) -> usize;
    /// Cell boundaries along x.
    fn x(&self) -> &[f64];
    /// Cell boundaries along y.
    fn y(&self) -> &[f64];
    /// Cell boundaries along z.
    fn z(&self) -> &[f64];
}

/// A region given by explicit boundary lists; the cell count on each axis is
/// one less than the number of boundaries.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRegion {
    /// Boundaries along x.
    pub x: Vec<f64>,
    /// Boundaries along y.
    pub y: Vec<f64>,
    /// Boundaries along z.
    pub z: Vec<f64>,
}

impl GridRegion {
    /// Build a region with `ni x nj x nk` evenly spaced cells.
    pub fn uniform(
        (ni, nj, nk): (usize, usize, usize),
        (xmin, xmax): (f64, f64),
        (ymin, ymax): (f64, f64),
        (zmin, zmax): (f64, f64),
    ) -> Self {
        fn axis(n: usize, lo: f64, hi: f64) -> Vec<f64> {
            if n == 0 {
                return vec![lo];
            }
            (0..=n)
                .map(|k| lo + (hi - lo) * k as f64 / n as f64)
                .collect()
        }
        Self {
            x: axis(ni, xmin, xmax),
            y: axis(nj, ymin, ymax),
            z: axis(nk, zmin, zmax),
        }
    }
}

impl Region for GridRegion {
    fn ni(&self) -> usize {
        self.x.len().saturating_sub(1)
    }

    fn nj(&self) -> usize {
        self.y.len().saturating_sub(1)
    }

    fn nk(&self) -> usize {
        self.z.len().saturating_sub(1)
    }

    fn x(&self) -> &[f64] {
        &self.x
    }

    fn y(&self) -> &[f64] {
        &self.y
    }

    fn z(&self) -> &[f64] {
        &self.z
    }
}

/// Read the first and `n`th boundary of an axis, scaled.
pub(crate) fn axis_range(axis: char, coords: &[f64], n: usize, scale: f64) -> Result<(f64, f64)> {
    match (coords.first(), coords.get(n)) {
        (Some(&lo), Some(&hi)) => Ok((lo * scale, hi * scale)),
        _ => Err(RasterError::RegionAxis {
            axis,
            len: coords.len(),
            needed: n + 1,
        }),
    }
}
