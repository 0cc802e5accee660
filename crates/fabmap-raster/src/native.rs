//! Binding to a native `save_png16L` heightmap encoder.
//!
//! The library is loaded explicitly by the caller and passed to
//! [`RasterTile::save`](crate::RasterTile::save) like any other encoder.

use crate::{HeightmapEncoder, RasterError, Result, RowPointers};
use libloading::Library;
use std::ffi::{c_char, c_int, CString, OsStr};
use std::path::Path;

/// `save_png16L` - write a 16-bit greyscale PNG with bounds metadata.
///
/// `bounds` points at six floats `(xmin, ymin, zmin, xmax, ymax, zmax)`;
/// `pixels` at `nj` row pointers of `ni` samples each, bottom row first.
pub type FnSavePng16L = unsafe extern "C" fn(
    output_file: *const c_char,
    ni: c_int,
    nj: c_int,
    bounds: *const f32,
    pixels: *const *const u16,
);

/// Symbol name of the encoder entry point.
pub const SAVE_PNG16L_SYMBOL: &[u8] = b"save_png16L\0";

/// A heightmap encoder backed by a shared library.
#[derive(Debug)]
pub struct NativeEncoder {
    save_png16l: FnSavePng16L,
    // Keeps `save_png16l` valid; must outlive it
    _library: Library,
}

impl NativeEncoder {
    /// Load the encoder from the shared library at `path`.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        // SAFETY: loading runs the library's initialisers; callers point this
        // at a library that exports `save_png16L` with the signature above.
        let library = unsafe { Library::new(path.as_ref()) }
            .map_err(|e| RasterError::LibraryLoad(e.to_string()))?;

        // SAFETY: the symbol type matches the exported C function.
        let save_png16l = unsafe { library.get::<FnSavePng16L>(SAVE_PNG16L_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|e| RasterError::SymbolNotFound(format!("save_png16L: {e}")))?;

        Ok(Self {
            save_png16l,
            _library: library,
        })
    }
}

impl HeightmapEncoder for NativeEncoder {
    fn encode(
        &self,
        path: &Path,
        width: usize,
        height: usize,
        bounds: [f32; 6],
        rows: &RowPointers<'_>,
    ) -> Result<()> {
        if rows.len() != height || rows.width() != width {
            return Err(RasterError::Encoder(format!(
                "row pointers are {}x{}, expected {width}x{height}",
                rows.width(),
                rows.len()
            )));
        }

        let filename = CString::new(path.to_string_lossy().as_bytes())
            .map_err(|e| RasterError::Encoder(format!("invalid path: {e}")))?;
        let ni = c_int::try_from(width)
            .map_err(|_| RasterError::Encoder(format!("width {width} too large")))?;
        let nj = c_int::try_from(height)
            .map_err(|_| RasterError::Encoder(format!("height {height} too large")))?;

        // SAFETY: the filename and bounds outlive the call, and `rows` holds
        // `nj` pointers to `ni` samples each in a buffer it borrows.
        unsafe {
            (self.save_png16l)(filename.as_ptr(), ni, nj, bounds.as_ptr(), rows.as_ptr());
        }
        Ok(())
    }
}
