//! Ground resolution of a DEM pixel

use droneqa_core::raster::{Raster, RasterElement};
use serde::Serialize;

/// Pixel footprint in the raster's native linear units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

/// Absolute horizontal and vertical scale of the DEM transform.
///
/// Rotated rasters report the scale coefficients only; the shear terms are
/// ignored rather than folded into an effective pixel size.
pub fn dem_resolution<T: RasterElement>(dem: &Raster<T>) -> PixelSize {
    let (width, height) = dem.transform().resolution();
    PixelSize { width, height }
}
