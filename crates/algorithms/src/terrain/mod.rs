//! Terrain analysis of Digital Elevation Models:
//! - Resolution: ground size of one pixel
//! - Slope: gradient magnitude per cell

mod resolution;
mod slope;

pub use resolution::{dem_resolution, PixelSize};
pub use slope::{slope, NodataHandling, Slope, SlopeParams, SlopeUnits};
