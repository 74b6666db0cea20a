//! # droneqa algorithms
//!
//! Quality checks for drone photogrammetry products.
//!
//! ## Modules
//!
//! - **statistics**: masked elevation summary (min, max, mean, std)
//! - **terrain**: pixel ground resolution, per-cell slope
//! - **pointcloud**: bounding-box point density
//! - **qa**: the same checks taking file paths, and the combined QA run

mod maybe_rayon;

pub mod pointcloud;
pub mod qa;
pub mod statistics;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::pointcloud::{point_density, PointDensity};
    pub use crate::qa::{QaReport, QaRequest};
    pub use crate::statistics::{elevation_summary, summarize, ElevationSummary, Summary};
    pub use crate::terrain::{
        dem_resolution, slope, NodataHandling, PixelSize, Slope, SlopeParams, SlopeUnits,
    };
    pub use droneqa_core::prelude::*;
}
