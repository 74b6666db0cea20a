//! # droneqa core
//!
//! Core types and I/O for drone photogrammetry quality checks.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid with no-data masking
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `PointCloud`: In-memory LiDAR / photogrammetry point set
//! - GeoTIFF and LAS/LAZ readers

pub mod error;
pub mod io;
pub mod pointcloud;
pub mod raster;

pub use error::{Error, Result};
pub use pointcloud::{Extent2, Point3, PointCloud};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::pointcloud::{Point3, PointCloud};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for QA algorithms.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
