//! I/O for DEM rasters and point clouds
//!
//! All readers load the whole file into memory; file handles are dropped
//! before the reader returns.

mod geotiff;
mod pointcloud;

pub use geotiff::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
    GeoTiffOptions,
};
pub use pointcloud::{read_point_cloud, PointCloudFormat};

#[cfg(feature = "las")]
pub use pointcloud::write_point_cloud;
