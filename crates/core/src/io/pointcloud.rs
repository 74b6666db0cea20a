//! LAS / LAZ point cloud reading via the `las` crate
//!
//! Decoding sits behind the `las` feature (LAZ additionally behind `laz`).
//! When a format's decoder is compiled out, reading reports
//! [`Error::MissingDependency`] with the feature to enable.

use crate::error::{Error, Result};
use crate::pointcloud::PointCloud;
use std::path::Path;

/// Point cloud encodings recognised by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    Las,
    Laz,
}

impl PointCloudFormat {
    /// Guess the format from the file extension (case-insensitive).
    ///
    /// Unknown extensions are handed to the LAS decoder, which checks the
    /// file signature itself.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("laz") => PointCloudFormat::Laz,
            _ => PointCloudFormat::Las,
        }
    }

    /// Whether this build can decode the format
    pub fn is_supported(self) -> bool {
        match self {
            PointCloudFormat::Las => cfg!(feature = "las"),
            PointCloudFormat::Laz => cfg!(feature = "laz"),
        }
    }

    fn missing(self) -> Error {
        match self {
            PointCloudFormat::Las => Error::MissingDependency {
                what: "LAS point cloud",
                remedy: "rebuild droneqa-core with `--features las`",
            },
            PointCloudFormat::Laz => Error::MissingDependency {
                what: "LAZ point cloud",
                remedy: "rebuild droneqa-core with `--features laz`",
            },
        }
    }
}

/// Read every point of a LAS/LAZ file into memory
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let path = path.as_ref();
    let format = PointCloudFormat::from_path(path);
    if !format.is_supported() {
        return Err(format.missing());
    }
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    decode(path)
}

#[cfg(feature = "las")]
fn decode(path: &Path) -> Result<PointCloud> {
    use crate::pointcloud::Point3;

    let mut reader = las::Reader::from_path(path)?;
    let expected = reader.header().number_of_points() as usize;

    let mut cloud = PointCloud::from_points(Vec::with_capacity(expected));
    for point in reader.points() {
        let point = point?;
        cloud.push(Point3::new(point.x, point.y, point.z));
    }
    Ok(cloud)
}

#[cfg(not(feature = "las"))]
fn decode(_path: &Path) -> Result<PointCloud> {
    Err(PointCloudFormat::Las.missing())
}

/// Write a point cloud as an uncompressed LAS 1.2 file (point format 0)
#[cfg(feature = "las")]
pub fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud, path: P) -> Result<()> {
    let header = las::Builder::from((1, 2)).into_header()?;
    let mut writer = las::Writer::from_path(path.as_ref(), header)?;
    for p in cloud.points() {
        writer.write_point(las::Point {
            x: p.x,
            y: p.y,
            z: p.z,
            ..Default::default()
        })?;
    }
    writer.close()?;
    Ok(())
}
