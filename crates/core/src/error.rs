//! Error types for droneqa

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for droneqa operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Point cloud error: {0}")]
    #[cfg(feature = "las")]
    PointCloud(String),

    #[error("{what} support is not available: {remedy}")]
    MissingDependency {
        what: &'static str,
        remedy: &'static str,
    },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Raster has no valid cells ({nodata_count} no-data)")]
    NoValidCells { nodata_count: usize },

    #[error("Point cloud contains no points")]
    EmptyPointCloud,

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "las")]
impl From<las::Error> for Error {
    fn from(e: las::Error) -> Self {
        Error::PointCloud(e.to_string())
    }
}

/// Result type alias for droneqa operations
pub type Result<T> = std::result::Result<T, Error>;
