//! File-level QA checks
//!
//! Path-taking forms of the four checks, plus [`run`], which performs the
//! full check of one DEM and an optional point cloud. Each function opens
//! and decodes its input, computes, and drops the decoded data before
//! returning.

mod report;

pub use report::{DemReport, PointCloudReport, QaReport, SlopeReport};

use crate::pointcloud::PointDensity;
use crate::statistics::{summarize, ElevationSummary};
use crate::terrain::{PixelSize, SlopeParams};
use droneqa_core::io::{read_geotiff, read_point_cloud};
use droneqa_core::raster::Raster;
use droneqa_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Decode band 1 of a DEM as `f64`
pub fn load_dem<P: AsRef<Path>>(path: P) -> Result<Raster<f64>> {
    read_geotiff(path, Some(1))
}

/// Elevation summary of the DEM at `path`
pub fn elevation_summary<P: AsRef<Path>>(path: P) -> Result<ElevationSummary> {
    crate::statistics::elevation_summary(&load_dem(path)?)
}

/// Pixel ground size of the DEM at `path`
pub fn dem_resolution<P: AsRef<Path>>(path: P) -> Result<PixelSize> {
    Ok(crate::terrain::dem_resolution(&load_dem(path)?))
}

/// Slope grid in degrees for the DEM at `path`
pub fn slope_analysis<P: AsRef<Path>>(path: P) -> Result<Raster<f64>> {
    crate::terrain::slope(&load_dem(path)?, SlopeParams::default())
}

/// Bounding-box point density of the LAS/LAZ file at `path`
pub fn point_density<P: AsRef<Path>>(path: P) -> Result<PointDensity> {
    crate::pointcloud::point_density(&read_point_cloud(path)?)
}

/// Inputs of a QA run
#[derive(Debug, Clone)]
pub struct QaRequest {
    pub dem: PathBuf,
    pub point_cloud: Option<PathBuf>,
    pub slope: SlopeParams,
}

impl QaRequest {
    pub fn new(dem: impl Into<PathBuf>) -> Self {
        Self {
            dem: dem.into(),
            point_cloud: None,
            slope: SlopeParams::default(),
        }
    }

    pub fn with_point_cloud(mut self, path: impl Into<PathBuf>) -> Self {
        self.point_cloud = Some(path.into());
        self
    }

    pub fn with_slope_params(mut self, params: SlopeParams) -> Self {
        self.slope = params;
        self
    }
}

/// Run every check of `request`.
///
/// The DEM and the point cloud are independent failure domains: an error
/// in one is recorded in its section of the report and the other section
/// is still computed. The DEM is decoded once and shared by the three
/// raster checks.
pub fn run(request: &QaRequest) -> QaReport {
    let dem = check_dem(&request.dem, &request.slope);
    let point_cloud = request
        .point_cloud
        .as_deref()
        .map(check_point_cloud);

    QaReport { dem, point_cloud }
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}

fn check_dem(path: &Path, params: &SlopeParams) -> Result<DemReport> {
    require_file(path)?;
    let dem = load_dem(path)?;

    let elevation = crate::statistics::elevation_summary(&dem)?;
    let resolution = crate::terrain::dem_resolution(&dem);
    // A slope failure leaves the elevation and resolution results standing
    let slope = crate::terrain::slope(&dem, params.clone())
        .and_then(|grid| summarize(&grid))
        .map(|summary| SlopeReport {
            units: params.units,
            summary,
        });

    Ok(DemReport {
        path: path.to_path_buf(),
        rows: dem.rows(),
        cols: dem.cols(),
        elevation,
        resolution,
        slope,
    })
}

fn check_point_cloud(path: &Path) -> Result<PointCloudReport> {
    require_file(path)?;
    let density = point_density(path)?;
    Ok(PointCloudReport {
        path: path.to_path_buf(),
        density,
    })
}
