//! End-to-end checks over files on disk.
//!
//! Fixtures are written to temporary files with the crate's own GeoTIFF and
//! LAS writers, then read back through the path-level QA functions.

use approx::assert_relative_eq;
use droneqa_algorithms::qa::{self, QaRequest};
use droneqa_algorithms::terrain::{NodataHandling, SlopeParams};
use droneqa_core::io::{write_geotiff, write_point_cloud};
use droneqa_core::{Error, GeoTransform, Point3, PointCloud, Raster};
use tempfile::{NamedTempFile, TempDir};

fn tif(raster: &Raster<f64>) -> NamedTempFile {
    let tmp = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
    write_geotiff(raster, tmp.path(), None).expect("write failed");
    tmp
}

fn las(points: &[(f64, f64, f64)]) -> NamedTempFile {
    let cloud: PointCloud = points.iter().map(|&(x, y, z)| Point3::new(x, y, z)).collect();
    let tmp = tempfile::Builder::new().suffix(".las").tempfile().unwrap();
    write_point_cloud(&cloud, tmp.path()).expect("write failed");
    tmp
}

/// 4x4 DEM, all 10 m, 1 m pixels
fn flat_dem() -> Raster<f64> {
    Raster::filled(4, 4, 10.0).with_transform(GeoTransform::new(500.0, 1000.0, 1.0, -1.0))
}

/// 20x30 DEM at 0.5 m pixels rising 0.2 m per metre eastward
fn ramp_dem() -> Raster<f64> {
    let mut dem = Raster::new(20, 30).with_transform(GeoTransform::new(0.0, 10.0, 0.5, -0.5));
    for row in 0..20 {
        for col in 0..30 {
            dem.set(row, col, 100.0 + 0.2 * 0.5 * col as f64).unwrap();
        }
    }
    dem
}

#[test]
fn flat_dem_scenario() {
    let file = tif(&flat_dem());

    let summary = qa::elevation_summary(file.path()).unwrap();
    assert_eq!((summary.min, summary.max, summary.mean, summary.std), (10.0, 10.0, 10.0, 0.0));

    let res = qa::dem_resolution(file.path()).unwrap();
    assert_eq!((res.width, res.height), (1.0, 1.0));

    let slope = qa::slope_analysis(file.path()).unwrap();
    assert_eq!(slope.shape(), (4, 4));
    assert!(slope.data().iter().all(|&v| v == 0.0));
}

#[test]
fn ramp_slope_matches_arctan() {
    let file = tif(&ramp_dem());
    let slope = qa::slope_analysis(file.path()).unwrap();

    let expected = 0.2_f64.atan().to_degrees();
    for row in 1..19 {
        for col in 1..29 {
            assert_relative_eq!(slope.get(row, col).unwrap(), expected, epsilon = 1e-3);
        }
    }
}

#[test]
fn nodata_survives_the_file_roundtrip() {
    let mut dem = flat_dem().with_nodata(Some(-9999.0));
    dem.set(0, 0, -9999.0).unwrap();
    dem.set(3, 3, 14.0).unwrap();
    let file = tif(&dem);

    let summary = qa::elevation_summary(file.path()).unwrap();
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 14.0);
    assert_eq!(summary.valid_count, 15);
    assert_eq!(summary.nodata_count, 1);
}

#[test]
fn inexact_float32_nodata_is_excluded() {
    let mut dem = flat_dem().with_nodata(Some(-9999.9));
    dem.set(2, 1, -9999.9).unwrap();
    let file = tif(&dem);

    let summary = qa::elevation_summary(file.path()).unwrap();
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.valid_count, 15);
    assert_eq!(summary.nodata_count, 1);
}

#[test]
fn density_of_square_corners() {
    let file = las(&[(0.0, 0.0, 1.0), (10.0, 0.0, 1.0), (0.0, 10.0, 1.0), (10.0, 10.0, 1.0)]);
    let d = qa::point_density(file.path()).unwrap();

    assert_eq!(d.point_count, 4);
    assert_relative_eq!(d.area, 100.0, epsilon = 1e-6);
    assert_relative_eq!(d.avg_density, 0.04, epsilon = 1e-9);
}

#[test]
fn density_of_coincident_points() {
    let file = las(&[(5.0, 5.0, 0.0), (5.0, 5.0, 1.0), (5.0, 5.0, 2.0)]);
    let d = qa::point_density(file.path()).unwrap();
    assert_eq!(d.point_count, 3);
    assert_eq!(d.avg_density, 0.0);
}

#[test]
fn raster_path_that_is_not_a_raster() {
    let file = las(&[(0.0, 0.0, 0.0)]);
    assert!(matches!(qa::elevation_summary(file.path()), Err(Error::Decode(_))));
}

#[test]
fn full_run_reports_every_section() {
    let dem = tif(&flat_dem());
    let cloud = las(&[(0.0, 0.0, 1.0), (10.0, 0.0, 1.0), (0.0, 10.0, 1.0), (10.0, 10.0, 1.0)]);

    let report = qa::run(&QaRequest::new(dem.path()).with_point_cloud(cloud.path()));
    assert!(report.is_ok());

    let text = report.to_string();
    assert!(text.contains("--- Elevation Summary ---"));
    assert!(text.contains("Pixel size: 1.00m x 1.00m"));
    assert!(text.contains("Slope (deg) - min: 0.00, max: 0.00, mean: 0.00"));
    assert!(text.contains("avg_density_ppm2: 0.04"));
}

#[test]
fn missing_point_cloud_keeps_dem_results() {
    let dem = tif(&flat_dem());
    let dir = TempDir::new().unwrap();

    let report = qa::run(&QaRequest::new(dem.path()).with_point_cloud(dir.path().join("gone.las")));

    assert!(report.dem.is_ok());
    assert!(matches!(report.point_cloud, Some(Err(Error::FileNotFound(_)))));
    assert!(report.to_string().contains("Error processing point cloud: File not found"));
}

#[test]
fn broken_dem_keeps_point_cloud_results() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("dem.tif");
    std::fs::write(&bogus, b"II*\0 truncated").unwrap();
    let cloud = las(&[(0.0, 0.0, 1.0), (2.0, 2.0, 1.0)]);

    let report = qa::run(&QaRequest::new(&bogus).with_point_cloud(cloud.path()));

    assert!(report.dem.is_err());
    let pc = report.point_cloud.as_ref().unwrap().as_ref().unwrap();
    assert_relative_eq!(pc.density.avg_density, 0.5, epsilon = 1e-9);
    assert!(report.to_string().starts_with("Error processing DEM:"));
}

#[test]
fn missing_dem_is_reported_not_raised() {
    let report = qa::run(&QaRequest::new("/nonexistent/dem.tif"));
    assert!(matches!(report.dem, Err(Error::FileNotFound(_))));
    assert!(report.point_cloud.is_none());
}

#[test]
fn raw_nodata_mode_through_run() {
    let mut dem = flat_dem().with_nodata(Some(-9999.0));
    dem.set(1, 1, -9999.0).unwrap();
    let file = tif(&dem);

    let masked = qa::run(&QaRequest::new(file.path()));
    let raw = qa::run(&QaRequest::new(file.path()).with_slope_params(SlopeParams {
        nodata: NodataHandling::Raw,
        ..Default::default()
    }));

    let masked_max = masked.dem.unwrap().slope.unwrap().summary.max;
    let raw_max = raw.dem.unwrap().slope.unwrap().summary.max;
    assert_eq!(masked_max, 0.0);
    assert!(raw_max > 89.0);
}

#[test]
fn slope_without_valid_cells_keeps_elevation() {
    // Middle column masked: every slope stencil touches it
    let mut dem = Raster::filled(2, 3, 10.0)
        .with_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0))
        .with_nodata(Some(-9999.0));
    dem.set(0, 1, -9999.0).unwrap();
    dem.set(1, 1, -9999.0).unwrap();
    let file = tif(&dem);

    let report = qa::run(&QaRequest::new(file.path()));
    let section = report.dem.as_ref().unwrap();

    assert_eq!(section.elevation.mean, 10.0);
    assert_eq!(section.elevation.valid_count, 4);
    assert!(matches!(section.slope, Err(Error::NoValidCells { nodata_count: 6 })));
    assert!(!report.is_ok());
    assert!(report.to_string().contains("Error processing slope:"));
}
