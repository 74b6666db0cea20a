//! QA report rendering

use crate::pointcloud::PointDensity;
use crate::statistics::{ElevationSummary, Summary};
use crate::terrain::{PixelSize, SlopeUnits};
use droneqa_core::Result;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;

/// Slope grid reduced to its range and mean
#[derive(Debug, Clone, Serialize)]
pub struct SlopeReport {
    pub units: SlopeUnits,
    pub summary: Summary,
}

/// Results of the raster checks on one DEM
#[derive(Debug, Serialize)]
pub struct DemReport {
    pub path: PathBuf,
    pub rows: usize,
    pub cols: usize,
    pub elevation: ElevationSummary,
    pub resolution: PixelSize,
    /// Fails on its own when no slope cell can be computed
    #[serde(serialize_with = "serialize_slope")]
    pub slope: Result<SlopeReport>,
}

fn serialize_slope<S: Serializer>(
    slope: &Result<SlopeReport>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match slope {
        Ok(report) => report.serialize(serializer),
        Err(e) => json!({ "error": e.to_string() }).serialize(serializer),
    }
}

/// Results of the point cloud check
#[derive(Debug, Clone, Serialize)]
pub struct PointCloudReport {
    pub path: PathBuf,
    pub density: PointDensity,
}

/// Outcome of a full QA run, one section per failure domain
#[derive(Debug)]
pub struct QaReport {
    pub dem: Result<DemReport>,
    /// `None` when no point cloud was requested
    pub point_cloud: Option<Result<PointCloudReport>>,
}

impl QaReport {
    /// True when every requested section succeeded
    pub fn is_ok(&self) -> bool {
        self.dem.as_ref().is_ok_and(|dem| dem.slope.is_ok())
            && self.point_cloud.as_ref().map_or(true, |pc| pc.is_ok())
    }

    /// Same content as the text report, as a JSON document
    pub fn to_json(&self) -> serde_json::Result<String> {
        let dem = section(&self.dem)?;
        let point_cloud = match &self.point_cloud {
            Some(pc) => section(pc)?,
            None => Value::Null,
        };
        let value = json!({ "dem": dem, "point_cloud": point_cloud });
        serde_json::to_string_pretty(&value)
    }
}

fn section<T: Serialize>(result: &Result<T>) -> serde_json::Result<Value> {
    Ok(match result {
        Ok(report) => serde_json::to_value(report)?,
        Err(e) => json!({ "error": e.to_string() }),
    })
}

impl fmt::Display for DemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.elevation;
        writeln!(f, "--- Elevation Summary ---")?;
        writeln!(f, "min: {:.2}", e.min)?;
        writeln!(f, "max: {:.2}", e.max)?;
        writeln!(f, "mean: {:.2}", e.mean)?;
        writeln!(f, "std: {:.2}", e.std)?;
        if e.nodata_count > 0 {
            writeln!(f, "no-data cells: {} of {}", e.nodata_count, self.rows * self.cols)?;
        }

        writeln!(f)?;
        writeln!(f, "--- DEM Resolution ---")?;
        writeln!(
            f,
            "Pixel size: {:.2}m x {:.2}m",
            self.resolution.width, self.resolution.height
        )?;

        writeln!(f)?;
        writeln!(f, "--- Slope Analysis ---")?;
        match &self.slope {
            Ok(slope) => {
                let s = &slope.summary;
                writeln!(
                    f,
                    "Slope ({}) - min: {:.2}, max: {:.2}, mean: {:.2}",
                    slope.units.abbrev(),
                    s.min,
                    s.max,
                    s.mean
                )
            }
            Err(e) => writeln!(f, "Error processing slope: {}", e),
        }
    }
}

impl fmt::Display for PointCloudReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.density;
        writeln!(f, "--- Point Cloud Density ---")?;
        writeln!(f, "point_count: {}", d.point_count)?;
        writeln!(f, "area_m2: {:.2}", d.area)?;
        writeln!(f, "avg_density_ppm2: {:.2}", d.avg_density)
    }
}

impl fmt::Display for QaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dem {
            Ok(report) => write!(f, "{}", report)?,
            Err(e) => writeln!(f, "Error processing DEM: {}", e)?,
        }
        match &self.point_cloud {
            Some(Ok(report)) => write!(f, "\n{}", report),
            Some(Err(e)) => write!(f, "\nError processing point cloud: {}\n", e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droneqa_core::Error;

    fn dem_report() -> DemReport {
        let flat = Summary {
            min: 10.0,
            max: 10.0,
            mean: 10.0,
            std: 0.0,
            valid_count: 16,
            nodata_count: 0,
        };
        DemReport {
            path: PathBuf::from("dem.tif"),
            rows: 4,
            cols: 4,
            elevation: flat,
            resolution: PixelSize { width: 1.0, height: 1.0 },
            slope: Ok(SlopeReport {
                units: SlopeUnits::Degrees,
                summary: Summary { min: 0.0, max: 0.0, mean: 0.0, ..flat },
            }),
        }
    }

    fn density_report() -> PointCloudReport {
        PointCloudReport {
            path: PathBuf::from("cloud.las"),
            density: PointDensity { point_count: 4, area: 100.0, avg_density: 0.04 },
        }
    }

    #[test]
    fn test_text_sections() {
        let report = QaReport {
            dem: Ok(dem_report()),
            point_cloud: Some(Ok(density_report())),
        };
        let text = report.to_string();

        assert!(text.contains("--- Elevation Summary ---\nmin: 10.00\n"));
        assert!(text.contains("Pixel size: 1.00m x 1.00m"));
        assert!(text.contains("Slope (deg) - min: 0.00, max: 0.00, mean: 0.00"));
        assert!(text.contains("point_count: 4\narea_m2: 100.00\navg_density_ppm2: 0.04"));
        assert!(report.is_ok());
    }

    #[test]
    fn test_failures_render_independently() {
        let report = QaReport {
            dem: Err(Error::Decode("not a TIFF file".into())),
            point_cloud: Some(Ok(density_report())),
        };
        let text = report.to_string();

        assert!(text.starts_with("Error processing DEM: Decode error: not a TIFF file"));
        assert!(text.contains("--- Point Cloud Density ---"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_skipped_point_cloud() {
        let report = QaReport { dem: Ok(dem_report()), point_cloud: None };
        assert!(!report.to_string().contains("Point Cloud"));
        assert!(report.is_ok());
    }

    #[test]
    fn test_slope_failure_keeps_elevation() {
        let mut dem = dem_report();
        dem.slope = Err(Error::NoValidCells { nodata_count: 6 });
        let report = QaReport { dem: Ok(dem), point_cloud: None };
        let text = report.to_string();

        assert!(text.contains("mean: 10.00"));
        assert!(text.contains("Pixel size: 1.00m x 1.00m"));
        assert!(text.contains("Error processing slope: "));
        assert!(!report.is_ok());

        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["dem"]["elevation"]["mean"], 10.0);
        assert!(value["dem"]["slope"]["error"].is_string());
    }

    #[test]
    fn test_json_shape() {
        let report = QaReport {
            dem: Ok(dem_report()),
            point_cloud: Some(Err(Error::EmptyPointCloud)),
        };
        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["dem"]["elevation"]["mean"], 10.0);
        assert_eq!(value["dem"]["slope"]["units"], "degrees");
        assert_eq!(value["point_cloud"]["error"], "Point cloud contains no points");
    }
}
