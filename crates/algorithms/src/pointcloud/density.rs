//! Planar point density
//!
//! Points per square unit of the cloud's x/y bounding box. The box is the
//! axis-aligned extent, so irregular flight footprints read lower than
//! their true coverage density.

use droneqa_core::pointcloud::PointCloud;
use droneqa_core::{Error, Result};
use serde::Serialize;

/// Density of a point cloud over its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointDensity {
    pub point_count: usize,
    /// Bounding-box area in squared native units
    pub area: f64,
    /// Points per squared unit; 0 when the box has no area
    pub avg_density: f64,
}

/// Count points and divide by the planar bounding-box area.
///
/// Coincident or collinear clouds have zero area and report a density of
/// zero instead of dividing by it.
pub fn point_density(cloud: &PointCloud) -> Result<PointDensity> {
    let extent = cloud.extent_xy().ok_or(Error::EmptyPointCloud)?;
    let point_count = cloud.len();
    let area = extent.area();
    let avg_density = if area > 0.0 {
        point_count as f64 / area
    } else {
        0.0
    };

    Ok(PointDensity {
        point_count,
        area,
        avg_density,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use droneqa_core::Point3;

    fn cloud(xy: &[(f64, f64)]) -> PointCloud {
        xy.iter().map(|&(x, y)| Point3::new(x, y, 0.0)).collect()
    }

    #[test]
    fn test_square_corners() {
        let pc = cloud(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]);
        let d = point_density(&pc).unwrap();
        assert_eq!(d.point_count, 4);
        assert_relative_eq!(d.area, 100.0);
        assert_relative_eq!(d.avg_density, 0.04);
    }

    #[test]
    fn test_unit_square() {
        let mut xy = vec![(0.0, 0.0), (1.0, 1.0)];
        xy.extend((0..48).map(|i| (i as f64 / 48.0, 0.5)));
        let d = point_density(&cloud(&xy)).unwrap();
        assert_relative_eq!(d.area, 1.0);
        assert_relative_eq!(d.avg_density, 50.0);
    }

    #[test]
    fn test_coincident_points_zero_density() {
        let pc = cloud(&[(3.0, 3.0); 5]);
        let d = point_density(&pc).unwrap();
        assert_eq!(d.point_count, 5);
        assert_eq!(d.area, 0.0);
        assert_eq!(d.avg_density, 0.0);
    }

    #[test]
    fn test_collinear_points_zero_density() {
        let pc = cloud(&[(0.0, 2.0), (5.0, 2.0), (9.0, 2.0)]);
        assert_eq!(point_density(&pc).unwrap().avg_density, 0.0);
    }

    #[test]
    fn test_empty_cloud() {
        assert!(matches!(
            point_density(&PointCloud::new()),
            Err(Error::EmptyPointCloud)
        ));
    }
}
