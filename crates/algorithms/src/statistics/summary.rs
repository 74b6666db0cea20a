//! Masked summary statistics
//!
//! Min, max, mean and population standard deviation over the unmasked
//! cells of a raster. No-data and NaN cells take no part in any reduction.

use droneqa_core::raster::{Raster, RasterElement};
use droneqa_core::{Error, Result};
use serde::Serialize;

/// Reduction of a raster's valid cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divides by N)
    pub std: f64,
    pub valid_count: usize,
    pub nodata_count: usize,
}

/// Summary of DEM heights
pub type ElevationSummary = Summary;

/// Summarise the unmasked cells of any raster.
///
/// Two passes over the valid cells: mean first, then squared deviations
/// from it, which keeps the variance stable for high-altitude DEMs where
/// sum-of-squares would cancel.
pub fn summarize<T: RasterElement>(raster: &Raster<T>) -> Result<Summary> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for v in raster.valid_values().filter_map(RasterElement::to_f64) {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }

    let nodata_count = raster.len() - count;
    if count == 0 {
        return Err(Error::NoValidCells { nodata_count });
    }

    let mean = sum / count as f64;
    let sq_dev: f64 = raster
        .valid_values()
        .filter_map(RasterElement::to_f64)
        .map(|v| (v - mean) * (v - mean))
        .sum();

    Ok(Summary {
        min,
        max,
        mean,
        std: (sq_dev / count as f64).sqrt(),
        valid_count: count,
        nodata_count,
    })
}

/// Elevation range, mean and spread of a DEM, no-data excluded
pub fn elevation_summary(dem: &Raster<f64>) -> Result<ElevationSummary> {
    summarize(dem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform() {
        let dem: Raster<f64> = Raster::filled(4, 4, 10.0);
        let s = elevation_summary(&dem).unwrap();
        assert_eq!((s.min, s.max, s.mean, s.std), (10.0, 10.0, 10.0, 0.0));
        assert_eq!(s.valid_count, 16);
        assert_eq!(s.nodata_count, 0);
    }

    #[test]
    fn test_population_std() {
        let dem = Raster::from_vec(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 2, 4).unwrap();
        let s = elevation_summary(&dem).unwrap();
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std, 2.0);
        assert_eq!((s.min, s.max), (2.0, 9.0));
    }

    #[test]
    fn test_nodata_excluded() {
        let mut dem = Raster::filled(3, 3, 100.0).with_nodata(Some(-9999.0));
        dem.set(0, 0, -9999.0).unwrap();
        dem.set(2, 2, f64::NAN).unwrap();
        dem.set(1, 1, 106.0).unwrap();

        let s = elevation_summary(&dem).unwrap();
        assert_eq!(s.min, 100.0);
        assert_eq!(s.max, 106.0);
        assert_relative_eq!(s.mean, 100.0 + 6.0 / 7.0, epsilon = 1e-12);
        assert_eq!(s.valid_count, 7);
        assert_eq!(s.nodata_count, 2);
    }

    #[test]
    fn test_high_altitude_std_is_stable() {
        let data: Vec<f64> = (0..1000).map(|i| 4500.0 + (i % 2) as f64 * 0.01).collect();
        let dem = Raster::from_vec(data, 10, 100).unwrap();
        let s = summarize(&dem).unwrap();
        assert_relative_eq!(s.std, 0.005, epsilon = 1e-9);
    }

    #[test]
    fn test_integer_raster() {
        let dem = Raster::from_vec(vec![0_i16, 10, 20, -32768], 2, 2)
            .unwrap()
            .with_nodata(Some(-32768));
        let s = summarize(&dem).unwrap();
        assert_eq!(s.mean, 10.0);
        assert_eq!(s.valid_count, 3);
    }

    #[test]
    fn test_all_masked() {
        let dem = Raster::filled(2, 2, -9999.0).with_nodata(Some(-9999.0));
        assert!(matches!(
            elevation_summary(&dem),
            Err(Error::NoValidCells { nodata_count: 4 })
        ));
    }
}
