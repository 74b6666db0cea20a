//! Slope calculation from DEMs
//!
//! Finite-difference gradient along both pixel axes: central differences in
//! the interior, one-sided first differences on the border rows and
//! columns, so the output grid has the same shape as the DEM.

use crate::maybe_rayon::*;
use droneqa_core::raster::Raster;
use droneqa_core::{Algorithm, Error, Result};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;
use std::fmt;

/// Units for slope output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlopeUnits {
    /// Degrees (0-90)
    #[default]
    Degrees,
    /// Percent rise over run (0-infinity)
    Percent,
    /// Radians (0-π/2)
    Radians,
}

impl SlopeUnits {
    /// Short label used in reports
    pub fn abbrev(&self) -> &'static str {
        match self {
            SlopeUnits::Degrees => "deg",
            SlopeUnits::Percent => "%",
            SlopeUnits::Radians => "rad",
        }
    }

    fn express(&self, magnitude: f64) -> f64 {
        match self {
            SlopeUnits::Degrees => magnitude.atan().to_degrees(),
            SlopeUnits::Percent => magnitude * 100.0,
            SlopeUnits::Radians => magnitude.atan(),
        }
    }
}

impl fmt::Display for SlopeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlopeUnits::Degrees => "degrees",
            SlopeUnits::Percent => "percent",
            SlopeUnits::Radians => "radians",
        };
        f.write_str(name)
    }
}

/// How no-data cells enter the finite differences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodataHandling {
    /// A cell whose stencil touches no-data is NaN in the output
    #[default]
    Mask,
    /// No-data values are differenced like any other number
    Raw,
}

/// Parameters for slope calculation
#[derive(Debug, Clone)]
pub struct SlopeParams {
    /// Output units
    pub units: SlopeUnits,
    /// Multiplier applied to elevation differences (default 1.0)
    pub z_factor: f64,
    /// Treatment of masked cells
    pub nodata: NodataHandling,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self {
            units: SlopeUnits::Degrees,
            z_factor: 1.0,
            nodata: NodataHandling::Mask,
        }
    }
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Per-cell slope magnitude from the finite-difference elevation gradient"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope(&input, params)
    }
}

/// Sample indices and divisor of the first difference at `i` along an axis of length `n`
#[inline]
fn stencil(i: usize, n: usize) -> (usize, usize, f64) {
    if i == 0 {
        (0, 1, 1.0)
    } else if i == n - 1 {
        (n - 2, n - 1, 1.0)
    } else {
        (i - 1, i + 1, 2.0)
    }
}

/// Calculate slope from a DEM
///
/// ```text
/// dz/dx = grad_col(z) / pixel_width
/// dz/dy = grad_row(z) / -pixel_height
/// slope = atan(sqrt(dz/dx² + dz/dy²))
/// ```
///
/// where `grad` is `(z[i+1] - z[i-1]) / 2` inside the grid and
/// `z[1] - z[0]`, `z[n-1] - z[n-2]` on its edges. Rows grow southward while
/// `pixel_height` is negative for north-up rasters, hence the sign flip.
///
/// # Errors
/// - [`Error::InvalidDimensions`] when the DEM has fewer than 2 rows or columns
/// - [`Error::InvalidParameter`] for a zero or non-finite pixel size or z-factor
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    if rows < 2 || cols < 2 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let gt = dem.transform();
    let dx = gt.pixel_width;
    let dy = -gt.pixel_height;
    for (name, value) in [("pixel_width", dx), ("pixel_height", dy)] {
        if value == 0.0 || !value.is_finite() {
            return Err(Error::InvalidParameter {
                name,
                value: value.to_string(),
                reason: "pixel size must be finite and non-zero".into(),
            });
        }
    }
    if !params.z_factor.is_finite() {
        return Err(Error::InvalidParameter {
            name: "z_factor",
            value: params.z_factor.to_string(),
            reason: "must be finite".into(),
        });
    }

    let z = dem.view();
    let valid = match params.nodata {
        NodataHandling::Mask => Some(dem.valid_mask()),
        NodataHandling::Raw => None,
    };
    let valid = valid.as_ref().map(|m| m.view());

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| slope_row(z, valid, row, dx, dy, &params))
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    let mut output = dem.with_same_meta(data)?;
    output.set_nodata(Some(f64::NAN));

    Ok(output)
}

fn slope_row(
    z: ArrayView2<'_, f64>,
    valid: Option<ArrayView2<'_, bool>>,
    row: usize,
    dx: f64,
    dy: f64,
    params: &SlopeParams,
) -> Vec<f64> {
    let (rows, cols) = z.dim();
    let (r0, r1, row_div) = stencil(row, rows);

    (0..cols)
        .map(|col| {
            let (c0, c1, col_div) = stencil(col, cols);

            if let Some(mask) = valid {
                let touched = [(row, col), (row, c0), (row, c1), (r0, col), (r1, col)];
                if touched.iter().any(|&idx| !mask[idx]) {
                    return f64::NAN;
                }
            }

            let dz_dx = (z[(row, c1)] - z[(row, c0)]) * params.z_factor / (col_div * dx);
            let dz_dy = (z[(r1, col)] - z[(r0, col)]) * params.z_factor / (row_div * dy);

            params.units.express(dz_dx.hypot(dz_dy))
        })
        .collect()
}
