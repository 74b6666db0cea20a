//! Point cloud QA metrics

mod density;

pub use density::{point_density, PointDensity};
