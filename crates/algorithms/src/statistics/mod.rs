//! Statistical reductions over raster data

pub mod summary;

pub use summary::{elevation_summary, summarize, ElevationSummary, Summary};
