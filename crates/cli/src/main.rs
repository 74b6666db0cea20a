//! droneqa CLI - quality checks for drone DEMs and point clouds

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use droneqa_algorithms::pointcloud::point_density;
use droneqa_algorithms::qa::{self, QaRequest};
use droneqa_algorithms::statistics::{elevation_summary, summarize};
use droneqa_algorithms::terrain::{dem_resolution, slope, NodataHandling, SlopeParams, SlopeUnits};
use droneqa_core::io::read_point_cloud;
use droneqa_core::{PointCloud, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "droneqa")]
#[command(author, version, about = "Quality checks for drone photogrammetry outputs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check on a DEM and an optional point cloud
    Qa {
        /// Input DEM file (GeoTIFF)
        dem: PathBuf,
        /// Point cloud file (LAS/LAZ)
        #[arg(short, long)]
        pointcloud: Option<PathBuf>,
        #[command(flatten)]
        slope: SlopeArgs,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Elevation min, max, mean and standard deviation
    Elevation {
        /// Input DEM file
        dem: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Ground size of one DEM pixel
    Resolution {
        /// Input DEM file
        dem: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Slope statistics of a DEM
    Slope {
        /// Input DEM file
        dem: PathBuf,
        #[command(flatten)]
        slope: SlopeArgs,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Point density over the cloud's bounding box
    Density {
        /// Input point cloud (LAS/LAZ)
        pointcloud: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

#[derive(clap::Args, Clone)]
struct SlopeArgs {
    /// Output units
    #[arg(short, long, value_enum, default_value = "degrees")]
    units: UnitsArg,
    /// Z-factor for unit conversion
    #[arg(short, long, default_value = "1.0")]
    z_factor: f64,
    /// Difference no-data cells as plain numbers instead of masking
    #[arg(long)]
    raw_nodata: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum UnitsArg {
    #[value(alias = "deg")]
    Degrees,
    #[value(alias = "pct")]
    Percent,
    #[value(alias = "rad")]
    Radians,
}

impl From<UnitsArg> for SlopeUnits {
    fn from(units: UnitsArg) -> Self {
        match units {
            UnitsArg::Degrees => SlopeUnits::Degrees,
            UnitsArg::Percent => SlopeUnits::Percent,
            UnitsArg::Radians => SlopeUnits::Radians,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_dem(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster = qa::load_dem(path);
    pb.finish_and_clear();
    let raster = raster.with_context(|| format!("Failed to read raster {}", path.display()))?;
    info!("Input: {} x {}", raster.cols(), raster.rows());
    debug!("Transform: {:?}", raster.transform().to_gdal());
    Ok(raster)
}

fn read_cloud(path: &Path) -> Result<PointCloud> {
    let pb = spinner("Reading point cloud...");
    let cloud = read_point_cloud(path);
    pb.finish_and_clear();
    let cloud = cloud.with_context(|| format!("Failed to read point cloud {}", path.display()))?;
    info!("Points: {}", cloud.len());
    Ok(cloud)
}

impl SlopeArgs {
    fn params(&self) -> SlopeParams {
        SlopeParams {
            units: self.units.into(),
            z_factor: self.z_factor,
            nodata: if self.raw_nodata {
                NodataHandling::Raw
            } else {
                NodataHandling::Mask
            },
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Full QA run ──────────────────────────────────────────────
        Commands::Qa {
            dem,
            pointcloud,
            slope,
            format,
        } => {
            let mut request = QaRequest::new(dem).with_slope_params(slope.params());
            if let Some(pc) = pointcloud {
                request = request.with_point_cloud(pc);
            }

            let pb = spinner("Running QA checks...");
            let start = Instant::now();
            let report = qa::run(&request);
            pb.finish_and_clear();
            info!("Processing time: {:.2?}", start.elapsed());

            match format {
                OutputFormat::Text => print!("{}", report),
                OutputFormat::Json => println!("{}", report.to_json()?),
            }

            if let Err(e) = &report.dem {
                warn!("DEM checks failed: {}", e);
            }
            if let Some(Err(e)) = &report.point_cloud {
                warn!("Point cloud check failed: {}", e);
            }
            if !report.is_ok() {
                anyhow::bail!("QA finished with errors");
            }
        }

        // ── Single checks ────────────────────────────────────────────
        Commands::Elevation { dem, format } => {
            let raster = read_dem(&dem)?;
            let s = elevation_summary(&raster).context("Failed to summarise elevation")?;
            match format {
                OutputFormat::Text => {
                    println!("min: {:.2}", s.min);
                    println!("max: {:.2}", s.max);
                    println!("mean: {:.2}", s.mean);
                    println!("std: {:.2}", s.std);
                }
                OutputFormat::Json => print_json(&s)?,
            }
        }

        Commands::Resolution { dem, format } => {
            let raster = read_dem(&dem)?;
            let res = dem_resolution(&raster);
            if raster.transform().is_rotated() {
                warn!("Rotated transform: shear terms ignored");
            }
            match format {
                OutputFormat::Text => {
                    println!("Pixel size: {:.2}m x {:.2}m", res.width, res.height)
                }
                OutputFormat::Json => print_json(&res)?,
            }
        }

        Commands::Slope { dem, slope: args, format } => {
            let raster = read_dem(&dem)?;
            let params = args.params();
            let units = params.units;
            let start = Instant::now();
            let grid = slope(&raster, params).context("Failed to calculate slope")?;
            info!("Processing time: {:.2?}", start.elapsed());
            let s = summarize(&grid).context("Slope grid has no valid cells")?;
            match format {
                OutputFormat::Text => println!(
                    "Slope ({}) - min: {:.2}, max: {:.2}, mean: {:.2}",
                    units.abbrev(),
                    s.min,
                    s.max,
                    s.mean
                ),
                OutputFormat::Json => print_json(&s)?,
            }
        }

        Commands::Density { pointcloud, format } => {
            let cloud = read_cloud(&pointcloud)?;
            let d = point_density(&cloud).context("Failed to compute point density")?;
            match format {
                OutputFormat::Text => {
                    println!("point_count: {}", d.point_count);
                    println!("area_m2: {:.2}", d.area);
                    println!("avg_density_ppm2: {:.2}", d.avg_density);
                }
                OutputFormat::Json => print_json(&d)?,
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_dem(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let res = dem_resolution(&raster);
            let valid = raster.valid_count();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Pixel size: {} x {}", res.width, res.height);
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if raster.transform().is_rotated() {
                println!("Transform: rotated");
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!(
                "Valid cells: {} ({:.1}%)",
                valid,
                100.0 * valid as f64 / raster.len().max(1) as f64
            );
        }
    }

    Ok(())
}
