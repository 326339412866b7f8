//! vegclass CLI - supervised vegetation classification of 4-band imagery

mod tools;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use vegclass_algorithms::classify::{classify_scene, PipelineParams};
use vegclass_algorithms::imagery::SourceBands;
use vegclass_core::io::read_geotiff;
use vegclass_core::points::{read_point_file, GeoPoint};
use vegclass_core::Raster;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vegclass")]
#[command(author, version, about = "Vegetation classification of 4-band satellite imagery", long_about = None)]
struct Cli {
    /// Red band raster
    #[arg(long)]
    red: PathBuf,

    /// Green band raster
    #[arg(long)]
    green: PathBuf,

    /// Blue band raster
    #[arg(long)]
    blue: PathBuf,

    /// Near-infrared band raster
    #[arg(long)]
    nir: PathBuf,

    /// Panchromatic band raster (synthesized from the four bands when omitted)
    #[arg(long)]
    pan: Option<PathBuf>,

    /// Vegetation training points ("x y" per line, imagery CRS)
    #[arg(long)]
    vegetation: PathBuf,

    /// Non-vegetation training points ("x y" per line, imagery CRS)
    #[arg(long = "non-vegetation")]
    non_vegetation: PathBuf,

    /// Output directory for feature rasters, training table and classification
    #[arg(short, long, default_value = "classification")]
    outdir: PathBuf,

    /// Number of trees in the ensemble (also seeds the random generator)
    #[arg(long, default_value_t = 3)]
    ntrees: usize,

    /// No-data value of the source bands
    #[arg(long)]
    nodata: Option<f32>,

    /// CRS of the point files, e.g. EPSG:4326 (requires --target-srs;
    /// points are reprojected through gdaltransform)
    #[arg(long)]
    source_srs: Option<String>,

    /// CRS of the imagery, e.g. EPSG:32719
    #[arg(long)]
    target_srs: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
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

fn is_geotiff(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff")
    )
}

/// Read a band, routing non-GeoTIFF inputs through gdal_translate
fn read_band(path: &Path, name: &str, work_dir: &Path) -> Result<Raster<f32>> {
    if !path.exists() {
        anyhow::bail!("Missing input: {} band {}", name, path.display());
    }

    let pb = spinner(&format!("Reading {} band...", name));
    let geotiff = if is_geotiff(path) {
        path.to_path_buf()
    } else {
        let converted = work_dir.join(format!("input_{}.tif", name));
        tools::translate_to_gtiff(path, &converted)
            .with_context(|| format!("Failed to convert {} band", name))?;
        converted
    };

    let raster: Raster<f32> =
        read_geotiff(&geotiff).with_context(|| format!("Failed to read {} band", name))?;
    pb.finish_and_clear();
    info!("{} band: {} x {}", name, raster.cols(), raster.rows());
    Ok(raster)
}

/// Read the panchromatic band, resampling it onto the multispectral grid
/// when its dimensions differ
fn read_pan(path: &Path, reference: &Raster<f32>, work_dir: &Path) -> Result<Raster<f32>> {
    let pan = read_band(path, "pan", work_dir)?;
    if pan.shape() == reference.shape() {
        return Ok(pan);
    }

    let (rows, cols) = reference.shape();
    info!(
        "pan band is {} x {}, resampling to {} x {}",
        pan.cols(),
        pan.rows(),
        cols,
        rows
    );
    let resampled = work_dir.join("input_pan_resampled.tif");
    tools::resample_to_grid(path, &resampled, cols, rows)
        .context("Failed to resample pan band")?;
    read_geotiff(&resampled).context("Failed to read resampled pan band")
}

/// Read a point file, reprojecting when a CRS pair is given
fn read_points(
    path: &Path,
    label: &str,
    srs: Option<(&str, &str)>,
    work_dir: &Path,
) -> Result<Vec<GeoPoint>> {
    let source = if let Some((source_srs, target_srs)) = srs {
        let reprojected = work_dir.join(format!("points_{}.txt", label));
        tools::reproject_points(path, &reprojected, source_srs, target_srs)
            .with_context(|| format!("Failed to reproject {} points", label))?;
        reprojected
    } else {
        path.to_path_buf()
    };

    let points = read_point_file(&source)
        .with_context(|| format!("Failed to read {} points", label))?;
    info!("{} points: {}", label, points.len());
    Ok(points)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let srs = match (cli.source_srs.as_deref(), cli.target_srs.as_deref()) {
        (Some(s), Some(t)) => Some((s, t)),
        (None, None) => None,
        _ => anyhow::bail!("--source-srs and --target-srs must be given together"),
    };

    std::fs::create_dir_all(&cli.outdir)
        .with_context(|| format!("Cannot create output directory {}", cli.outdir.display()))?;

    let bands = SourceBands {
        red: read_band(&cli.red, "red", &cli.outdir)?,
        green: read_band(&cli.green, "green", &cli.outdir)?,
        blue: read_band(&cli.blue, "blue", &cli.outdir)?,
        nir: read_band(&cli.nir, "nir", &cli.outdir)?,
    };
    let pan = match cli.pan.as_deref() {
        Some(path) => Some(read_pan(path, &bands.red, &cli.outdir)?),
        None => None,
    };

    let vegetation = read_points(&cli.vegetation, "vegetation", srs, &cli.outdir)?;
    let background = read_points(&cli.non_vegetation, "non-vegetation", srs, &cli.outdir)?;

    let params = PipelineParams {
        n_trees: cli.ntrees,
        nodata: cli.nodata,
        ..Default::default()
    };

    let pb = spinner("Classifying...");
    let start = Instant::now();
    let outputs = classify_scene(bands, pan, &vegetation, &background, &cli.outdir, &params)
        .context("Classification failed")?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    println!(
        "Classification saved to: {}",
        outputs.classification.display()
    );
    println!("  Quicklook: {}", outputs.quicklook.display());
    println!("  Training table: {}", outputs.training_table.display());
    println!("  Vegetation pixels: {}", outputs.vegetation_pixels);
    println!("  Processing time: {:.2?}", elapsed);

    Ok(())
}
