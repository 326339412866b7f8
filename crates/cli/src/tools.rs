//! External GDAL tool collaborators
//!
//! Format translation and point reprojection stay outside the core:
//! they shell out to `gdal_translate` and `gdaltransform` when present.
//! A missing binary is a fatal, actionable error before any processing
//! starts.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use vegclass_core::{Error, Result};

/// Locate an executable on PATH
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn require_tool(name: &str, hint: &str) -> Result<PathBuf> {
    find_tool(name).ok_or_else(|| Error::ExternalTool {
        tool: name.to_string(),
        hint: hint.to_string(),
    })
}

/// Convert an arbitrary GDAL-readable raster to a single-band GeoTIFF
pub fn translate_to_gtiff(input: &Path, output: &Path) -> Result<()> {
    let exe = require_tool(
        "gdal_translate",
        "Install GDAL or supply GeoTIFF inputs directly",
    )?;

    let status = Command::new(exe)
        .arg("-q")
        .args(["-of", "GTiff"])
        .arg(input)
        .arg(output)
        .status()?;

    if !status.success() {
        return Err(Error::Other(format!(
            "gdal_translate failed on {} ({})",
            input.display(),
            status
        )));
    }
    Ok(())
}

/// Resample a raster onto a target grid size with nearest-neighbour
/// sampling. Used when a supplied panchromatic band does not match the
/// multispectral grid.
pub fn resample_to_grid(input: &Path, output: &Path, cols: usize, rows: usize) -> Result<()> {
    let exe = require_tool(
        "gdal_translate",
        "Install GDAL or supply a panchromatic band matching the source grid",
    )?;

    let status = Command::new(exe)
        .arg("-q")
        .args(["-of", "GTiff"])
        .args(["-r", "nearest"])
        .args(["-outsize", &cols.to_string(), &rows.to_string()])
        .arg(input)
        .arg(output)
        .status()?;

    if !status.success() {
        return Err(Error::Other(format!(
            "gdal_translate resampling failed on {} ({})",
            input.display(),
            status
        )));
    }
    Ok(())
}

/// Reproject a delimited "x y" point file between two CRSs.
///
/// Streams the point file through `gdaltransform -s_srs .. -t_srs ..`;
/// the output file keeps the one-point-per-line layout the pipeline
/// reads.
pub fn reproject_points(
    points: &Path,
    output: &Path,
    source_srs: &str,
    target_srs: &str,
) -> Result<()> {
    let exe = require_tool(
        "gdaltransform",
        "Install GDAL or supply points in the imagery CRS",
    )?;

    let stdin = File::open(points)
        .map_err(|_| Error::MissingInput(format!("point file {}", points.display())))?;
    let stdout = File::create(output)?;

    let status = Command::new(exe)
        .args(["-s_srs", source_srs])
        .args(["-t_srs", target_srs])
        .args(["-output_xy"])
        .stdin(stdin)
        .stdout(stdout)
        .status()?;

    if !status.success() {
        return Err(Error::Other(format!(
            "gdaltransform failed on {} ({})",
            points.display(),
            status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_tool_is_not_found() {
        assert!(find_tool("vegclass-no-such-binary-xyz").is_none());
    }

    #[test]
    fn absent_tool_is_an_external_tool_error() {
        let err = require_tool("vegclass-no-such-binary-xyz", "hint").unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
    }

    #[test]
    fn resample_produces_the_requested_grid() {
        if find_tool("gdal_translate").is_none() {
            return; // environment without GDAL
        }

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pan.tif");
        let out = dir.path().join("pan_resampled.tif");

        let raster = vegclass_core::Raster::<f32>::filled(8, 8, 5.0);
        vegclass_core::io::write_geotiff(&raster, &src).unwrap();

        resample_to_grid(&src, &out, 4, 6).unwrap();
        let back: vegclass_core::Raster<f32> = vegclass_core::io::read_geotiff(&out).unwrap();
        assert_eq!(back.shape(), (6, 4));
    }
}
