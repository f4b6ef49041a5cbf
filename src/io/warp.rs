//! Co-registration by delegating to `gdalwarp`.
use std::path::Path;
use std::process::Command;

use geo::Rect;
use tracing::{debug, info};

use crate::core::raster::GridSpec;
use crate::io::gdal::GdalError;

/// What a source raster is warped onto.
#[derive(Debug, Clone)]
pub enum AlignTarget {
    /// Reproject to `crs`, cropped to `bounds`, keeping the native resolution.
    Bounds { crs: String, bounds: Rect<f64> },
    /// Resample onto an existing grid cell for cell.
    Grid(GridSpec),
}

impl AlignTarget {
    pub fn crs(&self) -> &str {
        match self {
            AlignTarget::Bounds { crs, .. } => crs,
            AlignTarget::Grid(grid) => &grid.crs,
        }
    }
}

/// gdalwarp options for `target`, excluding source and destination.
pub fn warp_args(target: &AlignTarget) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-of".into(),
        "GTiff".into(),
        "-overwrite".into(),
        "-r".into(),
        "near".into(),
        "-t_srs".into(),
        target.crs().to_string(),
    ];
    let bounds = match target {
        AlignTarget::Bounds { bounds, .. } => *bounds,
        AlignTarget::Grid(grid) => grid.bounds(),
    };
    args.push("-te".into());
    for v in [bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y] {
        args.push(v.to_string());
    }
    if let AlignTarget::Grid(grid) = target {
        args.push("-ts".into());
        args.push(grid.cols.to_string());
        args.push(grid.rows.to_string());
    }
    args
}

/// Warp `src` into `dst`, replacing `dst` only once gdalwarp succeeded.
pub fn warp_to(src: &Path, dst: &Path, target: &AlignTarget) -> Result<(), GdalError> {
    info!("Warping {:?} to {}", src, target.crs());
    let dir = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = dst
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("warped");
    // Unique temporary file next to the destination (auto-cleanup on failure)
    let tmp_file = tempfile::Builder::new()
        .prefix(&format!("{}_", stem))
        .suffix("_warped.tif")
        .tempfile_in(dir)
        .map_err(|e| GdalError::Warp(format!("tempfile error: {}", e)))?;

    let args = warp_args(target);
    debug!(?args, "gdalwarp");
    let status = Command::new("gdalwarp")
        .args(&args)
        .arg(src)
        .arg(tmp_file.path())
        .status()
        .map_err(|e| GdalError::Warp(format!("gdalwarp exec error: {}", e)))?;
    if !status.success() {
        return Err(GdalError::Warp(format!("gdalwarp failed on {:?}", src)));
    }
    tmp_file
        .persist(dst)
        .map_err(|e| GdalError::Warp(format!("cannot persist {:?}: {}", dst, e.error)))?;
    Ok(())
}
