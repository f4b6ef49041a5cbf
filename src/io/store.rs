//! Storage seam between the orchestrator and the raster/vector backends.
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::land::Region;
use crate::core::raster::Raster;
use crate::core::stats::Stats;
use crate::error::Result;
use crate::io::layout::ProjectLayout;
use crate::io::vector::PolygonFeature;
use crate::io::warp::AlignTarget;

/// Raster/vector provider used by [`crate::api::Project`].
///
/// Continuous rasters come back with nodata as NaN; classified rasters with
/// nodata as [`crate::types::NODATA_CODE`].
pub trait DataStore {
    /// One-off setup before a run, e.g. creating output directories.
    fn prepare(&mut self, layout: &ProjectLayout) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn read_raster(&self, path: &Path) -> Result<Raster<f64>>;

    fn read_classified(&self, path: &Path) -> Result<Raster<i32>>;

    fn write_continuous(
        &mut self,
        path: &Path,
        raster: &Raster<f64>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()>;

    fn write_classified(
        &mut self,
        path: &Path,
        raster: &Raster<i32>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Polygon features of `path` expressed in `target_crs`.
    fn read_vector(&self, path: &Path, target_crs: &str) -> Result<Vec<PolygonFeature>>;

    fn write_vector(&mut self, path: &Path, region: &Region) -> Result<()>;

    fn write_stats(&mut self, path: &Path, stats: &Stats) -> Result<()>;

    /// Co-register `src` onto `target`, storing the result at `dst`.
    fn align_raster(&mut self, src: &Path, dst: &Path, target: &AlignTarget) -> Result<()>;
}
