//! GDAL-backed [`DataStore`] over GeoTIFF and OGR files.
use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::core::land::Region;
use crate::core::raster::Raster;
use crate::core::stats::Stats;
use crate::error::{Error, Result};
use crate::io::gdal::GdalRasterReader;
use crate::io::layout::ProjectLayout;
use crate::io::store::DataStore;
use crate::io::vector::{self, PolygonFeature};
use crate::io::warp::{self, AlignTarget};
use crate::io::writers::{embed_tiff_metadata, write_json, write_tiff_f32, write_tiff_i32};
use crate::types::NODATA_CODE;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl DiskStore {
    pub fn new() -> Self {
        DiskStore
    }

    fn require(&self, what: &'static str, path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(Error::missing(what, path))
        }
    }

    fn note_overwrite(path: &Path) {
        if path.exists() {
            info!("Overwriting {:?}", path);
        }
    }
}

impl DataStore for DiskStore {
    fn prepare(&mut self, layout: &ProjectLayout) -> Result<()> {
        layout.ensure_dirs()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_raster(&self, path: &Path) -> Result<Raster<f64>> {
        self.require("raster", path)?;
        Ok(GdalRasterReader::open(path)?.read_masked()?)
    }

    fn read_classified(&self, path: &Path) -> Result<Raster<i32>> {
        let raster = self.read_raster(path)?;
        let codes = raster
            .data
            .mapv(|v| if v.is_nan() { NODATA_CODE } else { v as i32 });
        Ok(raster.with_data(codes).with_nodata(NODATA_CODE as f64))
    }

    fn write_continuous(
        &mut self,
        path: &Path,
        raster: &Raster<f64>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        Self::note_overwrite(path);
        let nodata = raster.nodata.filter(|v| !v.is_nan()).unwrap_or(NODATA_CODE as f64);
        let mut ds = write_tiff_f32(path, raster, nodata)?;
        embed_tiff_metadata(&mut ds, metadata)?;
        info!("Wrote {:?}", path);
        Ok(())
    }

    fn write_classified(
        &mut self,
        path: &Path,
        raster: &Raster<i32>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        Self::note_overwrite(path);
        let mut ds = write_tiff_i32(path, raster)?;
        embed_tiff_metadata(&mut ds, metadata)?;
        info!("Wrote {:?}", path);
        Ok(())
    }

    fn read_vector(&self, path: &Path, target_crs: &str) -> Result<Vec<PolygonFeature>> {
        self.require("vector file", path)?;
        Ok(vector::read_features(path, target_crs)?)
    }

    fn write_vector(&mut self, path: &Path, region: &Region) -> Result<()> {
        Self::note_overwrite(path);
        vector::write_geojson(path, region, "remaining_land")?;
        info!("Wrote {:?}", path);
        Ok(())
    }

    fn write_stats(&mut self, path: &Path, stats: &Stats) -> Result<()> {
        write_json(path, stats)
    }

    fn align_raster(&mut self, src: &Path, dst: &Path, target: &AlignTarget) -> Result<()> {
        self.require("raster", src)?;
        Self::note_overwrite(dst);
        warp::warp_to(src, dst, target)?;
        Ok(())
    }
}
