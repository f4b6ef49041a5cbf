//! In-memory [`DataStore`] for tests and embedding.
//!
//! It does not reproject: vectors must already be in the requested CRS and
//! alignment only crops rasters that share the target's CRS and pixel size.
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use tracing::debug;

use crate::core::land::Region;
use crate::core::raster::Raster;
use crate::core::stats::Stats;
use crate::error::{Error, Result};
use crate::io::layout::ProjectLayout;
use crate::io::store::DataStore;
use crate::io::vector::PolygonFeature;
use crate::io::warp::AlignTarget;

#[derive(Debug, Clone)]
struct VectorLayer {
    crs: String,
    features: Vec<PolygonFeature>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rasters: HashMap<PathBuf, Raster<f64>>,
    classified: HashMap<PathBuf, Raster<i32>>,
    metadata: HashMap<PathBuf, BTreeMap<String, String>>,
    vectors: HashMap<PathBuf, VectorLayer>,
    stats: HashMap<PathBuf, Stats>,
    prepared: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_raster(&mut self, path: impl Into<PathBuf>, raster: Raster<f64>) {
        self.rasters.insert(path.into(), raster);
    }

    pub fn insert_features(
        &mut self,
        path: impl Into<PathBuf>,
        crs: impl Into<String>,
        features: Vec<PolygonFeature>,
    ) {
        self.vectors.insert(
            path.into(),
            VectorLayer {
                crs: crs.into(),
                features,
            },
        );
    }

    /// Single feature without attributes.
    pub fn insert_region(&mut self, path: impl Into<PathBuf>, region: &Region) {
        let feature = PolygonFeature {
            geometry: region.geometry.clone(),
            attributes: HashMap::new(),
        };
        self.insert_features(path, region.crs.clone(), vec![feature]);
    }

    pub fn raster(&self, path: &Path) -> Option<&Raster<f64>> {
        self.rasters.get(path)
    }

    pub fn classified(&self, path: &Path) -> Option<&Raster<i32>> {
        self.classified.get(path)
    }

    pub fn metadata(&self, path: &Path) -> Option<&BTreeMap<String, String>> {
        self.metadata.get(path)
    }

    pub fn stats(&self, path: &Path) -> Option<&Stats> {
        self.stats.get(path)
    }

    /// Geometry of a stored vector, all features merged.
    pub fn region(&self, path: &Path) -> Option<Region> {
        let layer = self.vectors.get(path)?;
        let polygons: Vec<_> = layer
            .features
            .iter()
            .flat_map(|f| f.geometry.0.iter().cloned())
            .collect();
        Some(Region::new(MultiPolygon::new(polygons), layer.crs.clone()))
    }

    /// Number of `prepare` calls seen.
    pub fn prepared(&self) -> usize {
        self.prepared
    }

    fn align<T: Clone>(raster: &Raster<T>, target: &AlignTarget, src: &Path) -> Result<Raster<T>> {
        if raster.crs != target.crs() {
            return Err(Error::DataFormat(format!(
                "{:?} is in {} and cannot be reprojected to {} in memory",
                src,
                raster.crs,
                target.crs()
            )));
        }
        let bounds = match target {
            AlignTarget::Bounds { bounds, .. } => *bounds,
            AlignTarget::Grid(grid) => grid.bounds(),
        };
        let cropped = raster.crop_to(&bounds).ok_or_else(|| {
            Error::Processing(format!("{:?} does not overlap the alignment target", src))
        })?;
        if let AlignTarget::Grid(grid) = target {
            grid.ensure_matches(&cropped.grid(), &src.display().to_string())?;
        }
        Ok(cropped)
    }
}

impl DataStore for MemoryStore {
    fn prepare(&mut self, layout: &ProjectLayout) -> Result<()> {
        self.prepared += 1;
        debug!("Memory store ready for {:?}", layout.project_dir);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.rasters.contains_key(path)
            || self.classified.contains_key(path)
            || self.vectors.contains_key(path)
            || self.stats.contains_key(path)
    }

    fn read_raster(&self, path: &Path) -> Result<Raster<f64>> {
        self.rasters
            .get(path)
            .cloned()
            .ok_or_else(|| Error::missing("raster", path))
    }

    fn read_classified(&self, path: &Path) -> Result<Raster<i32>> {
        self.classified
            .get(path)
            .cloned()
            .ok_or_else(|| Error::missing("classified raster", path))
    }

    fn write_continuous(
        &mut self,
        path: &Path,
        raster: &Raster<f64>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.rasters.insert(path.to_path_buf(), raster.clone());
        self.metadata.insert(path.to_path_buf(), metadata.clone());
        Ok(())
    }

    fn write_classified(
        &mut self,
        path: &Path,
        raster: &Raster<i32>,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.classified.insert(path.to_path_buf(), raster.clone());
        self.metadata.insert(path.to_path_buf(), metadata.clone());
        Ok(())
    }

    fn read_vector(&self, path: &Path, target_crs: &str) -> Result<Vec<PolygonFeature>> {
        let layer = self
            .vectors
            .get(path)
            .ok_or_else(|| Error::missing("vector file", path))?;
        if layer.crs != target_crs {
            return Err(Error::DataFormat(format!(
                "{:?} is in {} and cannot be reprojected to {} in memory",
                path, layer.crs, target_crs
            )));
        }
        Ok(layer.features.clone())
    }

    fn write_vector(&mut self, path: &Path, region: &Region) -> Result<()> {
        self.insert_region(path, region);
        Ok(())
    }

    fn write_stats(&mut self, path: &Path, stats: &Stats) -> Result<()> {
        self.stats.insert(path.to_path_buf(), stats.clone());
        Ok(())
    }

    fn align_raster(&mut self, src: &Path, dst: &Path, target: &AlignTarget) -> Result<()> {
        if let Some(raster) = self.rasters.get(src) {
            let aligned = Self::align(raster, target, src)?;
            self.rasters.insert(dst.to_path_buf(), aligned);
            return Ok(());
        }
        if let Some(raster) = self.classified.get(src) {
            let aligned = Self::align(raster, target, src)?;
            self.classified.insert(dst.to_path_buf(), aligned);
            return Ok(());
        }
        Err(Error::missing("raster", src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::{GeoTransform, GridSpec};
    use geo::{Coord, Rect};
    use ndarray::Array2;

    const CRS: &str = "EPSG:32721";

    fn source() -> Raster<f64> {
        let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        Raster::new(data, GeoTransform::new(0.0, 10.0, 40.0, -10.0), CRS)
    }

    #[test]
    fn bounds_alignment_crops() {
        let mut store = MemoryStore::new();
        store.insert_raster("dem.tif", source());
        let target = AlignTarget::Bounds {
            crs: CRS.into(),
            bounds: Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 30.0, y: 30.0 }),
        };
        store
            .align_raster(Path::new("dem.tif"), Path::new("dem_processed.tif"), &target)
            .unwrap();
        let out = store.raster(Path::new("dem_processed.tif")).unwrap();
        assert_eq!(out.data.dim(), (2, 2));
        assert_eq!(out.data[[0, 0]], 5.0);
    }

    #[test]
    fn grid_alignment_checks_registration() {
        let mut store = MemoryStore::new();
        store.insert_raster("hand.tif", source());
        let grid = GridSpec {
            crs: CRS.into(),
            transform: GeoTransform::new(10.0, 10.0, 30.0, -10.0),
            rows: 2,
            cols: 2,
        };
        store
            .align_raster(Path::new("hand.tif"), Path::new("out.tif"), &AlignTarget::Grid(grid))
            .unwrap();

        let coarse = GridSpec {
            crs: CRS.into(),
            transform: GeoTransform::new(0.0, 20.0, 40.0, -20.0),
            rows: 2,
            cols: 2,
        };
        let err = store
            .align_raster(Path::new("hand.tif"), Path::new("bad.tif"), &AlignTarget::Grid(coarse))
            .unwrap_err();
        assert!(matches!(err, Error::GridMismatch { .. }));
    }

    #[test]
    fn foreign_crs_is_refused() {
        let mut store = MemoryStore::new();
        let region = Region::new(MultiPolygon::new(Vec::new()), "EPSG:4326");
        store.insert_region("aoi.geojson", &region);
        let err = store.read_vector(Path::new("aoi.geojson"), CRS).unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)));
        assert!(matches!(
            store.read_vector(Path::new("missing.geojson"), CRS).unwrap_err(),
            Error::MissingResource { .. }
        ));
    }
}
