//! OGR-backed polygon reader and GeoJSON writer.
use std::collections::HashMap;
use std::path::Path;

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::vector::{LayerAccess, LayerOptions, ToGdal};
use gdal::{Dataset, DriverManager};
use geo::{Geometry, MultiPolygon, Polygon};
use tracing::{debug, warn};

use crate::core::land::Region;
use crate::io::gdal::GdalError;

/// CRS assumed for layers that carry none.
pub const DEFAULT_VECTOR_CRS: &str = "EPSG:4326";

/// Vector formats accepted by [`read_features`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    GeoParquet,
    Shapefile,
    GeoJson,
    Kml,
}

impl VectorFormat {
    pub fn from_path(path: &Path) -> Result<Self, GdalError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "parquet" | "geoparquet" => Ok(VectorFormat::GeoParquet),
            "shp" => Ok(VectorFormat::Shapefile),
            "geojson" | "json" => Ok(VectorFormat::GeoJson),
            "kml" => Ok(VectorFormat::Kml),
            _ => Err(GdalError::UnsupportedFormat(format!(
                "unsupported vector file {:?}; expected .parquet, .shp, .geojson or .kml",
                path
            ))),
        }
    }
}

/// One polygonal feature with its string attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub geometry: MultiPolygon<f64>,
    pub attributes: HashMap<String, String>,
}

/// Flatten any polygonal geometry; points and lines are dropped.
pub fn polygons_of(geometry: Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0,
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::GeometryCollection(gc) => gc.0.into_iter().flat_map(polygons_of).collect(),
        _ => Vec::new(),
    }
}

fn spatial_ref(definition: &str) -> Result<SpatialRef, GdalError> {
    let mut srs = SpatialRef::from_definition(definition)?;
    srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    Ok(srs)
}

/// Read every polygonal feature of the first layer, reprojected to `target_crs`.
pub fn read_features(path: &Path, target_crs: &str) -> Result<Vec<PolygonFeature>, GdalError> {
    VectorFormat::from_path(path)?;
    let ds = Dataset::open(path)?;
    let mut layer = ds.layer(0)?;
    let target = spatial_ref(target_crs)?;
    let source = match layer.spatial_ref() {
        Some(mut srs) => {
            srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
            srs
        }
        None => {
            warn!("{:?} has no CRS; assuming {}", path, DEFAULT_VECTOR_CRS);
            spatial_ref(DEFAULT_VECTOR_CRS)?
        }
    };
    let transform = CoordTransform::new(&source, &target)?;

    let mut features = Vec::new();
    for feature in layer.features() {
        let Some(geometry) = feature.geometry() else {
            continue;
        };
        let projected = geometry.transform(&transform)?;
        let polygons = polygons_of(projected.to_geo()?);
        if polygons.is_empty() {
            continue;
        }
        let attributes = feature
            .fields()
            .filter_map(|(name, value)| Some((name, value?.into_string()?)))
            .collect();
        features.push(PolygonFeature {
            geometry: MultiPolygon::new(polygons),
            attributes,
        });
    }
    debug!("Read {} polygon features from {:?}", features.len(), path);
    Ok(features)
}

/// Write `region` as a single-feature GeoJSON file, replacing any existing one.
pub fn write_geojson(path: &Path, region: &Region, layer_name: &str) -> Result<(), GdalError> {
    if path.exists() {
        std::fs::remove_file(path)
            .map_err(|e| GdalError::UnsupportedFormat(format!("cannot replace {:?}: {}", path, e)))?;
    }
    let driver = DriverManager::get_driver_by_name("GeoJSON")?;
    let mut ds = driver.create_vector_only(path)?;
    let srs = spatial_ref(&region.crs)?;
    let mut layer = ds.create_layer(LayerOptions {
        name: layer_name,
        srs: Some(&srs),
        ty: gdal_sys::OGRwkbGeometryType::wkbMultiPolygon,
        ..Default::default()
    })?;
    let geometry = region.geometry.to_gdal()?;
    layer.create_feature(geometry)?;
    Ok(())
}
