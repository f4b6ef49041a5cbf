use gdal::raster::ResampleAlg;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::raster::{GeoTransform, Raster};

/// Errors encountered in the GDAL adapters
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
    #[error("Warp failed: {0}")]
    Warp(String),
}

/// Metadata extracted from a GDAL-supported raster
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection as `EPSG:xxxx` when an authority code is present, WKT otherwise
    pub projection: String,
    /// Nodata value of band 1
    pub nodata: Option<f64>,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Reader for single-band georeferenced rasters via GDAL
pub struct GdalRasterReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

/// Extract an `EPSG:xxxx` label from a WKT authority tag
pub(crate) fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(idx) = wkt.rfind(KEY) {
        let start = idx + KEY.len();
        if let Some(end) = wkt[start..].find('"') {
            let code = &wkt[start..start + end];
            return Some(format!("EPSG:{}", code));
        }
    }
    // WKT2 form
    const KEY2: &str = "ID[\"EPSG\",";
    if let Some(idx) = wkt.rfind(KEY2) {
        let start = idx + KEY2.len();
        let code: String = wkt[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if !code.is_empty() {
            return Some(format!("EPSG:{}", code));
        }
    }
    None
}

/// Normalise a projection string to the label used across the crate
pub(crate) fn crs_label(projection: &str) -> String {
    if projection.starts_with("EPSG:") {
        projection.to_string()
    } else if let Some(code) = parse_epsg(projection) {
        code
    } else {
        projection.to_string()
    }
}

impl GdalRasterReader {
    /// Open a GDAL-supported raster (GeoTIFF, VRT, ...)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset.geo_transform().map_err(|_| {
            GdalError::UnsupportedFormat(format!(
                "{} has no geotransform",
                path.as_ref().display()
            ))
        })?;
        let projection = crs_label(&dataset.projection());
        let nodata = dataset.rasterband(1)?.no_data_value();
        // Collect metadata entries (domain "")
        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        Ok(GdalRasterReader {
            dataset,
            metadata: GdalMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                nodata,
                metadata: metadata_map,
            },
        })
    }

    /// Read a single band (1-based index) as an f64 ndarray of shape (height, width)
    pub fn read_band(&self, index: usize) -> Result<Array2<f64>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>((0, 0), window, window, Some(ResampleAlg::NearestNeighbour))?;
        let data_vec = buf.data().to_vec();
        let got = data_vec.len();
        Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec).map_err(
            |_| {
                GdalError::DimensionMismatch(
                    self.metadata.size_x,
                    self.metadata.size_y,
                    got,
                    1,
                )
            },
        )
    }

    /// Band 1 as a raster, nodata samples replaced with NaN
    pub fn read_masked(&self) -> Result<Raster<f64>, GdalError> {
        let mut data = self.read_band(1)?;
        if let Some(nd) = self.metadata.nodata {
            data.mapv_inplace(|v| if v == nd || (nd.is_nan() && v.is_nan()) { f64::NAN } else { v });
        }
        Ok(Raster {
            data,
            transform: GeoTransform(self.metadata.geotransform),
            crs: self.metadata.projection.clone(),
            nodata: self.metadata.nodata,
        })
    }
}
