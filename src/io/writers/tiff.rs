use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

use crate::core::raster::{GeoTransform, Raster};
use crate::io::gdal::GdalError;
use crate::types::NODATA_CODE;

fn write_band<T: GdalType + Copy>(
    output: &Path,
    cols: usize,
    rows: usize,
    data: Vec<T>,
    nodata: f64,
) -> Result<Dataset, GdalError> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let ds = driver.create_with_band_type::<T, _>(output, cols, rows, 1)?;
    let mut buf = Buffer::new((cols, rows), data);
    let mut band = ds.rasterband(1)?;
    band.set_no_data_value(Some(nodata))?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(ds)
}

fn georeference(ds: &mut Dataset, transform: &GeoTransform, crs: &str) -> Result<(), GdalError> {
    ds.set_geo_transform(&transform.0)?;
    if !crs.is_empty() {
        let srs = SpatialRef::from_definition(crs)?;
        ds.set_spatial_ref(&srs)?;
    }
    Ok(())
}

/// Float32 GeoTIFF of a continuous raster; NaN is written as `nodata`.
pub fn write_tiff_f32(output: &Path, raster: &Raster<f64>, nodata: f64) -> Result<Dataset, GdalError> {
    let data: Vec<f32> = raster
        .data
        .iter()
        .map(|&v| if v.is_nan() { nodata as f32 } else { v as f32 })
        .collect();
    let mut ds = write_band(output, raster.cols(), raster.rows(), data, nodata)?;
    georeference(&mut ds, &raster.transform, &raster.crs)?;
    Ok(ds)
}

/// Int32 GeoTIFF of a classified raster with the sentinel as nodata.
pub fn write_tiff_i32(output: &Path, raster: &Raster<i32>) -> Result<Dataset, GdalError> {
    let data: Vec<i32> = raster.data.iter().copied().collect();
    let mut ds = write_band(output, raster.cols(), raster.rows(), data, NODATA_CODE as f64)?;
    georeference(&mut ds, &raster.transform, &raster.crs)?;
    Ok(ds)
}
