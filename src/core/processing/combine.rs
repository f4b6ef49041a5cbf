//! Map algebra merging classified layers into the final suitability grid.
use geo::BoundingRect;
use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::core::land::Region;
use crate::core::processing::ops::{count_code, to_hectares};
use crate::core::raster::Raster;
use crate::error::{Error, Result};
use crate::types::{NODATA_CODE, RoundingMode, SuitabilityLevel};

/// Hectares per suitability tier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SuitabilityAreas {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub nodata: usize,
    /// Pixels of the clipped grid whose centre lies in available land.
    pub inside: usize,
}

#[derive(Debug, Clone)]
pub struct Combined {
    pub classification: Raster<i32>,
    pub areas: SuitabilityAreas,
    pub counts: PixelCounts,
}

/// Arithmetic mean of the codes; negative means become [`NODATA_CODE`].
/// `None` for an empty slice.
pub fn mean_codes(layers: &[&Array2<i32>]) -> Option<Array2<f64>> {
    let first = layers.first()?;
    let mut sum = Array2::<f64>::zeros(first.dim());
    for grid in layers {
        Zip::from(&mut sum).and(*grid).for_each(|acc, &v| *acc += v as f64);
    }
    let n = layers.len() as f64;
    Some(sum.mapv(|s| {
        let mean = s / n;
        if mean < 0.0 { NODATA_CODE as f64 } else { mean }
    }))
}

/// Combine co-registered classified layers and clip the result to available land.
pub fn combine_layers(
    layers: &[Raster<i32>],
    available_land: &Region,
    rounding: RoundingMode,
) -> Result<Combined> {
    let Some(first) = layers.first() else {
        return Err(Error::Configuration(
            "no classified layers to combine".to_string(),
        ));
    };
    let reference = first.grid();
    for (i, layer) in layers.iter().enumerate().skip(1) {
        reference.ensure_matches(&layer.grid(), &format!("classified layer {}", i + 1))?;
    }
    if available_land.crs != reference.crs {
        return Err(Error::GridMismatch {
            layer: "available land".to_string(),
            detail: format!(
                "CRS {} differs from raster CRS {}",
                available_land.crs, reference.crs
            ),
        });
    }
    info!("Combining {} classified layers ({})", layers.len(), rounding);

    let grids: Vec<&Array2<i32>> = layers.iter().map(|l| &l.data).collect();
    let mean = mean_codes(&grids)
        .ok_or_else(|| Error::Configuration("no classified layers to combine".to_string()))?;
    let classes = mean.mapv(|m| rounding.apply(m) as i32);
    let full = first.with_data(classes);

    let window = available_land
        .geometry
        .bounding_rect()
        .and_then(|bbox| full.transform.window(&bbox, full.rows(), full.cols()))
        .ok_or_else(|| {
            Error::Processing("available land does not overlap the classification grid".to_string())
        })?;
    let mut clipped = full.crop(window);
    let inside = clipped.footprint_mask(&available_land.geometry);
    Zip::from(&mut clipped.data).and(&inside).for_each(|v, &m| {
        if !m {
            *v = NODATA_CODE;
        }
    });
    clipped.nodata = Some(NODATA_CODE as f64);

    let inside_count = inside.iter().filter(|m| **m).count();
    let tier = |level: SuitabilityLevel| count_code(&clipped.data, level.code(), Some(&inside));
    let counts = PixelCounts {
        low: tier(SuitabilityLevel::Low),
        medium: tier(SuitabilityLevel::Medium),
        high: tier(SuitabilityLevel::High),
        nodata: count_code(&clipped.data, NODATA_CODE, Some(&inside)),
        inside: inside_count,
    };
    let pixel_area = clipped.transform.pixel_area();
    let areas = SuitabilityAreas {
        low: to_hectares(counts.low as f64 * pixel_area),
        medium: to_hectares(counts.medium as f64 * pixel_area),
        high: to_hectares(counts.high as f64 * pixel_area),
    };
    debug!(?counts, "classification pixel counts");

    Ok(Combined {
        classification: clipped,
        areas,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::GeoTransform;
    use geo::{MultiPolygon, polygon};
    use ndarray::array;

    const CRS: &str = "EPSG:32721";

    fn layer(data: Array2<i32>) -> Raster<i32> {
        let rows = data.nrows() as f64;
        Raster::new(data, GeoTransform::new(0.0, 100.0, rows * 100.0, -100.0), CRS)
    }

    fn land(x1: f64, y1: f64) -> Region {
        Region::new(
            MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: x1, y: 0.0),
                (x: x1, y: y1),
                (x: 0.0, y: y1),
            ]]),
            CRS,
        )
    }

    #[test]
    fn mean_then_floor() {
        let a = layer(array![[1, 3]]);
        let b = layer(array![[3, 3]]);
        let out = combine_layers(&[a, b], &land(200.0, 100.0), RoundingMode::Floor).unwrap();
        assert_eq!(out.classification.data, array![[2, 3]]);
        assert_eq!(out.counts.medium, 1);
        assert_eq!(out.counts.high, 1);
        // 100 m x 100 m pixel = 1 Ha
        assert_eq!(out.areas.medium, 1.0);
        assert_eq!(out.areas.high, 1.0);
        assert_eq!(out.areas.low, 0.0);
    }

    #[test]
    fn identical_layers_agree_for_every_rounding() {
        let grid = array![[3, 3], [3, 3]];
        for mode in [RoundingMode::Floor, RoundingMode::Ceil, RoundingMode::Round] {
            let layers = vec![layer(grid.clone()), layer(grid.clone()), layer(grid.clone())];
            let out = combine_layers(&layers, &land(200.0, 200.0), mode).unwrap();
            assert!(out.classification.data.iter().all(|&v| v == 3), "{mode}");
        }
    }

    #[test]
    fn nodata_in_any_layer_propagates() {
        let a = layer(array![[NODATA_CODE, 2]]);
        let b = layer(array![[3, 2]]);
        let out = combine_layers(&[a, b], &land(200.0, 100.0), RoundingMode::Ceil).unwrap();
        assert_eq!(out.classification.data, array![[NODATA_CODE, 2]]);
        assert_eq!(out.counts.nodata, 1);
    }

    #[test]
    fn clip_drops_outside_pixels_and_conserves_counts() {
        let data = array![[1, 2, 3, 1], [2, 3, 1, 2], [3, 1, 2, 3], [1, 1, 1, 1]];
        // lower-left 3x2 block of a 4x4 grid with x up to 300, y up to 200
        let out = combine_layers(&[layer(data)], &land(300.0, 200.0), RoundingMode::Floor).unwrap();
        assert_eq!(out.classification.data.dim(), (2, 3));
        assert_eq!(out.classification.data, array![[3, 1, 2], [1, 1, 1]]);
        let c = out.counts;
        assert_eq!(c.low + c.medium + c.high + c.nodata, c.inside);
        assert_eq!(c.inside, 6);
    }

    #[test]
    fn triangle_clip_marks_outside_pixels_nodata() {
        let data = Array2::from_elem((2, 2), 2);
        let tri = Region::new(
            MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 200.0, y: 0.0), (x: 0.0, y: 200.0)]]),
            CRS,
        );
        let out = combine_layers(&[layer(data)], &tri, RoundingMode::Floor).unwrap();
        // only (50, 50) is strictly inside; two centres sit on the hypotenuse
        assert_eq!(out.counts.inside, 1);
        assert_eq!(out.counts.medium, 1);
        assert_eq!(out.classification.data.iter().filter(|&&v| v == NODATA_CODE).count(), 3);
    }

    #[test]
    fn empty_layer_list_fails() {
        let err = combine_layers(&[], &land(1.0, 1.0), RoundingMode::Floor).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert!(mean_codes(&[]).is_none());
        let grid = array![[1, 3], [NODATA_CODE, 2]];
        let mean = mean_codes(&[&grid, &grid]).unwrap();
        assert_eq!(mean, array![[1.0, 3.0], [NODATA_CODE as f64, 2.0]]);
    }

    #[test]
    fn misaligned_layers_fail_fast() {
        let a = layer(array![[1, 2]]);
        let mut b = layer(array![[1, 2]]);
        b.transform = GeoTransform::new(50.0, 100.0, 100.0, -100.0);
        let err = combine_layers(&[a, b], &land(200.0, 100.0), RoundingMode::Floor).unwrap_err();
        assert!(matches!(err, Error::GridMismatch { .. }));
    }
}
