//! Multi-year land-cover persistence filter.
use std::collections::BTreeMap;

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::core::params::CategoryConfig;
use crate::core::processing::reclassify::reclassify_categorical;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Persistence {
    /// Most recent year's category where viable in every year, NaN elsewhere.
    pub persistent: Array2<f64>,
    /// `persistent` run through the categorical reclassifier.
    pub suitability: Array2<i32>,
    /// Year whose categories were kept.
    pub last_year: i32,
}

/// Replace `no_data_class` and `clouds_class` samples with NaN.
pub fn mask_unobserved(grid: &Array2<f64>, no_data_class: i32, clouds_class: i32) -> Array2<f64> {
    let (nd, cl) = (no_data_class as f64, clouds_class as f64);
    grid.mapv(|v| if v == nd || v == cl { f64::NAN } else { v })
}

/// Keep pixels whose category is viable in every supplied year.
///
/// Only the years present in `years` constrain the result; callers drop years
/// without data before calling, which loosens the persistence requirement.
pub fn persist_viable(
    years: &BTreeMap<i32, Array2<f64>>,
    config: &CategoryConfig,
    no_data_class: i32,
    clouds_class: i32,
) -> Result<Persistence> {
    let Some((&last_year, last_grid)) = years.last_key_value() else {
        return Err(Error::Processing(
            "land cover persistence needs at least one year".to_string(),
        ));
    };
    let shape = last_grid.dim();
    let viable: Vec<f64> = config
        .viable_categories()
        .into_iter()
        .map(|c| c as f64)
        .collect();

    let mut combined = Array2::from_elem(shape, true);
    for (&year, grid) in years {
        if grid.dim() != shape {
            return Err(Error::GridMismatch {
                layer: format!("land cover {year}"),
                detail: format!("shape {:?} differs from {:?}", grid.dim(), shape),
            });
        }
        let masked = mask_unobserved(grid, no_data_class, clouds_class);
        Zip::from(&mut combined).and(&masked).for_each(|keep, &v| {
            *keep = *keep && viable.contains(&v);
        });
        debug!(year, "land cover year intersected");
    }
    let last_masked = mask_unobserved(last_grid, no_data_class, clouds_class);

    let persistent = Zip::from(&combined)
        .and(&last_masked)
        .map_collect(|&keep, &v| if keep { v } else { f64::NAN });
    let suitability = reclassify_categorical(&persistent, config);

    Ok(Persistence {
        persistent,
        suitability,
        last_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NODATA_CODE;
    use ndarray::array;

    fn config() -> CategoryConfig {
        CategoryConfig::default()
    }

    #[test]
    fn pixel_must_be_viable_every_year() {
        let mut years = BTreeMap::new();
        years.insert(2021, array![[5.0, 8.0, 11.0, 2.0]]);
        years.insert(2022, array![[8.0, 1.0, 11.0, 5.0]]);
        years.insert(2023, array![[11.0, 8.0, 5.0, 5.0]]);
        let out = persist_viable(&years, &config(), 0, 10).unwrap();

        assert_eq!(out.last_year, 2023);
        assert_eq!(out.persistent[[0, 0]], 11.0);
        assert!(out.persistent[[0, 1]].is_nan());
        assert_eq!(out.persistent[[0, 2]], 5.0);
        assert!(out.persistent[[0, 3]].is_nan());
        assert_eq!(out.suitability, array![[3, NODATA_CODE, 1, NODATA_CODE]]);
    }

    #[test]
    fn clouds_and_nodata_break_persistence() {
        let mut years = BTreeMap::new();
        years.insert(2020, array![[10.0, 0.0, 8.0]]);
        years.insert(2021, array![[8.0, 8.0, 8.0]]);
        let out = persist_viable(&years, &config(), 0, 10).unwrap();
        assert_eq!(out.suitability, array![[NODATA_CODE, NODATA_CODE, 3]]);
    }

    #[test]
    fn single_year_equals_direct_reclassification() {
        let grid = array![[5.0, 8.0, 0.0], [10.0, 11.0, 3.0]];
        let mut years = BTreeMap::new();
        years.insert(2025, grid.clone());
        let out = persist_viable(&years, &config(), 0, 10).unwrap();
        let direct = reclassify_categorical(&mask_unobserved(&grid, 0, 10), &config());
        assert_eq!(out.suitability, direct);
    }

    #[test]
    fn no_years_is_an_error() {
        let years = BTreeMap::new();
        assert!(persist_viable(&years, &config(), 0, 10).is_err());
    }

    #[test]
    fn mismatched_years_are_rejected() {
        let mut years = BTreeMap::new();
        years.insert(2020, array![[5.0, 5.0]]);
        years.insert(2021, array![[5.0], [5.0]]);
        let err = persist_viable(&years, &config(), 0, 10).unwrap_err();
        assert!(matches!(err, Error::GridMismatch { .. }));
    }
}
