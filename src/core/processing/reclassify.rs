//! Per-criterion reclassifiers mapping raw samples to suitability codes.
//!
//! Both produce `Array2<i32>` with codes 1..=3 and
//! [`NODATA_CODE`](crate::types::NODATA_CODE) where the
//! input is undefined, so nodata survives the combiner's averaging as a
//! negative mean.
use ndarray::Array2;

use crate::core::params::{CategoryConfig, ThresholdConfig};
use crate::types::SuitabilityLevel;

/// Classify one continuous value. NaN yields `None`.
///
/// Low is `v < low || v > medium`, High is `low <= v < high`, Medium is
/// neither. When a degenerate configuration makes Low and High both hold,
/// High wins.
pub fn classify_threshold(value: f64, config: &ThresholdConfig) -> Option<SuitabilityLevel> {
    if value.is_nan() {
        return None;
    }
    let is_low = value < config.low_threshold || value > config.medium_threshold;
    let is_high = value >= config.low_threshold && value < config.high_threshold;
    if is_high {
        Some(SuitabilityLevel::High)
    } else if is_low {
        Some(SuitabilityLevel::Low)
    } else {
        Some(SuitabilityLevel::Medium)
    }
}

/// Classify one land-cover category. NaN and codes outside every tier yield `None`.
///
/// A code listed in several tiers resolves medium > high > low.
pub fn classify_category(value: f64, config: &CategoryConfig) -> Option<SuitabilityLevel> {
    if value.is_nan() {
        return None;
    }
    let listed = |codes: &[i32]| codes.iter().any(|&c| value == c as f64);
    if listed(&config.medium) {
        Some(SuitabilityLevel::Medium)
    } else if listed(&config.high) {
        Some(SuitabilityLevel::High)
    } else if listed(&config.low) {
        Some(SuitabilityLevel::Low)
    } else {
        None
    }
}

pub fn reclassify(values: &Array2<f64>, config: &ThresholdConfig) -> Array2<i32> {
    values.mapv(|v| SuitabilityLevel::code_or_nodata(classify_threshold(v, config)))
}

pub fn reclassify_categorical(categories: &Array2<f64>, config: &CategoryConfig) -> Array2<i32> {
    categories.mapv(|v| SuitabilityLevel::code_or_nodata(classify_category(v, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NODATA_CODE;
    use ndarray::array;

    fn slope() -> ThresholdConfig {
        ThresholdConfig::slope_default()
    }

    #[test]
    fn slope_example_values() {
        let values = array![[0.5, 2.0, 4.0, 6.0]];
        let codes = reclassify(&values, &slope());
        assert_eq!(codes, array![[1, 3, 2, 1]]);
    }

    #[test]
    fn boundaries_follow_half_open_ranges() {
        let cfg = slope();
        assert_eq!(classify_threshold(1.0, &cfg), Some(SuitabilityLevel::High));
        assert_eq!(classify_threshold(3.0, &cfg), Some(SuitabilityLevel::Medium));
        assert_eq!(classify_threshold(5.0, &cfg), Some(SuitabilityLevel::Medium));
        assert_eq!(classify_threshold(5.0001, &cfg), Some(SuitabilityLevel::Low));
        assert_eq!(classify_threshold(f64::INFINITY, &cfg), Some(SuitabilityLevel::Low));
        assert_eq!(classify_threshold(f64::NEG_INFINITY, &cfg), Some(SuitabilityLevel::Low));
    }

    #[test]
    fn nan_becomes_nodata() {
        let codes = reclassify(&array![[f64::NAN, 2.0]], &slope());
        assert_eq!(codes, array![[NODATA_CODE, 3]]);
    }

    #[test]
    fn ordered_thresholds_partition_dense_range() {
        let cfg = ThresholdConfig {
            low_threshold: 1.0,
            high_threshold: 30.0,
            medium_threshold: 50.0,
        };
        for i in -1000..=8000 {
            let v = i as f64 * 0.01;
            let is_low = v < cfg.low_threshold || v > cfg.medium_threshold;
            let is_high = v >= cfg.low_threshold && v < cfg.high_threshold;
            let is_medium = !is_low && !is_high;
            assert_eq!(
                [is_low, is_high, is_medium].iter().filter(|b| **b).count(),
                1,
                "value {v}"
            );
            let expected = if is_low {
                SuitabilityLevel::Low
            } else if is_high {
                SuitabilityLevel::High
            } else {
                SuitabilityLevel::Medium
            };
            assert_eq!(classify_threshold(v, &cfg), Some(expected));
        }
    }

    #[test]
    fn degenerate_config_applies_formulas_literally() {
        // medium < high: values in (medium, high) satisfy both Low and High
        let cfg = ThresholdConfig {
            low_threshold: 1.0,
            medium_threshold: 2.0,
            high_threshold: 5.0,
        };
        assert_eq!(classify_threshold(3.0, &cfg), Some(SuitabilityLevel::High));
        assert_eq!(classify_threshold(0.0, &cfg), Some(SuitabilityLevel::Low));
        assert_eq!(classify_threshold(6.0, &cfg), Some(SuitabilityLevel::Low));

        // low > high: High is never reachable
        let inverted = ThresholdConfig {
            low_threshold: 4.0,
            medium_threshold: 10.0,
            high_threshold: 2.0,
        };
        assert_eq!(classify_threshold(3.0, &inverted), Some(SuitabilityLevel::Low));
        assert_eq!(classify_threshold(5.0, &inverted), Some(SuitabilityLevel::Medium));
    }

    #[test]
    fn categories_map_to_their_tier() {
        let cfg = CategoryConfig {
            low: vec![5],
            medium: vec![4],
            high: vec![8, 11],
        };
        let grid = array![[5.0, 4.0, 8.0, 11.0], [1.0, f64::NAN, 7.0, 0.0]];
        let codes = reclassify_categorical(&grid, &cfg);
        assert_eq!(
            codes,
            array![[1, 2, 3, 3], [NODATA_CODE, NODATA_CODE, NODATA_CODE, NODATA_CODE]]
        );
    }

    #[test]
    fn overlapping_category_prefers_medium_then_high() {
        let cfg = CategoryConfig {
            low: vec![1, 2],
            medium: vec![2],
            high: vec![1],
        };
        assert_eq!(classify_category(2.0, &cfg), Some(SuitabilityLevel::Medium));
        assert_eq!(classify_category(1.0, &cfg), Some(SuitabilityLevel::High));
    }
}
