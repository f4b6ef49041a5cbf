use ndarray::{Array2, Zip};

/// Mean/min/max over the finite samples selected by a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// NaN-ignoring summary of `values` where `mask` holds. `None` if nothing is selected.
pub fn masked_summary(values: &Array2<f64>, mask: &Array2<bool>) -> Option<Summary> {
    let mut count = 0usize;
    let mut sum = 0.0_f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    Zip::from(values).and(mask).for_each(|&v, &m| {
        if m && v.is_finite() {
            count += 1;
            sum += v;
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    });

    if count == 0 {
        return None;
    }
    Some(Summary {
        mean: sum / count as f64,
        min,
        max,
        count,
    })
}

/// Number of cells equal to `code`, optionally restricted to a mask.
pub fn count_code(grid: &Array2<i32>, code: i32, mask: Option<&Array2<bool>>) -> usize {
    match mask {
        Some(mask) => {
            let mut n = 0;
            Zip::from(grid).and(mask).for_each(|&v, &m| {
                if m && v == code {
                    n += 1;
                }
            });
            n
        }
        None => grid.iter().filter(|&&v| v == code).count(),
    }
}

/// Cells of a categorical float grid whose value is one of `categories`, inside `mask`.
pub fn count_categories(grid: &Array2<f64>, categories: &[i32], mask: &Array2<bool>) -> usize {
    let mut n = 0;
    Zip::from(grid).and(mask).for_each(|&v, &m| {
        if m && categories.iter().any(|&c| v == c as f64) {
            n += 1;
        }
    });
    n
}

/// Square metres (CRS unit squared) to hectares.
#[inline]
pub fn to_hectares(area: f64) -> f64 {
    area / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn summary_skips_nan_and_masked() {
        let values = array![[1.0, f64::NAN], [3.0, 100.0]];
        let mask = array![[true, true], [true, false]];
        let s = masked_summary(&values, &mask).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
    }

    #[test]
    fn empty_selection_has_no_summary() {
        let values = array![[f64::NAN, 2.0]];
        let mask = array![[true, false]];
        assert!(masked_summary(&values, &mask).is_none());
    }

    #[test]
    fn counts() {
        let grid = array![[1, 2], [2, 3]];
        let mask = array![[true, false], [true, true]];
        assert_eq!(count_code(&grid, 2, None), 2);
        assert_eq!(count_code(&grid, 2, Some(&mask)), 1);

        let cover = array![[5.0, 8.0], [f64::NAN, 11.0]];
        assert_eq!(count_categories(&cover, &[5, 8, 11], &mask), 2);
    }
}
