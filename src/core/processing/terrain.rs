use ndarray::Array2;

/// Derivative along one axis: central difference inside, one-sided at the edges.
#[inline]
fn axis_gradient(len: usize, i: usize, at: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        return 0.0;
    }
    if i == 0 {
        at(1) - at(0)
    } else if i == len - 1 {
        at(i) - at(i - 1)
    } else {
        (at(i + 1) - at(i - 1)) / 2.0
    }
}

/// Slope in degrees from an elevation grid.
///
/// `cell_x`/`cell_y` are the pixel sizes in the elevation's linear unit; signs
/// are ignored. NaN elevations propagate to their neighbours.
pub fn slope_degrees(elevation: &Array2<f64>, cell_x: f64, cell_y: f64) -> Array2<f64> {
    let (rows, cols) = elevation.dim();
    let (cell_x, cell_y) = (cell_x.abs(), cell_y.abs());
    let mut slope = Array2::<f64>::zeros((rows, cols));

    for ((r, c), out) in slope.indexed_iter_mut() {
        let dzdx = axis_gradient(cols, c, |k| elevation[[r, k]]) / cell_x;
        let dzdy = axis_gradient(rows, r, |k| elevation[[k, c]]) / cell_y;
        let magnitude = (dzdx * dzdx + dzdy * dzdy).sqrt();
        *out = magnitude.atan().to_degrees();
    }

    slope
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn flat_surface_has_zero_slope() {
        let dem = Array2::from_elem((4, 5), 120.0);
        assert!(slope_degrees(&dem, 30.0, -30.0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn constant_ramp_gives_45_degrees() {
        // rises 10 per 10 m column
        let dem = array![[0.0, 10.0, 20.0, 30.0], [0.0, 10.0, 20.0, 30.0]];
        let slope = slope_degrees(&dem, 10.0, 10.0);
        for &s in slope.iter() {
            assert!((s - 45.0).abs() < 1e-9, "{s}");
        }
    }

    #[test]
    fn both_axes_contribute() {
        // dz/dx = 1, dz/dy = 1 -> atan(sqrt 2)
        let dem = array![[0.0, 1.0, 2.0], [1.0, 2.0, 3.0], [2.0, 3.0, 4.0]];
        let slope = slope_degrees(&dem, 1.0, 1.0);
        let expected = 2.0_f64.sqrt().atan().to_degrees();
        assert!((slope[[1, 1]] - expected).abs() < 1e-9);
    }

    #[test]
    fn nan_spreads_to_neighbours() {
        let dem = array![[1.0, 1.0, 1.0], [1.0, f64::NAN, 1.0], [1.0, 1.0, 1.0]];
        let slope = slope_degrees(&dem, 1.0, 1.0);
        assert!(slope[[0, 1]].is_nan());
        assert!(slope[[1, 0]].is_nan());
        // central differences skip the centre sample itself
        assert_eq!(slope[[1, 1]], 0.0);
        assert_eq!(slope[[0, 0]], 0.0);
    }
}
