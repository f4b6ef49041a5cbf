//! In-memory raster model: a 2D grid plus its georeferencing.
//!
//! Transforms follow the GDAL convention
//! `[origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]`; rotation terms
//! are carried through but windowing assumes a north-up grid.
use geo::{BoundingRect, Contains, Coord, MultiPolygon, Point, Rect};
use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform(pub [f64; 6]);

/// Rows/columns of a raster covered by a rectangle, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row0: usize,
    pub col0: usize,
    pub rows: usize,
    pub cols: usize,
}

impl GeoTransform {
    pub fn new(origin_x: f64, pixel_width: f64, origin_y: f64, pixel_height: f64) -> Self {
        GeoTransform([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    pub fn origin_x(&self) -> f64 {
        self.0[0]
    }

    pub fn origin_y(&self) -> f64 {
        self.0[3]
    }

    pub fn pixel_width(&self) -> f64 {
        self.0[1]
    }

    pub fn pixel_height(&self) -> f64 {
        self.0[5]
    }

    /// |pixel width| x |pixel height| in the CRS linear unit squared.
    pub fn pixel_area(&self) -> f64 {
        self.pixel_width().abs() * self.pixel_height().abs()
    }

    pub fn pixel_center(&self, row: usize, col: usize) -> Coord<f64> {
        let (c, r) = (col as f64 + 0.5, row as f64 + 0.5);
        let gt = &self.0;
        Coord {
            x: gt[0] + c * gt[1] + r * gt[2],
            y: gt[3] + c * gt[4] + r * gt[5],
        }
    }

    pub fn bounds(&self, rows: usize, cols: usize) -> Rect<f64> {
        let x1 = self.origin_x() + cols as f64 * self.pixel_width();
        let y1 = self.origin_y() + rows as f64 * self.pixel_height();
        Rect::new(
            Coord {
                x: self.origin_x(),
                y: self.origin_y(),
            },
            Coord { x: x1, y: y1 },
        )
    }

    /// Pixels of a `rows` x `cols` grid touched by `rect`, or `None` if disjoint.
    pub fn window(&self, rect: &Rect<f64>, rows: usize, cols: usize) -> Option<PixelWindow> {
        let ca = (rect.min().x - self.origin_x()) / self.pixel_width();
        let cb = (rect.max().x - self.origin_x()) / self.pixel_width();
        let ra = (rect.min().y - self.origin_y()) / self.pixel_height();
        let rb = (rect.max().y - self.origin_y()) / self.pixel_height();

        // edges within 1e-6 px of a pixel boundary snap onto it
        let snap = |v: f64| if (v - v.round()).abs() < 1e-6 { v.round() } else { v };
        let (ca, cb, ra, rb) = (snap(ca), snap(cb), snap(ra), snap(rb));
        let clamp = |v: f64, max: usize| v.clamp(0.0, max as f64) as usize;
        let col0 = clamp(ca.min(cb).floor(), cols);
        let col1 = clamp(ca.max(cb).ceil(), cols);
        let row0 = clamp(ra.min(rb).floor(), rows);
        let row1 = clamp(ra.max(rb).ceil(), rows);
        if col1 <= col0 || row1 <= row0 {
            return None;
        }
        Some(PixelWindow {
            row0,
            col0,
            rows: row1 - row0,
            cols: col1 - col0,
        })
    }

    /// Transform of the sub-grid starting at (`row0`, `col0`).
    pub fn shifted(&self, row0: usize, col0: usize) -> GeoTransform {
        let origin = self.pixel_corner(row0, col0);
        let mut gt = self.0;
        gt[0] = origin.x;
        gt[3] = origin.y;
        GeoTransform(gt)
    }

    fn pixel_corner(&self, row: usize, col: usize) -> Coord<f64> {
        let (c, r) = (col as f64, row as f64);
        let gt = &self.0;
        Coord {
            x: gt[0] + c * gt[1] + r * gt[2],
            y: gt[3] + c * gt[4] + r * gt[5],
        }
    }

    fn approx_eq(&self, other: &GeoTransform) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0))
    }
}

/// Shape, transform and CRS of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub crs: String,
    pub transform: GeoTransform,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub fn bounds(&self) -> Rect<f64> {
        self.transform.bounds(self.rows, self.cols)
    }

    /// Fails with a diagnostic unless `other` is co-registered with `self`.
    pub fn ensure_matches(&self, other: &GridSpec, layer: &str) -> Result<()> {
        let mismatch = |detail: String| Error::GridMismatch {
            layer: layer.to_string(),
            detail,
        };
        if (self.rows, self.cols) != (other.rows, other.cols) {
            return Err(mismatch(format!(
                "shape {}x{} differs from reference {}x{}",
                other.rows, other.cols, self.rows, self.cols
            )));
        }
        if self.crs != other.crs {
            return Err(mismatch(format!(
                "CRS {} differs from reference {}",
                other.crs, self.crs
            )));
        }
        if !self.transform.approx_eq(&other.transform) {
            return Err(mismatch(format!(
                "transform {:?} differs from reference {:?}",
                other.transform.0, self.transform.0
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Raster<T> {
    pub data: Array2<T>,
    pub transform: GeoTransform,
    pub crs: String,
    /// Sentinel used when the raster is written; NaN for float grids read masked.
    pub nodata: Option<f64>,
}

impl<T: Clone> Raster<T> {
    pub fn new(data: Array2<T>, transform: GeoTransform, crs: impl Into<String>) -> Self {
        Self {
            data,
            transform,
            crs: crs.into(),
            nodata: None,
        }
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Same georeferencing, new samples.
    pub fn with_data<U>(&self, data: Array2<U>) -> Raster<U> {
        debug_assert_eq!(data.dim(), self.data.dim());
        Raster {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec {
            crs: self.crs.clone(),
            transform: self.transform,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.transform.bounds(self.rows(), self.cols())
    }

    /// True when the raster extent contains `rect` entirely.
    pub fn covers(&self, rect: &Rect<f64>) -> bool {
        let b = self.bounds();
        b.min().x <= rect.min().x
            && b.min().y <= rect.min().y
            && b.max().x >= rect.max().x
            && b.max().y >= rect.max().y
    }

    /// Pixels whose centre lies inside `region`.
    pub fn footprint_mask(&self, region: &MultiPolygon<f64>) -> Array2<bool> {
        let mut mask = Array2::from_elem(self.data.dim(), false);
        let Some(bbox) = region.bounding_rect() else {
            return mask;
        };
        let Some(win) = self.transform.window(&bbox, self.rows(), self.cols()) else {
            return mask;
        };
        for row in win.row0..win.row0 + win.rows {
            for col in win.col0..win.col0 + win.cols {
                let center = Point::from(self.transform.pixel_center(row, col));
                mask[[row, col]] = region.contains(&center);
            }
        }
        mask
    }

    pub fn crop(&self, win: PixelWindow) -> Raster<T> {
        let view = self.data.slice(s![
            win.row0..win.row0 + win.rows,
            win.col0..win.col0 + win.cols
        ]);
        Raster {
            data: view.to_owned(),
            transform: self.transform.shifted(win.row0, win.col0),
            crs: self.crs.clone(),
            nodata: self.nodata,
        }
    }

    pub fn crop_to(&self, rect: &Rect<f64>) -> Option<Raster<T>> {
        self.transform
            .window(rect, self.rows(), self.cols())
            .map(|win| self.crop(win))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn grid(rows: usize, cols: usize) -> Raster<f64> {
        // 10 m pixels, north-up, origin at (0, rows*10)
        Raster::new(
            Array2::zeros((rows, cols)),
            GeoTransform::new(0.0, 10.0, rows as f64 * 10.0, -10.0),
            "EPSG:32721",
        )
    }

    #[test]
    fn window_covers_touched_pixels() {
        let r = grid(10, 10);
        let rect = Rect::new(Coord { x: 15.0, y: 15.0 }, Coord { x: 35.0, y: 40.0 });
        let win = r.transform.window(&rect, 10, 10).unwrap();
        assert_eq!(
            win,
            PixelWindow {
                row0: 6,
                col0: 1,
                rows: 3,
                cols: 3
            }
        );
        let cropped = r.crop(win);
        assert_eq!(cropped.data.dim(), (3, 3));
        assert_eq!(cropped.transform.origin_x(), 10.0);
        assert_eq!(cropped.transform.origin_y(), 40.0);
    }

    #[test]
    fn disjoint_window_is_none() {
        let r = grid(4, 4);
        let rect = Rect::new(Coord { x: 100.0, y: 100.0 }, Coord { x: 200.0, y: 200.0 });
        assert!(r.transform.window(&rect, 4, 4).is_none());
    }

    #[test]
    fn footprint_uses_pixel_centres() {
        let r = grid(4, 4);
        // Left half of the raster
        let region = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 20.0, y: 0.0),
            (x: 20.0, y: 40.0),
            (x: 0.0, y: 40.0),
        ]]);
        let mask = r.footprint_mask(&region);
        assert_eq!(mask.iter().filter(|m| **m).count(), 8);
        assert!(mask[[0, 0]] && mask[[3, 1]]);
        assert!(!mask[[0, 2]] && !mask[[3, 3]]);
    }

    #[test]
    fn grid_mismatch_is_reported() {
        let a = grid(4, 4).grid();
        let mut b = a.clone();
        assert!(a.ensure_matches(&b, "same").is_ok());
        b.crs = "EPSG:4326".to_string();
        let err = a.ensure_matches(&b, "other").unwrap_err();
        assert!(err.to_string().contains("CRS"));
        let c = grid(4, 5).grid();
        assert!(a.ensure_matches(&c, "shape").is_err());
    }

    #[test]
    fn pixel_area_and_cover() {
        let r = grid(4, 4);
        assert_eq!(r.transform.pixel_area(), 100.0);
        let inside = Rect::new(Coord { x: 5.0, y: 5.0 }, Coord { x: 35.0, y: 35.0 });
        let outside = Rect::new(Coord { x: -5.0, y: 5.0 }, Coord { x: 35.0, y: 35.0 });
        assert!(r.covers(&inside));
        assert!(!r.covers(&outside));
    }
}
