//! Land-availability resolver: AOI minus land outside the administrative
//! region and inside protected areas.
//!
//! Every overlay runs in the CRS carried by the inputs; callers reproject
//! first. Areas are hectares, assuming a metric CRS.
use geo::{Area, BooleanOps, BoundingRect, MultiPolygon, Rect};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::processing::ops::to_hectares;
use crate::error::{Error, Result};

/// Polygons tagged with the CRS their coordinates are in.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub geometry: MultiPolygon<f64>,
    pub crs: String,
}

impl Region {
    pub fn new(geometry: MultiPolygon<f64>, crs: impl Into<String>) -> Self {
        Self {
            geometry,
            crs: crs.into(),
        }
    }

    /// Merge every polygon into one geometry.
    pub fn dissolve(polygons: MultiPolygon<f64>, crs: impl Into<String>) -> Self {
        let mut merged = MultiPolygon::new(Vec::new());
        for polygon in polygons {
            merged = merged.union(&MultiPolygon::new(vec![polygon]));
        }
        Region::new(merged, crs)
    }

    pub fn area_ha(&self) -> f64 {
        to_hectares(self.geometry.unsigned_area())
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty() || self.geometry.unsigned_area() == 0.0
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    fn same_crs(&self, other: &Region, what: &str) -> Result<()> {
        if self.crs != other.crs {
            return Err(Error::DataFormat(format!(
                "{what} is in {} but the AOI is in {}",
                other.crs, self.crs
            )));
        }
        Ok(())
    }
}

/// Reasons an AOI cannot host the project.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NonViable {
    #[error("AOI lies outside the administrative borders")]
    OutsideBorders,
    #[error("AOI area inside the borders ({area:.2} Ha) is below the minimum viable area ({minimum} Ha)")]
    BelowMinimumArea { area: f64, minimum: f64 },
    #[error("AOI lies entirely within protected areas")]
    FullyProtected,
    #[error("non-protected AOI area ({area:.2} Ha) is below the minimum viable area ({minimum} Ha)")]
    NonProtectedBelowMinimum { area: f64, minimum: f64 },
}

/// Areas recorded by the resolver, hectares.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AvailabilityAreas {
    pub aoi: f64,
    pub within_border: f64,
    pub outside_border: f64,
    pub protected_intersection: f64,
    pub non_protected: f64,
}

#[derive(Debug, Clone)]
pub struct LandAvailability {
    pub available_land: Region,
    pub areas: AvailabilityAreas,
}

impl LandAvailability {
    /// Available land without legal checks: the AOI itself.
    pub fn unchecked(aoi: &Region) -> Self {
        let area = aoi.area_ha();
        LandAvailability {
            available_land: aoi.clone(),
            areas: AvailabilityAreas {
                aoi: area,
                within_border: area,
                outside_border: 0.0,
                protected_intersection: 0.0,
                non_protected: area,
            },
        }
    }
}

fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

/// Resolve available land for `aoi`.
///
/// `region` is the administrative sub-region; `protected` the protected areas
/// (possibly empty). All three must share a CRS.
pub fn resolve_available_land(
    aoi: &Region,
    region: &Region,
    protected: &Region,
    min_viable_area: f64,
) -> Result<LandAvailability> {
    aoi.same_crs(region, "administrative border")?;
    aoi.same_crs(protected, "protected areas")?;

    let aoi_area = aoi.area_ha();
    let within = Region::new(aoi.geometry.intersection(&region.geometry), &aoi.crs);
    if within.is_empty() {
        return Err(NonViable::OutsideBorders.into());
    }
    let within_area = within.area_ha();
    let mut areas = AvailabilityAreas {
        aoi: aoi_area,
        within_border: within_area,
        outside_border: (aoi_area - within_area).max(0.0),
        ..Default::default()
    };
    if within_area < aoi_area && !approx_equal(within_area, aoi_area) {
        warn!(
            "AOI is only partially inside the administrative region: {:.2} of {:.2} Ha",
            within_area, aoi_area
        );
    }
    if within_area < min_viable_area {
        return Err(NonViable::BelowMinimumArea {
            area: within_area,
            minimum: min_viable_area,
        }
        .into());
    }

    let protected = Region::dissolve(protected.geometry.clone(), &protected.crs);
    let overlap = Region::new(within.geometry.intersection(&protected.geometry), &aoi.crs);
    let overlap_area = if overlap.is_empty() { 0.0 } else { overlap.area_ha() };
    areas.protected_intersection = overlap_area;

    if overlap_area == 0.0 {
        areas.non_protected = within_area;
        info!("AOI does not intersect protected areas");
        return Ok(LandAvailability {
            available_land: within,
            areas,
        });
    }
    if approx_equal(overlap_area, within_area) {
        return Err(NonViable::FullyProtected.into());
    }

    let non_protected = within_area - overlap_area;
    areas.non_protected = non_protected;
    warn!(
        "AOI partially intersects protected areas: {:.2} Ha protected, {:.2} Ha remaining",
        overlap_area, non_protected
    );
    if non_protected < min_viable_area {
        return Err(NonViable::NonProtectedBelowMinimum {
            area: non_protected,
            minimum: min_viable_area,
        }
        .into());
    }
    let available = Region::new(within.geometry.difference(&protected.geometry), &aoi.crs);
    Ok(LandAvailability {
        available_land: available,
        areas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    const CRS: &str = "EPSG:32721";

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
        ]])
    }

    fn region(geometry: MultiPolygon<f64>) -> Region {
        Region::new(geometry, CRS)
    }

    fn none() -> Region {
        region(MultiPolygon::new(Vec::new()))
    }

    fn non_viable(result: Result<LandAvailability>) -> NonViable {
        match result {
            Err(Error::NonViable(reason)) => reason,
            other => panic!("expected non-viable, got {other:?}"),
        }
    }

    // 1000 m x 5000 m = 500 Ha
    fn aoi() -> Region {
        region(rect(0.0, 0.0, 1000.0, 5000.0))
    }

    #[test]
    fn aoi_inside_border_without_protection() {
        let border = region(rect(-1000.0, -1000.0, 10_000.0, 10_000.0));
        let land = resolve_available_land(&aoi(), &border, &none(), 100.0).unwrap();
        assert!((land.available_land.area_ha() - 500.0).abs() < 1e-6);
        assert!((land.areas.within_border - 500.0).abs() < 1e-6);
        assert_eq!(land.areas.outside_border, 0.0);
        assert_eq!(land.areas.protected_intersection, 0.0);
        assert!((land.areas.non_protected - 500.0).abs() < 1e-6);
    }

    #[test]
    fn fully_protected_aoi_aborts() {
        let border = region(rect(-1000.0, -1000.0, 10_000.0, 10_000.0));
        let park = region(rect(-10.0, -10.0, 2000.0, 6000.0));
        let reason = non_viable(resolve_available_land(&aoi(), &border, &park, 100.0));
        assert_eq!(reason, NonViable::FullyProtected);
    }

    #[test]
    fn aoi_outside_border_aborts() {
        let border = region(rect(50_000.0, 50_000.0, 60_000.0, 60_000.0));
        let reason = non_viable(resolve_available_land(&aoi(), &border, &none(), 100.0));
        assert_eq!(reason, NonViable::OutsideBorders);
    }

    #[test]
    fn small_clipped_area_aborts() {
        // border keeps 1000 x 500 m = 50 Ha
        let border = region(rect(0.0, 0.0, 1000.0, 500.0));
        let reason = non_viable(resolve_available_land(&aoi(), &border, &none(), 100.0));
        assert!(matches!(reason, NonViable::BelowMinimumArea { area, .. } if (area - 50.0).abs() < 1e-6));
    }

    #[test]
    fn partial_border_records_outside_area() {
        let border = region(rect(0.0, 0.0, 1000.0, 3000.0));
        let land = resolve_available_land(&aoi(), &border, &none(), 100.0).unwrap();
        assert!((land.areas.within_border - 300.0).abs() < 1e-6);
        assert!((land.areas.outside_border - 200.0).abs() < 1e-6);
    }

    #[test]
    fn partial_protection_subtracts_protected_land() {
        let border = region(rect(-1000.0, -1000.0, 10_000.0, 10_000.0));
        // two overlapping parks covering y in [0, 2000): 200 Ha
        let mut parks = rect(-100.0, -100.0, 1100.0, 1500.0);
        parks.0.extend(rect(-100.0, 1000.0, 1100.0, 2000.0));
        let land = resolve_available_land(&aoi(), &border, &region(parks), 100.0).unwrap();
        assert!((land.areas.protected_intersection - 200.0).abs() < 1e-6);
        assert!((land.areas.non_protected - 300.0).abs() < 1e-6);
        assert!((land.available_land.area_ha() - 300.0).abs() < 1e-6);
    }

    #[test]
    fn protected_remainder_below_minimum_aborts() {
        let border = region(rect(-1000.0, -1000.0, 10_000.0, 10_000.0));
        let park = region(rect(-100.0, -100.0, 1100.0, 4500.0));
        let reason = non_viable(resolve_available_land(&aoi(), &border, &park, 100.0));
        assert!(matches!(reason, NonViable::NonProtectedBelowMinimum { area, .. } if (area - 50.0).abs() < 1e-6));
    }

    #[test]
    fn mixed_crs_is_a_format_error() {
        let border = Region::new(rect(0.0, 0.0, 1.0, 1.0), "EPSG:4326");
        let err = resolve_available_land(&aoi(), &border, &none(), 100.0).unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)));
    }

    #[test]
    fn unchecked_keeps_aoi() {
        let land = LandAvailability::unchecked(&aoi());
        assert_eq!(land.available_land, aoi());
        assert!((land.areas.non_protected - 500.0).abs() < 1e-6);
    }
}
