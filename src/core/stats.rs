//! Run-level statistics record.
//!
//! Every metric is `Option<Measure>`: `None` means the stage producing it has not
//! run, never zero. Serialises as a flat JSON object of `name -> [value, unit]`.
use serde::{Deserialize, Serialize};

use crate::core::land::AvailabilityAreas;
use crate::core::processing::combine::SuitabilityAreas;
use crate::core::processing::ops::Summary;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "Ha")]
    Hectares,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "m")]
    Meters,
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Measure(pub f64, pub Unit);

impl Measure {
    pub fn ha(value: f64) -> Self {
        Measure(value, Unit::Hectares)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(r: geo::Rect<f64>) -> Self {
        Self {
            minx: r.min().x,
            miny: r.min().y,
            maxx: r.max().x,
            maxy: r.max().y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub project_name: Option<String>,
    pub years: Option<Vec<i32>>,
    pub project_crs: Option<u32>,
    pub project_bbox: Option<BoundingBox>,
    // land availability
    pub aoi_area: Option<Measure>,
    pub aoi_within_admin_border_area: Option<Measure>,
    pub aoi_outside_admin_border_area: Option<Measure>,
    pub intersect_with_protected_area: Option<Measure>,
    pub area_non_protected: Option<Measure>,
    // slope
    pub average_slope: Option<Measure>,
    pub max_slope: Option<Measure>,
    pub min_slope: Option<Measure>,
    // land cover
    pub area_of_adequate_land_cover_over_time: Option<Measure>,
    // hand
    pub average_height_above_drainage: Option<Measure>,
    pub max_height_above_drainage: Option<Measure>,
    pub min_height_above_drainage: Option<Measure>,
    // suitabilities
    pub area_low_suitability: Option<Measure>,
    pub area_medium_suitability: Option<Measure>,
    pub area_high_suitability: Option<Measure>,
}

impl Stats {
    pub fn record_availability(&mut self, areas: &AvailabilityAreas) {
        self.aoi_area = Some(Measure::ha(areas.aoi));
        self.aoi_within_admin_border_area = Some(Measure::ha(areas.within_border));
        self.aoi_outside_admin_border_area = Some(Measure::ha(areas.outside_border));
        self.intersect_with_protected_area = Some(Measure::ha(areas.protected_intersection));
        self.area_non_protected = Some(Measure::ha(areas.non_protected));
    }

    pub fn record_slope(&mut self, summary: &Summary) {
        self.average_slope = Some(Measure(summary.mean, Unit::Percent));
        self.max_slope = Some(Measure(summary.max, Unit::Percent));
        self.min_slope = Some(Measure(summary.min, Unit::Percent));
    }

    pub fn record_hand(&mut self, summary: &Summary) {
        self.average_height_above_drainage = Some(Measure(summary.mean, Unit::Meters));
        self.max_height_above_drainage = Some(Measure(summary.max, Unit::Meters));
        self.min_height_above_drainage = Some(Measure(summary.min, Unit::Meters));
    }

    pub fn record_suitability(&mut self, areas: &SuitabilityAreas) {
        self.area_low_suitability = Some(Measure::ha(areas.low));
        self.area_medium_suitability = Some(Measure::ha(areas.medium));
        self.area_high_suitability = Some(Measure::ha(areas.high));
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
