use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::RoundingMode;

/// Thresholds for a continuous criterion (slope, HAND).
///
/// Values below `low_threshold` or above `medium_threshold` are Low, values in
/// `[low_threshold, high_threshold)` are High, everything else is Medium. The
/// names do not follow ascending order; stock configurations have
/// `low < high < medium`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub low_threshold: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
}

impl ThresholdConfig {
    pub fn slope_default() -> Self {
        Self {
            low_threshold: 1.0,
            medium_threshold: 5.0,
            high_threshold: 3.0,
        }
    }

    pub fn hand_default() -> Self {
        Self {
            low_threshold: 1.0,
            medium_threshold: 50.0,
            high_threshold: 30.0,
        }
    }

    /// False unless `low <= high <= medium`.
    pub fn is_ordered(&self) -> bool {
        self.low_threshold <= self.high_threshold && self.high_threshold <= self.medium_threshold
    }

    pub fn warn_if_unordered(&self, criterion: &str) {
        if !self.is_ordered() {
            warn!(
                "{} thresholds are not ordered low <= high <= medium ({:?}); classes are applied as configured",
                criterion, self
            );
        }
    }
}

/// Land-cover category codes per suitability tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub low: Vec<i32>,
    pub medium: Vec<i32>,
    pub high: Vec<i32>,
}

impl CategoryConfig {
    /// Union of every tier: the categories that are viable at all.
    pub fn viable_categories(&self) -> BTreeSet<i32> {
        self.low
            .iter()
            .chain(&self.medium)
            .chain(&self.high)
            .copied()
            .collect()
    }

    /// Codes listed in more than one tier.
    pub fn overlapping_codes(&self) -> BTreeSet<i32> {
        let low: BTreeSet<i32> = self.low.iter().copied().collect();
        let medium: BTreeSet<i32> = self.medium.iter().copied().collect();
        let high: BTreeSet<i32> = self.high.iter().copied().collect();
        low.intersection(&medium)
            .chain(low.intersection(&high))
            .chain(medium.intersection(&high))
            .copied()
            .collect()
    }

    pub fn warn_on_overlap(&self) {
        let overlap = self.overlapping_codes();
        if !overlap.is_empty() {
            warn!(
                "Land cover codes {:?} appear in more than one suitability tier; medium > high > low precedence applies",
                overlap
            );
        }
    }
}

impl Default for CategoryConfig {
    /// Crops are low, bare ground and rangeland are high (Esri 10m land cover codes).
    fn default() -> Self {
        Self {
            low: vec![5],
            medium: vec![],
            high: vec![8, 11],
        }
    }
}

/// Per-run analysis options. Each criterion config is optional; `None` skips it.
///
/// When deserialised, a criterion left out of the document is `None`; the
/// stock configurations of [`Default`] only apply to code-built params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityParams {
    /// Hectares.
    pub min_viable_area: f64,
    pub land_checks: bool,
    #[serde(default)]
    pub slope: Option<ThresholdConfig>,
    #[serde(default)]
    pub land_cover: Option<CategoryConfig>,
    #[serde(default)]
    pub hand: Option<ThresholdConfig>,
    pub reference_raster: Option<PathBuf>,
    pub rounding: RoundingMode,
    pub no_data_class: i32,
    pub clouds_class: i32,
}

impl SuitabilityParams {
    pub fn has_criteria(&self) -> bool {
        self.slope.is_some() || self.land_cover.is_some() || self.hand.is_some()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: SuitabilityParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_viable_area.is_nan() || self.min_viable_area < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "min_viable_area",
                value: self.min_viable_area.to_string(),
            });
        }
        if let Some(slope) = &self.slope {
            slope.warn_if_unordered("slope");
        }
        if let Some(hand) = &self.hand {
            hand.warn_if_unordered("HAND");
        }
        if let Some(cover) = &self.land_cover {
            cover.warn_on_overlap();
        }
        Ok(())
    }
}

impl Default for SuitabilityParams {
    fn default() -> Self {
        Self {
            min_viable_area: 100.0,
            land_checks: true,
            slope: Some(ThresholdConfig::slope_default()),
            land_cover: Some(CategoryConfig::default()),
            hand: Some(ThresholdConfig::hand_default()),
            reference_raster: None,
            rounding: RoundingMode::Floor,
            no_data_class: 0,
            clouds_class: 10,
        }
    }
}

/// Identity and locations of one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectParams {
    pub name: String,
    pub year: i32,
    pub years_prior: u32,
    pub epsg: u32,
    pub country_code: String,
    pub sub_region: String,
    pub aoi_path: PathBuf,
    pub project_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub intermediate_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub protected_areas: Option<PathBuf>,
    pub admin_borders: Option<PathBuf>,
}

impl ProjectParams {
    pub fn new(name: impl Into<String>, year: i32, aoi_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            year,
            years_prior: 5,
            epsg: 32721,
            country_code: "ARG".to_string(),
            sub_region: "Corrientes".to_string(),
            aoi_path: aoi_path.into(),
            project_dir: None,
            data_dir: None,
            intermediate_dir: None,
            results_dir: None,
            protected_areas: None,
            admin_borders: None,
        }
    }

    /// Lower-cased, underscore-separated name used for directories.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }

    /// Analysed years, oldest first, ending at the project year.
    pub fn years(&self) -> Vec<i32> {
        let first = self.year - self.years_prior as i32;
        (first..=self.year).collect()
    }

    pub fn crs_label(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}
