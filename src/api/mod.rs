//! High-level library API: the `Project` orchestrator that sequences land
//! checks, raster co-registration, the per-criterion analyzers and the final
//! combination. Prefer these entrypoints over the low-level processing modules
//! when integrating landsuit.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::land::{LandAvailability, Region, resolve_available_land};
use crate::core::params::{CategoryConfig, ProjectParams, SuitabilityParams, ThresholdConfig};
use crate::core::processing::combine::{Combined, SuitabilityAreas, combine_layers};
use crate::core::processing::landcover::persist_viable;
use crate::core::processing::ops::{count_categories, masked_summary, to_hectares};
use crate::core::processing::reclassify::reclassify;
use crate::core::processing::terrain::slope_degrees;
use crate::core::raster::Raster;
use crate::core::stats::{BoundingBox, Measure, Stats};
use crate::error::{Error, Result};
use crate::io::layout::ProjectLayout;
use crate::io::store::DataStore;
use crate::io::warp::AlignTarget;
use crate::io::writers::metadata::{
    category_fields, classification_fields, provenance_fields, threshold_fields,
};
use crate::types::{Criterion, NODATA_CODE, RoundingMode};

/// Attribute holding the first-level administrative unit name.
pub const SUB_REGION_FIELD: &str = "NAME_1";

/// A classified raster awaiting combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLayer {
    pub criterion: Criterion,
    pub path: PathBuf,
}

/// Ordered classified layers accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RastersToAnalyze(Vec<ClassifiedLayer>);

impl RastersToAnalyze {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: ClassifiedLayer) {
        self.0.push(layer);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassifiedLayer> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn criteria(&self) -> Vec<Criterion> {
        self.0.iter().map(|l| l.criterion).collect()
    }
}

impl FromIterator<ClassifiedLayer> for RastersToAnalyze {
    fn from_iter<I: IntoIterator<Item = ClassifiedLayer>>(iter: I) -> Self {
        RastersToAnalyze(iter.into_iter().collect())
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct SuitabilityReport {
    pub stats: Stats,
    pub layers: RastersToAnalyze,
    pub areas: SuitabilityAreas,
    pub classification_path: PathBuf,
    pub stats_path: PathBuf,
}

/// One land-suitability project over a single AOI.
pub struct Project<S: DataStore> {
    params: ProjectParams,
    layout: ProjectLayout,
    store: S,
    crs: String,
    aoi: Region,
    availability: Option<LandAvailability>,
    stats: Stats,
    prepared: bool,
}

fn merge_features(features: impl IntoIterator<Item = MultiPolygon<f64>>) -> MultiPolygon<f64> {
    MultiPolygon::new(features.into_iter().flat_map(|mp| mp.0).collect())
}

impl<S: DataStore> Project<S> {
    /// Read the AOI in the project CRS and seed the statistics record.
    pub fn new(params: ProjectParams, store: S) -> Result<Self> {
        let layout = ProjectLayout::new(&params);
        let crs = params.crs_label();
        let features = store
            .read_vector(&params.aoi_path, &crs)
            .map_err(|e| match e {
                Error::MissingResource { path, .. } => Error::missing("area of interest", path),
                other => other,
            })?;
        if features.is_empty() {
            return Err(Error::DataFormat(format!(
                "{:?} contains no polygons",
                params.aoi_path
            )));
        }
        let aoi = Region::dissolve(merge_features(features.into_iter().map(|f| f.geometry)), &crs);

        let stats = Stats {
            project_name: Some(params.name.clone()),
            years: Some(params.years()),
            project_crs: Some(params.epsg),
            project_bbox: aoi.bounding_rect().map(BoundingBox::from),
            ..Default::default()
        };
        info!(
            "Project {} over {:.2} Ha in {}",
            params.name,
            aoi.area_ha(),
            crs
        );
        Ok(Project {
            params,
            layout,
            store,
            crs,
            aoi,
            availability: None,
            stats,
            prepared: false,
        })
    }

    pub fn params(&self) -> &ProjectParams {
        &self.params
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn aoi(&self) -> &Region {
        &self.aoi
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Land left after the checks, or the whole AOI when none ran.
    pub fn available_land(&self) -> &Region {
        self.availability
            .as_ref()
            .map(|a| &a.available_land)
            .unwrap_or(&self.aoi)
    }

    /// Set up the storage backend. Later calls are no-ops.
    pub fn prepare(&mut self) -> Result<()> {
        if !self.prepared {
            self.store.prepare(&self.layout)?;
            self.prepared = true;
        }
        Ok(())
    }

    fn read_required_vector(&self, what: &'static str, path: &Path) -> Result<MultiPolygon<f64>> {
        if !self.store.exists(path) {
            return Err(Error::missing(what, path));
        }
        let features = self.store.read_vector(path, &self.crs)?;
        Ok(merge_features(features.into_iter().map(|f| f.geometry)))
    }

    /// Resolve available land against the administrative sub-region and protected areas.
    pub fn check_aoi_location(&mut self, min_viable_area: f64) -> Result<&LandAvailability> {
        let borders_path = self.layout.admin_borders.clone();
        if !self.store.exists(&borders_path) {
            return Err(Error::missing("administrative borders", borders_path));
        }
        let sub_region = &self.params.sub_region;
        let borders = self.store.read_vector(&borders_path, &self.crs)?;
        let selected: Vec<MultiPolygon<f64>> = borders
            .into_iter()
            .filter(|f| f.attributes.get(SUB_REGION_FIELD) == Some(sub_region))
            .map(|f| f.geometry)
            .collect();
        if selected.is_empty() {
            return Err(Error::UnknownSubRegion {
                sub_region: sub_region.clone(),
                country: self.params.country_code.clone(),
            });
        }
        let region = Region::new(merge_features(selected), &self.crs);
        let protected = Region::new(
            self.read_required_vector("protected areas", &self.layout.protected_areas)?,
            &self.crs,
        );

        info!("Checking AOI against {} and protected areas", sub_region);
        let availability = resolve_available_land(&self.aoi, &region, &protected, min_viable_area)?;
        self.stats.record_availability(&availability.areas);
        info!(
            "Available land: {:.2} Ha",
            availability.available_land.area_ha()
        );
        Ok(self.availability.insert(availability))
    }

    /// Use the whole AOI as available land.
    pub fn skip_land_checks(&mut self) {
        info!("Land checks disabled; using the entire AOI");
        self.availability = Some(LandAvailability::unchecked(&self.aoi));
    }

    /// Source rasters the configured criteria need, reference candidates first.
    pub fn source_rasters(&self, params: &SuitabilityParams) -> Vec<PathBuf> {
        let mut sources = Vec::new();
        if params.slope.is_some() {
            sources.push(self.layout.dem());
        }
        if params.land_cover.is_some() {
            sources.extend(self.params.years().into_iter().map(|y| self.layout.land_cover(y)));
        }
        if params.hand.is_some() {
            sources.push(self.layout.hand());
        }
        sources
    }

    /// Co-register the available sources onto one grid over available land.
    ///
    /// The reference (explicit, else the DEM, else the first available source)
    /// is warped to the project CRS over the available-land bounding box; every
    /// other source is resampled onto the reference grid. Missing sources are
    /// skipped.
    pub fn process_rasters(
        &mut self,
        reference: Option<&Path>,
        sources: &[PathBuf],
    ) -> Result<Vec<PathBuf>> {
        let mut available = Vec::new();
        for source in sources {
            if self.store.exists(source) {
                available.push(source.clone());
            } else {
                warn!("Source raster {:?} not found; skipping", source);
            }
        }
        let reference = match reference {
            Some(path) if !self.store.exists(path) => {
                return Err(Error::missing("reference raster", path));
            }
            Some(path) => path.to_path_buf(),
            None if self.store.exists(&self.layout.dem()) => self.layout.dem(),
            None => match available.first() {
                Some(path) => path.clone(),
                None => {
                    warn!("No source rasters available to process");
                    return Ok(Vec::new());
                }
            },
        };
        let bounds = self.available_land().bounding_rect().ok_or_else(|| {
            Error::Processing("available land has no extent".to_string())
        })?;

        info!("Using {:?} as reference raster", reference);
        let reference_out = self.layout.processed(&reference);
        let target = AlignTarget::Bounds {
            crs: self.crs.clone(),
            bounds,
        };
        self.store.align_raster(&reference, &reference_out, &target)?;
        let reference_raster = self.store.read_raster(&reference_out)?;
        if !reference_raster.covers(&bounds) {
            warn!(
                "Processed raster {:?} does not fully cover the available land",
                reference_out
            );
        }
        let grid = AlignTarget::Grid(reference_raster.grid());

        let mut processed = Vec::with_capacity(available.len());
        for source in &available {
            let out = self.layout.processed(source);
            if *source != reference {
                self.store.align_raster(source, &out, &grid)?;
            }
            processed.push(out);
        }
        Ok(processed)
    }

    fn footprint<T: Clone>(&self, raster: &Raster<T>) -> Array2<bool> {
        raster.footprint_mask(&self.available_land().geometry)
    }

    fn read_processed(&self, what: &'static str, source: &Path) -> Result<Raster<f64>> {
        let path = self.layout.processed(source);
        if !self.store.exists(&path) {
            return Err(Error::missing(what, path));
        }
        self.store.read_raster(&path)
    }

    fn write_reclassified(
        &mut self,
        criterion: Criterion,
        values: &Raster<f64>,
        config: &ThresholdConfig,
        path: PathBuf,
    ) -> Result<ClassifiedLayer> {
        let classes = values
            .with_data(reclassify(&values.data, config))
            .with_nodata(NODATA_CODE as f64);
        self.store
            .write_classified(&path, &classes, &threshold_fields(criterion, config))?;
        Ok(ClassifiedLayer { criterion, path })
    }

    /// Derive slope from the processed DEM and reclassify it.
    pub fn slope_analysis(&mut self, config: &ThresholdConfig) -> Result<ClassifiedLayer> {
        info!("Running slope analysis");
        let dem = self.read_processed("processed DEM", &self.layout.dem())?;
        let degrees = slope_degrees(
            &dem.data,
            dem.transform.pixel_width(),
            dem.transform.pixel_height(),
        );
        let slope = dem.with_data(degrees);
        self.store.write_continuous(
            &self.layout.slope(),
            &slope,
            &provenance_fields("slope (degrees)"),
        )?;

        match masked_summary(&slope.data, &self.footprint(&slope)) {
            Some(summary) => self.stats.record_slope(&summary),
            None => warn!("No valid slope samples inside available land"),
        }
        let path = self.layout.slope_reclassified();
        self.write_reclassified(Criterion::Slope, &slope, config, path)
    }

    /// Reclassify the processed HAND raster.
    pub fn hand_analysis(&mut self, config: &ThresholdConfig) -> Result<ClassifiedLayer> {
        info!("Running height above nearest drainage analysis");
        let hand = self.read_processed("processed HAND", &self.layout.hand())?;
        match masked_summary(&hand.data, &self.footprint(&hand)) {
            Some(summary) => self.stats.record_hand(&summary),
            None => warn!("No valid HAND samples inside available land"),
        }
        let path = self.layout.hand_reclassified();
        self.write_reclassified(Criterion::Hand, &hand, config, path)
    }

    /// Keep land cover viable in every available year and reclassify it.
    pub fn land_cover_analysis(
        &mut self,
        config: &CategoryConfig,
        no_data_class: i32,
        clouds_class: i32,
    ) -> Result<ClassifiedLayer> {
        info!("Running land cover analysis");
        let mut grids = BTreeMap::new();
        let mut latest: Option<Raster<f64>> = None;
        for year in self.params.years() {
            let path = self.layout.processed(&self.layout.land_cover(year));
            if !self.store.exists(&path) {
                warn!("Land cover for {} not available; skipping year", year);
                continue;
            }
            let raster = self.store.read_raster(&path)?;
            grids.insert(year, raster.data.clone());
            latest = Some(raster);
        }
        let Some(latest) = latest else {
            return Err(Error::missing(
                "processed land cover",
                self.layout.processed(&self.layout.land_cover(self.params.year)),
            ));
        };
        let years: Vec<i32> = grids.keys().copied().collect();
        let persistence = persist_viable(&grids, config, no_data_class, clouds_class)?;

        let viable: Vec<i32> = config.viable_categories().into_iter().collect();
        let inside = self.footprint(&latest);
        let pixels = count_categories(&persistence.persistent, &viable, &inside);
        let area = to_hectares(pixels as f64 * latest.transform.pixel_area());
        self.stats.area_of_adequate_land_cover_over_time = Some(Measure::ha(area));
        info!("Land cover viable over {:?}: {:.2} Ha", years, area);

        let metadata = category_fields(config, &years);
        let persistent = latest.with_data(persistence.persistent);
        self.store
            .write_continuous(&self.layout.land_cover_intersect(), &persistent, &metadata)?;
        let classes = latest
            .with_data(persistence.suitability)
            .with_nodata(NODATA_CODE as f64);
        let path = self.layout.land_cover_reclassified();
        self.store.write_classified(&path, &classes, &metadata)?;
        Ok(ClassifiedLayer {
            criterion: Criterion::LandCover,
            path,
        })
    }

    /// Combine `layers`, clip to available land and record the tier areas.
    pub fn land_suitability_analyzer(
        &mut self,
        layers: &RastersToAnalyze,
        rounding: RoundingMode,
    ) -> Result<Combined> {
        if layers.is_empty() {
            return Err(Error::Configuration("no rasters to analyze".to_string()));
        }
        let names: Vec<String> = layers.iter().map(|l| l.path.display().to_string()).collect();
        info!("Performing map algebra on {}", names.join(", "));
        let rasters = layers
            .iter()
            .map(|l| self.store.read_classified(&l.path))
            .collect::<Result<Vec<_>>>()?;

        let land = self.available_land().clone();
        self.store.write_vector(&self.layout.remaining_land(), &land)?;
        let combined = combine_layers(&rasters, &land, rounding)?;
        self.store.write_classified(
            &self.layout.classification(),
            &combined.classification,
            &classification_fields(&layers.criteria(), rounding),
        )?;
        self.stats.record_suitability(&combined.areas);
        info!(
            "Suitability areas (Ha): low={:.2} medium={:.2} high={:.2}",
            combined.areas.low, combined.areas.medium, combined.areas.high
        );
        Ok(combined)
    }

    fn resolve_land(&mut self, params: &SuitabilityParams) -> Result<()> {
        if params.land_checks {
            self.check_aoi_location(params.min_viable_area)?;
        } else {
            self.skip_land_checks();
        }
        Ok(())
    }

    /// Run every configured analysis, combine and persist the statistics.
    ///
    /// Without criterion configs the `previous` layers of an earlier run are
    /// combined directly and no data stage is repeated.
    pub fn analyze_land_suitability(
        &mut self,
        params: &SuitabilityParams,
        previous: RastersToAnalyze,
    ) -> Result<SuitabilityReport> {
        params.validate()?;
        let mut layers = previous;
        if !params.has_criteria() {
            if layers.is_empty() {
                return Err(Error::Configuration(
                    "pass at least one criterion configuration or previously classified layers"
                        .to_string(),
                ));
            }
            info!(
                "No configurations passed; reusing {} classified layers",
                layers.len()
            );
            self.prepare()?;
            if self.availability.is_none() {
                self.resolve_land(params)?;
            }
        } else {
            self.prepare()?;
            self.resolve_land(params)?;
            let sources = self.source_rasters(params);
            self.process_rasters(params.reference_raster.as_deref(), &sources)?;

            if let Some(config) = &params.slope {
                layers.push(self.slope_analysis(config)?);
            }
            if let Some(config) = &params.land_cover {
                layers.push(self.land_cover_analysis(
                    config,
                    params.no_data_class,
                    params.clouds_class,
                )?);
            }
            if let Some(config) = &params.hand {
                layers.push(self.hand_analysis(config)?);
            }
        }

        let combined = self.land_suitability_analyzer(&layers, params.rounding)?;
        let stats_path = self.layout.stats();
        self.store.write_stats(&stats_path, &self.stats)?;
        info!("Statistics written to {:?}", stats_path);

        Ok(SuitabilityReport {
            stats: self.stats.clone(),
            layers,
            areas: combined.areas,
            classification_path: self.layout.classification(),
            stats_path,
        })
    }
}
