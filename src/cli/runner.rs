use std::fs;

use chrono::Datelike;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use landsuit::api::Project;
use landsuit::core::params::{CategoryConfig, ProjectParams, SuitabilityParams, ThresholdConfig};
use landsuit::io::DiskStore;
use landsuit::{RastersToAnalyze, Stats};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --log
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub(crate) fn suitability_params(args: &CliArgs) -> Result<SuitabilityParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading analysis parameters from {:?}", path);
            SuitabilityParams::from_json_file(path)?
        }
        None => {
            if args.min_viable_area.is_nan() || args.min_viable_area < 0.0 {
                return Err(AppError::InvalidValue {
                    arg: "--min-viable-area".to_string(),
                    value: args.min_viable_area.to_string(),
                });
            }
            SuitabilityParams {
                min_viable_area: args.min_viable_area,
                land_checks: true,
                slope: Some(ThresholdConfig {
                    low_threshold: args.slope_low,
                    medium_threshold: args.slope_medium,
                    high_threshold: args.slope_high,
                }),
                land_cover: Some(CategoryConfig {
                    low: args.cover_low.clone(),
                    medium: args.cover_medium.clone(),
                    high: args.cover_high.clone(),
                }),
                hand: Some(ThresholdConfig {
                    low_threshold: args.hand_low,
                    medium_threshold: args.hand_medium,
                    high_threshold: args.hand_high,
                }),
                reference_raster: None,
                rounding: args.rounding,
                no_data_class: args.no_data_class,
                clouds_class: args.clouds_class,
            }
        }
    };

    if args.no_land_checks {
        params.land_checks = false;
    }
    if args.no_slope {
        params.slope = None;
    }
    if args.no_land_cover {
        params.land_cover = None;
    }
    if args.no_hand {
        params.hand = None;
    }
    if let Some(reference) = &args.reference_raster {
        params.reference_raster = Some(args.input_dir.join(reference));
    }
    if !params.has_criteria() {
        return Err(AppError::NothingToAnalyze);
    }
    Ok(params)
}

pub(crate) fn project_params(args: &CliArgs) -> ProjectParams {
    let year = args.year.unwrap_or_else(|| chrono::Local::now().year());
    let mut params = ProjectParams::new(&args.name, year, args.input_dir.join(&args.aoi));
    params.years_prior = args.years_prior;
    params.epsg = args.epsg;
    params.country_code = args.country_code.clone();
    params.sub_region = args.sub_region.clone();
    params.project_dir = Some(args.output_dir.join(params.slug()));
    params.data_dir = args.data_dir.as_ref().map(|d| args.input_dir.join(d));
    params.admin_borders = args.admin_borders.as_ref().map(|p| args.input_dir.join(p));
    params.protected_areas = args.protected_areas.as_ref().map(|p| args.input_dir.join(p));
    params
}

fn log_summary(stats: &Stats) {
    let fields = [
        ("available land", stats.area_non_protected),
        ("low suitability", stats.area_low_suitability),
        ("medium suitability", stats.area_medium_suitability),
        ("high suitability", stats.area_high_suitability),
    ];
    for (label, measure) in fields {
        if let Some(m) = measure {
            info!("{}: {:.2} Ha", label, m.value());
        }
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let suitability = suitability_params(&args)?;
    let project_params = project_params(&args);
    fs::create_dir_all(&args.output_dir).map_err(AppError::from)?;

    info!("Input directory: {:?}", args.input_dir);
    info!("Output directory: {:?}", args.output_dir);

    let mut project = Project::new(project_params, DiskStore::new())?;
    match project.analyze_land_suitability(&suitability, RastersToAnalyze::new()) {
        Ok(report) => {
            log_summary(&report.stats);
            info!("Classification written to {:?}", report.classification_path);
            Ok(())
        }
        Err(e) => {
            if e.is_non_viable() {
                error!("Project is not viable: {}", e);
            } else {
                error!("Analysis failed: {}", e);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["landsuit", "--aoi", "aoi.geojson", "--input-dir", "/in", "--output-dir", "/out"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_build_default_criteria() {
        let params = suitability_params(&parse(&[])).unwrap();
        assert_eq!(params.slope, Some(ThresholdConfig::slope_default()));
        assert_eq!(params.hand, Some(ThresholdConfig::hand_default()));
        assert_eq!(params.land_cover, Some(CategoryConfig::default()));
        assert!(params.land_checks);
    }

    #[test]
    fn stages_can_be_disabled() {
        let params = suitability_params(&parse(&["--no-slope", "--no-hand", "--no-land-checks"])).unwrap();
        assert!(params.slope.is_none() && params.hand.is_none());
        assert!(params.land_cover.is_some());
        assert!(!params.land_checks);

        let all_off = parse(&["--no-slope", "--no-hand", "--no-land-cover"]);
        assert!(matches!(suitability_params(&all_off), Err(AppError::NothingToAnalyze)));
    }

    #[test]
    fn cover_codes_are_comma_separated() {
        let params = suitability_params(&parse(&["--cover-high", "1,2,3", "--cover-medium", "7"])).unwrap();
        let cover = params.land_cover.unwrap();
        assert_eq!(cover.high, vec![1, 2, 3]);
        assert_eq!(cover.medium, vec![7]);
        assert_eq!(cover.low, vec![5]);
    }

    #[test]
    fn project_paths_resolve_against_directories() {
        let params = project_params(&parse(&["--name", "Solar Farm", "--year", "2024"]));
        assert_eq!(params.aoi_path, PathBuf::from("/in/aoi.geojson"));
        assert_eq!(params.project_dir, Some(PathBuf::from("/out/solar_farm")));
        assert_eq!(params.years().first(), Some(&2019));
    }
}
