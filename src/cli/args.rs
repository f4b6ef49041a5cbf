use clap::Parser;
use std::path::PathBuf;

use landsuit::RoundingMode;

#[derive(Parser, Debug)]
#[command(name = "landsuit", version, about = "Land suitability classification CLI")]
pub struct CliArgs {
    /// Project name (also names the project directory)
    #[arg(short, long, default_value = "project")]
    pub name: String,

    /// Area of interest vector file (.geojson, .shp, .parquet or .kml), relative to the input directory
    #[arg(short, long)]
    pub aoi: PathBuf,

    /// Directory holding the input files
    #[arg(long, env = "INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory where the project directory is created
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Last analysed year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Number of years before `year` included in the land cover analysis
    #[arg(long, default_value_t = 5)]
    pub years_prior: u32,

    /// Projected CRS used for every computation
    #[arg(long, default_value_t = 32721)]
    pub epsg: u32,

    /// ISO3 country code of the administrative borders
    #[arg(long, default_value = "ARG")]
    pub country_code: String,

    /// First-level administrative unit (NAME_1) the AOI must fall in
    #[arg(long, default_value = "Corrientes")]
    pub sub_region: String,

    /// Directory with dem.tif, hand.tif and lc_<year>.tif (defaults to <project>/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Administrative borders file, relative to the input directory
    #[arg(long)]
    pub admin_borders: Option<PathBuf>,

    /// Protected areas file, relative to the input directory
    #[arg(long)]
    pub protected_areas: Option<PathBuf>,

    /// Raster whose grid every other raster is aligned to
    #[arg(long)]
    pub reference_raster: Option<PathBuf>,

    /// JSON file with analysis parameters; replaces the criterion flags below
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum viable area in hectares
    #[arg(long, default_value_t = 100.0)]
    pub min_viable_area: f64,

    /// Skip administrative border and protected area checks
    #[arg(long, default_value_t = false)]
    pub no_land_checks: bool,

    /// Skip the slope analysis
    #[arg(long, default_value_t = false)]
    pub no_slope: bool,

    /// Skip the land cover analysis
    #[arg(long, default_value_t = false)]
    pub no_land_cover: bool,

    /// Skip the height above nearest drainage analysis
    #[arg(long, default_value_t = false)]
    pub no_hand: bool,

    /// Slope below this (degrees) is low suitability
    #[arg(long, default_value_t = 1.0)]
    pub slope_low: f64,

    /// Slope above this (degrees) is low suitability
    #[arg(long, default_value_t = 5.0)]
    pub slope_medium: f64,

    /// Slope from `slope-low` up to this (degrees) is high suitability
    #[arg(long, default_value_t = 3.0)]
    pub slope_high: f64,

    /// HAND below this (m) is low suitability
    #[arg(long, default_value_t = 1.0)]
    pub hand_low: f64,

    /// HAND above this (m) is low suitability
    #[arg(long, default_value_t = 50.0)]
    pub hand_medium: f64,

    /// HAND from `hand-low` up to this (m) is high suitability
    #[arg(long, default_value_t = 30.0)]
    pub hand_high: f64,

    /// Land cover codes of low suitability (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = [5])]
    pub cover_low: Vec<i32>,

    /// Land cover codes of medium suitability (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub cover_medium: Vec<i32>,

    /// Land cover codes of high suitability (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = [8, 11])]
    pub cover_high: Vec<i32>,

    /// Land cover code meaning no data
    #[arg(long, default_value_t = 0)]
    pub no_data_class: i32,

    /// Land cover code meaning clouds
    #[arg(long, default_value_t = 10)]
    pub clouds_class: i32,

    /// Rounding applied to the mean suitability code
    #[arg(long, value_enum, default_value_t = RoundingMode::Floor)]
    pub rounding: RoundingMode,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
