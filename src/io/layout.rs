//! File addresses for one project run.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::params::ProjectParams;
use crate::error::Result;

/// `dir/file` with `_suffix` inserted before the extension.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub data_dir: PathBuf,
    pub intermediate_dir: PathBuf,
    pub results_dir: PathBuf,
    pub admin_borders: PathBuf,
    pub protected_areas: PathBuf,
}

impl ProjectLayout {
    pub fn new(params: &ProjectParams) -> Self {
        let project_dir = params
            .project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(params.slug()));
        let results_dir = params
            .results_dir
            .clone()
            .unwrap_or_else(|| project_dir.join("results"));
        let cc = &params.country_code;
        ProjectLayout {
            data_dir: params
                .data_dir
                .clone()
                .unwrap_or_else(|| project_dir.join("data")),
            intermediate_dir: params
                .intermediate_dir
                .clone()
                .unwrap_or_else(|| project_dir.join("intermediate_results")),
            admin_borders: params
                .admin_borders
                .clone()
                .unwrap_or_else(|| project_dir.join(format!("admin_border_{cc}.geojson"))),
            protected_areas: params
                .protected_areas
                .clone()
                .unwrap_or_else(|| project_dir.join(format!("protected_areas_{cc}.geojson"))),
            results_dir,
            project_dir,
        }
    }

    /// Create every output directory. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.project_dir,
            &self.data_dir,
            &self.intermediate_dir,
            &self.results_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        debug!("Project directories ready under {:?}", self.project_dir);
        Ok(())
    }

    pub fn dem(&self) -> PathBuf {
        self.data_dir.join("dem.tif")
    }

    pub fn hand(&self) -> PathBuf {
        self.data_dir.join("hand.tif")
    }

    pub fn land_cover(&self, year: i32) -> PathBuf {
        self.data_dir.join(format!("lc_{year}.tif"))
    }

    /// Co-registered copy of a source raster.
    pub fn processed(&self, source: &Path) -> PathBuf {
        let name = source.file_name().map(PathBuf::from).unwrap_or_default();
        with_suffix(&self.intermediate_dir.join(name), "processed")
    }

    pub fn slope(&self) -> PathBuf {
        self.intermediate_dir.join("slope.tif")
    }

    pub fn slope_reclassified(&self) -> PathBuf {
        self.intermediate_dir.join("slope_reclassified.tif")
    }

    pub fn hand_reclassified(&self) -> PathBuf {
        with_suffix(&self.processed(&self.hand()), "reclassified")
    }

    pub fn land_cover_intersect(&self) -> PathBuf {
        self.intermediate_dir.join("land_cover_intersect.tif")
    }

    pub fn land_cover_reclassified(&self) -> PathBuf {
        self.intermediate_dir
            .join("land_cover_intersect_reclassified.tif")
    }

    pub fn classification(&self) -> PathBuf {
        self.results_dir.join("classified_land.tif")
    }

    pub fn remaining_land(&self) -> PathBuf {
        self.results_dir.join("remaining_land.geojson")
    }

    pub fn stats(&self) -> PathBuf {
        self.results_dir.join("stats.json")
    }
}
