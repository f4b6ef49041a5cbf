//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GDAL and JSON errors, and provides semantic variants
//! for configuration problems, missing inputs, grid mismatches and legally
//! non-viable areas of interest.
use std::path::PathBuf;

use thiserror::Error;

use crate::core::land::NonViable;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Area of interest is not viable: {0}")]
    NonViable(#[from] NonViable),

    #[error("Missing {what}: {path:?}")]
    MissingResource { what: &'static str, path: PathBuf },

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Grid mismatch for {layer}: {detail}")]
    GridMismatch { layer: String, detail: String },

    #[error("Sub-region {sub_region} not found in administrative borders of {country}")]
    UnknownSubRegion { sub_region: String, country: String },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl Error {
    pub fn missing(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Error::MissingResource {
            what,
            path: path.into(),
        }
    }

    /// True for the legal/geometric non-viability family.
    pub fn is_non_viable(&self) -> bool {
        matches!(self, Error::NonViable(_))
    }
}
