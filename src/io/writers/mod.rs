//! GeoTIFF writers and metadata helpers.
pub mod metadata;
pub mod tiff;

pub use metadata::{embed_tiff_metadata, write_json};
pub use tiff::{write_tiff_f32, write_tiff_i32};
