//! I/O layer: GDAL raster and OGR vector adapters, `gdalwarp`
//! co-registration, GeoTIFF/JSON writers, the project file layout and the
//! `DataStore` seam with its disk and in-memory backends.
pub mod gdal;
pub use gdal::{GdalError, GdalMetadata, GdalRasterReader};

pub mod disk;
pub mod layout;
pub mod memory;
pub mod store;
pub mod vector;
pub mod warp;
pub mod writers;

pub use disk::DiskStore;
pub use layout::ProjectLayout;
pub use memory::MemoryStore;
pub use store::DataStore;
