//! Core building blocks: configuration, the raster model, the
//! land-availability resolver, the statistics record and the grid
//! processing stages. These are internal primitives consumed by the
//! high-level `api` module.
pub mod land;
pub mod params;
pub mod processing;
pub mod raster;
pub mod stats;
