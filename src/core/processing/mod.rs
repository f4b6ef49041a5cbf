//! Grid processing stages: reclassifiers, the land-cover persistence
//! filter, slope derivation and the suitability combiner.
pub mod combine;
pub mod landcover;
pub mod ops;
pub mod reclassify;
pub mod terrain;
