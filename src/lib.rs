#![doc = r#"
landsuit: land-suitability classification for an area of interest.

This crate classifies an area of interest (AOI) into Low/Medium/High suitability
zones for a proposed land-use project. It subtracts land outside the
administrative sub-region and inside protected areas, reclassifies terrain slope,
height above nearest drainage (HAND) and multi-year land-cover persistence, and
averages the classified layers into one decision raster with per-tier areas.
It powers the `landsuit` CLI and can be embedded in your own Rust applications.

Requirements
------------
- GDAL development headers and runtime available on your system.
- `gdalwarp` on `PATH` for raster co-registration with the disk store.
- Rust 2024 edition toolchain.

Quick start: full run on disk
-----------------------------
```rust,no_run
use landsuit::{DiskStore, Project, ProjectParams, RastersToAnalyze, SuitabilityParams};

fn main() -> landsuit::Result<()> {
    let mut params = ProjectParams::new("Corrientes solar", 2025, "/in/aoi.geojson");
    params.project_dir = Some("/out/corrientes_solar".into());

    let mut project = Project::new(params, DiskStore::new())?;
    let report = project.analyze_land_suitability(
        &SuitabilityParams::default(),
        RastersToAnalyze::new(),
    )?;
    println!("{:?}", report.stats.area_high_suitability);
    Ok(())
}
```

Pure building blocks
--------------------
```rust
use ndarray::array;
use landsuit::core::params::ThresholdConfig;
use landsuit::core::processing::reclassify::reclassify;

let slope = array![[0.5, 2.0, 4.0, 6.0]];
let codes = reclassify(&slope, &ThresholdConfig::slope_default());
assert_eq!(codes, array![[1, 3, 2, 1]]);
```

Error handling
--------------
All public functions return `landsuit::Result<T>`. A legally non-viable AOI is
reported as `Error::NonViable` rather than terminating the process:

```rust,no_run
use landsuit::{DiskStore, Error, Project, ProjectParams, RastersToAnalyze, SuitabilityParams};
use landsuit::core::land::NonViable;

fn main() {
    let params = ProjectParams::new("demo", 2025, "/in/aoi.geojson");
    let run = Project::new(params, DiskStore::new()).and_then(|mut p| {
        p.analyze_land_suitability(&SuitabilityParams::default(), RastersToAnalyze::new())
    });
    match run {
        Ok(_) => {}
        Err(Error::NonViable(NonViable::FullyProtected)) => eprintln!("AOI is protected"),
        Err(Error::MissingResource { what, path }) => eprintln!("missing {what}: {path:?}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: the `Project` orchestrator.
- [`core`]: configuration, raster model, land-availability resolver, reclassifiers and combiner.
- [`io`]: GDAL/OGR adapters, `gdalwarp` co-registration, writers and the `DataStore` backends.
- [`types`]: suitability levels, rounding modes and criteria.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::land::{LandAvailability, NonViable, Region};
pub use core::params::{CategoryConfig, ProjectParams, SuitabilityParams, ThresholdConfig};
pub use core::raster::{GeoTransform, GridSpec, Raster};
pub use core::stats::{Measure, Stats, Unit};
pub use error::{Error, Result};
pub use types::{Criterion, NODATA_CODE, RoundingMode, SuitabilityLevel};

// Storage backends
pub use io::{DataStore, DiskStore, MemoryStore, ProjectLayout};

// High-level API re-exports
pub use api::{ClassifiedLayer, Project, RastersToAnalyze, SuitabilityReport};
