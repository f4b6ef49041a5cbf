use gdal::Dataset;
use gdal::Metadata;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::core::params::{CategoryConfig, ThresholdConfig};
use crate::io::gdal::GdalError;
use crate::types::{Criterion, RoundingMode};

/// Provenance tags shared by every raster the crate writes
pub fn provenance_fields(description: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("DESCRIPTION".to_string(), description.to_string());
    metadata.insert("CONVERSION_TOOL".to_string(), env!("CARGO_PKG_NAME").to_string());
    metadata.insert(
        "CONVERSION_VERSION".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    metadata.insert(
        "CONVERSION_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );
    metadata
}

/// Tags for a threshold-reclassified layer
pub fn threshold_fields(criterion: Criterion, config: &ThresholdConfig) -> BTreeMap<String, String> {
    let mut metadata = provenance_fields(&format!("{criterion} suitability"));
    metadata.insert("CRITERION".to_string(), criterion.to_string());
    metadata.insert("LOW_THRESHOLD".to_string(), config.low_threshold.to_string());
    metadata.insert("MEDIUM_THRESHOLD".to_string(), config.medium_threshold.to_string());
    metadata.insert("HIGH_THRESHOLD".to_string(), config.high_threshold.to_string());
    metadata
}

/// Tags for the land-cover persistence layer
pub fn category_fields(config: &CategoryConfig, years: &[i32]) -> BTreeMap<String, String> {
    let join = |codes: &[i32]| {
        codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let mut metadata = provenance_fields("land cover suitability");
    metadata.insert("CRITERION".to_string(), Criterion::LandCover.to_string());
    metadata.insert("LOW_CATEGORIES".to_string(), join(&config.low));
    metadata.insert("MEDIUM_CATEGORIES".to_string(), join(&config.medium));
    metadata.insert("HIGH_CATEGORIES".to_string(), join(&config.high));
    metadata.insert("YEARS".to_string(), join(years));
    metadata
}

/// Tags for the combined classification
pub fn classification_fields(layers: &[Criterion], rounding: RoundingMode) -> BTreeMap<String, String> {
    let mut metadata = provenance_fields("land suitability classification");
    let names: Vec<String> = layers.iter().map(|c| c.to_string()).collect();
    metadata.insert("CRITERIA".to_string(), names.join(","));
    metadata.insert("ROUNDING".to_string(), rounding.to_string());
    metadata.insert("CLASSES".to_string(), "1=Low,2=Medium,3=High".to_string());
    metadata
}

/// Embed metadata items into a GeoTIFF dataset
pub fn embed_tiff_metadata(
    ds: &mut Dataset,
    metadata: &BTreeMap<String, String>,
) -> Result<(), GdalError> {
    for (key, value) in metadata {
        ds.set_metadata_item(key, value, "")?;
    }
    Ok(())
}

/// Write any serialisable record as pretty JSON
pub fn write_json(path: &Path, value: &impl Serialize) -> crate::Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json_string)?;
    info!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_tags_carry_config() {
        let tags = threshold_fields(Criterion::Slope, &ThresholdConfig::slope_default());
        assert_eq!(tags["CRITERION"], "slope");
        assert_eq!(tags["HIGH_THRESHOLD"], "3");
        assert!(tags.contains_key("CONVERSION_TIMESTAMP"));
    }

    #[test]
    fn classification_tags_list_layers() {
        let tags = classification_fields(&[Criterion::Slope, Criterion::Hand], RoundingMode::Ceil);
        assert_eq!(tags["CRITERIA"], "slope,hand");
        assert_eq!(tags["ROUNDING"], "ceil");
    }

    #[test]
    fn category_tags_join_codes() {
        let tags = category_fields(&CategoryConfig::default(), &[2020, 2021]);
        assert_eq!(tags["HIGH_CATEGORIES"], "8,11");
        assert_eq!(tags["MEDIUM_CATEGORIES"], "");
        assert_eq!(tags["YEARS"], "2020,2021");
    }
}
