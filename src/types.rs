//! Shared types and enums used across landsuit.
//! Includes `SuitabilityLevel` and its ordinal codes, the nodata sentinel used by
//! every classified grid, `RoundingMode` for the combiner, and `Criterion`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel written into classified grids where no suitability applies.
pub const NODATA_CODE: i32 = -9999;

/// Suitability tier. The discriminants are the ordinal codes averaged by the combiner.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SuitabilityLevel {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl SuitabilityLevel {
    pub const ALL: [SuitabilityLevel; 3] = [
        SuitabilityLevel::Low,
        SuitabilityLevel::Medium,
        SuitabilityLevel::High,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(SuitabilityLevel::Low),
            2 => Some(SuitabilityLevel::Medium),
            3 => Some(SuitabilityLevel::High),
            _ => None,
        }
    }

    /// Grid code for an optional level; `None` becomes [`NODATA_CODE`].
    pub fn code_or_nodata(level: Option<Self>) -> i32 {
        level.map_or(NODATA_CODE, Self::code)
    }
}

impl std::fmt::Display for SuitabilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuitabilityLevel::Low => write!(f, "Low"),
            SuitabilityLevel::Medium => write!(f, "Medium"),
            SuitabilityLevel::High => write!(f, "High"),
        }
    }
}

/// Rounding applied to the mean of suitability codes.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    Floor,
    Ceil,
    /// Round half to even.
    Round,
}

impl RoundingMode {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingMode::Floor => value.floor(),
            RoundingMode::Ceil => value.ceil(),
            RoundingMode::Round => value.round_ties_even(),
        }
    }
}

impl std::fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundingMode::Floor => write!(f, "floor"),
            RoundingMode::Ceil => write!(f, "ceil"),
            RoundingMode::Round => write!(f, "round"),
        }
    }
}

/// Physical criterion that produced a classified layer.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Criterion {
    Slope,
    LandCover,
    Hand,
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criterion::Slope => write!(f, "slope"),
            Criterion::LandCover => write!(f, "land_cover"),
            Criterion::Hand => write!(f, "hand"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SuitabilityLevel::Low.code(), 1);
        assert_eq!(SuitabilityLevel::Medium.code(), 2);
        assert_eq!(SuitabilityLevel::High.code(), 3);
        for level in SuitabilityLevel::ALL {
            assert_eq!(SuitabilityLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(SuitabilityLevel::from_code(NODATA_CODE), None);
        assert_eq!(SuitabilityLevel::code_or_nodata(None), NODATA_CODE);
    }

    #[test]
    fn rounding_modes() {
        assert_eq!(RoundingMode::Floor.apply(2.5), 2.0);
        assert_eq!(RoundingMode::Ceil.apply(2.5), 3.0);
        assert_eq!(RoundingMode::Round.apply(2.5), 2.0);
        assert_eq!(RoundingMode::Round.apply(1.5), 2.0);
        assert_eq!(RoundingMode::Floor.apply(-9999.0), -9999.0);
    }
}
