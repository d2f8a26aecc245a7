//! Geographic aggregation levels.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The granularity at which indicators are grouped and ranked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationLevel {
    /// Census tract (keyed by GEOID).
    CensusTract,
    /// County (keyed by `"<County>, <State>"`).
    County,
    /// State (keyed by full state name).
    State,
    /// Primary city of a county (keyed by city id).
    City,
}

impl AggregationLevel {
    /// All levels, finest first.
    pub const ALL: [Self; 4] = [Self::CensusTract, Self::County, Self::State, Self::City];

    /// Human-readable label (e.g. `"Census Tract"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CensusTract => "Census Tract",
            Self::County => "County",
            Self::State => "State",
            Self::City => "City",
        }
    }

    /// Whether ranked areas at this level get a "ranks highly in" explanation
    /// by default. Tracts never had one.
    #[must_use]
    pub const fn explained_by_default(self) -> bool {
        !matches!(self, Self::CensusTract)
    }
}

/// Builds the county grouping key. Qualifying by state keeps same-named
/// counties in different states apart.
#[must_use]
pub fn county_key(county: &str, state: &str) -> String {
    format!("{}, {}", county.trim(), state.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn parses_snake_case() {
        assert_eq!(
            AggregationLevel::from_str("census_tract").unwrap(),
            AggregationLevel::CensusTract
        );
        assert_eq!(AggregationLevel::City.to_string(), "city");
        assert!(AggregationLevel::from_str("zip").is_err());
    }

    #[test]
    fn tracts_are_not_explained() {
        assert!(!AggregationLevel::CensusTract.explained_by_default());
        assert!(AggregationLevel::County.explained_by_default());
        assert!(AggregationLevel::State.explained_by_default());
        assert!(AggregationLevel::City.explained_by_default());
    }

    #[test]
    fn county_key_includes_state() {
        assert_eq!(
            county_key(" Washington County ", "Ohio"),
            "Washington County, Ohio"
        );
        assert_ne!(
            county_key("Washington County", "Ohio"),
            county_key("Washington County", "Oregon")
        );
    }
}
