#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Environmental-justice indicator types.
//!
//! Defines the eight percentile indicators that make up the composite
//! disadvantage score, the per-unit records read from the screening-tool
//! tables, and the ranked output rows handed to the map/table renderer.

pub mod level;
pub mod output;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use level::AggregationLevel;
pub use output::{Centroid, OutputRow, RankedArea};

/// One of the eight percentile indicators summed into the composite score.
///
/// The string form of each variant is the column name used in the
/// screening-tool tables.
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
pub enum Indicator {
    /// PM2.5 in the air.
    #[strum(serialize = "PM25")]
    #[serde(rename = "PM25")]
    Pm25,
    /// Diesel particulate matter exposure.
    #[strum(serialize = "Diesel_Particulate")]
    #[serde(rename = "Diesel_Particulate")]
    DieselParticulate,
    /// Current asthma among adults.
    #[strum(serialize = "Asthma")]
    #[serde(rename = "Asthma")]
    Asthma,
    /// Low median household income as a percent of area median income.
    #[strum(serialize = "Household_Income")]
    #[serde(rename = "Household_Income")]
    HouseholdIncome,
    /// Population density, ranked within the aggregation level.
    #[strum(serialize = "Population_Density_Percentile")]
    #[serde(rename = "Population_Density_Percentile")]
    PopulationDensity,
    /// Expected building loss rate (natural hazards risk index).
    #[strum(serialize = "Building_Loss_Rate")]
    #[serde(rename = "Building_Loss_Rate")]
    BuildingLossRate,
    /// Expected agricultural loss rate (natural hazards risk index).
    #[strum(serialize = "Agricultural_Loss_Rate")]
    #[serde(rename = "Agricultural_Loss_Rate")]
    AgriculturalLossRate,
    /// Traffic proximity and volume.
    #[strum(serialize = "Traffic_Proximity")]
    #[serde(rename = "Traffic_Proximity")]
    TrafficProximity,
}

impl Indicator {
    /// Number of indicators in the composite score.
    pub const COUNT: usize = 8;

    /// All indicators, in composite-score column order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pm25,
        Self::DieselParticulate,
        Self::Asthma,
        Self::HouseholdIncome,
        Self::PopulationDensity,
        Self::BuildingLossRate,
        Self::AgriculturalLossRate,
        Self::TrafficProximity,
    ];

    /// The seven indicators eligible for an area explanation. Population
    /// density is scored but never cited.
    pub const DESCRIPTIVE: [Self; 7] = [
        Self::Pm25,
        Self::DieselParticulate,
        Self::Asthma,
        Self::HouseholdIncome,
        Self::BuildingLossRate,
        Self::AgriculturalLossRate,
        Self::TrafficProximity,
    ];

    /// Short name used in area explanations (e.g. `"Asthma: 95%"`).
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pm25 => "PM25",
            Self::DieselParticulate => "Diesel",
            Self::Asthma => "Asthma",
            Self::HouseholdIncome => "Income",
            Self::PopulationDensity => "Density",
            Self::BuildingLossRate => "Building",
            Self::AgriculturalLossRate => "Agricultural",
            Self::TrafficProximity => "Traffic",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Returns `value` if it is a valid percentile (finite and in `[0, 1]`).
#[must_use]
pub fn valid_percentile(value: f64) -> Option<f64> {
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value)
}

/// A possibly incomplete set of indicator percentiles for one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorValues {
    values: [Option<f64>; Indicator::COUNT],
}

impl IndicatorValues {
    /// Returns the value of `indicator`, if present.
    #[must_use]
    pub const fn get(&self, indicator: Indicator) -> Option<f64> {
        self.values[indicator.index()]
    }

    /// Sets `indicator`. Values outside `[0, 1]` are stored as absent.
    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        self.values[indicator.index()] = value.and_then(valid_percentile);
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        self.set(indicator, Some(value));
        self
    }

    /// Whether every descriptive indicator is present. Density is derived
    /// later and not required here.
    #[must_use]
    pub fn has_all_descriptive(&self) -> bool {
        Indicator::DESCRIPTIVE
            .iter()
            .all(|indicator| self.get(*indicator).is_some())
    }

    /// Returns the complete set if all eight indicators are present.
    #[must_use]
    pub fn complete(&self) -> Option<IndicatorSet> {
        let mut values = [0.0; Indicator::COUNT];
        for indicator in Indicator::ALL {
            values[indicator.index()] = self.get(indicator)?;
        }
        Some(IndicatorSet { values })
    }
}

/// A complete set of the eight indicator percentiles for one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    values: [f64; Indicator::COUNT],
}

impl IndicatorSet {
    /// Returns the value of `indicator`.
    #[must_use]
    pub const fn get(&self, indicator: Indicator) -> f64 {
        self.values[indicator.index()]
    }

    /// Iterates `(indicator, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, f64)> + '_ {
        Indicator::ALL
            .iter()
            .map(|indicator| (*indicator, self.get(*indicator)))
    }

    /// The `(indicator, value)` pairs eligible for an explanation.
    #[must_use]
    pub fn descriptive(&self) -> [(Indicator, f64); 7] {
        Indicator::DESCRIPTIVE.map(|indicator| (indicator, self.get(indicator)))
    }

    /// Sum of all eight indicators.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// One geographic unit as read from a screening-tool table.
///
/// The key is absent when the source cell was empty; such records are
/// skipped by every downstream stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorRecord {
    /// Grouping key at the record's aggregation level.
    pub key: Option<String>,
    /// Human-readable name, falls back to the key.
    pub name: Option<String>,
    /// Raw percentiles. Population density is filled in by the density
    /// stage.
    pub values: IndicatorValues,
    /// Total population.
    pub population: Option<f64>,
    /// Land area in the same unit across the whole table.
    pub area: Option<f64>,
}

impl IndicatorRecord {
    /// Display name for the unit.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.key.as_deref())
    }
}

/// A tract row from the screening-tool table, carrying every key needed to
/// roll it up to higher aggregation levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TractRecord {
    /// Census tract GEOID.
    pub tract_id: Option<String>,
    /// Full state name.
    pub state: Option<String>,
    /// County name including the `" County"` suffix.
    pub county: Option<String>,
    /// Raw tract percentiles (density absent).
    pub values: IndicatorValues,
    /// Total population.
    pub population: Option<f64>,
    /// Tract land area.
    pub area: Option<f64>,
}

/// A row from the cities lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityRecord {
    /// Stable city identifier.
    pub id: Option<String>,
    /// City name.
    pub name: Option<String>,
    /// County name as given by the lookup (usually without the `" County"`
    /// suffix).
    pub county: Option<String>,
    /// Full state name, when the lookup carries one.
    pub state: Option<String>,
    /// City population.
    pub population: Option<f64>,
    /// City latitude.
    pub lat: Option<f64>,
    /// City longitude.
    pub lon: Option<f64>,
}
