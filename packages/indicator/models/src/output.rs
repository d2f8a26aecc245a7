//! Ranked output types consumed by the map and table renderer.

use serde::{Deserialize, Serialize};

use crate::{Indicator, IndicatorSet};

/// Representative point for a geographic unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// A ranked geographic unit. Built once per pipeline run and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedArea {
    /// Grouping key at the unit's aggregation level.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// 1-based rank, 1 being the most disadvantaged.
    pub rank: u32,
    /// Composite score (sum of the eight indicators).
    pub score: f64,
    /// Centroid, absent when the lookup missed and misses are retained.
    pub centroid: Option<Centroid>,
    /// `"Ranks highly in: ..."` text, absent for unexplained levels.
    pub explanation: Option<String>,
    /// The indicator values behind the score.
    pub indicators: IndicatorSet,
}

/// Flat, row-oriented form of a [`RankedArea`] (column name -> value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub key: String,
    pub name: String,
    pub rank: u32,
    pub score: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub explanation: Option<String>,
    #[serde(rename = "PM25")]
    pub pm25: f64,
    #[serde(rename = "Diesel_Particulate")]
    pub diesel_particulate: f64,
    #[serde(rename = "Asthma")]
    pub asthma: f64,
    #[serde(rename = "Household_Income")]
    pub household_income: f64,
    #[serde(rename = "Population_Density_Percentile")]
    pub population_density: f64,
    #[serde(rename = "Building_Loss_Rate")]
    pub building_loss_rate: f64,
    #[serde(rename = "Agricultural_Loss_Rate")]
    pub agricultural_loss_rate: f64,
    #[serde(rename = "Traffic_Proximity")]
    pub traffic_proximity: f64,
}

impl From<&RankedArea> for OutputRow {
    fn from(area: &RankedArea) -> Self {
        let value = |indicator| area.indicators.get(indicator);
        Self {
            key: area.key.clone(),
            name: area.name.clone(),
            rank: area.rank,
            score: area.score,
            lat: area.centroid.map(|c| c.lat),
            lon: area.centroid.map(|c| c.lon),
            explanation: area.explanation.clone(),
            pm25: value(Indicator::Pm25),
            diesel_particulate: value(Indicator::DieselParticulate),
            asthma: value(Indicator::Asthma),
            household_income: value(Indicator::HouseholdIncome),
            population_density: value(Indicator::PopulationDensity),
            building_loss_rate: value(Indicator::BuildingLossRate),
            agricultural_loss_rate: value(Indicator::AgriculturalLossRate),
            traffic_proximity: value(Indicator::TrafficProximity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndicatorValues;

    #[test]
    fn output_row_flattens_indicators() {
        let indicators = Indicator::ALL
            .iter()
            .enumerate()
            .fold(IndicatorValues::default(), |acc, (i, indicator)| {
                #[allow(clippy::cast_precision_loss)]
                acc.with(*indicator, i as f64 / 10.0)
            })
            .complete()
            .unwrap();
        let area = RankedArea {
            key: "06037".to_string(),
            name: "Los Angeles County, California".to_string(),
            rank: 1,
            score: indicators.sum(),
            centroid: Some(Centroid {
                lat: 34.3,
                lon: -118.2,
            }),
            explanation: None,
            indicators,
        };

        let row = OutputRow::from(&area);
        assert_eq!(row.rank, 1);
        assert_eq!(row.lat, Some(34.3));
        assert!((row.pm25 - 0.0).abs() < f64::EPSILON);
        assert!((row.population_density - 0.4).abs() < f64::EPSILON);
        assert!((row.traffic_proximity - 0.7).abs() < f64::EPSILON);
    }
}
