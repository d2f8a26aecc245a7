//! Population density percentiles.
//!
//! Density is population / area, ranked against every unit at the same
//! aggregation level. Units without a key, a population or a positive area
//! are left out of the ranking and keep no density percentile.

use equity_map_indicator_models::{Indicator, IndicatorRecord};

use crate::percentile::percentile_ranks;

/// Density of one unit and its percentile within the level.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMetric {
    /// Position of the record in the input.
    pub index: usize,
    /// Unit key.
    pub key: String,
    /// Population per unit of area.
    pub density: f64,
    /// Fraction of units with density less than or equal to this one.
    pub percentile: f64,
}

/// Returns the raw density of a record, if it can be computed.
#[must_use]
pub fn raw_density(record: &IndicatorRecord) -> Option<f64> {
    let population = record.population.filter(|p| p.is_finite() && *p >= 0.0)?;
    let area = record.area.filter(|a| a.is_finite() && *a > 0.0)?;
    let density = population / area;
    density.is_finite().then_some(density)
}

/// Computes a [`DensityMetric`] for every eligible record, in input order.
#[must_use]
pub fn compute(records: &[IndicatorRecord]) -> Vec<DensityMetric> {
    let eligible: Vec<(usize, String, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| Some((index, record.key.clone()?, raw_density(record)?)))
        .collect();
    let densities: Vec<f64> = eligible.iter().map(|(_, _, d)| *d).collect();

    eligible
        .into_iter()
        .zip(percentile_ranks(&densities))
        .map(|((index, key, density), percentile)| DensityMetric {
            index,
            key,
            density,
            percentile,
        })
        .collect()
}

/// Writes the density percentile of every record into its indicator
/// values. Ineligible records get an absent density.
///
/// Returns the number of records that received a percentile.
pub fn apply(records: &mut [IndicatorRecord]) -> usize {
    let metrics = compute(records);

    for record in records.iter_mut() {
        record.values.set(Indicator::PopulationDensity, None);
    }
    for metric in &metrics {
        records[metric.index]
            .values
            .set(Indicator::PopulationDensity, Some(metric.percentile));
    }

    let skipped = records.len() - metrics.len();
    if skipped > 0 {
        log::debug!("{skipped} record(s) lack population, area or key; no density percentile");
    }

    metrics.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, population: Option<f64>, area: Option<f64>) -> IndicatorRecord {
        IndicatorRecord {
            key: Some(key.to_string()),
            population,
            area,
            ..IndicatorRecord::default()
        }
    }

    #[test]
    fn percentiles_follow_density() {
        let records = vec![
            record("a", Some(100.0), Some(10.0)),
            record("b", Some(50.0), Some(10.0)),
            record("c", Some(1000.0), Some(10.0)),
            record("d", Some(100.0), Some(20.0)),
        ];
        let metrics = compute(&records);
        let pct: Vec<(&str, f64)> = metrics
            .iter()
            .map(|m| (m.key.as_str(), m.percentile))
            .collect();
        assert_eq!(pct, vec![("a", 0.75), ("b", 0.5), ("c", 1.0), ("d", 0.5)]);
        assert!((metrics[0].density - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn excludes_missing_population_or_area() {
        let records = vec![
            record("a", Some(100.0), Some(10.0)),
            record("b", None, Some(10.0)),
            record("c", Some(100.0), None),
            record("d", Some(100.0), Some(0.0)),
            IndicatorRecord {
                key: None,
                population: Some(10.0),
                area: Some(1.0),
                ..IndicatorRecord::default()
            },
        ];
        let metrics = compute(&records);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].key, "a");
        assert_eq!(metrics[0].index, 0);
        assert!((metrics[0].percentile - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_writes_density_indicator() {
        let mut records = vec![
            record("a", Some(10.0), Some(1.0)),
            record("b", Some(20.0), Some(1.0)),
            record("c", None, Some(1.0)),
        ];
        records[2]
            .values
            .set(Indicator::PopulationDensity, Some(0.9));

        assert_eq!(apply(&mut records), 2);
        assert_eq!(records[0].values.get(Indicator::PopulationDensity), Some(0.5));
        assert_eq!(records[1].values.get(Indicator::PopulationDensity), Some(1.0));
        assert_eq!(records[2].values.get(Indicator::PopulationDensity), None);
    }

    #[test]
    fn percentiles_are_bounded_and_monotonic() {
        let records: Vec<IndicatorRecord> = (0..50)
            .map(|i| record(&format!("u{i}"), Some(f64::from((i * 37) % 11)), Some(2.0)))
            .collect();
        let metrics = compute(&records);
        for a in &metrics {
            assert!((0.0..=1.0).contains(&a.percentile));
            for b in &metrics {
                if a.density <= b.density {
                    assert!(a.percentile <= b.percentile);
                }
            }
        }
    }
}
