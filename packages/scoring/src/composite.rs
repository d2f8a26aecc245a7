//! Composite score and ranking.
//!
//! The composite score is the plain sum of the eight indicator
//! percentiles. Units missing any indicator are dropped; there is no
//! partial-sum fallback.

use equity_map_indicator_models::{IndicatorRecord, IndicatorSet};

/// Default number of units kept per level after ranking.
pub const DEFAULT_TOP_N: usize = 501;

/// A unit with a complete indicator set and its composite score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredUnit {
    /// Unit key.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// The eight indicators.
    pub indicators: IndicatorSet,
    /// Sum of the eight indicators.
    pub score: f64,
}

impl ScoredUnit {
    /// Scores a record. Returns `None` if the key or any indicator is
    /// absent.
    #[must_use]
    pub fn from_record(record: &IndicatorRecord) -> Option<Self> {
        let key = record.key.clone()?;
        let indicators = record.values.complete()?;
        let name = record.display_name().unwrap_or(&key).to_string();
        Some(Self {
            key,
            name,
            score: indicators.sum(),
            indicators,
        })
    }
}

/// Scores every complete record, preserving input order.
#[must_use]
pub fn score(records: &[IndicatorRecord]) -> Vec<ScoredUnit> {
    let units: Vec<ScoredUnit> = records.iter().filter_map(ScoredUnit::from_record).collect();

    let dropped = records.len() - units.len();
    if dropped > 0 {
        log::debug!("Excluded {dropped} incomplete record(s) from scoring");
    }

    units
}

/// Orders units by descending score and keeps the first `top_n`.
///
/// The sort is stable: units with equal scores keep their input order.
#[must_use]
pub fn rank(mut units: Vec<ScoredUnit>, top_n: usize) -> Vec<ScoredUnit> {
    units.sort_by(|a, b| b.score.total_cmp(&a.score));
    units.truncate(top_n);
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use equity_map_indicator_models::{Indicator, IndicatorValues};

    fn values(pairs: &[(Indicator, f64)]) -> IndicatorValues {
        pairs
            .iter()
            .fold(IndicatorValues::default(), |acc, (i, v)| acc.with(*i, *v))
    }

    fn uniform(value: f64) -> IndicatorValues {
        Indicator::ALL
            .iter()
            .fold(IndicatorValues::default(), |acc, i| acc.with(*i, value))
    }

    fn record(key: &str, values: IndicatorValues) -> IndicatorRecord {
        IndicatorRecord {
            key: Some(key.to_string()),
            values,
            ..IndicatorRecord::default()
        }
    }

    fn unit(key: &str, score: f64) -> ScoredUnit {
        ScoredUnit {
            key: key.to_string(),
            name: key.to_string(),
            indicators: uniform(score / 8.0).complete().unwrap(),
            score,
        }
    }

    #[test]
    fn sums_all_eight_indicators() {
        let record = record(
            "A",
            values(&[
                (Indicator::Pm25, 0.9),
                (Indicator::DieselParticulate, 0.5),
                (Indicator::Asthma, 0.95),
                (Indicator::HouseholdIncome, 0.2),
                (Indicator::PopulationDensity, 0.6),
                (Indicator::BuildingLossRate, 0.1),
                (Indicator::AgriculturalLossRate, 0.05),
                (Indicator::TrafficProximity, 0.8),
            ]),
        );
        let units = score(&[record]);
        assert_eq!(units.len(), 1);
        assert!((units[0].score - 4.1).abs() < 1e-9);
        assert_eq!(units[0].name, "A");
    }

    #[test]
    fn changing_one_indicator_shifts_score_by_delta() {
        let base = uniform(0.4);
        let bumped = base.with(Indicator::TrafficProximity, 0.65);
        let units = score(&[record("a", base), record("b", bumped)]);
        assert!((units[1].score - units[0].score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn excludes_incomplete_units() {
        let mut partial = uniform(0.5);
        partial.set(Indicator::Asthma, None);
        let records = vec![
            record("complete", uniform(0.5)),
            record("partial", partial),
            IndicatorRecord {
                key: None,
                values: uniform(0.5),
                ..IndicatorRecord::default()
            },
        ];
        let units = score(&records);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].key, "complete");
    }

    #[test]
    fn ranks_descending_by_score() {
        let ranked = rank(vec![unit("a", 1.0), unit("b", 5.0), unit("c", 3.0)], 10);
        let keys: Vec<&str> = ranked.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let ranked = rank(
            vec![unit("A", 1.0), unit("B", 3.0), unit("C", 3.0), unit("D", 4.0)],
            10,
        );
        let keys: Vec<&str> = ranked.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn truncates_to_top_n() {
        #[allow(clippy::cast_precision_loss)]
        let units: Vec<ScoredUnit> = (0..1000)
            .map(|i| unit(&format!("u{i}"), ((i * 7919) % 1000) as f64 / 125.0))
            .collect();
        let all_scores: Vec<f64> = units.iter().map(|u| u.score).collect();

        let ranked = rank(units, DEFAULT_TOP_N);
        assert_eq!(ranked.len(), 501);

        let min_kept = ranked
            .iter()
            .map(|u| u.score)
            .fold(f64::INFINITY, f64::min);
        let kept: std::collections::BTreeSet<&str> =
            ranked.iter().map(|u| u.key.as_str()).collect();
        for (i, score) in all_scores.iter().enumerate() {
            if !kept.contains(format!("u{i}").as_str()) {
                assert!(*score <= min_kept);
            }
        }
    }

    #[test]
    fn rank_is_deterministic() {
        let input = vec![unit("x", 2.0), unit("y", 2.0), unit("z", 1.0)];
        assert_eq!(rank(input.clone(), 3), rank(input, 3));
    }
}
