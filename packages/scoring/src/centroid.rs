//! Centroid lookup and the final ranked-area assembly.

use std::collections::{BTreeMap, BTreeSet};

use equity_map_indicator_models::{Centroid, RankedArea};
use serde::{Deserialize, Serialize};

use crate::composite::ScoredUnit;
use crate::explanation;

/// What to do with a ranked unit whose key has no centroid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCentroid {
    /// Drop the unit from the output.
    #[default]
    Drop,
    /// Keep the unit with an empty latitude/longitude.
    Retain,
}

/// Key -> centroid lookup for one aggregation level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentroidTable {
    by_key: BTreeMap<String, Centroid>,
    /// Keys seen more than once with different coordinates.
    conflicting: BTreeSet<String>,
}

impl CentroidTable {
    /// Inserts a centroid. Non-finite coordinates are ignored. A repeated
    /// key keeps its first centroid.
    pub fn insert(&mut self, key: impl Into<String>, centroid: Centroid) {
        if !centroid.lat.is_finite() || !centroid.lon.is_finite() {
            return;
        }
        let key = key.into();
        match self.by_key.get(&key) {
            Some(existing) if *existing != centroid => {
                self.conflicting.insert(key);
            }
            Some(_) => {}
            None => {
                self.by_key.insert(key, centroid);
            }
        }
    }

    /// Looks up a centroid by key.
    ///
    /// A state-qualified county key (`"<County>, <State>"`) that is not in
    /// the table falls back to the bare county name, as found in county
    /// centroid tables without a state column. The fallback is refused when
    /// the bare name was listed with conflicting coordinates.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Centroid> {
        self.by_key.get(key).copied().or_else(|| {
            let (county, _) = key.rsplit_once(", ")?;
            if self.conflicting.contains(county) {
                return None;
            }
            self.by_key.get(county).copied()
        })
    }

    /// Number of centroids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Centroid)> for CentroidTable {
    fn from_iter<I: IntoIterator<Item = (K, Centroid)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (key, centroid) in iter {
            table.insert(key, centroid);
        }
        table
    }
}

/// Joins ranked units to their centroids and assigns final ranks.
///
/// `ranked` must already be in rank order. Ranks are assigned after misses
/// are handled, so they are always `1..=len` with no gaps.
#[must_use]
pub fn attach(
    ranked: Vec<ScoredUnit>,
    centroids: &CentroidTable,
    policy: MissingCentroid,
    explain: bool,
) -> Vec<RankedArea> {
    let total = ranked.len();
    let mut missed = 0_usize;

    let areas: Vec<RankedArea> = ranked
        .into_iter()
        .filter_map(|unit| {
            let centroid = centroids.get(&unit.key);
            if centroid.is_none() {
                missed += 1;
                if policy == MissingCentroid::Drop {
                    log::debug!("No centroid for '{}', dropping", unit.key);
                    return None;
                }
            }
            Some((unit, centroid))
        })
        .enumerate()
        .map(|(idx, (unit, centroid))| RankedArea {
            rank: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            explanation: explain.then(|| explanation::explain(&unit.indicators)),
            key: unit.key,
            name: unit.name,
            score: unit.score,
            centroid,
            indicators: unit.indicators,
        })
        .collect();

    if missed > 0 {
        log::info!("{missed} of {total} ranked unit(s) had no centroid ({policy:?})");
    }

    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use equity_map_indicator_models::{Indicator, IndicatorValues};

    fn unit(key: &str, score: f64) -> ScoredUnit {
        let indicators = Indicator::ALL
            .iter()
            .fold(IndicatorValues::default(), |acc, i| acc.with(*i, score / 8.0))
            .complete()
            .unwrap();
        ScoredUnit {
            key: key.to_string(),
            name: key.to_string(),
            indicators,
            score,
        }
    }

    fn table() -> CentroidTable {
        [
            ("a", Centroid { lat: 1.0, lon: 2.0 }),
            ("c", Centroid { lat: 3.0, lon: 4.0 }),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn drop_policy_renumbers_ranks() {
        let areas = attach(
            vec![unit("a", 5.0), unit("b", 4.0), unit("c", 3.0)],
            &table(),
            MissingCentroid::Drop,
            false,
        );
        let got: Vec<(&str, u32)> = areas.iter().map(|a| (a.key.as_str(), a.rank)).collect();
        assert_eq!(got, vec![("a", 1), ("c", 2)]);
        assert_eq!(areas[1].centroid, Some(Centroid { lat: 3.0, lon: 4.0 }));
    }

    #[test]
    fn retain_policy_keeps_misses() {
        let areas = attach(
            vec![unit("a", 5.0), unit("b", 4.0), unit("c", 3.0)],
            &table(),
            MissingCentroid::Retain,
            false,
        );
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[1].key, "b");
        assert_eq!(areas[1].rank, 2);
        assert!(areas[1].centroid.is_none());
    }

    #[test]
    fn explanation_only_when_requested() {
        let explained = attach(vec![unit("a", 4.0)], &table(), MissingCentroid::Drop, true);
        assert!(
            explained[0]
                .explanation
                .as_deref()
                .unwrap()
                .starts_with("Ranks highly in: ")
        );

        let plain = attach(vec![unit("a", 4.0)], &table(), MissingCentroid::Drop, false);
        assert!(plain[0].explanation.is_none());
    }

    #[test]
    fn ignores_non_finite_and_duplicate_centroids() {
        let table: CentroidTable = [
            ("a", Centroid { lat: f64::NAN, lon: 0.0 }),
            ("b", Centroid { lat: 1.0, lon: 1.0 }),
            ("b", Centroid { lat: 9.0, lon: 9.0 }),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 1);
        assert!(table.get("a").is_none());
        assert_eq!(table.get("b"), Some(Centroid { lat: 1.0, lon: 1.0 }));
    }

    #[test]
    fn county_keys_fall_back_to_bare_county_name() {
        let table: CentroidTable = [
            ("Autauga County", Centroid { lat: 32.5, lon: -86.6 }),
            ("Baldwin County", Centroid { lat: 30.7, lon: -87.7 }),
            ("Washington County", Centroid { lat: 45.5, lon: -123.1 }),
            ("Washington County", Centroid { lat: 37.3, lon: -113.5 }),
            ("Ohio", Centroid { lat: 40.4, lon: -82.9 }),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            table.get("Autauga County, Alabama"),
            Some(Centroid { lat: 32.5, lon: -86.6 })
        );
        assert!(table.get("Washington County, Utah").is_none());
        assert!(table.get("Clark County, Ohio").is_none());
        assert!(table.get("Ohio").is_some());

        let areas = attach(
            vec![unit("Baldwin County, Alabama", 5.0), unit("Autauga County, Alabama", 4.0)],
            &table,
            MissingCentroid::Drop,
            true,
        );
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].key, "Baldwin County, Alabama");
    }
}
