//! Roll census tracts up to county, state and city records.
//!
//! Each descriptive indicator is summed over a group's tracts and the sums
//! are re-ranked across groups, so every rolled-up value is again a
//! percentile. Population and area are summed. Groups keep the order in
//! which their first tract appears.

use std::collections::BTreeMap;

use equity_map_indicator_models::{
    AggregationLevel, Centroid, CityRecord, Indicator, IndicatorRecord, IndicatorValues,
    TractRecord, level::county_key,
};

use crate::centroid::CentroidTable;
use crate::percentile::percentile_ranks;

const COUNTY_SUFFIX: &str = " County";

/// Primary (most populous) city of each county.
#[derive(Debug, Clone, Default)]
pub struct PrimaryCities {
    /// `"<County>, <State>"` -> city, for lookups that carry a state.
    by_county_state: BTreeMap<String, CityRecord>,
    /// Bare county name -> city, over every city.
    by_county: BTreeMap<String, CityRecord>,
    /// Bare county name -> city, over cities without a state.
    stateless: BTreeMap<String, CityRecord>,
}

impl PrimaryCities {
    /// Selects the most populous city of every county in the lookup.
    ///
    /// County names get a `" County"` suffix to match the tract table.
    /// Cities without an id or county are ignored. On equal population
    /// the first city in the lookup wins.
    #[must_use]
    pub fn select(cities: &[CityRecord]) -> Self {
        let mut selected = Self::default();

        for city in cities {
            if city.id.is_none() {
                continue;
            }
            let Some(county) = city.county.as_deref().map(with_county_suffix) else {
                continue;
            };

            match city.state.as_deref() {
                Some(state) => keep_most_populous(
                    &mut selected.by_county_state,
                    county_key(&county, state),
                    city,
                ),
                None => keep_most_populous(&mut selected.stateless, county.clone(), city),
            }
            keep_most_populous(&mut selected.by_county, county, city);
        }

        log::debug!(
            "Selected primary cities for {} county name(s)",
            selected.by_county.len()
        );

        selected
    }

    /// Primary city for a tract's county.
    ///
    /// A tract with a state only matches cities in that state, or cities
    /// listed without a state. A tract without a state matches on the bare
    /// county name.
    #[must_use]
    pub fn for_county(&self, county: &str, state: Option<&str>) -> Option<&CityRecord> {
        match state {
            Some(state) => self
                .by_county_state
                .get(&county_key(county, state))
                .or_else(|| self.stateless.get(county.trim())),
            None => self.by_county.get(county.trim()),
        }
    }

    /// Centroid table keyed by city id.
    #[must_use]
    pub fn centroids(&self) -> CentroidTable {
        self.by_county
            .values()
            .chain(self.by_county_state.values())
            .chain(self.stateless.values())
            .filter_map(|city| {
                Some((
                    city.id.clone()?,
                    Centroid {
                        lat: city.lat?,
                        lon: city.lon?,
                    },
                ))
            })
            .collect()
    }

    /// Number of counties with a primary city.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_county.len()
    }

    /// Whether no county has a primary city.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_county.is_empty()
    }
}

fn with_county_suffix(county: &str) -> String {
    let county = county.trim();
    if county.ends_with(COUNTY_SUFFIX) {
        county.to_string()
    } else {
        format!("{county}{COUNTY_SUFFIX}")
    }
}

fn keep_most_populous(map: &mut BTreeMap<String, CityRecord>, key: String, city: &CityRecord) {
    let population = city.population.unwrap_or(f64::NEG_INFINITY);
    match map.get(&key) {
        Some(current) if current.population.unwrap_or(f64::NEG_INFINITY) >= population => {}
        _ => {
            map.insert(key, city.clone());
        }
    }
}

/// Converts tracts to census-tract level records.
#[must_use]
pub fn tract_records(tracts: &[TractRecord]) -> Vec<IndicatorRecord> {
    tracts
        .iter()
        .map(|tract| IndicatorRecord {
            key: tract.tract_id.clone(),
            name: tract.tract_id.clone(),
            values: tract.values,
            population: tract.population,
            area: tract.area,
        })
        .collect()
}

/// Key and display name of a tract's group at `level`.
fn group_of(
    tract: &TractRecord,
    level: AggregationLevel,
    cities: &PrimaryCities,
) -> Option<(String, String)> {
    match level {
        AggregationLevel::CensusTract => {
            let id = tract.tract_id.clone()?;
            Some((id.clone(), id))
        }
        AggregationLevel::County => {
            let key = county_key(tract.county.as_deref()?, tract.state.as_deref()?);
            Some((key.clone(), key))
        }
        AggregationLevel::State => {
            let state = tract.state.as_deref()?.trim().to_string();
            Some((state.clone(), state))
        }
        AggregationLevel::City => {
            let city = cities.for_county(tract.county.as_deref()?, tract.state.as_deref())?;
            Some((city.id.clone()?, city.name.clone().or_else(|| city.id.clone())?))
        }
    }
}

struct Group {
    key: String,
    name: String,
    sums: [f64; 7],
    population: Option<f64>,
    area: Option<f64>,
}

fn add(total: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (total, value.filter(|v| v.is_finite())) {
        (Some(t), Some(v)) => Some(t + v),
        (None, v) => v,
        (t, None) => t,
    }
}

/// Rolls tracts up to `level`.
///
/// Tracts without a group key, or missing a descriptive indicator, are
/// skipped. For [`AggregationLevel::CensusTract`] this is
/// [`tract_records`].
#[must_use]
pub fn rollup(
    tracts: &[TractRecord],
    level: AggregationLevel,
    cities: &PrimaryCities,
) -> Vec<IndicatorRecord> {
    if level == AggregationLevel::CensusTract {
        return tract_records(tracts);
    }

    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut skipped = 0_usize;

    for tract in tracts {
        let Some((key, name)) = group_of(tract, level, cities) else {
            skipped += 1;
            continue;
        };
        if !tract.values.has_all_descriptive() {
            skipped += 1;
            continue;
        }

        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                name,
                sums: [0.0; 7],
                population: None,
                area: None,
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];

        for (sum, indicator) in group.sums.iter_mut().zip(Indicator::DESCRIPTIVE) {
            *sum += tract.values.get(indicator).unwrap_or_default();
        }
        group.population = add(group.population, tract.population);
        group.area = add(group.area, tract.area);
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} tract(s) without a {level} key or complete indicators");
    }

    let mut records: Vec<IndicatorRecord> = groups
        .iter()
        .map(|group| IndicatorRecord {
            key: Some(group.key.clone()),
            name: Some(group.name.clone()),
            values: IndicatorValues::default(),
            population: group.population,
            area: group.area,
        })
        .collect();

    for (slot, indicator) in Indicator::DESCRIPTIVE.into_iter().enumerate() {
        let sums: Vec<f64> = groups.iter().map(|group| group.sums[slot]).collect();
        for (record, pct) in records.iter_mut().zip(percentile_ranks(&sums)) {
            record.values.set(indicator, Some(pct));
        }
    }

    log::info!(
        "Rolled {} tract(s) up to {} {level} record(s)",
        tracts.len() - skipped,
        records.len()
    );

    records
}
