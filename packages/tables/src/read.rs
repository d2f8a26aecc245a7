//! CSV readers for the input tables.
//!
//! Every reader looks columns up by header name, accepting the short names
//! used throughout the equity map as well as the long column names of the
//! raw screening-tool export. Cells that are empty or not numeric where a
//! number is expected are read as absent.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use equity_map_indicator_models::{
    Centroid, CityRecord, Indicator, IndicatorRecord, IndicatorValues, TractRecord,
    level::county_key,
};

use crate::TableError;

/// Accepted header names for an indicator column, short name first.
#[must_use]
pub const fn indicator_columns(indicator: Indicator) -> &'static [&'static str] {
    match indicator {
        Indicator::Pm25 => &["PM25", "PM2.5_in_the_air__percentile_"],
        Indicator::DieselParticulate => &[
            "Diesel_Particulate",
            "Diesel_particulate_matter_exposure__percentile_",
        ],
        Indicator::Asthma => &[
            "Asthma",
            "Current_asthma_among_adults_aged_greater_than_or_equal_to_18_years__percentile_",
        ],
        Indicator::HouseholdIncome => &[
            "Household_Income",
            "Low_median_household_income_as_a_percent_of_area_median_income__percentile_",
        ],
        Indicator::PopulationDensity => &["Population_Density_Percentile"],
        Indicator::BuildingLossRate => &[
            "Building_Loss_Rate",
            "Expected_building_loss_rate__Natural_Hazards_Risk_Index___percentile_",
        ],
        Indicator::AgriculturalLossRate => &[
            "Agricultural_Loss_Rate",
            "Expected_agricultural_loss_rate__Natural_Hazards_Risk_Index___percentile_",
        ],
        Indicator::TrafficProximity => &[
            "Traffic_Proximity",
            "Traffic_proximity_and_volume__percentile_",
        ],
    }
}

/// Header name -> column index, case-insensitive.
struct Columns {
    table: &'static str,
    by_name: BTreeMap<String, usize>,
}

impl Columns {
    fn new(table: &'static str, headers: &csv::StringRecord) -> Self {
        let by_name = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect();
        Self { table, by_name }
    }

    fn find(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.by_name.get(&name.to_lowercase()).copied())
    }

    fn require(&self, names: &[&str]) -> Result<usize, TableError> {
        self.find(names).ok_or_else(|| TableError::MissingColumn {
            table: self.table,
            column: names.first().copied().unwrap_or_default().to_string(),
        })
    }

    /// Column index of every descriptive indicator.
    fn indicators(&self) -> Result<Vec<(Indicator, usize)>, TableError> {
        Indicator::DESCRIPTIVE
            .iter()
            .map(|indicator| Ok((*indicator, self.require(indicator_columns(*indicator))?)))
            .collect()
    }
}

fn text(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    let value = record.get(idx?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn number(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    let value = text(record, idx)?;
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            log::trace!("Ignoring non-numeric cell '{value}'");
            None
        }
    }
}

fn indicator_values(record: &csv::StringRecord, columns: &[(Indicator, usize)]) -> IndicatorValues {
    let mut values = IndicatorValues::default();
    for (indicator, idx) in columns {
        values.set(*indicator, number(record, Some(*idx)));
    }
    values
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().flexible(true).from_reader(reader)
}

fn open(path: &Path) -> Result<File, TableError> {
    File::open(path).map_err(|e| TableError::io(path, e))
}

/// Reads the census tract indicator table.
///
/// # Errors
///
/// Returns [`TableError`] if the CSV is malformed or a required column is
/// missing.
pub fn read_tracts(reader: impl Read) -> Result<Vec<TractRecord>, TableError> {
    let mut reader = csv_reader(reader);
    let columns = Columns::new("tract", reader.headers()?);

    let tract_id = columns.require(&["Census_tract_ID", "Census_tract_2010_ID", "GEOID10"])?;
    let state = columns.require(&["State", "State_Territory", "State_Name"])?;
    let county = columns.require(&["County_Name", "County"])?;
    let population = columns.require(&["Total_population"])?;
    let area = columns.require(&["geo_area", "area"])?;
    let indicators = columns.indicators()?;

    let mut tracts = Vec::new();
    for result in reader.records() {
        let record = result?;
        tracts.push(TractRecord {
            tract_id: text(&record, Some(tract_id)),
            state: text(&record, Some(state)),
            county: text(&record, Some(county)),
            values: indicator_values(&record, &indicators),
            population: number(&record, Some(population)),
            area: number(&record, Some(area)),
        });
    }

    log::info!("Read {} census tract row(s)", tracts.len());
    Ok(tracts)
}

/// Reads a pre-aggregated level table (`key`, optional `name`, the seven
/// descriptive indicators, `population`, `area`).
///
/// # Errors
///
/// Returns [`TableError`] if the CSV is malformed or a required column is
/// missing.
pub fn read_level_table(reader: impl Read) -> Result<Vec<IndicatorRecord>, TableError> {
    let mut reader = csv_reader(reader);
    let columns = Columns::new("level", reader.headers()?);

    let key = columns.require(&["key"])?;
    let name = columns.find(&["name"]);
    let population = columns.require(&["population", "Total_population"])?;
    let area = columns.require(&["area", "geo_area"])?;
    let indicators = columns.indicators()?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(IndicatorRecord {
            key: text(&record, Some(key)),
            name: text(&record, name),
            values: indicator_values(&record, &indicators),
            population: number(&record, Some(population)),
            area: number(&record, Some(area)),
        });
    }

    log::info!("Read {} level table row(s)", records.len());
    Ok(records)
}

/// Reads the cities lookup (`id`, `city`, `county_name`, optional
/// `state_name`, `population`, `lat`, `lng`).
///
/// # Errors
///
/// Returns [`TableError`] if the CSV is malformed or a required column is
/// missing.
pub fn read_cities(reader: impl Read) -> Result<Vec<CityRecord>, TableError> {
    let mut reader = csv_reader(reader);
    let columns = Columns::new("cities", reader.headers()?);

    let id = columns.require(&["id", "city_id"])?;
    let name = columns.require(&["city"])?;
    let county = columns.require(&["county_name"])?;
    let state = columns.find(&["state_name"]);
    let population = columns.require(&["population"])?;
    let lat = columns.require(&["lat", "city_lat"])?;
    let lon = columns.require(&["lng", "lon", "city_lon"])?;

    let mut cities = Vec::new();
    for result in reader.records() {
        let record = result?;
        cities.push(CityRecord {
            id: text(&record, Some(id)),
            name: text(&record, Some(name)),
            county: text(&record, Some(county)),
            state: text(&record, state),
            population: number(&record, Some(population)),
            lat: number(&record, Some(lat)),
            lon: number(&record, Some(lon)),
        });
    }

    log::info!("Read {} city row(s)", cities.len());
    Ok(cities)
}

/// Reads a centroid lookup (`key`, `lat`, `lon`). Rows with an empty key
/// or coordinate are skipped.
///
/// A county table keyed by `CF` that also carries a state column is keyed
/// by `"<County>, <State>"`, matching the county rollup. Without a state
/// column the bare county names are kept.
///
/// # Errors
///
/// Returns [`TableError`] if the CSV is malformed or a required column is
/// missing.
pub fn read_centroids(reader: impl Read) -> Result<Vec<(String, Centroid)>, TableError> {
    let mut reader = csv_reader(reader);
    let columns = Columns::new("centroid", reader.headers()?);

    let key = columns.require(&["key", "GEOID10", "CF", "SF"])?;
    let lat = columns.require(&["lat", "latitude"])?;
    let lon = columns.require(&["lon", "lng", "longitude"])?;

    // County names are only unique within a state.
    let county_state = if columns.find(&["CF"]) == Some(key) {
        columns.find(&["State", "state_name", "SF"])
    } else {
        None
    };

    let mut centroids = Vec::new();
    let mut skipped = 0_usize;
    for result in reader.records() {
        let record = result?;
        let key = match (text(&record, Some(key)), text(&record, county_state)) {
            (Some(county), Some(state)) => Some(county_key(&county, &state)),
            (key, _) => key,
        };
        match (
            key,
            number(&record, Some(lat)),
            number(&record, Some(lon)),
        ) {
            (Some(key), Some(lat), Some(lon)) => centroids.push((key, Centroid { lat, lon })),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} incomplete centroid row(s)");
    }
    Ok(centroids)
}

/// Reads the tract table from a file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or read.
pub fn read_tracts_file(path: &Path) -> Result<Vec<TractRecord>, TableError> {
    read_tracts(open(path)?)
}

/// Reads a level table from a file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or read.
pub fn read_level_table_file(path: &Path) -> Result<Vec<IndicatorRecord>, TableError> {
    read_level_table(open(path)?)
}

/// Reads the cities lookup from a file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or read.
pub fn read_cities_file(path: &Path) -> Result<Vec<CityRecord>, TableError> {
    read_cities(open(path)?)
}

/// Reads a centroid lookup from a file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or read.
pub fn read_centroids_file(path: &Path) -> Result<Vec<(String, Centroid)>, TableError> {
    read_centroids(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACTS: &str = "\
Census_tract_ID,State,County_Name,PM25,Diesel_Particulate,Asthma,Household_Income,Building_Loss_Rate,Agricultural_Loss_Rate,Traffic_Proximity,Total_population,geo_area
01001020100,Alabama,Autauga County,0.9,0.5,0.95,0.2,0.1,0.05,0.8,1993,9.8
01001020200,Alabama,Autauga County,0.4,,0.3,0.2,0.1,0.05,0.8,2000,
,Alabama,Autauga County,0.4,0.4,0.3,0.2,0.1,0.05,0.8,2000,3.1
";

    #[test]
    fn reads_tracts_with_absent_cells() {
        let tracts = read_tracts(TRACTS.as_bytes()).unwrap();
        assert_eq!(tracts.len(), 3);

        let first = &tracts[0];
        assert_eq!(first.tract_id.as_deref(), Some("01001020100"));
        assert_eq!(first.county.as_deref(), Some("Autauga County"));
        assert_eq!(first.values.get(Indicator::Asthma), Some(0.95));
        assert!(first.values.has_all_descriptive());
        assert_eq!(first.population, Some(1993.0));

        assert_eq!(tracts[1].values.get(Indicator::DieselParticulate), None);
        assert_eq!(tracts[1].area, None);
        assert_eq!(tracts[2].tract_id, None);
    }

    #[test]
    fn accepts_raw_screening_tool_headers() {
        let csv = "\
census_tract_id,state,county_name,PM2.5_in_the_air__percentile_,Diesel_particulate_matter_exposure__percentile_,Current_asthma_among_adults_aged_greater_than_or_equal_to_18_years__percentile_,Low_median_household_income_as_a_percent_of_area_median_income__percentile_,Expected_building_loss_rate__Natural_Hazards_Risk_Index___percentile_,Expected_agricultural_loss_rate__Natural_Hazards_Risk_Index___percentile_,Traffic_proximity_and_volume__percentile_,total_population,geo_area
t1,Ohio,Adams County,0.1,0.2,0.3,0.4,0.5,0.6,0.7,10,1
";
        let tracts = read_tracts(csv.as_bytes()).unwrap();
        assert_eq!(tracts[0].values.get(Indicator::TrafficProximity), Some(0.7));
        assert_eq!(tracts[0].values.get(Indicator::Pm25), Some(0.1));
    }

    #[test]
    fn missing_indicator_column_is_an_error() {
        let csv = "Census_tract_ID,State,County_Name,PM25,Total_population,geo_area\n\
                   t1,Ohio,Adams,0.1,1,1\n";
        match read_tracts(csv.as_bytes()).unwrap_err() {
            TableError::MissingColumn { table, column } => {
                assert_eq!(table, "tract");
                assert_eq!(column, "Diesel_Particulate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_and_garbage_cells_are_absent() {
        let csv = "\
key,PM25,Diesel_Particulate,Asthma,Household_Income,Building_Loss_Rate,Agricultural_Loss_Rate,Traffic_Proximity,population,area
a,1.5,n/a,0.3,0.4,0.5,0.6,0.7,10,2
";
        let records = read_level_table(csv.as_bytes()).unwrap();
        assert_eq!(records[0].key.as_deref(), Some("a"));
        assert_eq!(records[0].name, None);
        assert_eq!(records[0].values.get(Indicator::Pm25), None);
        assert_eq!(records[0].values.get(Indicator::DieselParticulate), None);
        assert_eq!(records[0].area, Some(2.0));
    }

    #[test]
    fn reads_cities() {
        let csv = "\
city,county_name,population,lat,lng,id
Prattville,Autauga,37000,32.46,-86.45,1840004086
Nowhere,,10,1,1,
";
        let cities = read_cities(csv.as_bytes()).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name.as_deref(), Some("Prattville"));
        assert_eq!(cities[0].state, None);
        assert_eq!(cities[0].lon, Some(-86.45));
        assert_eq!(cities[1].county, None);
        assert_eq!(cities[1].id, None);
    }

    #[test]
    fn reads_centroids_skipping_incomplete_rows() {
        let csv = "CF,lat,lon\nAutauga County,32.5,-86.6\nBaldwin County,,-87.7\n";
        let centroids = read_centroids(csv.as_bytes()).unwrap();
        assert_eq!(centroids.len(), 1);
        assert_eq!(centroids[0].0, "Autauga County");
        assert_eq!(centroids[0].1, Centroid { lat: 32.5, lon: -86.6 });
    }

    #[test]
    fn county_centroids_with_state_use_county_keys() {
        let csv = "CF,State,lat,lon\n\
                   Autauga County,Alabama,32.5,-86.6\n\
                   Washington County,Utah,37.3,-113.5\n\
                   Baldwin County,,30.7,-87.7\n";
        let keys: Vec<String> = read_centroids(csv.as_bytes())
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "Autauga County, Alabama",
                "Washington County, Utah",
                "Baldwin County"
            ]
        );
    }

    #[test]
    fn state_centroids_are_not_qualified() {
        let csv = "SF,lat,lon\nAlabama,32.8,-86.8\n";
        let centroids = read_centroids(csv.as_bytes()).unwrap();
        assert_eq!(centroids[0].0, "Alabama");
    }
}
