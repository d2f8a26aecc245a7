//! Writers for ranked output tables.
//!
//! The renderer consumes row-oriented records (column name -> value): a
//! JSON array for the table view, a CSV copy, and a `GeoJSON` point layer
//! for the map markers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use equity_map_indicator_models::{AggregationLevel, OutputRow, RankedArea};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use crate::TableError;

/// Tooltip text shown on a map marker: `"<name> (<score>)"`.
#[must_use]
pub fn tooltip(area: &RankedArea) -> String {
    format!("{} ({:.1})", area.name, area.score)
}

/// Flattens ranked areas into output rows.
#[must_use]
pub fn output_rows(areas: &[RankedArea]) -> Vec<OutputRow> {
    areas.iter().map(OutputRow::from).collect()
}

/// Writes ranked areas as a JSON array of row objects.
///
/// # Errors
///
/// Returns [`TableError::Json`] if serialization or the write fails.
pub fn write_json(areas: &[RankedArea], writer: impl Write) -> Result<(), TableError> {
    serde_json::to_writer_pretty(writer, &output_rows(areas))?;
    Ok(())
}

/// Writes ranked areas as CSV with a header row. Absent values are empty
/// cells.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if serialization or the write fails.
pub fn write_csv(areas: &[RankedArea], writer: impl Write) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in output_rows(areas) {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Builds a point feature per ranked area. Areas without a centroid get a
/// feature with no geometry.
///
/// # Errors
///
/// Returns [`TableError::Json`] if a row cannot be converted to properties.
pub fn feature_collection(areas: &[RankedArea]) -> Result<FeatureCollection, TableError> {
    let features = areas
        .iter()
        .map(|area| -> Result<Feature, TableError> {
            let mut properties = match serde_json::to_value(OutputRow::from(area))? {
                serde_json::Value::Object(map) => map,
                _ => JsonObject::new(),
            };
            properties.insert(
                "tooltip".to_string(),
                serde_json::Value::String(tooltip(area)),
            );

            Ok(Feature {
                bbox: None,
                geometry: area
                    .centroid
                    .map(|c| Geometry::new(Value::Point(vec![c.lon, c.lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Writes ranked areas as a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`TableError`] if conversion or the write fails.
pub fn write_geojson(areas: &[RankedArea], mut writer: impl Write) -> Result<(), TableError> {
    let geojson = GeoJson::from(feature_collection(areas)?);
    serde_json::to_writer(&mut writer, &geojson)?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, TableError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| TableError::io(path, e))
}

/// Writes the JSON, CSV and `GeoJSON` outputs for one level into `dir`,
/// returning the written paths.
///
/// # Errors
///
/// Returns [`TableError`] if the directory or any file cannot be written.
pub fn write_level(
    dir: &Path,
    level: AggregationLevel,
    areas: &[RankedArea],
) -> Result<Vec<PathBuf>, TableError> {
    crate::paths::ensure_dir(dir).map_err(|e| TableError::io(dir, e))?;

    let json_path = crate::paths::output_path(dir, level, "json");
    let mut json = create(&json_path)?;
    write_json(areas, &mut json)?;
    json.flush().map_err(|e| TableError::io(&json_path, e))?;

    let csv_path = crate::paths::output_path(dir, level, "csv");
    write_csv(areas, create(&csv_path)?)?;

    let geojson_path = crate::paths::output_path(dir, level, "geojson");
    let mut geojson = create(&geojson_path)?;
    write_geojson(areas, &mut geojson)?;
    geojson
        .flush()
        .map_err(|e| TableError::io(&geojson_path, e))?;

    log::info!(
        "Wrote {} {level} area(s) to {}",
        areas.len(),
        dir.display()
    );

    Ok(vec![json_path, csv_path, geojson_path])
}
