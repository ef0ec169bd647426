//! Dataset loading for the command-line front end.
//!
//! Reads the entity catalog from CSV and the precomputed feature matrix from
//! JSON. Row `i` of the CSV must describe the same entity as row `i` of the
//! feature file.

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};
use simrec_core::{EntityCatalog, EntityRecord, FeatureMatrix};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_NAME_COLUMN: &str = "Restaurant Name";

/// How to read a catalog CSV
#[derive(Debug, Clone)]
pub struct CsvCatalogOptions {
    /// Column holding the entity name; every other column becomes an attribute
    pub name_column: String,
    /// Stop after this many data rows
    pub limit: Option<usize>,
}

impl Default for CsvCatalogOptions {
    fn default() -> Self {
        Self {
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            limit: None,
        }
    }
}

/// Load an entity catalog from a CSV file with a header row
pub fn load_catalog_csv(path: &Path, options: &CsvCatalogOptions) -> Result<EntityCatalog> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h.trim() == options.name_column)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing name column '{}' in {}",
                options.name_column,
                path.display()
            )
        })?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        if options.limit.is_some_and(|lim| idx >= lim) {
            break;
        }

        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        records.push(parse_row(&row, &headers, name_idx, idx));
    }

    info!(entities = records.len(), path = %path.display(), "loaded catalog");
    Ok(EntityCatalog::from_records(records))
}

fn parse_row(
    row: &csv::StringRecord,
    headers: &csv::StringRecord,
    name_idx: usize,
    idx: usize,
) -> EntityRecord {
    let name = row.get(name_idx).unwrap_or_default();
    if name.trim().is_empty() {
        // Kept so that catalog ids stay aligned with feature rows
        warn!(row = idx + 1, "entity has an empty name");
    }

    let mut attributes = Map::new();
    for (col, (header, raw)) in headers.iter().zip(row.iter()).enumerate() {
        if col == name_idx {
            continue;
        }
        if let Some(value) = parse_attribute(raw) {
            attributes.insert(header.trim().to_string(), value);
        }
    }

    EntityRecord {
        name: name.to_string(),
        attributes,
    }
}

/// Numbers become JSON numbers, other non-empty text stays a string
pub fn parse_attribute(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::from(int));
    }
    if let Some(num) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Some(Value::Number(num));
    }
    Some(Value::String(trimmed.to_string()))
}

/// Load a feature matrix stored as a JSON array of numeric arrays
pub fn load_features_json(path: &Path) -> Result<FeatureMatrix> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature file: {}", path.display()))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse feature file: {}", path.display()))?;

    let matrix = FeatureMatrix::from_rows(rows)
        .with_context(|| format!("Invalid feature matrix in {}", path.display()))?;
    info!(rows = matrix.len(), dim = matrix.dim(), "loaded features");
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute(" 4.5 "), Some(json!(4.5)));
        assert_eq!(parse_attribute("12"), Some(json!(12)));
        assert_eq!(parse_attribute("Cafe, Italian"), Some(json!("Cafe, Italian")));
        assert_eq!(parse_attribute("   "), None);
        assert_eq!(parse_attribute("NaN"), Some(json!("NaN")));
    }

    #[test]
    fn test_load_catalog_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "catalog.csv",
            "Restaurant ID,Restaurant Name,Aggregate rating,Cuisines\n\
             1,  The Coffee House ,4.2,\"Cafe, Desserts\"\n\
             2,Pizza Place,3.9,Pizza\n",
        );

        let catalog = load_catalog_csv(&path, &CsvCatalogOptions::default()).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.normalized_name, "the coffee house");
        assert_eq!(first.display_name, "The Coffee House");
        assert_eq!(first.attribute("Aggregate rating"), Some(&json!(4.2)));
        assert_eq!(first.attribute("Cuisines"), Some(&json!("Cafe, Desserts")));
        assert_eq!(first.attribute("Restaurant ID"), Some(&json!(1)));
        assert!(first.attribute("Restaurant Name").is_none());
    }

    #[test]
    fn test_empty_names_keep_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "catalog.csv", "name,rating\nA,1\n,2\nC,3\n");
        let options = CsvCatalogOptions {
            name_column: "name".to_string(),
            limit: None,
        };

        let catalog = load_catalog_csv(&path, &options).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(2).unwrap().display_name, "C");
    }

    #[test]
    fn test_row_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "catalog.csv", "name\nA\nB\nC\n");
        let options = CsvCatalogOptions {
            name_column: "name".to_string(),
            limit: Some(2),
        };
        assert_eq!(load_catalog_csv(&path, &options).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_name_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "catalog.csv", "title\nA\n");
        let err = load_catalog_csv(&path, &CsvCatalogOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Restaurant Name"));
    }

    #[test]
    fn test_load_features_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "features.json", "[[0.1, 0.2], [0.3, 0.4]]");
        let matrix = load_features_json(&path).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.dim(), 2);

        let ragged = write_file(&dir, "ragged.json", "[[0.1, 0.2], [0.3]]");
        assert!(load_features_json(&ragged).is_err());

        let huge = write_file(&dir, "huge.json", "[[0.0], [2e200], [1e200]]");
        let err = load_features_json(&huge).unwrap_err();
        assert!(format!("{:#}", err).contains("magnitude"));
    }
}
