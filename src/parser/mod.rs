//! Loading configurations and datasets from YAML or JSON files
//!
//! The format is picked from the file extension: `.json` is read as JSON,
//! anything else as YAML.

use std::path::Path;

use serde_yaml::Value as YamlValue;

use crate::config::EngineConfig;
use crate::error::{FormulaError, FormulaResult};
use crate::types::{Column, Dataset, Value};

/// Document format of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

/// Read a document of either format into a YAML value tree
fn read_document(path: &Path) -> FormulaResult<YamlValue> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(YamlValue::Null);
    }
    match FileFormat::from_path(path) {
        FileFormat::Json => Ok(serde_json::from_str(&content)?),
        FileFormat::Yaml => Ok(serde_yaml::from_str(&content)?),
    }
}

/// Parse an engine configuration file.
///
/// # Example
/// ```no_run
/// use royalbit_colformula::parser::parse_config_file;
/// use royalbit_colformula::FormulaEngine;
/// use std::path::Path;
///
/// let config = parse_config_file(Path::new("formulas.yaml"))?;
/// let engine = FormulaEngine::from_config(&config);
/// println!("Formulas: {}", engine.formulas().len());
/// # Ok::<(), royalbit_colformula::FormulaError>(())
/// ```
pub fn parse_config_file(path: &Path) -> FormulaResult<EngineConfig> {
    EngineConfig::from_value(&read_document(path)?)
}

/// Parse a dataset file (see [`parse_dataset`] for the accepted layouts)
pub fn parse_dataset_file(path: &Path) -> FormulaResult<Dataset> {
    parse_dataset(&read_document(path)?)
}

/// Build a dataset from a parsed document.
///
/// Two layouts are accepted:
/// - column-oriented: a mapping of column name → list of scalars
/// - row-oriented: a list of mappings, one per row; a key missing from a row
///   is null in that row
pub fn parse_dataset(yaml: &YamlValue) -> FormulaResult<Dataset> {
    let dataset = match yaml {
        YamlValue::Null => Dataset::new(),
        YamlValue::Mapping(map) => parse_columns(map)?,
        YamlValue::Sequence(rows) => parse_rows(rows)?,
        _ => {
            return Err(FormulaError::Dataset(
                "Dataset must be a mapping of columns or a list of rows".to_string(),
            ))
        }
    };

    dataset.validate_lengths()?;
    Ok(dataset)
}

fn column_name(key: &YamlValue) -> FormulaResult<String> {
    key.as_str()
        .map(str::to_string)
        .ok_or_else(|| FormulaError::Dataset("Column names must be strings".to_string()))
}

fn cell(column: &str, row: usize, value: &YamlValue) -> FormulaResult<Value> {
    Value::from_yaml(value).ok_or_else(|| {
        FormulaError::Dataset(format!(
            "Column '{}' row {}: cells must be numbers, text, booleans or null",
            column, row
        ))
    })
}

fn parse_columns(map: &serde_yaml::Mapping) -> FormulaResult<Dataset> {
    let mut columns = Vec::with_capacity(map.len());

    for (key, value) in map {
        let name = column_name(key)?;
        let seq = value.as_sequence().ok_or_else(|| {
            FormulaError::Dataset(format!("Column '{}' must be a list of values", name))
        })?;

        let values = seq
            .iter()
            .enumerate()
            .map(|(row, v)| cell(&name, row, v))
            .collect::<FormulaResult<Vec<_>>>()?;
        columns.push(Column::new(name, values));
    }

    Ok(Dataset::from(columns))
}

fn parse_rows(rows: &[YamlValue]) -> FormulaResult<Dataset> {
    let mut columns: Vec<Column> = Vec::new();

    for (row, record) in rows.iter().enumerate() {
        let map = record.as_mapping().ok_or_else(|| {
            FormulaError::Dataset(format!("Row {} must be a mapping of column to value", row))
        })?;

        for (key, value) in map {
            let name = column_name(key)?;
            let value = cell(&name, row, value)?;
            let index = match columns.iter().position(|c| c.name == name) {
                Some(index) => index,
                None => {
                    columns.push(Column::new(name, Vec::with_capacity(rows.len())));
                    columns.len() - 1
                }
            };
            let column = &mut columns[index];
            column.values.resize(row, Value::Null);
            column.values.push(value);
        }
    }

    for column in &mut columns {
        column.values.resize(rows.len(), Value::Null);
    }

    Ok(Dataset::from(columns))
}
