//! Rendering datasets back to YAML or JSON
//!
//! Output is column-oriented (column name → list of values) in column order.
//! Integral numbers are written without a fraction; NaN is written as `.nan`
//! in YAML and `null` in JSON.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::FormulaResult;
use crate::parser::FileFormat;
use crate::types::Dataset;

pub fn dataset_to_value(dataset: &Dataset) -> YamlValue {
    let mut root = Mapping::new();
    for column in dataset.columns() {
        root.insert(
            YamlValue::String(column.name.clone()),
            YamlValue::Sequence(column.values.iter().map(|v| v.to_yaml()).collect()),
        );
    }
    YamlValue::Mapping(root)
}

pub fn dataset_to_yaml(dataset: &Dataset) -> FormulaResult<String> {
    Ok(serde_yaml::to_string(&dataset_to_value(dataset))?)
}

pub fn dataset_to_json(dataset: &Dataset) -> FormulaResult<String> {
    Ok(serde_json::to_string_pretty(&dataset_to_value(dataset))?)
}

/// Render in the given format
pub fn dataset_to_string(dataset: &Dataset, format: FileFormat) -> FormulaResult<String> {
    match format {
        FileFormat::Yaml => dataset_to_yaml(dataset),
        FileFormat::Json => dataset_to_json(dataset),
    }
}

/// Write a dataset to `path`, picking the format from its extension
pub fn write_dataset_file(path: &Path, dataset: &Dataset) -> FormulaResult<()> {
    let content = dataset_to_string(dataset, FileFormat::from_path(path))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_dataset, parse_dataset_file};
    use crate::types::Value;
    use tempfile::TempDir;

    fn sample() -> Dataset {
        Dataset::new()
            .with_column("id", [1.0, 2.0])
            .with_column("ratio", [0.5, f64::NAN])
            .with_column("label", [Value::from("a"), Value::Null])
    }

    #[test]
    fn test_yaml_output_keeps_column_order() {
        let yaml = dataset_to_yaml(&sample()).unwrap();
        let id = yaml.find("id:").unwrap();
        let ratio = yaml.find("ratio:").unwrap();
        let label = yaml.find("label:").unwrap();
        assert!(id < ratio && ratio < label);
        assert!(yaml.contains("- 1\n"));
        assert!(yaml.contains(".nan"));
    }

    #[test]
    fn test_json_output_writes_nan_as_null() {
        let json: serde_json::Value = serde_json::from_str(&dataset_to_json(&sample()).unwrap()).unwrap();
        assert_eq!(json["id"], serde_json::json!([1, 2]));
        assert_eq!(json["ratio"], serde_json::json!([0.5, null]));
        assert_eq!(json["label"], serde_json::json!(["a", null]));
    }

    #[test]
    fn test_yaml_reparses_to_same_values() {
        let data = Dataset::new()
            .with_column("x", [1.5, 2.0])
            .with_column("flag", [true, false]);
        let yaml: YamlValue = serde_yaml::from_str(&dataset_to_yaml(&data).unwrap()).unwrap();
        assert_eq!(parse_dataset(&yaml).unwrap(), data);
    }

    #[test]
    fn test_write_dataset_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_dataset_file(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.trim_start().starts_with('{'));
        assert_eq!(parse_dataset_file(&path).unwrap().row_count(), 2);
    }
}
