//! Engine configuration import and export
//!
//! A configuration document has an optional `version`, an optional
//! `constants` mapping (name → scalar) and a `columns` mapping. Each column
//! is either a bare formula string or a mapping with `formula` and an
//! optional `enabled` flag:
//!
//! ```yaml
//! version: "0.1.0"
//! constants:
//!   tax_rate: 0.08
//! columns:
//!   subtotal: "@mul(price, qty)"
//!   tax:
//!     formula: "@mul(subtotal, @tax_rate())"
//!   legacy:
//!     formula: "@neg(subtotal)"
//!     enabled: false
//! ```
//!
//! Entry order is preserved in both directions.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{FormulaError, FormulaResult};
use crate::types::Value;

/// One entry of the `columns` section
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnEntry {
    /// `name: "@formula(...)"`
    Formula(String),
    /// `name: { formula: "...", enabled: bool }`
    Spec { formula: String, enabled: bool },
}

impl ColumnEntry {
    pub fn formula(&self) -> &str {
        match self {
            ColumnEntry::Formula(f) => f,
            ColumnEntry::Spec { formula, .. } => formula,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            ColumnEntry::Formula(_) => true,
            ColumnEntry::Spec { enabled, .. } => *enabled,
        }
    }
}

/// Parsed engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub version: Option<String>,
    pub constants: Vec<(String, Value)>,
    pub columns: Vec<(String, ColumnEntry)>,
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> FormulaResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let yaml: YamlValue = serde_yaml::from_str(content)?;
        Self::from_value(&yaml)
    }

    pub fn from_json_str(content: &str) -> FormulaResult<Self> {
        let yaml: YamlValue = serde_json::from_str(content)?;
        Self::from_value(&yaml)
    }

    /// Build a configuration from an already parsed document
    pub fn from_value(yaml: &YamlValue) -> FormulaResult<Self> {
        let map = match yaml {
            YamlValue::Null => return Ok(Self::default()),
            YamlValue::Mapping(map) => map,
            _ => {
                return Err(FormulaError::Config(
                    "Configuration must be a mapping".to_string(),
                ))
            }
        };

        let version = match map.get("version") {
            None | Some(YamlValue::Null) => None,
            Some(YamlValue::String(s)) => Some(s.clone()),
            Some(YamlValue::Number(n)) => Some(n.to_string()),
            Some(_) => {
                return Err(FormulaError::Config(
                    "'version' must be a string".to_string(),
                ))
            }
        };

        Ok(Self {
            version,
            constants: parse_constants(map.get("constants"))?,
            columns: parse_columns(map.get("columns"))?,
        })
    }

    /// Enabled, non-empty formulas in document order
    pub fn enabled_formulas(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter(|(_, entry)| entry.is_enabled() && !entry.formula().is_empty())
            .map(|(name, entry)| (name.as_str(), entry.formula()))
    }

    /// Render as a YAML/JSON document
    pub fn to_value(&self) -> YamlValue {
        let mut root = Mapping::new();

        if let Some(version) = &self.version {
            root.insert("version".into(), YamlValue::String(version.clone()));
        }

        let mut constants = Mapping::new();
        for (name, value) in &self.constants {
            constants.insert(YamlValue::String(name.clone()), value.to_yaml());
        }
        root.insert("constants".into(), YamlValue::Mapping(constants));

        let mut columns = Mapping::new();
        for (name, entry) in &self.columns {
            let rendered = match entry {
                ColumnEntry::Formula(f) => YamlValue::String(f.clone()),
                ColumnEntry::Spec { formula, enabled } => {
                    let mut spec = Mapping::new();
                    spec.insert("formula".into(), YamlValue::String(formula.clone()));
                    spec.insert("enabled".into(), YamlValue::Bool(*enabled));
                    YamlValue::Mapping(spec)
                }
            };
            columns.insert(YamlValue::String(name.clone()), rendered);
        }
        root.insert("columns".into(), YamlValue::Mapping(columns));

        YamlValue::Mapping(root)
    }

    pub fn to_yaml_string(&self) -> FormulaResult<String> {
        Ok(serde_yaml::to_string(&self.to_value())?)
    }

    pub fn to_json_string(&self) -> FormulaResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

fn section<'a>(value: Option<&'a YamlValue>, name: &str) -> FormulaResult<Option<&'a Mapping>> {
    match value {
        None | Some(YamlValue::Null) => Ok(None),
        Some(YamlValue::Mapping(map)) => Ok(Some(map)),
        Some(_) => Err(FormulaError::Config(format!(
            "'{}' must be a mapping",
            name
        ))),
    }
}

fn key_name(key: &YamlValue, section: &str) -> FormulaResult<String> {
    key.as_str().map(str::to_string).ok_or_else(|| {
        FormulaError::Config(format!("Names in '{}' must be strings", section))
    })
}

fn parse_constants(value: Option<&YamlValue>) -> FormulaResult<Vec<(String, Value)>> {
    let Some(map) = section(value, "constants")? else {
        return Ok(Vec::new());
    };

    let mut constants = Vec::with_capacity(map.len());
    for (key, value) in map {
        let name = key_name(key, "constants")?;
        let value = Value::from_yaml(value).ok_or_else(|| {
            FormulaError::Config(format!("Constant '{}' must be a scalar value", name))
        })?;
        constants.push((name, value));
    }
    Ok(constants)
}

fn parse_columns(value: Option<&YamlValue>) -> FormulaResult<Vec<(String, ColumnEntry)>> {
    let Some(map) = section(value, "columns")? else {
        return Ok(Vec::new());
    };

    let mut columns = Vec::with_capacity(map.len());
    for (key, value) in map {
        let name = key_name(key, "columns")?;
        let entry = match value {
            YamlValue::String(formula) => ColumnEntry::Formula(formula.clone()),
            YamlValue::Mapping(spec) => parse_column_spec(&name, spec)?,
            _ => {
                return Err(FormulaError::Config(format!(
                    "Column '{}' must be a formula string or a mapping with 'formula'",
                    name
                )))
            }
        };
        columns.push((name, entry));
    }
    Ok(columns)
}

fn parse_column_spec(name: &str, spec: &Mapping) -> FormulaResult<ColumnEntry> {
    let formula = match spec.get("formula") {
        None | Some(YamlValue::Null) => String::new(),
        Some(YamlValue::String(s)) => s.clone(),
        Some(_) => {
            return Err(FormulaError::Config(format!(
                "Column '{}': 'formula' must be a string",
                name
            )))
        }
    };

    let enabled = match spec.get("enabled") {
        None => true,
        Some(YamlValue::Bool(b)) => *b,
        Some(_) => {
            return Err(FormulaError::Config(format!(
                "Column '{}': 'enabled' must be true or false",
                name
            )))
        }
    };

    Ok(ColumnEntry::Spec { formula, enabled })
}
