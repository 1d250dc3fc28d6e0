use serde::{Deserialize, Serialize};

use crate::error::{FormulaError, FormulaResult};

//==============================================================================
// Cell Values
//==============================================================================

/// A single cell value.
///
/// Numbers are always `f64`; a `NaN` number counts as null, the same as an
/// explicit [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Value {
    /// True for `Null` and for `NaN` numbers
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value. Booleans count as 1/0, text is never numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Render the value as text; integral numbers drop the fractional part
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
            Value::Null => String::new(),
        }
    }

    /// Truthiness used by logical functions; null is false
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(*n != 0.0),
            Value::Text(s) => Some(!s.is_empty()),
            Value::Null => None,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::Null => "Null",
        }
    }

    /// Convert a YAML scalar; sequences, mappings and tagged values give None
    pub fn from_yaml(value: &serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Null => Some(Value::Null),
            serde_yaml::Value::Bool(b) => Some(Value::Boolean(*b)),
            serde_yaml::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_yaml::Value::String(s) => Some(Value::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert to a YAML scalar; integral numbers are written without a fraction
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Boolean(b) => serde_yaml::Value::Bool(*b),
            Value::Text(s) => serde_yaml::Value::String(s.clone()),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_yaml::Value::Number((*n as i64).into())
            }
            Value::Number(n) => serde_yaml::Value::Number((*n).into()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

//==============================================================================
// Columns and Datasets
//==============================================================================

/// A named column of cell values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A table of named, positionally aligned columns.
///
/// Columns keep their insertion order. Formulas only ever add or replace
/// columns; the row count of a dataset never changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Dataset::set_column`]
    pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_column(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Add a column, checking that its length matches the existing rows
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> FormulaResult<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(FormulaError::Dataset(format!(
                "Column '{}' has {} rows, expected {} rows",
                name,
                values.len(),
                self.row_count()
            )));
        }
        self.set_column(name, values);
        Ok(())
    }

    /// Replace the column in place if it exists, append it otherwise
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Copy of the first `n` rows of every column
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.iter().take(n).cloned().collect()))
                .collect(),
        }
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> FormulaResult<()> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(FormulaError::Dataset(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<Column>> for Dataset {
    fn from(columns: Vec<Column>) -> Self {
        let mut dataset = Dataset::new();
        for column in columns {
            dataset.set_column(column.name, column.values);
        }
        dataset
    }
}
