//! Ordered target-column → formula storage

use serde::{Deserialize, Serialize};

/// One named formula: the column it writes and the text that computes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaSpec {
    pub column: String,
    pub formula: String,
}

impl FormulaSpec {
    pub fn new(column: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            formula: formula.into(),
        }
    }
}

/// Formulas in insertion order.
///
/// Adding a column that is already present replaces its formula text but keeps
/// its original position, so application order is the order columns were
/// first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaStore {
    specs: Vec<FormulaSpec>,
}

impl FormulaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the formula for `column`
    pub fn add(&mut self, column: impl Into<String>, formula: impl Into<String>) -> &mut Self {
        let column = column.into();
        let formula = formula.into();
        match self.specs.iter_mut().find(|s| s.column == column) {
            Some(existing) => existing.formula = formula,
            None => self.specs.push(FormulaSpec { column, formula }),
        }
        self
    }

    /// Formula text for `column`
    pub fn get(&self, column: &str) -> Option<&str> {
        self.specs
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.formula.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormulaSpec> {
        self.specs.iter()
    }

    /// Formula texts in application order
    pub fn formulas(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.formula.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormulaStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = FormulaStore::new();
        for (column, formula) in iter {
            store.add(column, formula);
        }
        store
    }
}

impl<'a> IntoIterator for &'a FormulaStore {
    type Item = &'a FormulaSpec;
    type IntoIter = std::slice::Iter<'a, FormulaSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
