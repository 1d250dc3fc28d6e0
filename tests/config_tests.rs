//! Configuration import/export tests

use pretty_assertions::assert_eq;
use royalbit_colformula::{ColumnEntry, Dataset, EngineConfig, FormulaEngine, FormulaError, Value};

const PRICING: &str = r#"
version: "0.1.0"
constants:
  tax_rate: 0.25
  label: net
columns:
  subtotal: "@mul(price, qty)"
  tax:
    formula: "@mul(subtotal, @tax_rate())"
  legacy:
    formula: "@neg(subtotal)"
    enabled: false
  placeholder:
    enabled: true
  tag: "@concat(@label(), '!')"
"#;

fn orders() -> Dataset {
    Dataset::new()
        .with_column("price", [10.0, 20.0])
        .with_column("qty", [4.0, 1.0])
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_yaml_config_parses_all_sections() {
    let config = EngineConfig::from_yaml_str(PRICING).unwrap();

    assert_eq!(config.version.as_deref(), Some("0.1.0"));
    assert_eq!(
        config.constants,
        vec![
            ("tax_rate".to_string(), Value::from(0.25)),
            ("label".to_string(), Value::from("net")),
        ]
    );
    assert_eq!(config.columns.len(), 5);
    assert_eq!(
        config.columns[2].1,
        ColumnEntry::Spec {
            formula: "@neg(subtotal)".to_string(),
            enabled: false
        }
    );
}

#[test]
fn test_disabled_and_empty_columns_are_skipped() {
    let config = EngineConfig::from_yaml_str(PRICING).unwrap();

    let enabled: Vec<&str> = config.enabled_formulas().map(|(column, _)| column).collect();

    assert_eq!(enabled, vec!["subtotal", "tax", "tag"]);
}

#[test]
fn test_engine_from_yaml_applies_config() {
    let engine = FormulaEngine::from_yaml_str(PRICING).unwrap();

    let result = engine.apply(&orders(), None).unwrap();

    assert_eq!(result.column("subtotal").unwrap(), &[Value::from(40.0), Value::from(20.0)]);
    assert_eq!(result.column("tax").unwrap(), &[Value::from(10.0), Value::from(5.0)]);
    assert_eq!(result.column("tag").unwrap(), &[Value::from("net!"), Value::from("net!")]);
    assert!(!result.has_column("legacy"));
}

#[test]
fn test_json_config_matches_yaml() {
    let json = r#"{
        "constants": {"tax_rate": 0.25, "label": "net"},
        "columns": {
            "subtotal": "@mul(price, qty)",
            "tax": {"formula": "@mul(subtotal, @tax_rate())"},
            "legacy": {"formula": "@neg(subtotal)", "enabled": false},
            "tag": "@concat(@label(), '!')"
        }
    }"#;

    let from_json = FormulaEngine::from_json_str(json).unwrap();
    let from_yaml = FormulaEngine::from_yaml_str(PRICING).unwrap();

    assert_eq!(
        from_json.apply(&orders(), None).unwrap(),
        from_yaml.apply(&orders(), None).unwrap()
    );
}

#[test]
fn test_empty_config_is_default() {
    assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    assert_eq!(EngineConfig::from_yaml_str("   \n").unwrap(), EngineConfig::default());
}

#[test]
fn test_invalid_configs() {
    let err = EngineConfig::from_yaml_str("- a\n- b\n").unwrap_err();
    assert!(matches!(err, FormulaError::Config(_)));

    let err = EngineConfig::from_yaml_str("columns: [a, b]\n").unwrap_err();
    assert!(err.to_string().contains("'columns' must be a mapping"));

    let err = EngineConfig::from_yaml_str("columns:\n  x: 42\n").unwrap_err();
    assert!(matches!(err, FormulaError::Config(_)));

    let err = EngineConfig::from_yaml_str("columns: {x: [unclosed\n").unwrap_err();
    assert!(matches!(err, FormulaError::Yaml(_)));

    let err = EngineConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, FormulaError::Json(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_stamps_version_and_drops_disabled() {
    let engine = FormulaEngine::from_yaml_str(PRICING).unwrap();

    let exported = engine.to_config();

    assert_eq!(exported.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
    let columns: Vec<&str> = exported.columns.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(columns, vec!["subtotal", "tax", "tag"]);
    assert_eq!(exported.constants, engine.constants().to_vec());
}

#[test]
fn test_exported_yaml_reloads_to_same_engine() {
    let mut engine = FormulaEngine::new();
    engine
        .add_constant("rate", 1.5)
        .add_formula("b", "@mul(a, @rate())")
        .add_formula("c", "@add(b, 1)");

    let yaml = engine.to_yaml_string().unwrap();
    let reloaded = FormulaEngine::from_yaml_str(&yaml).unwrap();

    assert_eq!(reloaded.formulas(), engine.formulas());
    assert_eq!(reloaded.constants(), engine.constants());
    let data = Dataset::new().with_column("a", [2.0]);
    assert_eq!(
        reloaded.apply(&data, None).unwrap(),
        engine.apply(&data, None).unwrap()
    );
}

#[test]
fn test_export_json_keeps_column_order() {
    let mut engine = FormulaEngine::new();
    engine.add_formula("zeta", "1").add_formula("alpha", "2");

    let json = engine.to_config().to_json_string().unwrap();

    assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
}
