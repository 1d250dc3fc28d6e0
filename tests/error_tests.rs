//! Error handling tests

use royalbit_colformula::{Dataset, EvalError, FormulaEngine, FormulaError, FormulaStore, FunctionRegistry};
use std::error::Error;

#[test]
fn test_not_found_message() {
    let registry = FunctionRegistry::new();
    let err = registry.get("missing").err().unwrap();
    assert_eq!(err.to_string(), "Function 'missing' not registered");
    assert!(err.column().is_none());
}

#[test]
fn test_evaluation_error_exposes_source() {
    let engine = FormulaEngine::new();
    let data = Dataset::new().with_column("a", [1.0]);
    let formulas: FormulaStore = [("out", "@add(a, 'x')")].into_iter().collect();

    let err = engine.apply(&data, Some(&formulas)).unwrap_err();

    let source = err.source().expect("evaluation errors carry a source");
    assert!(source.to_string().contains("add() requires a number"));
    match err {
        FormulaError::Evaluation { column, formula, .. } => {
            assert_eq!(column, "out");
            assert_eq!(formula, "@add(a, 'x')");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_parse_errors_surface_as_evaluation() {
    let engine = FormulaEngine::new();
    let data = Dataset::new().with_column("a", [1.0]);

    for formula in ["@add(a, 1", "a + 1", "@add(a,, 1)", ""] {
        let formulas: FormulaStore = [("out", formula)].into_iter().collect();
        let err = engine.apply(&data, Some(&formulas)).unwrap_err();
        assert_eq!(err.column(), Some("out"), "formula {:?}", formula);
    }
}

#[test]
fn test_unsupported_operator_hint() {
    let engine = FormulaEngine::new();
    let data = Dataset::new().with_column("a", [1.0]);
    let formulas: FormulaStore = [("out", "@sub(a, 1) - 1")].into_iter().collect();

    let err = engine.apply(&data, Some(&formulas)).unwrap_err();

    assert!(err.to_string().contains("use @sub or @neg"));
}

#[test]
fn test_dataset_and_config_messages() {
    let err = FormulaError::Dataset("Column 'b' has 1 rows, expected 2".to_string());
    assert_eq!(err.to_string(), "Dataset error: Column 'b' has 1 rows, expected 2");

    let err = FormulaError::Config("bad".to_string());
    assert_eq!(err.to_string(), "Configuration error: bad");

    let err = FormulaError::Validation("1 of 2 formulas failed".to_string());
    assert_eq!(err.to_string(), "Validation failed: 1 of 2 formulas failed");
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: FormulaError = io.into();
    assert!(matches!(err, FormulaError::Io(_)));
    assert!(err.to_string().starts_with("IO error: "));
}

#[test]
fn test_eval_error_display() {
    assert_eq!(EvalError::new("boom").to_string(), "boom");
}
