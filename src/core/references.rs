//! Static column-reference extraction
//!
//! Determines which columns a formula reads without parsing or evaluating it.
//! The analysis is purely lexical, so it also works for formulas that would
//! fail to evaluate, and it never consults the function registry.
//!
//! Identifiers follow the tokenizer: a Unicode letter or `_`, then letters,
//! digits, `_`, `.`, `[` or `]`.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn function_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([\p{Alphabetic}\p{N}_]+)").expect("valid regex"))
}

fn keyword_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([\p{Alphabetic}_][\p{Alphabetic}\p{N}_]*)\s*=").expect("valid regex")
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"'[^']*'|"[^"]*""#).expect("valid regex"))
}

fn scientific_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9]+\.?[0-9]*[eE][+-]?[0-9]+").expect("valid regex"))
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[\p{Alphabetic}_][\p{Alphabetic}\p{N}_.\[\]]*").expect("valid regex")
    })
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid regex"))
}

/// Column names referenced by a formula.
///
/// Function names (`@name`), keyword labels (`lower=`), quoted literals and
/// numeric literals are excluded. The result is deduplicated and sorted.
///
/// ```
/// use royalbit_colformula::core::extract_references;
///
/// let refs = extract_references("@div(@clip(score, lower=0), 1e6)");
/// assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["score"]);
/// ```
pub fn extract_references(formula: &str) -> BTreeSet<String> {
    let function_names: BTreeSet<&str> = function_name_re()
        .captures_iter(formula)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    let keyword_labels: BTreeSet<&str> = keyword_label_re()
        .captures_iter(formula)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    // Removed spans become a blank so neighbouring tokens never fuse
    let cleaned = quoted_re().replace_all(formula, " ");
    let cleaned = scientific_re().replace_all(&cleaned, " ");

    identifier_re()
        .find_iter(&cleaned)
        .map(|m| m.as_str())
        .filter(|ident| !function_names.contains(ident))
        .filter(|ident| !keyword_labels.contains(ident))
        .filter(|ident| !numeric_re().is_match(ident))
        .map(str::to_string)
        .collect()
}

/// Union of the references of many formulas
pub fn extract_references_batch<I, S>(formulas: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    formulas
        .into_iter()
        .flat_map(|formula| extract_references(formula.as_ref()))
        .collect()
}
