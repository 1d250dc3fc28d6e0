use crate::core::FormulaEngine;
use crate::error::{FormulaError, FormulaResult};
use crate::parser::{self, FileFormat};
use crate::writer;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Load an engine (builtins plus config constants and formulas)
fn load_engine(config: &Path) -> FormulaResult<FormulaEngine> {
    let config = parser::parse_config_file(config)?;
    Ok(FormulaEngine::from_config(&config))
}

/// Execute the apply command.
///
/// The resulting dataset goes to `output` when given, otherwise to stdout;
/// progress lines go to stderr so stdout stays machine readable.
pub fn apply(
    config: PathBuf,
    data: PathBuf,
    format: Option<FileFormat>,
    output: Option<PathBuf>,
    verbose: bool,
) -> FormulaResult<()> {
    eprintln!("{}", "🔥 colformula - Applying formulas".bold().green());
    eprintln!("   Config: {}", config.display());
    eprintln!("   Data:   {}", data.display());

    let engine = load_engine(&config)?;
    let dataset = parser::parse_dataset_file(&data)?;

    if verbose {
        eprintln!(
            "   Found {} formulas, {} columns, {} rows",
            engine.formulas().len(),
            dataset.column_count(),
            dataset.row_count()
        );
        for spec in engine.formulas() {
            eprintln!("      {} = {}", spec.column.cyan(), spec.formula);
        }
    }

    let result = match engine.apply(&dataset, None) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("\n{}", format!("❌ {}", e).bold().red());
            return Err(e);
        }
    };

    match output {
        Some(path) => {
            let format = format.unwrap_or_else(|| FileFormat::from_path(&path));
            std::fs::write(&path, writer::dataset_to_string(&result, format)?)?;
            eprintln!(
                "{}",
                format!("✅ Wrote {} columns to {}", result.column_count(), path.display())
                    .bold()
                    .green()
            );
        }
        None => {
            let format = format.unwrap_or(FileFormat::Yaml);
            print!("{}", writer::dataset_to_string(&result, format)?);
            eprintln!(
                "{}",
                format!("✅ Applied {} formulas", engine.formulas().len())
                    .bold()
                    .green()
            );
        }
    }

    Ok(())
}

/// Execute the validate command
pub fn validate(config: PathBuf, data: PathBuf) -> FormulaResult<()> {
    println!("{}", "✅ Validating formulas".bold().green());
    println!("   Config: {}", config.display());
    println!("   Data:   {}\n", data.display());

    let engine = load_engine(&config)?;
    let dataset = parser::parse_dataset_file(&data)?;

    if engine.formulas().is_empty() {
        println!("{}", "⚠️  No formulas found in config".yellow());
        return Ok(());
    }

    let errors = engine.validate(&dataset, None);
    if errors.is_empty() {
        println!(
            "{}",
            format!("✅ All {} formulas are valid!", engine.formulas().len())
                .bold()
                .green()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("❌ Found {} invalid formulas!", errors.len())
            .bold()
            .red()
    );
    for error in &errors {
        println!("   {}", error.red());
    }

    Err(FormulaError::Validation(format!(
        "{} of {} formulas failed",
        errors.len(),
        engine.formulas().len()
    )))
}

/// Execute the refs command: columns each formula reads
pub fn refs(config: Option<PathBuf>, formula: Option<String>) -> FormulaResult<()> {
    let engine = match &config {
        Some(path) => load_engine(path)?,
        None => FormulaEngine::new(),
    };

    if let Some(formula) = formula {
        for name in engine.extract_references(&formula) {
            println!("{}", name);
        }
        return Ok(());
    }

    if config.is_none() {
        return Err(FormulaError::Config(
            "refs needs a config file or --formula".to_string(),
        ));
    }

    println!("{}", "🔍 Column references".bold().green());
    for spec in engine.formulas() {
        let names: Vec<String> = engine.extract_references(&spec.formula).into_iter().collect();
        println!("   {} ← {}", spec.column.bright_blue().bold(), names.join(", "));
    }

    let all: Vec<String> = engine
        .extract_references_batch(engine.formulas())
        .into_iter()
        .collect();
    println!("\n   {} {}", "All:".bold(), all.join(", "));

    Ok(())
}

/// Execute the functions command
pub fn functions(docs: bool) -> FormulaResult<()> {
    let engine = FormulaEngine::new();
    for name in engine.list_functions() {
        if docs {
            println!("{} {}", format!("{:<14}", name).cyan(), engine.function_doc(&name));
        } else {
            println!("{}", name);
        }
    }
    Ok(())
}

/// Execute the export command: normalized configuration
pub fn export(config: PathBuf, format: Option<FileFormat>) -> FormulaResult<()> {
    let engine = load_engine(&config)?;
    let exported = engine.to_config();
    let content = match format.unwrap_or(FileFormat::Yaml) {
        FileFormat::Yaml => exported.to_yaml_string()?,
        FileFormat::Json => exported.to_json_string()?,
    };
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
