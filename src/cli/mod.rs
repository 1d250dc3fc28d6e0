//! CLI command handlers

pub mod commands;

pub use commands::{apply, export, functions, refs, validate};
