//! codelens - rule-based static analysis for C# sources.
//!
//! Given one source unit, codelens produces a structured report covering
//! naming conventions, cyclomatic complexity, documentation coverage,
//! duplicated blocks, unused declarations, oversized methods and
//! exception-handling anti-patterns.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter front-end producing the syntax model
//! - `detect`: the analyzers, the result model and the `Runner`
//! - `config`: YAML configuration schema
//! - `report`: Output formatting (pretty, JSON)
//! - `cli`: command-line entry points
//!
//! # Example
//!
//! ```
//! let result = codelens::analyze("void getData() { if (x) { } }", "Sample.cs");
//! assert!(result.category("Naming").is_some());
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod report;

pub use analysis::{CSharpParser, SourceParser, SyntaxNode, SyntaxTree};
pub use config::Config;
pub use detect::{AnalysisResult, Analyzer, CategoryResult, Issue, Rule, Runner};
pub use error::{ConfigError, ParseError};

/// File name used when the caller does not supply one.
pub const UNKNOWN_FILE: &str = "Unknown";

/// Analyze `source` with the default configuration.
///
/// Never fails: parse errors and analyzer faults are reported in the
/// result's `Error` category.
pub fn analyze(source: &str, file_name: &str) -> AnalysisResult {
    Runner::default().analyze(source, file_name)
}
