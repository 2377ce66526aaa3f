//! Typed errors surfaced by the engine.
//!
//! Only two kinds of failure are modelled as Rust errors. Parse failures are
//! folded into the returned `AnalysisResult` by the runner; configuration
//! errors are rejected before any analyzer runs.

use thiserror::Error;

/// The source text could not be turned into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },

    #[error("parser did not produce a syntax tree")]
    NoTree,

    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl ParseError {
    /// Position of the error, when one is known (1-indexed).
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("complexity.low_threshold ({low}) must not exceed complexity.max_complexity ({max})")]
    ThresholdOrder { low: usize, max: usize },

    #[error("unknown analyzer {0:?} in disabled_analyzers")]
    UnknownAnalyzer(String),

    #[error("invalid excluded_paths pattern {pattern:?}: {message}")]
    InvalidGlob { pattern: String, message: String },
}
