//! Analyzers that derive issues from a syntax tree.
//!
//! Each analyzer owns exactly one category and only ever writes to the
//! `CategoryResult` it is handed, so analyzers can run in any order or in
//! parallel. The [`Runner`] merges their output into an `AnalysisResult`.

mod complexity;
mod documentation;
mod duplicates;
mod exceptions;
mod naming;
mod runner;
mod size;
mod types;
mod unused;

pub use complexity::{cyclomatic_complexity, ComplexityAnalyzer, ComplexityLevel};
pub use documentation::DocumentationAnalyzer;
pub use duplicates::{block_hash, find_clusters, DuplicateCodeAnalyzer};
pub use exceptions::ExceptionAnalyzer;
pub use naming::{
    is_camel_case, is_pascal_case, scan_placeholders, split_words, to_camel_case,
    to_pascal_case, KeywordTable, NamingAnalyzer,
};
pub use runner::Runner;
pub use size::{method_lines, SizeAnalyzer};
pub use types::{AnalysisResult, CategoryResult, Issue, Rule, ERROR_CATEGORY};
pub use unused::{is_referenced, UnusedCodeAnalyzer};

use crate::analysis::{Span, SyntaxTree};
use crate::config::Config;

/// Analyzer names accepted by `disabled_analyzers`, in run order.
pub const ANALYZER_NAMES: &[&str] = &[
    "naming",
    "complexity",
    "documentation",
    "duplication",
    "unused",
    "size",
    "exceptions",
];

/// A rule set that inspects a syntax tree and reports into one category.
pub trait Analyzer: Send + Sync {
    /// Name used in configuration and error reports (e.g., "naming").
    fn name(&self) -> &'static str;

    /// Name of the category this analyzer owns.
    fn category(&self) -> &'static str;

    /// Inspect the tree and append issues to `category`.
    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()>;
}

/// The built-in analyzers configured from `config`, in run order.
pub fn default_analyzers(config: &Config) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(NamingAnalyzer::new(KeywordTable::with_extra(
            &config.naming.extra_keywords,
        ))),
        Box::new(ComplexityAnalyzer::new(config.complexity.clone())),
        Box::new(DocumentationAnalyzer::new()),
        Box::new(DuplicateCodeAnalyzer::new(config.duplication.clone())),
        Box::new(UnusedCodeAnalyzer::new()),
        Box::new(SizeAnalyzer::new(config.size.clone())),
        Box::new(ExceptionAnalyzer::new()),
    ]
}

/// Markdown summary attached to an issue as its `detailMessage`.
pub(crate) fn detail_message(rule: Rule, facts: &[(&str, String)], at: Option<Span>) -> String {
    let mut out = format!("**{}**", rule);
    for (label, value) in facts {
        out.push_str(&format!("\n- {}: {}", label, value));
    }
    if let Some(span) = at {
        out.push_str(&format!(
            "\n- Location: line {}, column {}",
            span.start_line, span.start_col
        ));
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analyzers_match_names() {
        let analyzers = default_analyzers(&Config::default());
        let names: Vec<_> = analyzers.iter().map(|a| a.name()).collect();
        assert_eq!(names, ANALYZER_NAMES);
    }

    #[test]
    fn test_categories_are_distinct() {
        let analyzers = default_analyzers(&Config::default());
        let mut categories: Vec<_> = analyzers.iter().map(|a| a.category()).collect();
        categories.sort();
        categories.dedup();
        assert_eq!(categories.len(), analyzers.len());
        assert!(!categories.contains(&ERROR_CATEGORY));
    }

    #[test]
    fn test_detail_message_format() {
        let span = Span {
            start_line: 4,
            start_col: 9,
            ..Span::default()
        };
        let detail = detail_message(
            Rule::UnusedLocal,
            &[("Symbol", "`temp`".to_string())],
            Some(span),
        );
        assert_eq!(
            detail,
            "**Unused local variable**\n- Symbol: `temp`\n- Location: line 4, column 9"
        );
    }
}
