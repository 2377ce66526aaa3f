//! Cyclomatic complexity per method.
//!
//! Complexity is calculated as:
//! - Start at 1
//! - Add 1 for each: if, for, foreach, while, do, catch, ?:, &&, ||
//! - Add 1 for each switch section

use crate::analysis::{NodeKind, SyntaxNode, SyntaxTree};
use crate::config::ComplexityConfig;

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Complexity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn classify(complexity: usize, config: &ComplexityConfig) -> Self {
        if complexity <= config.low_threshold {
            ComplexityLevel::Low
        } else if complexity <= config.max_complexity {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision points contributed by a single node.
fn decision_points(node: &SyntaxNode) -> usize {
    match &node.kind {
        NodeKind::IfStmt
        | NodeKind::ForStmt
        | NodeKind::ForEachStmt
        | NodeKind::WhileStmt
        | NodeKind::DoStmt
        | NodeKind::CatchClause
        | NodeKind::ConditionalExpr => 1,
        NodeKind::SwitchStmt { sections } => *sections,
        NodeKind::BinaryExpr { op } if op == "&&" || op == "||" => 1,
        _ => 0,
    }
}

/// Cyclomatic complexity of a method body.
pub fn cyclomatic_complexity(body: &SyntaxNode) -> usize {
    1 + body.descendants().map(decision_points).sum::<usize>()
}

pub struct ComplexityAnalyzer {
    config: ComplexityConfig,
}

impl ComplexityAnalyzer {
    pub fn new(config: ComplexityConfig) -> Self {
        Self { config }
    }
}

impl Default for ComplexityAnalyzer {
    fn default() -> Self {
        Self::new(ComplexityConfig::default())
    }
}

impl Analyzer for ComplexityAnalyzer {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        for method in tree.descendants().filter(|n| n.kind == NodeKind::MethodDecl) {
            // Abstract and interface methods
            let Some(body) = method.body() else {
                continue;
            };

            let complexity = cyclomatic_complexity(body);
            let level = ComplexityLevel::classify(complexity, &self.config);
            let name = method.name();

            let verdict = if level == ComplexityLevel::High {
                format!("exceeds the threshold ({})", self.config.max_complexity)
            } else {
                "within the threshold".to_string()
            };
            let detail = detail_message(
                Rule::CyclomaticComplexity,
                &[
                    ("Method", format!("`{}`", name)),
                    ("Complexity", format!("{} ({})", complexity, level)),
                    ("Verdict", verdict),
                ],
                Some(method.anchor()),
            );

            let mut issue = Issue::new(
                Rule::CyclomaticComplexity,
                format!("Method '{}' has complexity {} ({})", name, complexity, level),
            )
            .at(method.anchor())
            .snippet(name)
            .detail(detail);

            if level == ComplexityLevel::High {
                issue = issue.failed(format!(
                    "Split '{}' into smaller methods to bring complexity to {} or below",
                    name, self.config.max_complexity
                ));
            }
            category.push(issue);
        }
        Ok(())
    }
}
