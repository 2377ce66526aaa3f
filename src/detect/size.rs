//! Method length and parameter count limits.

use crate::analysis::{NodeKind, SyntaxNode, SyntaxTree};
use crate::config::SizeConfig;

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Size";

/// Lines spanned from the method's first line to the end of its body.
pub fn method_lines(method: &SyntaxNode) -> usize {
    let end = method
        .body()
        .map(|b| b.span.end_line)
        .unwrap_or(method.span.start_line);
    end.saturating_sub(method.span.start_line) + 1
}

pub struct SizeAnalyzer {
    config: SizeConfig,
}

impl SizeAnalyzer {
    pub fn new(config: SizeConfig) -> Self {
        Self { config }
    }
}

impl Default for SizeAnalyzer {
    fn default() -> Self {
        Self::new(SizeConfig::default())
    }
}

impl Analyzer for SizeAnalyzer {
    fn name(&self) -> &'static str {
        "size"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        for method in tree.descendants().filter(|n| n.kind == NodeKind::MethodDecl) {
            let name = method.name();
            let lines = method_lines(method);
            let params = method.parameters.len();
            let counts = [
                ("Method", format!("`{}`", name)),
                ("Lines", format!("{} (max {})", lines, self.config.max_lines)),
                (
                    "Parameters",
                    format!("{} (max {})", params, self.config.max_parameters),
                ),
            ];

            if lines > self.config.max_lines {
                category.push(
                    Issue::violation(
                        Rule::MethodTooLong,
                        format!(
                            "Method '{}' has {} lines (> {})",
                            name, lines, self.config.max_lines
                        ),
                        "Split the method into smaller methods",
                    )
                    .at(method.anchor())
                    .snippet(name)
                    .detail(detail_message(Rule::MethodTooLong, &counts, Some(method.anchor()))),
                );
            }

            if params > self.config.max_parameters {
                category.push(
                    Issue::violation(
                        Rule::TooManyParameters,
                        format!(
                            "Method '{}' has {} parameters (> {})",
                            name, params, self.config.max_parameters
                        ),
                        "Group related parameters into a record or options type",
                    )
                    .at(method.anchor())
                    .snippet(name)
                    .detail(detail_message(
                        Rule::TooManyParameters,
                        &counts,
                        Some(method.anchor()),
                    )),
                );
            }
        }
        Ok(())
    }
}
