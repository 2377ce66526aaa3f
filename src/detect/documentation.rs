//! Documentation coverage of the public surface.
//!
//! Public classes, interfaces, public methods and public properties must
//! carry a `///` (or `/** */`) block directly above them. Methods must also
//! document every parameter with `<param name="...">`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{NodeKind, SyntaxNode, SyntaxTree};

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Documentation";

lazy_static! {
    /// Pattern to match TODO/FIXME markers inside doc comments
    static ref TODO_PATTERN: Regex = Regex::new(r"\b(TODO|FIXME)\b").unwrap();
}

/// Outcome of checking one declaration's doc comment.
#[derive(Debug, Default, PartialEq, Eq)]
struct DocCheck {
    missing: bool,
    undocumented_params: Vec<String>,
    has_todo: bool,
}

impl DocCheck {
    fn is_complete(&self) -> bool {
        !self.missing && self.undocumented_params.is_empty()
    }
}

fn check_doc(node: &SyntaxNode) -> DocCheck {
    let Some(doc) = &node.doc_comment else {
        return DocCheck {
            missing: true,
            ..DocCheck::default()
        };
    };

    let undocumented_params = if node.kind == NodeKind::MethodDecl {
        node.parameters
            .iter()
            .filter(|p| !doc.text.contains(&format!("<param name=\"{}\"", p.text)))
            .map(|p| p.text.clone())
            .collect()
    } else {
        Vec::new()
    };

    DocCheck {
        missing: false,
        undocumented_params,
        has_todo: TODO_PATTERN.is_match(&doc.text),
    }
}

/// Whether the declaration is part of the documented surface.
fn is_documented_surface(node: &SyntaxNode) -> bool {
    match node.kind {
        NodeKind::InterfaceDecl => true,
        NodeKind::ClassDecl | NodeKind::MethodDecl | NodeKind::PropertyDecl => node.is_public(),
        _ => false,
    }
}

fn describe(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::ClassDecl => "Class",
        NodeKind::InterfaceDecl => "Interface",
        NodeKind::MethodDecl => "Method",
        _ => "Property",
    }
}

#[derive(Default)]
pub struct DocumentationAnalyzer;

impl DocumentationAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for DocumentationAnalyzer {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        let mut total = 0usize;
        let mut documented = 0usize;

        for node in tree.descendants().filter(|n| is_documented_surface(n)) {
            total += 1;
            let check = check_doc(node);
            let what = describe(&node.kind);
            let name = node.name();

            if check.is_complete() {
                documented += 1;
                if check.has_todo {
                    category.push(
                        Issue::new(
                            Rule::DocumentationNote,
                            format!("{} '{}' documentation contains TODO/FIXME", what, name),
                        )
                        .at(node.anchor())
                        .snippet(name)
                        .detail(detail_message(
                            Rule::DocumentationNote,
                            &[("Declaration", format!("{} `{}`", what.to_lowercase(), name))],
                            Some(node.anchor()),
                        )),
                    );
                }
                continue;
            }

            let (rule, mut description) = if check.missing {
                (
                    Rule::MissingDocumentation,
                    format!("{} '{}' has no documentation comment.", what, name),
                )
            } else {
                (
                    Rule::IncompleteDocumentation,
                    format!("{} '{}' documentation is incomplete.", what, name),
                )
            };
            for param in &check.undocumented_params {
                description.push_str(&format!(" Parameter '{}' undocumented.", param));
            }
            if check.has_todo {
                description.push_str(" Contains TODO/FIXME.");
            }

            let suggestion = if check.missing {
                "Add a /// <summary> block above the declaration".to_string()
            } else {
                let tags: Vec<String> = check
                    .undocumented_params
                    .iter()
                    .map(|p| format!("<param name=\"{}\">", p))
                    .collect();
                format!("Add {}", tags.join(", "))
            };
            let detail = detail_message(
                rule,
                &[("Declaration", format!("{} `{}`", what.to_lowercase(), name))],
                Some(node.anchor()),
            );

            category.push(
                Issue::violation(rule, description, suggestion)
                    .at(node.anchor())
                    .snippet(name)
                    .detail(detail),
            );
        }

        let score = Issue::new(
            Rule::DocumentationScore,
            format!("Documented items: {}/{}", documented, total),
        )
        .detail(format!(
            "**{}**: {}/{} items documented",
            Rule::DocumentationScore,
            documented,
            total
        ));
        let score = if total == 0 || documented == total {
            score
        } else {
            score.failed("Document the remaining public declarations")
        };
        category.push(score);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::run;

    #[test]
    fn test_fully_documented() {
        let category = run(
            &DocumentationAnalyzer::new(),
            r#"
/// <summary>Adds numbers.</summary>
public class Calculator
{
    /// <summary>Sum.</summary>
    /// <param name="a">Left.</param>
    /// <param name="b">Right.</param>
    public int Add(int a, int b) => a + b;

    private int Hidden() => 0;
}
"#,
        );
        assert_eq!(category.issues.len(), 1);
        let score = &category.issues[0];
        assert_eq!(score.rule, Rule::DocumentationScore);
        assert!(score.passed);
        assert_eq!(score.description, "Documented items: 2/2");
        assert_eq!(score.line, 0);
    }

    #[test]
    fn test_missing_and_incomplete() {
        let category = run(
            &DocumentationAnalyzer::new(),
            r#"
public class Calculator
{
    /// <summary>Sum.</summary>
    /// <param name="a">Left.</param>
    public int Add(int a, int b) => a + b;

    public int Total { get; set; }
}
"#,
        );
        let rules: Vec<_> = category.issues.iter().map(|i| i.rule).collect();
        assert_eq!(
            rules,
            vec![
                Rule::MissingDocumentation,
                Rule::IncompleteDocumentation,
                Rule::MissingDocumentation,
                Rule::DocumentationScore,
            ]
        );
        assert!(category.issues[1]
            .description
            .contains("Parameter 'b' undocumented."));
        assert_eq!(category.issues[1].suggestion, "Add <param name=\"b\">");
        assert_eq!(category.issues[0].line, 2);

        let score = category.issues.last().unwrap();
        assert!(!score.passed);
        assert_eq!(score.description, "Documented items: 0/3");
    }

    #[test]
    fn test_todo_is_only_a_note() {
        let category = run(
            &DocumentationAnalyzer::new(),
            r#"
/// <summary>TODO: describe the service.</summary>
public interface IService { }
"#,
        );
        assert_eq!(category.issues.len(), 2);
        assert_eq!(category.issues[0].rule, Rule::DocumentationNote);
        assert!(category.issues[0].passed);
        assert!(category.issues[1].passed);
        assert_eq!(category.failed_count(), 0);
    }

    #[test]
    fn test_nothing_to_document() {
        let category = run(&DocumentationAnalyzer::new(), "void getData() { }");
        assert_eq!(category.issues.len(), 1);
        assert!(category.issues[0].passed);
        assert_eq!(category.issues[0].description, "Documented items: 0/0");
    }
}
