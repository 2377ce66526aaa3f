//! Duplicate block detection.
//!
//! Every braces-delimited block is reduced to its canonical token form and
//! hashed with SHA-256. Blocks sharing a digest form a cluster; clusters
//! with more than one member are reported once per member.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::analysis::{NodeKind, SyntaxNode, SyntaxTree};
use crate::config::DuplicationConfig;

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Duplication";

/// Hex SHA-256 digest of a block's canonical form.
pub fn block_hash(block: &SyntaxNode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(block.canonical_form().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Group candidate blocks by digest, in first-occurrence order.
pub fn find_clusters<'a>(
    tree: &'a SyntaxTree,
    min_statements: usize,
) -> Vec<Vec<&'a SyntaxNode>> {
    let mut by_hash: IndexMap<String, Vec<&SyntaxNode>> = IndexMap::new();

    for block in tree.descendants() {
        if block.kind != NodeKind::Block || block.statement_count() < min_statements {
            continue;
        }
        by_hash.entry(block_hash(block)).or_default().push(block);
    }

    by_hash
        .into_values()
        .filter(|members| members.len() > 1)
        .collect()
}

pub struct DuplicateCodeAnalyzer {
    config: DuplicationConfig,
}

impl DuplicateCodeAnalyzer {
    pub fn new(config: DuplicationConfig) -> Self {
        Self { config }
    }
}

impl Default for DuplicateCodeAnalyzer {
    fn default() -> Self {
        Self::new(DuplicationConfig::default())
    }
}

impl Analyzer for DuplicateCodeAnalyzer {
    fn name(&self) -> &'static str {
        "duplication"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        for members in find_clusters(tree, self.config.min_statements) {
            let count = members.len();
            let snippet = preview(&members[0].canonical_form(), self.config.preview_chars);

            for block in members {
                let detail = detail_message(
                    Rule::DuplicateCode,
                    &[
                        ("Occurrences", count.to_string()),
                        ("Block", format!("`{}`", snippet)),
                    ],
                    Some(block.span),
                );
                category.push(
                    Issue::violation(
                        Rule::DuplicateCode,
                        format!("Duplicated block ({} occurrences)", count),
                        "Extract the shared code into a single method",
                    )
                    .at(block.span)
                    .snippet(snippet.clone())
                    .detail(detail),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::{parse, run};

    #[test]
    fn test_identical_bodies_cluster() {
        let category = run(
            &DuplicateCodeAnalyzer::default(),
            r#"
void First() { doWork(); doWork(); }
void Second()
{
    doWork();
    doWork();
}
"#,
        );
        assert_eq!(category.issues.len(), 2);
        assert!(category
            .issues
            .iter()
            .all(|i| i.description == "Duplicated block (2 occurrences)"));
        assert_eq!(category.issues[0].line, 2);
        assert_eq!(category.issues[1].line, 4);
        assert_eq!(category.issues[0].code_snippet, "{ doWork ( ) ; doWork ( ) ; }");
    }

    #[test]
    fn test_comments_and_layout_ignored() {
        let category = run(
            &DuplicateCodeAnalyzer::default(),
            r#"
void First() { /* note */ Save(1); }
void Second()
{
    // other note
    Save( 1 );
}
"#,
        );
        assert_eq!(category.issues.len(), 2);
    }

    #[test]
    fn test_unique_blocks_not_reported() {
        let category = run(
            &DuplicateCodeAnalyzer::default(),
            r#"
void First() { Save(1); }
void Second() { Save(2); }
void Third() { }
"#,
        );
        assert!(category.issues.is_empty());
    }

    #[test]
    fn test_empty_blocks_cluster() {
        let source = r#"
void First() { if (x) { } Save(1); }
void Second() { if (y) { } Save(2); }
"#;
        let category = run(&DuplicateCodeAnalyzer::default(), source);
        assert_eq!(category.issues.len(), 2);
        assert_eq!(category.issues[0].code_snippet, "{ }");
        assert_eq!(category.issues[0].line, 2);
        assert_eq!(category.issues[1].line, 3);

        let strict = DuplicateCodeAnalyzer::new(DuplicationConfig {
            min_statements: 1,
            ..DuplicationConfig::default()
        });
        assert!(run(&strict, source).issues.is_empty());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let tree = parse("void First() { Save(1); }");
        let block = tree
            .descendants()
            .find(|n| n.kind == NodeKind::Block)
            .unwrap();
        assert_eq!(block_hash(block), block_hash(block));
        assert_eq!(block_hash(block).len(), 64);
    }

    #[test]
    fn test_clusters_in_first_occurrence_order() {
        let tree = parse(
            r#"
void A() { Save(2); }
void B() { Save(1); }
void C() { Save(2); }
void D() { Save(1); }
"#,
        );
        let clusters = find_clusters(&tree, 1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0][0].span.start_line, 2);
        assert_eq!(clusters[1][0].span.start_line, 3);
    }

    #[test]
    fn test_preview_truncation() {
        let long = "x".repeat(250);
        let cut = preview(&long, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with("..."));
        assert_eq!(preview("short", 200), "short");
    }
}
