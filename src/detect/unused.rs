//! Dead code detection.
//!
//! A declared symbol is used when an identifier reference with the same text
//! appears somewhere in its scope. Names introduced by other declarations
//! (overloads, shadowing locals, parameters) are not references.
//! Locals and parameters are scoped to the enclosing method body; private
//! fields and private methods to the whole compilation unit.

use crate::analysis::{NodeKind, SyntaxNode, SyntaxTree, Token};

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "UnusedCode";

/// Whether `name` is referenced inside `scope`.
pub fn is_referenced(scope: &SyntaxNode, name: &str) -> bool {
    scope
        .descendants()
        .any(|n| n.kind == NodeKind::IdentifierRef && n.text.as_deref() == Some(name))
}

/// Callee name without qualifier or type arguments: `a.b.Run<T>` -> `Run`.
fn callee_name(callee: &str) -> &str {
    let base = callee.split('<').next().unwrap_or(callee);
    base.rsplit('.').next().unwrap_or(base)
}

fn is_invoked(root: &SyntaxNode, name: &str) -> bool {
    root.descendants().any(|n| match &n.kind {
        NodeKind::InvocationExpr { callee, .. } => callee_name(callee) == name,
        _ => false,
    })
}

#[derive(Default)]
pub struct UnusedCodeAnalyzer;

impl UnusedCodeAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn report(
        &self,
        category: &mut CategoryResult,
        rule: Rule,
        token: &Token,
        description: String,
    ) {
        let suggestion = match rule {
            Rule::UnusedParameter => "Remove the parameter or use it",
            Rule::UnusedPrivateMethod => "Remove the method or call it",
            Rule::UnusedPrivateField => "Remove the field or use it",
            _ => "Remove the variable or use it",
        };
        let detail = detail_message(
            rule,
            &[("Symbol", format!("`{}`", token.text))],
            Some(token.span),
        );
        category.push(
            Issue::violation(rule, description, suggestion)
                .at(token.span)
                .snippet(token.text.clone())
                .detail(detail),
        );
    }

    fn check_locals(&self, root: &SyntaxNode, category: &mut CategoryResult) {
        // (node, scope) pairs; a method body becomes the scope for everything inside it.
        let mut stack: Vec<(&SyntaxNode, &SyntaxNode)> =
            root.children.iter().rev().map(|c| (c, root)).collect();

        while let Some((node, scope)) = stack.pop() {
            if node.kind == NodeKind::LocalDecl {
                for token in &node.declarators {
                    let used = is_referenced(scope, &token.text);
                    if token.text != "_" && !used {
                        self.report(
                            category,
                            Rule::UnusedLocal,
                            token,
                            format!("Local variable '{}' is never used", token.text),
                        );
                    }
                }
            }

            let inner = match (&node.kind, node.body()) {
                (NodeKind::MethodDecl, Some(body)) => body,
                _ => scope,
            };
            stack.extend(node.children.iter().rev().map(|c| (c, inner)));
        }
    }

    fn check_parameters(&self, method: &SyntaxNode, category: &mut CategoryResult) {
        // Declarations without a body have nothing to reference parameters.
        let Some(body) = method.body() else {
            return;
        };
        for param in &method.parameters {
            if param.text == "_" || is_referenced(body, &param.text) {
                continue;
            }
            self.report(
                category,
                Rule::UnusedParameter,
                param,
                format!(
                    "Parameter '{}' of method '{}' is never used",
                    param.text,
                    method.name()
                ),
            );
        }
    }

    fn check_private_field(
        &self,
        root: &SyntaxNode,
        field: &SyntaxNode,
        category: &mut CategoryResult,
    ) {
        for token in &field.declarators {
            if !is_referenced(root, &token.text) {
                self.report(
                    category,
                    Rule::UnusedPrivateField,
                    token,
                    format!("Private field '{}' is never used", token.text),
                );
            }
        }
    }

    fn check_private_method(
        &self,
        root: &SyntaxNode,
        method: &SyntaxNode,
        category: &mut CategoryResult,
    ) {
        let Some(token) = &method.identifier else {
            return;
        };
        // Method groups (`list.ForEach(Log)`) count as use.
        if is_invoked(root, &token.text) || is_referenced(root, &token.text) {
            return;
        }
        self.report(
            category,
            Rule::UnusedPrivateMethod,
            token,
            format!("Private method '{}' is never used", token.text),
        );
    }
}

impl Analyzer for UnusedCodeAnalyzer {
    fn name(&self) -> &'static str {
        "unused"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        let root = tree.root();

        self.check_locals(root, category);

        for method in tree.descendants().filter(|n| n.kind == NodeKind::MethodDecl) {
            self.check_parameters(method, category);
        }

        for field in tree
            .descendants()
            .filter(|n| n.kind == NodeKind::FieldDecl && n.is_private())
        {
            self.check_private_field(root, field, category);
        }

        for method in tree
            .descendants()
            .filter(|n| n.kind == NodeKind::MethodDecl && n.is_private())
        {
            self.check_private_method(root, method, category);
        }

        Ok(())
    }
}
