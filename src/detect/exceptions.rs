//! Exception-handling anti-patterns.
//!
//! Flags catch clauses that are too generic or silently swallow exceptions,
//! `throw ex;` re-throws that lose the original stack trace, and blocking
//! waits inside async methods.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{Modifier, NodeKind, SyntaxNode, SyntaxTree};

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Exceptions";

lazy_static! {
    /// `Thread.Sleep(...)`, optionally namespace-qualified
    static ref THREAD_SLEEP: Regex = Regex::new(r"^(?:.+\.)?Thread\.Sleep$").unwrap();

    /// `task.Wait()`
    static ref TASK_WAIT: Regex = Regex::new(r"^.+\.Wait$").unwrap();
}

fn is_generic_catch(catch: &SyntaxNode) -> bool {
    match &catch.declared_type {
        None => true,
        Some(t) => matches!(t.text.as_str(), "Exception" | "System.Exception"),
    }
}

fn is_empty_catch(catch: &SyntaxNode) -> bool {
    catch.block().map_or(true, |b| b.statement_count() == 0)
}

/// Description of a blocking construct, if `node` is one.
fn blocking_call(node: &SyntaxNode) -> Option<String> {
    match &node.kind {
        NodeKind::InvocationExpr { callee, arguments } => {
            let sleeps = THREAD_SLEEP.is_match(callee);
            let waits = TASK_WAIT.is_match(callee) && *arguments == 0;
            (sleeps || waits).then(|| format!("{}()", callee))
        }
        NodeKind::MemberAccess { member } if member == "Result" => {
            Some(node.canonical_form().replace(' ', ""))
        }
        _ => None,
    }
}

#[derive(Default)]
pub struct ExceptionAnalyzer;

impl ExceptionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_catch(&self, catch: &SyntaxNode, category: &mut CategoryResult) {
        let caught = catch
            .declared_type
            .as_ref()
            .map(|t| t.text.as_str())
            .unwrap_or("unspecified");

        if is_generic_catch(catch) {
            category.push(
                Issue::violation(
                    Rule::GenericCatch,
                    format!("Catch clause is too generic (type: {})", caught),
                    "Catch a specific exception type such as IOException or InvalidOperationException",
                )
                .at(catch.span)
                .snippet("catch")
                .detail(detail_message(
                    Rule::GenericCatch,
                    &[("Caught type", caught.to_string())],
                    Some(catch.span),
                )),
            );
        }

        if is_empty_catch(catch) {
            category.push(
                Issue::violation(
                    Rule::EmptyCatch,
                    "Empty catch block swallows the exception",
                    "Log, handle or rethrow the exception",
                )
                .at(catch.span)
                .snippet("catch")
                .detail(detail_message(
                    Rule::EmptyCatch,
                    &[("Caught type", caught.to_string())],
                    Some(catch.span),
                )),
            );
        }
    }

    /// `throw ex;` where `ex` is the variable bound by the enclosing catch.
    fn check_rethrows(
        &self,
        catch: &SyntaxNode,
        seen: &mut HashSet<usize>,
        category: &mut CategoryResult,
    ) {
        let (Some(variable), Some(block)) = (&catch.identifier, catch.block()) else {
            return;
        };

        for throw in block.descendants().filter(|n| n.kind == NodeKind::ThrowStmt) {
            let rethrows_variable = throw.operand().is_some_and(|op| {
                op.kind == NodeKind::IdentifierRef && op.text.as_deref() == Some(&variable.text)
            });
            if !rethrows_variable || !seen.insert(throw.span.start_byte) {
                continue;
            }
            category.push(
                Issue::violation(
                    Rule::RethrowByName,
                    format!(
                        "'throw {};' resets the stack trace of the caught exception",
                        variable.text
                    ),
                    "Replace with 'throw;'",
                )
                .at(throw.span)
                .snippet(throw.canonical_form())
                .detail(detail_message(
                    Rule::RethrowByName,
                    &[("Variable", format!("`{}`", variable.text))],
                    Some(throw.span),
                )),
            );
        }
    }

    fn check_async_method(&self, method: &SyntaxNode, category: &mut CategoryResult) {
        let Some(body) = method.body() else {
            return;
        };

        // Nested local functions are visited as methods of their own.
        let mut stack: Vec<&SyntaxNode> = body.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.kind == NodeKind::MethodDecl {
                continue;
            }
            stack.extend(node.children.iter().rev());
            let Some(call) = blocking_call(node) else {
                continue;
            };
            category.push(
                Issue::violation(
                    Rule::BlockingAsyncCall,
                    format!(
                        "'{}' blocks the thread inside async method '{}'",
                        call,
                        method.name()
                    ),
                    "Use await with the asynchronous API (e.g. await Task.Delay)",
                )
                .at(node.span)
                .snippet(call.clone())
                .detail(detail_message(
                    Rule::BlockingAsyncCall,
                    &[
                        ("Method", format!("`{}`", method.name())),
                        ("Call", format!("`{}`", call)),
                    ],
                    Some(node.span),
                )),
            );
        }
    }
}

impl Analyzer for ExceptionAnalyzer {
    fn name(&self) -> &'static str {
        "exceptions"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        let catches: Vec<&SyntaxNode> = tree
            .descendants()
            .filter(|n| n.kind == NodeKind::CatchClause)
            .collect();

        for catch in &catches {
            self.check_catch(catch, category);
        }

        let mut seen = HashSet::new();
        for catch in &catches {
            self.check_rethrows(catch, &mut seen, category);
        }

        for method in tree
            .descendants()
            .filter(|n| n.kind == NodeKind::MethodDecl && n.has_modifier(Modifier::Async))
        {
            self.check_async_method(method, category);
        }

        Ok(())
    }
}
