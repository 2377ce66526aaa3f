//! Naming convention checks.
//!
//! Types and methods use PascalCase, parameters use camelCase, and fields
//! follow the `_camelCase` convention for private state. Identifiers are
//! split into word segments by [`split_words`]; both classification and the
//! suggested rewrite work on those segments.

use std::collections::{BTreeSet, HashSet};

use phf::phf_set;

use crate::analysis::{Modifier, NodeKind, SyntaxNode, SyntaxTree, Token};

use super::{detail_message, Analyzer, CategoryResult, Issue, Rule};

pub const CATEGORY: &str = "Naming";

/// Built-in keywords and framework names, lowercased.
static BUILTIN_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "using", "class", "struct", "interface", "enum", "delegate", "event",
    "public", "private", "protected", "internal", "extern", "static",
    "virtual", "override", "abstract", "sealed", "async", "await",
    "void", "bool", "int", "string", "double", "float", "char", "long",
    "short", "byte", "decimal", "object", "var", "new", "this", "base",
    "if", "else", "for", "while", "do", "switch", "case", "default",
    "try", "catch", "finally", "throw", "return", "continue", "break",
    "lock", "fixed", "unsafe", "checked", "unchecked", "nameof", "typeof", "sizeof",
    "true", "false", "null",
    "console", "math", "file", "directory", "datetime", "list", "task",
};

/// Identifiers exempt from case-style checks. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    extra: HashSet<String>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in keywords plus project-specific names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra: extra
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        BUILTIN_KEYWORDS.contains(lower.as_str()) || self.extra.contains(&lower)
    }
}

/// Split an identifier into word segments.
///
/// An uppercase letter starts a new segment, lowercase letters and digits
/// extend the current one, and any other character ends it.
pub fn split_words(name: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in name.char_indices() {
        if !c.is_alphanumeric() {
            if let Some(s) = start.take() {
                words.push(&name[s..i]);
            }
            continue;
        }
        if c.is_uppercase() {
            if let Some(s) = start {
                words.push(&name[s..i]);
            }
            start = Some(i);
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&name[s..]);
    }
    words
}

pub fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
        && name.chars().all(char::is_alphanumeric)
        && split_words(name)
            .iter()
            .all(|w| w.starts_with(char::is_uppercase))
}

pub fn is_camel_case(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_lowercase)
        && name.chars().all(char::is_alphanumeric)
        && split_words(name)
            .iter()
            .skip(1)
            .all(|w| w.starts_with(char::is_uppercase))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn to_pascal_case(name: &str) -> String {
    let words = split_words(name);
    if words.is_empty() {
        return name.to_string();
    }
    words.iter().map(|w| capitalize(w)).collect()
}

pub fn to_camel_case(name: &str) -> String {
    let words = split_words(name);
    let Some((first, rest)) = words.split_first() else {
        return name.to_string();
    };
    let mut out = first.to_lowercase();
    for word in rest {
        out.push_str(&capitalize(word));
    }
    out
}

/// Scan text for `{identifier}` placeholders.
///
/// Accepts `{name}`, `{name:format}` and `{name,width}`; `{{` is an escaped
/// brace and never starts a placeholder.
pub fn scan_placeholders(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'{') {
            i += 2;
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }

        let is_identifier = end > start && !bytes[start].is_ascii_digit();
        if is_identifier && matches!(bytes.get(end), Some(b'}' | b':' | b',')) {
            found.push(&text[start..end]);
        }
        i = end.max(i + 1);
    }
    found
}

/// Verbatim identifiers (`@class`) are checked without the `@`.
fn bare(token: &Token) -> &str {
    token.text.trim_start_matches('@')
}

pub struct NamingAnalyzer {
    keywords: KeywordTable,
}

impl NamingAnalyzer {
    pub fn new(keywords: KeywordTable) -> Self {
        Self { keywords }
    }

    fn report(
        &self,
        category: &mut CategoryResult,
        rule: Rule,
        token: &Token,
        description: String,
        replacement: &str,
    ) {
        let suggestion = format!("Rename to '{}'", replacement);
        let detail = detail_message(
            rule,
            &[
                ("Identifier", format!("`{}`", token.text)),
                ("Suggested name", format!("`{}`", replacement)),
            ],
            Some(token.span),
        );
        category.push(
            Issue::violation(rule, description, suggestion)
                .at(token.span)
                .snippet(token.text.clone())
                .detail(detail),
        );
    }

    fn check_type(&self, node: &SyntaxNode, category: &mut CategoryResult) {
        let Some(token) = &node.identifier else {
            return;
        };
        let name = bare(token);
        if self.keywords.contains(name) || is_pascal_case(name) {
            return;
        }

        let (rule, what) = if node.kind == NodeKind::InterfaceDecl {
            (Rule::InterfacePascalCase, "Interface")
        } else {
            (Rule::ClassPascalCase, "Class")
        };
        self.report(
            category,
            rule,
            token,
            format!("{} '{}' must be PascalCase", what, name),
            &to_pascal_case(name),
        );
    }

    fn check_method(&self, node: &SyntaxNode, category: &mut CategoryResult) {
        if let Some(token) = &node.identifier {
            let name = bare(token);
            if !self.keywords.contains(name) && !is_pascal_case(name) {
                self.report(
                    category,
                    Rule::MethodPascalCase,
                    token,
                    format!("Method '{}' must be PascalCase", name),
                    &to_pascal_case(name),
                );
            }
            if node.has_modifier(Modifier::Async) && !name.ends_with("Async") {
                self.report(
                    category,
                    Rule::AsyncSuffix,
                    token,
                    format!("Async method '{}' must end with 'Async'", name),
                    &format!("{}Async", name),
                );
            }
        }

        for param in &node.parameters {
            self.check_parameter(param, category);
        }

        self.check_placeholders(node, category);
    }

    fn check_parameter(&self, param: &Token, category: &mut CategoryResult) {
        let name = bare(param);
        // Discards
        if name == "_" {
            return;
        }

        if name.starts_with('_') {
            let stripped = name.trim_start_matches('_');
            if stripped.is_empty() {
                return;
            }
            self.report(
                category,
                Rule::ParameterUnderscore,
                param,
                format!("Parameter '{}' must not start with '_'", name),
                &to_camel_case(stripped),
            );
            return;
        }

        if !self.keywords.contains(name) && !is_camel_case(name) {
            self.report(
                category,
                Rule::ParameterCamelCase,
                param,
                format!("Parameter '{}' must be camelCase", name),
                &to_camel_case(name),
            );
        }
    }

    /// Parameters surfaced through string placeholders in the method body.
    ///
    /// The issue points at the parameter declaration: the placeholder only
    /// exposes the parameter's name.
    fn check_placeholders(&self, node: &SyntaxNode, category: &mut CategoryResult) {
        let Some(body) = node.body() else {
            return;
        };

        let mut matched = BTreeSet::new();
        for literal in body.descendants() {
            if !matches!(literal.kind, NodeKind::StringLiteral | NodeKind::InterpolatedString) {
                continue;
            }
            let Some(text) = &literal.text else {
                continue;
            };
            for placeholder in scan_placeholders(text) {
                if let Some(index) = node
                    .parameters
                    .iter()
                    .position(|p| bare(p).eq_ignore_ascii_case(placeholder))
                {
                    matched.insert(index);
                }
            }
        }

        for index in matched {
            let param = &node.parameters[index];
            let name = bare(param);
            if name == "_" || self.keywords.contains(name) || is_camel_case(name) {
                continue;
            }
            self.report(
                category,
                Rule::PlaceholderParameter,
                param,
                format!(
                    "Parameter '{}' is used in a string placeholder but is not camelCase",
                    name
                ),
                &to_camel_case(name),
            );
        }
    }

    fn check_field(&self, node: &SyntaxNode, category: &mut CategoryResult) {
        let is_private = node.is_private();

        for token in &node.declarators {
            let name = bare(token);

            if name.starts_with(|c: char| c.eq_ignore_ascii_case(&'p')) {
                let rest = &name[1..];
                let replacement = if rest.is_empty() {
                    "_value".to_string()
                } else {
                    format!("_{}", to_camel_case(rest))
                };
                self.report(
                    category,
                    Rule::FieldPrefix,
                    token,
                    format!("Field '{}' uses the forbidden 'p' prefix", name),
                    &replacement,
                );
            }

            if is_private && !name.starts_with('_') {
                self.report(
                    category,
                    Rule::PrivateFieldUnderscore,
                    token,
                    format!("Private field '{}' must start with '_'", name),
                    &format!("_{}", to_camel_case(name)),
                );
            }

            if let Some(after) = name.strip_prefix('_') {
                if !after.is_empty() && !self.keywords.contains(after) && !is_camel_case(after) {
                    self.report(
                        category,
                        Rule::FieldCamelCase,
                        token,
                        format!("Field '{}' must be camelCase after the '_'", name),
                        &format!("_{}", to_camel_case(after)),
                    );
                }
            }
        }
    }
}

impl Default for NamingAnalyzer {
    fn default() -> Self {
        Self::new(KeywordTable::new())
    }
}

impl Analyzer for NamingAnalyzer {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn analyze(&self, tree: &SyntaxTree, category: &mut CategoryResult) -> anyhow::Result<()> {
        for node in tree.descendants() {
            match node.kind {
                NodeKind::ClassDecl | NodeKind::InterfaceDecl => self.check_type(node, category),
                NodeKind::MethodDecl => self.check_method(node, category),
                NodeKind::FieldDecl => self.check_field(node, category),
                _ => {}
            }
        }
        Ok(())
    }
}
