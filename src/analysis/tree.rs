//! Language-neutral syntax tree consumed by the analyzers.
//!
//! Front-ends convert their concrete parse trees into `SyntaxNode`s. The
//! tree is immutable once built; analyzers only ever borrow it.

use std::collections::BTreeSet;
use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        let (start, end) = if self.start_byte <= other.start_byte {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start_byte: start.start_byte,
            end_byte: end.end_byte.max(start.end_byte),
            start_line: start.start_line,
            start_col: start.start_col,
            end_line: end.end_line.max(start.end_line),
            end_col: end.end_col,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// A piece of source text with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Declaration modifiers the rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Async,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Readonly,
    Const,
    Partial,
}

impl Modifier {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Modifier::Public),
            "private" => Some(Modifier::Private),
            "protected" => Some(Modifier::Protected),
            "internal" => Some(Modifier::Internal),
            "static" => Some(Modifier::Static),
            "async" => Some(Modifier::Async),
            "abstract" => Some(Modifier::Abstract),
            "virtual" => Some(Modifier::Virtual),
            "override" => Some(Modifier::Override),
            "sealed" => Some(Modifier::Sealed),
            "readonly" => Some(Modifier::Readonly),
            "const" => Some(Modifier::Const),
            "partial" => Some(Modifier::Partial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Static => "static",
            Modifier::Async => "async",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Sealed => "sealed",
            Modifier::Readonly => "readonly",
            Modifier::Const => "const",
            Modifier::Partial => "partial",
        }
    }

    /// Whether this modifier declares accessibility.
    pub fn is_access(&self) -> bool {
        matches!(
            self,
            Modifier::Public | Modifier::Private | Modifier::Protected | Modifier::Internal
        )
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of node kinds. Grammar nodes no rule looks at are `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    ClassDecl,
    InterfaceDecl,
    MethodDecl,
    FieldDecl,
    PropertyDecl,
    Block,
    /// `=> expr` method body.
    ExpressionBody,
    IfStmt,
    ForStmt,
    ForEachStmt,
    WhileStmt,
    DoStmt,
    SwitchStmt {
        sections: usize,
    },
    LocalDecl,
    ThrowStmt,
    CatchClause,
    ConditionalExpr,
    BinaryExpr {
        op: String,
    },
    InvocationExpr {
        /// Dotted callee text with whitespace removed, e.g. `Thread.Sleep`.
        callee: String,
        arguments: usize,
    },
    MemberAccess {
        member: String,
    },
    IdentifierRef,
    /// Name token introduced by a declaration; never a reference.
    DeclarationName,
    StringLiteral,
    InterpolatedString,
    /// Anonymous leaf token (keyword, punctuation, operator).
    Token,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::ClassDecl => "class",
            NodeKind::InterfaceDecl => "interface",
            NodeKind::MethodDecl => "method",
            NodeKind::FieldDecl => "field",
            NodeKind::PropertyDecl => "property",
            NodeKind::Block => "block",
            NodeKind::ExpressionBody => "expression_body",
            NodeKind::IfStmt => "if",
            NodeKind::ForStmt => "for",
            NodeKind::ForEachStmt => "foreach",
            NodeKind::WhileStmt => "while",
            NodeKind::DoStmt => "do",
            NodeKind::SwitchStmt { .. } => "switch",
            NodeKind::LocalDecl => "local",
            NodeKind::ThrowStmt => "throw",
            NodeKind::CatchClause => "catch",
            NodeKind::ConditionalExpr => "conditional",
            NodeKind::BinaryExpr { .. } => "binary",
            NodeKind::InvocationExpr { .. } => "invocation",
            NodeKind::MemberAccess { .. } => "member_access",
            NodeKind::IdentifierRef => "identifier",
            NodeKind::DeclarationName => "declaration_name",
            NodeKind::StringLiteral => "string",
            NodeKind::InterpolatedString => "interpolated_string",
            NodeKind::Token => "token",
            NodeKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the syntax tree.
///
/// Only the fields meaningful for a kind are populated: declarations carry
/// `identifier`, `modifiers` and `doc_comment`; methods add `parameters`;
/// field and local declarations list every declared name in `declarators`;
/// catch clauses put the declared exception type in `declared_type` and the
/// variable in `identifier`. Leaves carry their source `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub modifiers: BTreeSet<Modifier>,
    pub identifier: Option<Token>,
    pub parameters: Vec<Token>,
    pub declarators: Vec<Token>,
    pub declared_type: Option<Token>,
    pub doc_comment: Option<Token>,
    pub text: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            modifiers: BTreeSet::new(),
            identifier: None,
            parameters: Vec::new(),
            declarators: Vec::new(),
            declared_type: None,
            doc_comment: None,
            text: None,
            children: Vec::new(),
        }
    }

    /// A node whose canonical text is `text`.
    pub fn leaf(kind: NodeKind, span: Span, text: impl Into<String>) -> Self {
        let mut node = Self::new(kind, span);
        node.text = Some(text.into());
        node
    }

    pub fn with_identifier(mut self, token: Token) -> Self {
        self.identifier = Some(token);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_parameter(mut self, token: Token) -> Self {
        self.parameters.push(token);
        self
    }

    pub fn with_declarator(mut self, token: Token) -> Self {
        self.declarators.push(token);
        self
    }

    pub fn with_doc_comment(mut self, token: Token) -> Self {
        self.doc_comment = Some(token);
        self
    }

    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    /// Pre-order iterator over all descendants, excluding `self`.
    ///
    /// Calling it again restarts the walk from the beginning.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Identifier text, or the empty string for anonymous nodes.
    pub fn name(&self) -> &str {
        self.identifier.as_ref().map(|t| t.text.as_str()).unwrap_or("")
    }

    /// Location to report for this node: its identifier if any, else the node.
    pub fn anchor(&self) -> Span {
        self.identifier.as_ref().map(|t| t.span).unwrap_or(self.span)
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier(Modifier::Public)
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier(Modifier::Private)
    }

    /// Method body: a block or an expression body.
    pub fn body(&self) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|c| matches!(c.kind, NodeKind::Block | NodeKind::ExpressionBody))
    }

    /// First direct child block (catch bodies, method bodies).
    pub fn block(&self) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == NodeKind::Block)
    }

    /// Number of statements directly inside a block.
    pub fn statement_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.kind != NodeKind::Token)
            .count()
    }

    /// First non-token child, e.g. the operand of a `throw`.
    pub fn operand(&self) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind != NodeKind::Token)
    }

    /// Re-serialize the subtree from its leaf tokens, one space apart.
    ///
    /// Comments are never part of the tree and original whitespace is not
    /// kept, so two subtrees that differ only in layout or comments produce
    /// the same string.
    pub fn canonical_form(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(text) = &node.text {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
                continue;
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Pre-order descendant iterator returned by [`SyntaxNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed compilation unit.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// All nodes below the root, in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, line: usize) -> Span {
        Span {
            start_byte: start,
            end_byte: start + 1,
            start_line: line,
            start_col: 1,
            end_line: line,
            end_col: 2,
        }
    }

    fn tok(text: &str, start: usize) -> SyntaxNode {
        SyntaxNode::leaf(NodeKind::Token, span(start, 1), text)
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = SyntaxNode::new(NodeKind::Block, span(0, 1))
            .with_child(
                SyntaxNode::new(NodeKind::IfStmt, span(1, 1))
                    .with_child(SyntaxNode::leaf(NodeKind::IdentifierRef, span(2, 1), "x")),
            )
            .with_child(tok(";", 3));

        let kinds: Vec<_> = tree.descendants().map(|n| n.kind.as_str().to_string()).collect();
        assert_eq!(kinds, vec!["if", "identifier", "token"]);

        // Restartable
        assert_eq!(tree.descendants().count(), 3);
        assert_eq!(tree.descendants().count(), 3);
    }

    #[test]
    fn test_canonical_form_ignores_layout() {
        let a = SyntaxNode::new(NodeKind::Block, span(0, 1))
            .with_child(tok("{", 0))
            .with_child(tok("x", 10))
            .with_child(tok("}", 40));
        let b = SyntaxNode::new(NodeKind::Block, span(100, 7))
            .with_child(tok("{", 100))
            .with_child(tok("x", 101))
            .with_child(tok("}", 102));

        assert_eq!(a.canonical_form(), "{ x }");
        assert_eq!(a.canonical_form(), b.canonical_form());
    }

    #[test]
    fn test_canonical_form_uses_leaf_text_over_children() {
        let interpolated = SyntaxNode::leaf(NodeKind::InterpolatedString, span(0, 1), "$\"{a}\"")
            .with_child(SyntaxNode::leaf(NodeKind::IdentifierRef, span(3, 1), "a"));
        assert_eq!(interpolated.canonical_form(), "$\"{a}\"");
        // The identifier is still visible to tree walks.
        assert_eq!(interpolated.descendants().count(), 1);
    }

    #[test]
    fn test_statement_count_skips_braces() {
        let block = SyntaxNode::new(NodeKind::Block, span(0, 1))
            .with_child(tok("{", 0))
            .with_child(SyntaxNode::new(NodeKind::Other("expression_statement".into()), span(1, 1)))
            .with_child(tok("}", 5));
        assert_eq!(block.statement_count(), 1);
    }

    #[test]
    fn test_span_cover() {
        let a = span(10, 2);
        let b = Span {
            start_byte: 30,
            end_byte: 50,
            start_line: 3,
            start_col: 1,
            end_line: 4,
            end_col: 9,
        };
        let c = a.cover(&b);
        assert_eq!(c.start_byte, 10);
        assert_eq!(c.end_byte, 50);
        assert_eq!(c.start_line, 2);
        assert_eq!(c.end_line, 4);
    }
}
