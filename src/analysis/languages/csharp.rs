//! C# front-end using tree-sitter.

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{Modifier, NodeKind, SourceParser, Span, SyntaxNode, SyntaxTree, Token};
use crate::error::ParseError;

/// Enclosing declaration context, used for C#'s implicit accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    /// Compilation unit or namespace: types default to `internal`.
    TopLevel,
    /// Class, struct or record body: members default to `private`.
    Type,
    /// Interface body: members default to `public`.
    Interface,
    /// Inside a member body.
    Member,
}

pub struct CSharpParser {
    language: Language,
    allow_partial: bool,
}

impl CSharpParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
            allow_partial: false,
        }
    }

    /// Accept trees containing syntax errors instead of failing the parse.
    pub fn allow_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Grammar {
                language: "csharp",
                message: e.to_string(),
            })?;
        Ok(parser)
    }
}

impl Default for CSharpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for CSharpParser {
    fn language_id(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() && !self.allow_partial {
            return Err(first_error(root, source.as_bytes()));
        }

        let converter = Converter {
            source: source.as_bytes(),
        };
        Ok(SyntaxTree::new(converter.convert(root, Container::TopLevel)))
    }
}

/// Locate the first ERROR or MISSING node in document order.
fn first_error(root: Node, source: &[u8]) -> ParseError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return syntax_error(node, format!("missing `{}`", node.kind()));
        }
        if node.is_error() {
            let text = node.utf8_text(source).unwrap_or("");
            let snippet: String = text.trim().chars().take(40).collect();
            return syntax_error(node, format!("unexpected `{}`", snippet));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    ParseError::Syntax {
        line: 1,
        column: 1,
        message: "syntax error".to_string(),
    }
}

fn syntax_error(node: Node, message: String) -> ParseError {
    let pos = node.start_position();
    ParseError::Syntax {
        line: pos.row + 1,
        column: pos.column + 1,
        message,
    }
}

/// Converts a tree-sitter tree into `SyntaxNode`s.
struct Converter<'a> {
    source: &'a [u8],
}

impl<'a> Converter<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn token(&self, node: Node) -> Token {
        Token::new(self.text(node), Span::from_node(node))
    }

    fn convert(&self, node: Node, container: Container) -> SyntaxNode {
        let span = Span::from_node(node);

        if !node.is_named() {
            return SyntaxNode::leaf(NodeKind::Token, span, self.text(node));
        }

        match node.kind() {
            "identifier" => {
                return SyntaxNode::leaf(NodeKind::IdentifierRef, span, self.text(node));
            }
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
                return SyntaxNode::leaf(NodeKind::StringLiteral, span, self.text(node));
            }
            "character_literal" | "integer_literal" | "real_literal" | "boolean_literal"
            | "null_literal" => {
                return SyntaxNode::leaf(
                    NodeKind::Other(node.kind().to_string()),
                    span,
                    self.text(node),
                );
            }
            _ => {}
        }

        let mut out = SyntaxNode::new(self.node_kind(node), span);

        if node.child_count() == 0 {
            out.text = Some(self.text(node).to_string());
            return out;
        }

        let child_container = match out.kind {
            NodeKind::ClassDecl => Container::Type,
            NodeKind::InterfaceDecl => Container::Interface,
            NodeKind::MethodDecl | NodeKind::PropertyDecl | NodeKind::FieldDecl => {
                Container::Member
            }
            _ if node.kind() == "constructor_declaration" => Container::Member,
            _ => container,
        };

        match out.kind {
            NodeKind::ClassDecl
            | NodeKind::InterfaceDecl
            | NodeKind::MethodDecl
            | NodeKind::FieldDecl
            | NodeKind::PropertyDecl => {
                self.decorate_declaration(node, container, &mut out);
            }
            NodeKind::LocalDecl => {
                out.declarators = self.declarators(node);
            }
            NodeKind::CatchClause => {
                if let Some(decl) = find_child(node, "catch_declaration") {
                    out.declared_type = decl.child_by_field_name("type").map(|t| self.token(t));
                    out.identifier = decl.child_by_field_name("name").map(|n| self.token(n));
                }
            }
            NodeKind::InterpolatedString => {
                out.text = Some(self.text(node).to_string());
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "comment" {
                continue;
            }
            if is_declaration_name(node, child) {
                out.children.push(SyntaxNode::leaf(
                    NodeKind::DeclarationName,
                    Span::from_node(child),
                    self.text(child),
                ));
                continue;
            }
            out.children.push(self.convert(child, child_container));
        }

        out
    }

    fn node_kind(&self, node: Node) -> NodeKind {
        match node.kind() {
            "compilation_unit" => NodeKind::CompilationUnit,
            "class_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "record_struct_declaration" => NodeKind::ClassDecl,
            "interface_declaration" => NodeKind::InterfaceDecl,
            "method_declaration" | "local_function_statement" => NodeKind::MethodDecl,
            "field_declaration" => NodeKind::FieldDecl,
            "property_declaration" => NodeKind::PropertyDecl,
            "block" => NodeKind::Block,
            "arrow_expression_clause" => NodeKind::ExpressionBody,
            "if_statement" => NodeKind::IfStmt,
            "for_statement" => NodeKind::ForStmt,
            "foreach_statement" | "for_each_statement" => NodeKind::ForEachStmt,
            "while_statement" => NodeKind::WhileStmt,
            "do_statement" => NodeKind::DoStmt,
            "switch_statement" => NodeKind::SwitchStmt {
                sections: self.switch_sections(node),
            },
            "local_declaration_statement" => NodeKind::LocalDecl,
            "throw_statement" => NodeKind::ThrowStmt,
            "catch_clause" => NodeKind::CatchClause,
            "conditional_expression" => NodeKind::ConditionalExpr,
            "binary_expression" => NodeKind::BinaryExpr {
                op: self.binary_operator(node),
            },
            "invocation_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|f| self.text(f).split_whitespace().collect::<String>())
                    .unwrap_or_default();
                NodeKind::InvocationExpr {
                    callee,
                    arguments: self.argument_count(node),
                }
            }
            "member_access_expression" => NodeKind::MemberAccess {
                member: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
            },
            "interpolated_string_expression" => NodeKind::InterpolatedString,
            other => NodeKind::Other(other.to_string()),
        }
    }

    fn decorate_declaration(&self, node: Node, container: Container, out: &mut SyntaxNode) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let candidate = if child.kind() == "modifier" || !child.is_named() {
                Modifier::parse(self.text(child).trim())
            } else {
                None
            };
            if let Some(modifier) = candidate {
                out.modifiers.insert(modifier);
            }
        }

        let is_local_function = node.kind() == "local_function_statement";
        if !is_local_function && !out.modifiers.iter().any(Modifier::is_access) {
            let implicit = match container {
                Container::TopLevel => Some(Modifier::Internal),
                Container::Type => Some(Modifier::Private),
                Container::Interface => Some(Modifier::Public),
                Container::Member => None,
            };
            if let Some(modifier) = implicit {
                out.modifiers.insert(modifier);
            }
        }

        out.identifier = node.child_by_field_name("name").map(|n| self.token(n));

        if out.kind == NodeKind::MethodDecl {
            out.parameters = self.parameters(node);
        }
        if out.kind == NodeKind::FieldDecl {
            out.declarators = self.declarators(node);
            out.identifier = out.declarators.first().cloned();
        }

        out.doc_comment = self.doc_comment(node);
    }

    fn parameters(&self, node: Node) -> Vec<Token> {
        let list = node
            .child_by_field_name("parameters")
            .or_else(|| find_child(node, "parameter_list"));
        let Some(list) = list else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            if !matches!(param.kind(), "parameter" | "parameter_array") {
                continue;
            }
            let name = param
                .child_by_field_name("name")
                .or_else(|| last_named_child(param, "identifier"));
            if let Some(name) = name {
                params.push(self.token(name));
            }
        }
        params
    }

    fn declarators(&self, node: Node) -> Vec<Token> {
        let Some(decl) = find_child(node, "variable_declaration") else {
            return Vec::new();
        };

        let mut names = Vec::new();
        let mut cursor = decl.walk();
        for declarator in decl.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let name = declarator
                .child_by_field_name("name")
                .or_else(|| find_child(declarator, "identifier"));
            if let Some(name) = name {
                names.push(self.token(name));
            }
        }
        names
    }

    fn switch_sections(&self, node: Node) -> usize {
        let body = node
            .child_by_field_name("body")
            .or_else(|| find_child(node, "switch_body"));
        let Some(body) = body else {
            return 0;
        };
        let mut cursor = body.walk();
        let count = body
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "switch_section")
            .count();
        count
    }

    fn binary_operator(&self, node: Node) -> String {
        if let Some(op) = node.child_by_field_name("operator") {
            return self.text(op).to_string();
        }
        let mut cursor = node.walk();
        let op = node
            .children(&mut cursor)
            .find(|c| !c.is_named())
            .map(|c| self.text(c).to_string())
            .unwrap_or_default();
        op
    }

    fn argument_count(&self, node: Node) -> usize {
        let args = node
            .child_by_field_name("arguments")
            .or_else(|| find_child(node, "argument_list"));
        let Some(args) = args else {
            return 0;
        };
        let mut cursor = args.walk();
        let count = args
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "argument")
            .count();
        count
    }

    /// Contiguous `///` or `/** */` comments directly above a declaration.
    fn doc_comment(&self, node: Node) -> Option<Token> {
        // Top-level local functions are wrapped in a global_statement.
        let anchor = match node.parent() {
            Some(parent) if parent.kind() == "global_statement" => parent,
            _ => node,
        };

        let mut comments = Vec::new();
        let mut next_row = anchor.start_position().row;
        let mut current = anchor.prev_sibling();
        while let Some(prev) = current {
            if prev.kind() != "comment" {
                break;
            }
            let text = self.text(prev);
            if !(text.starts_with("///") || text.starts_with("/**")) {
                break;
            }
            if next_row.saturating_sub(prev.end_position().row) > 1 {
                break;
            }
            comments.push(prev);
            next_row = prev.start_position().row;
            current = prev.prev_sibling();
        }

        let first = *comments.last()?;
        let last = *comments.first()?;
        let text = comments
            .iter()
            .rev()
            .map(|c| self.text(*c))
            .collect::<Vec<_>>()
            .join("\n");
        let span = Span::from_node(first).cover(&Span::from_node(last));
        Some(Token::new(text, span))
    }
}

/// Whether `child` is the name a declaration introduces rather than a use.
fn is_declaration_name(parent: Node, child: Node) -> bool {
    if child.kind() != "identifier" {
        return false;
    }
    let field = match parent.kind() {
        "class_declaration"
        | "struct_declaration"
        | "record_declaration"
        | "record_struct_declaration"
        | "interface_declaration"
        | "enum_declaration"
        | "enum_member_declaration"
        | "delegate_declaration"
        | "method_declaration"
        | "local_function_statement"
        | "constructor_declaration"
        | "destructor_declaration"
        | "property_declaration"
        | "event_declaration"
        | "parameter"
        | "parameter_array"
        | "variable_declarator"
        | "catch_declaration"
        | "declaration_expression"
        | "type_parameter" => "name",
        "foreach_statement" | "for_each_statement" => "left",
        _ => return false,
    };
    parent.child_by_field_name(field) == Some(child)
}

fn find_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn last_named_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .last();
    found
}
