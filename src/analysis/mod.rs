//! Syntax front-end.
//!
//! Source text is parsed with tree-sitter and converted into a small,
//! language-neutral tree (`SyntaxTree`) that the detection rules walk.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Text     │────▶│ SourceParser │────▶│ SyntaxTree    │
//! └─────────────────┘     │ (C#)         │     │ (NodeKind,    │
//!                         └──────────────┘     │  spans, docs) │
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ Analyzers     │
//!                                              └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `SourceParser` trait, mapping grammar nodes onto `NodeKind`
//! 3. Register the parser in `languages/mod.rs`

mod languages;
mod traits;
mod tree;

pub use languages::{registered_extensions, CSharpParser};
pub use traits::SourceParser;
pub use tree::{Descendants, Modifier, NodeKind, Span, SyntaxNode, SyntaxTree, Token};
