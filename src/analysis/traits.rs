//! Core trait for syntax front-ends.

use crate::error::ParseError;

use super::SyntaxTree;

/// Language-specific front-end that turns source text into a [`SyntaxTree`].
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser per
/// call and keep only the (shareable) grammar handle.
pub trait SourceParser: Send + Sync {
    /// Returns the language identifier (e.g., "csharp").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this parser handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source text into a syntax tree.
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Check if this parser handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
