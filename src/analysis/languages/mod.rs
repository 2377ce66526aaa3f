//! Language-specific front-end implementations.

mod csharp;

pub use csharp::CSharpParser;

use super::SourceParser;

/// File extensions some registered parser handles.
pub fn registered_extensions() -> Vec<String> {
    CSharpParser::new()
        .file_extensions()
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_extensions() {
        assert_eq!(registered_extensions(), vec!["cs".to_string()]);
        let parser = CSharpParser::new();
        assert!(registered_extensions()
            .iter()
            .all(|ext| parser.handles_extension(ext)));
    }
}
