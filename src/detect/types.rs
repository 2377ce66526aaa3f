//! Core types for analysis results.

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::analysis::Span;

/// Reserved category for parse failures, analyzer faults and cancellation.
pub const ERROR_CATEGORY: &str = "Error";

/// Rule names for the issues the analyzers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    // Naming
    #[serde(rename = "Class PascalCase")]
    ClassPascalCase,
    #[serde(rename = "Interface PascalCase")]
    InterfacePascalCase,
    #[serde(rename = "Method PascalCase")]
    MethodPascalCase,
    #[serde(rename = "Async method suffix")]
    AsyncSuffix,
    #[serde(rename = "Parameter camelCase")]
    ParameterCamelCase,
    #[serde(rename = "Parameter underscore prefix")]
    ParameterUnderscore,
    #[serde(rename = "Forbidden 'p' prefix")]
    FieldPrefix,
    #[serde(rename = "Private field underscore")]
    PrivateFieldUnderscore,
    #[serde(rename = "camelCase after underscore")]
    FieldCamelCase,
    #[serde(rename = "Placeholder parameter naming")]
    PlaceholderParameter,
    // Complexity
    #[serde(rename = "Cyclomatic complexity")]
    CyclomaticComplexity,
    // Documentation
    #[serde(rename = "Missing documentation")]
    MissingDocumentation,
    #[serde(rename = "Incomplete documentation")]
    IncompleteDocumentation,
    #[serde(rename = "Documentation note")]
    DocumentationNote,
    #[serde(rename = "Documentation score")]
    DocumentationScore,
    // Duplication
    #[serde(rename = "Duplicate code")]
    DuplicateCode,
    // Unused code
    #[serde(rename = "Unused local variable")]
    UnusedLocal,
    #[serde(rename = "Unused parameter")]
    UnusedParameter,
    #[serde(rename = "Unused private field")]
    UnusedPrivateField,
    #[serde(rename = "Unused private method")]
    UnusedPrivateMethod,
    // Size
    #[serde(rename = "Method too long")]
    MethodTooLong,
    #[serde(rename = "Too many parameters")]
    TooManyParameters,
    // Exceptions
    #[serde(rename = "Generic catch")]
    GenericCatch,
    #[serde(rename = "Empty catch")]
    EmptyCatch,
    #[serde(rename = "Rethrow by name")]
    RethrowByName,
    #[serde(rename = "Blocking call in async method")]
    BlockingAsyncCall,
    // Error
    #[serde(rename = "Parse failure")]
    ParseFailure,
    #[serde(rename = "Analyzer failure")]
    AnalyzerFault,
    #[serde(rename = "Analysis cancelled")]
    Cancelled,
    #[serde(rename = "Unreadable source")]
    UnreadableSource,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::ClassPascalCase => "Class PascalCase",
            Rule::InterfacePascalCase => "Interface PascalCase",
            Rule::MethodPascalCase => "Method PascalCase",
            Rule::AsyncSuffix => "Async method suffix",
            Rule::ParameterCamelCase => "Parameter camelCase",
            Rule::ParameterUnderscore => "Parameter underscore prefix",
            Rule::FieldPrefix => "Forbidden 'p' prefix",
            Rule::PrivateFieldUnderscore => "Private field underscore",
            Rule::FieldCamelCase => "camelCase after underscore",
            Rule::PlaceholderParameter => "Placeholder parameter naming",
            Rule::CyclomaticComplexity => "Cyclomatic complexity",
            Rule::MissingDocumentation => "Missing documentation",
            Rule::IncompleteDocumentation => "Incomplete documentation",
            Rule::DocumentationNote => "Documentation note",
            Rule::DocumentationScore => "Documentation score",
            Rule::DuplicateCode => "Duplicate code",
            Rule::UnusedLocal => "Unused local variable",
            Rule::UnusedParameter => "Unused parameter",
            Rule::UnusedPrivateField => "Unused private field",
            Rule::UnusedPrivateMethod => "Unused private method",
            Rule::MethodTooLong => "Method too long",
            Rule::TooManyParameters => "Too many parameters",
            Rule::GenericCatch => "Generic catch",
            Rule::EmptyCatch => "Empty catch",
            Rule::RethrowByName => "Rethrow by name",
            Rule::BlockingAsyncCall => "Blocking call in async method",
            Rule::ParseFailure => "Parse failure",
            Rule::AnalyzerFault => "Analyzer failure",
            Rule::Cancelled => "Analysis cancelled",
            Rule::UnreadableSource => "Unreadable source",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding.
///
/// Line and column are 1-based, or 0 when the issue has no location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "ruleName")]
    pub rule: Rule,
    pub description: String,
    pub passed: bool,
    pub suggestion: String,
    pub code_snippet: String,
    #[serde(rename = "lineNumber")]
    pub line: usize,
    #[serde(rename = "columnNumber")]
    pub column: usize,
    pub category: String,
    pub detail_message: Option<String>,
}

impl Issue {
    /// A passing (informational) issue.
    pub fn new(rule: Rule, description: impl Into<String>) -> Self {
        Self {
            rule,
            description: description.into(),
            passed: true,
            suggestion: String::new(),
            code_snippet: String::new(),
            line: 0,
            column: 0,
            category: String::new(),
            detail_message: None,
        }
    }

    /// A failing issue with its suggested fix.
    pub fn violation(
        rule: Rule,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(rule, description).failed(suggestion)
    }

    /// Mark the issue as failing with the given suggestion.
    pub fn failed(mut self, suggestion: impl Into<String>) -> Self {
        self.passed = false;
        self.suggestion = suggestion.into();
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.line = span.start_line;
        self.column = span.start_col;
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.code_snippet = snippet.into();
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail_message = Some(detail.into());
        self
    }
}

/// Issues produced by one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub name: String,
    pub issues: Vec<Issue>,
}

impl CategoryResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            issues: Vec::new(),
        }
    }

    /// Append an issue, stamping it with this category's name.
    pub fn push(&mut self, mut issue: Issue) {
        issue.category = self.name.clone();
        self.issues.push(issue);
    }

    /// Number of failing issues.
    pub fn failed_count(&self) -> usize {
        self.issues.iter().filter(|i| !i.passed).count()
    }
}

/// Aggregated result of analyzing one source unit.
///
/// Categories keep insertion order and are unique by name. The result can
/// only be built inside the crate; callers receive it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    file_name: String,
    categories: IndexMap<String, CategoryResult>,
}

impl AnalysisResult {
    pub(crate) fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            categories: IndexMap::new(),
        }
    }

    /// Result holding a single failing issue in the `Error` category.
    pub(crate) fn error(file_name: impl Into<String>, issue: Issue) -> Self {
        let mut result = Self::new(file_name);
        result.category_mut(ERROR_CATEGORY).push(issue);
        result
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryResult> {
        self.categories.values()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// All issues in category order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.categories.values().flat_map(|c| c.issues.iter())
    }

    /// Number of failing issues across all categories.
    pub fn total_issues(&self) -> usize {
        self.categories.values().map(|c| c.failed_count()).sum()
    }

    /// Find or create a category by name.
    pub(crate) fn category_mut(&mut self, name: &str) -> &mut CategoryResult {
        self.categories
            .entry(name.to_string())
            .or_insert_with(|| CategoryResult::new(name))
    }

    /// Merge a finished category, keeping its first insertion position.
    pub(crate) fn append(&mut self, category: CategoryResult) {
        let target = self.category_mut(&category.name);
        for issue in category.issues {
            target.push(issue);
        }
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let categories: Vec<&CategoryResult> = self.categories.values().collect();
        let mut state = serializer.serialize_struct("AnalysisResult", 3)?;
        state.serialize_field("fileName", &self.file_name)?;
        state.serialize_field("totalIssues", &self.total_issues())?;
        state.serialize_field("categories", &categories)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_push_stamps_name() {
        let mut category = CategoryResult::new("Naming");
        category.push(Issue::violation(Rule::ClassPascalCase, "bad", "Rename"));
        assert_eq!(category.issues[0].category, "Naming");
        assert_eq!(category.failed_count(), 1);
    }

    #[test]
    fn test_total_issues_counts_only_failures() {
        let mut result = AnalysisResult::new("a.cs");
        let mut complexity = CategoryResult::new("Complexity");
        complexity.push(Issue::new(Rule::CyclomaticComplexity, "ok"));
        complexity.push(Issue::violation(Rule::CyclomaticComplexity, "high", "Split"));
        result.append(complexity);

        assert_eq!(result.total_issues(), 1);
        assert_eq!(result.issues().count(), 2);
    }

    #[test]
    fn test_append_keeps_names_unique() {
        let mut result = AnalysisResult::new("a.cs");
        let mut first = CategoryResult::new("Size");
        first.push(Issue::violation(Rule::MethodTooLong, "long", "Split"));
        result.append(first);
        result.append(CategoryResult::new("Naming"));
        let mut second = CategoryResult::new("Size");
        second.push(Issue::violation(Rule::TooManyParameters, "many", "Group"));
        result.append(second);

        let names: Vec<_> = result.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Size", "Naming"]);
        assert_eq!(result.category("Size").unwrap().issues.len(), 2);
    }

    #[test]
    fn test_issue_location() {
        let span = Span {
            start_byte: 0,
            end_byte: 4,
            start_line: 3,
            start_col: 7,
            end_line: 3,
            end_col: 11,
        };
        let issue = Issue::new(Rule::DocumentationNote, "note").at(span);
        assert_eq!((issue.line, issue.column), (3, 7));
        assert!(issue.passed);
        assert!(issue.suggestion.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut result = AnalysisResult::new("Program.cs");
        result
            .category_mut("Exceptions")
            .push(Issue::violation(Rule::EmptyCatch, "empty", "Handle it").detail("**Empty catch**"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["fileName"], "Program.cs");
        assert_eq!(json["totalIssues"], 1);
        let issue = &json["categories"][0]["issues"][0];
        assert_eq!(json["categories"][0]["name"], "Exceptions");
        assert_eq!(issue["ruleName"], "Empty catch");
        assert_eq!(issue["lineNumber"], 0);
        assert_eq!(issue["columnNumber"], 0);
        assert_eq!(issue["codeSnippet"], "");
        assert_eq!(issue["category"], "Exceptions");
        assert_eq!(issue["detailMessage"], "**Empty catch**");
        assert_eq!(issue["passed"], false);
    }
}
