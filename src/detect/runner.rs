//! Analysis runner that orchestrates all analyzers.

use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analysis::{CSharpParser, SourceParser, SyntaxTree};
use crate::config::Config;
use crate::error::{ConfigError, ParseError};

use super::{
    default_analyzers, AnalysisResult, Analyzer, CategoryResult, Issue, Rule, ERROR_CATEGORY,
};

/// What happened to one analyzer during a run.
enum Outcome {
    Done(CategoryResult),
    Failed(Issue),
    Skipped,
}

/// Executes all analyzers against one source unit.
pub struct Runner {
    config: Config,
    parser: Box<dyn SourceParser>,
    analyzers: Vec<Box<dyn Analyzer>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Runner {
    /// Create a runner from a validated configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        let parser = CSharpParser::new().allow_partial(config.parser.allow_partial);
        let analyzers = default_analyzers(&config)
            .into_iter()
            .filter(|a| config.is_analyzer_enabled(a.name()))
            .collect();
        Self {
            config,
            parser: Box::new(parser),
            analyzers,
            cancel: None,
        }
    }

    /// Append an analyzer after the built-in ones.
    pub fn with_analyzer(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Share a flag that stops the run before the next analyzer starts.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the analyzers this runner will execute, in order.
    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Analyze source text. Never fails: parse errors, analyzer faults and
    /// cancellation are reported in the `Error` category.
    pub fn analyze(&self, source: &str, file_name: &str) -> AnalysisResult {
        if source.trim().is_empty() {
            debug!(file = file_name, "empty source, nothing to analyze");
            return AnalysisResult::new(file_name);
        }

        let tree = match self.parser.parse(source) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(file = file_name, error = %e, "parse failed");
                return AnalysisResult::error(file_name, parse_failure(&e));
            }
        };

        let outcomes: Vec<Outcome> = if self.config.parallel {
            self.analyzers
                .par_iter()
                .map(|a| self.run_analyzer(a.as_ref(), &tree, file_name))
                .collect()
        } else {
            self.analyzers
                .iter()
                .map(|a| self.run_analyzer(a.as_ref(), &tree, file_name))
                .collect()
        };

        let mut result = AnalysisResult::new(file_name);
        let mut skipped = Vec::new();
        for (analyzer, outcome) in self.analyzers.iter().zip(outcomes) {
            match outcome {
                Outcome::Done(category) => result.append(category),
                Outcome::Failed(issue) => result.category_mut(ERROR_CATEGORY).push(issue),
                Outcome::Skipped => skipped.push(analyzer.name()),
            }
        }

        if !skipped.is_empty() {
            debug!(file = file_name, skipped = ?skipped, "analysis cancelled");
            result.category_mut(ERROR_CATEGORY).push(
                Issue::violation(
                    Rule::Cancelled,
                    format!("Analysis cancelled before: {}", skipped.join(", ")),
                    "Run the analysis again to get a complete report",
                )
                .detail(format!("**{}**\n- Skipped: {}", Rule::Cancelled, skipped.join(", "))),
            );
        }

        result
    }

    /// Read and analyze a file, using its path as the file name.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<AnalysisResult> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Ok(self.analyze(&source, &path.display().to_string()))
    }

    /// Read and analyze `path` under `file_name`. A file that cannot be read
    /// is reported in the `Error` category instead of failing the run.
    pub fn analyze_path(&self, path: &Path, file_name: &str) -> AnalysisResult {
        match fs::read_to_string(path) {
            Ok(source) => self.analyze(&source, file_name),
            Err(e) => {
                warn!(file = file_name, error = %e, "cannot read source");
                AnalysisResult::error(file_name, read_failure(&e))
            }
        }
    }

    fn run_analyzer(
        &self,
        analyzer: &dyn Analyzer,
        tree: &SyntaxTree,
        file_name: &str,
    ) -> Outcome {
        if self.is_cancelled() {
            return Outcome::Skipped;
        }

        debug!(file = file_name, analyzer = analyzer.name(), "running analyzer");
        let mut category = CategoryResult::new(analyzer.category());
        let run = panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(tree, &mut category)));

        let message = match run {
            Ok(Ok(())) => {
                debug!(
                    file = file_name,
                    analyzer = analyzer.name(),
                    issues = category.issues.len(),
                    "analyzer finished"
                );
                return Outcome::Done(category);
            }
            Ok(Err(e)) => format!("{:#}", e),
            Err(payload) => panic_message(payload.as_ref()),
        };

        warn!(file = file_name, analyzer = analyzer.name(), error = %message, "analyzer failed");
        Outcome::Failed(analyzer_fault(analyzer.name(), &message))
    }
}

impl Default for Runner {
    /// Runner with the built-in configuration.
    fn default() -> Self {
        Self::build(Config::default())
    }
}

fn parse_failure(error: &ParseError) -> Issue {
    let mut issue = Issue::violation(
        Rule::ParseFailure,
        error.to_string(),
        "Fix the syntax error and analyze again",
    )
    .detail(format!("**{}**\n- {}", Rule::ParseFailure, error));
    if let Some((line, column)) = error.position() {
        issue.line = line;
        issue.column = column;
    }
    issue
}

fn read_failure(error: &io::Error) -> Issue {
    Issue::violation(
        Rule::UnreadableSource,
        format!("Cannot read source: {}", error),
        "Save the file as UTF-8 text and analyze again",
    )
    .detail(format!("**{}**\n- {}", Rule::UnreadableSource, error))
}

fn analyzer_fault(name: &str, message: &str) -> Issue {
    Issue::violation(
        Rule::AnalyzerFault,
        format!("Analyzer '{}' failed: {}", name, message),
        "Report this failure together with the analyzed source",
    )
    .snippet(name)
    .detail(format!(
        "**{}**\n- Analyzer: `{}`\n- Error: {}",
        Rule::AnalyzerFault,
        name,
        message
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
