//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the stable `AnalysisResult` document for programmatic consumption

use colored::*;
use std::io::Write;

use crate::detect::{AnalysisResult, CategoryResult, Issue, ERROR_CATEGORY};

// =============================================================================
// JSON Format
// =============================================================================

/// Write results as JSON.
///
/// A single result is written as one `AnalysisResult` object; several results
/// are written as an array of them.
pub fn write_json<W: Write>(w: &mut W, results: &[AnalysisResult]) -> anyhow::Result<()> {
    match results {
        [single] => serde_json::to_writer_pretty(&mut *w, single)?,
        _ => serde_json::to_writer_pretty(&mut *w, results)?,
    }
    writeln!(w)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results as colored terminal output.
///
/// Passed issues (informational entries such as complexity levels) are
/// hidden unless `show_passed` is set.
pub fn write_pretty<W: Write>(
    w: &mut W,
    results: &[AnalysisResult],
    show_passed: bool,
) -> anyhow::Result<()> {
    // Header
    writeln!(w)?;
    writeln!(w, "  {} v{}", "codelens".cyan().bold(), env!("CARGO_PKG_VERSION"))?;
    writeln!(w)?;

    for result in results {
        write_file(w, result, show_passed)?;
    }

    write_final_status(w, results)?;
    writeln!(w)?;
    Ok(())
}

/// Number of issues that did not pass across all results.
pub fn failed_count(results: &[AnalysisResult]) -> usize {
    results.iter().map(|r| r.total_issues()).sum()
}

fn write_file<W: Write>(w: &mut W, result: &AnalysisResult, show_passed: bool) -> anyhow::Result<()> {
    let failed = result.total_issues();
    if failed == 0 {
        write!(w, "  {}", "✓".green())?;
    } else {
        write!(w, "  {}", "✗".red())?;
    }
    writeln!(
        w,
        " {}  {}",
        result.file_name().blue(),
        format!("({} of {} issues failed)", failed, result.issues().count()).dimmed()
    )?;

    for category in result.categories() {
        write_category(w, category, show_passed)?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_category<W: Write>(
    w: &mut W,
    category: &CategoryResult,
    show_passed: bool,
) -> anyhow::Result<()> {
    let failed = category.failed_count();
    let title = format!("{} ({}/{})", category.name, failed, category.issues.len());
    if category.name == ERROR_CATEGORY {
        writeln!(w, "    {}", title.red().bold())?;
    } else if failed > 0 {
        writeln!(w, "    {}", title.bold())?;
    } else {
        writeln!(w, "    {}", title.dimmed())?;
    }

    for issue in category.issues.iter().filter(|i| show_passed || !i.passed) {
        write_issue(w, issue)?;
    }
    Ok(())
}

fn write_issue<W: Write>(w: &mut W, issue: &Issue) -> anyhow::Result<()> {
    if issue.passed {
        write!(w, "      {} ", "PASS".green())?;
    } else {
        write!(w, "      {} ", "FAIL".red())?;
    }
    write!(w, "{:<30}", issue.rule.as_str().dimmed())?;
    if issue.line > 0 {
        write!(w, "{}", format!("{}:{}", issue.line, issue.column).dimmed())?;
    }
    writeln!(w)?;

    // Message on next line, indented
    writeln!(w, "           {}", issue.description)?;
    if !issue.passed && !issue.suggestion.is_empty() {
        writeln!(w, "           {} {}", "→".cyan(), issue.suggestion)?;
    }
    Ok(())
}

fn write_final_status<W: Write>(w: &mut W, results: &[AnalysisResult]) -> anyhow::Result<()> {
    let failed = failed_count(results);
    let plural = if results.len() != 1 { "s" } else { "" };
    if failed == 0 {
        writeln!(
            w,
            "  {} {} file{} analyzed, no failing issues",
            "PASS".green().bold(),
            results.len(),
            plural
        )?;
    } else {
        writeln!(
            w,
            "  {} {} failing issue{} in {} file{}",
            "FAIL".red().bold(),
            failed,
            if failed != 1 { "s" } else { "" },
            results.len(),
            plural
        )?;
    }
    Ok(())
}
