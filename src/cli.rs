//! Command-line interface for codelens.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::analysis;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::detect::{AnalysisResult, Runner};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into during a scan.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "packages", "node_modules"];

/// Rule-based static analysis for C# sources.
///
/// Reports naming conventions, cyclomatic complexity, documentation coverage,
/// duplicated blocks, unused declarations, oversized methods and
/// exception-handling anti-patterns.
#[derive(Parser)]
#[command(name = "codelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source file or directory
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Write the default configuration file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Path to configuration YAML file (default: ./codelens.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File name reported for a single analyzed file
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also print issues that passed
    #[arg(long)]
    pub show_passed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub output: PathBuf,
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(verbose: u8) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "codelens=warn",
            1 => "codelens=info",
            2 => "codelens=debug",
            _ => "codelens=trace",
        })
    };

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the configuration named on the command line, or discover one.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => {
            info!(config = %path.display(), "using configuration");
            Config::parse_file(path)
        }
        None => {
            let (config, found) = Config::discover(std::env::current_dir()?)?;
            match found {
                Some(path) => info!(config = %path.display(), "discovered configuration"),
                None => debug!("no configuration file, using defaults"),
            }
            Ok(config)
        }
    }
}

/// Collect analyzable files under `root`, sorted by path.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let extensions = analysis::registered_extensions();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !extensions.iter().any(|e| e == ext) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            debug!(file = %relative.display(), "excluded by configuration");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Run the analyze command, writing the report to `out`.
pub fn run_analyze<W: Write>(args: &AnalyzeArgs, out: &mut W) -> anyhow::Result<i32> {
    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error parsing configuration: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runner = match Runner::new(config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let results: Vec<AnalysisResult> = if metadata.is_dir() {
        let files = collect_files(&args.path, runner.config())?;
        if files.is_empty() {
            warn!(path = %args.path.display(), "no files to analyze");
        }
        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            let name = file.strip_prefix(&args.path).unwrap_or(file);
            results.push(runner.analyze_path(file, &name.display().to_string()));
        }
        results
    } else {
        let source = std::fs::read_to_string(&args.path)?;
        let name = args
            .name
            .clone()
            .unwrap_or_else(|| args.path.display().to_string());
        vec![runner.analyze(&source, &name)]
    };

    info!(files = results.len(), "analysis complete");

    match args.format {
        OutputFormat::Json => report::write_json(out, &results)?,
        OutputFormat::Pretty => report::write_pretty(out, &results, args.show_passed)?,
    }

    if report::failed_count(&results) > 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&args.output, Config::default_yaml()?)?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to adjust thresholds", args.output.display());
    println!("  2. Run: codelens analyze . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
