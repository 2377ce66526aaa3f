//! Configuration schema for codelens.
//!
//! Configuration is read from `codelens.yaml`. Every key is optional; a
//! missing file or section means the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::ANALYZER_NAMES;
use crate::error::ConfigError;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "codelens.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Run analyzers concurrently (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub complexity: ComplexityConfig,
    #[serde(default)]
    pub size: SizeConfig,
    #[serde(default)]
    pub duplication: DuplicationConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    /// Analyzer names to skip (e.g., "documentation")
    #[serde(default)]
    pub disabled_analyzers: Vec<String>,
    /// Glob patterns for paths to exclude from directory scans (e.g., "**/obj/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: true,
            parser: ParserConfig::default(),
            complexity: ComplexityConfig::default(),
            size: SizeConfig::default(),
            duplication: DuplicationConfig::default(),
            naming: NamingConfig::default(),
            disabled_analyzers: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Analyze trees that contain syntax errors instead of reporting a parse failure.
    #[serde(default)]
    pub allow_partial: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComplexityConfig {
    /// Methods above this complexity fail.
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,
    /// Methods at or below this complexity are "low".
    #[serde(default = "default_low_threshold")]
    pub low_threshold: usize,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            max_complexity: default_max_complexity(),
            low_threshold: default_low_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SizeConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_max_parameters")]
    pub max_parameters: usize,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_parameters: default_max_parameters(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DuplicationConfig {
    /// Blocks with fewer statements are not compared. `0` compares every block.
    #[serde(default = "default_min_statements")]
    pub min_statements: usize,
    /// Maximum length of the code preview attached to each issue.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            min_statements: default_min_statements(),
            preview_chars: default_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Additional identifiers exempt from case checks.
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_complexity() -> usize {
    10
}

fn default_low_threshold() -> usize {
    5
}

fn default_max_lines() -> usize {
    50
}

fn default_max_parameters() -> usize {
    5
}

fn default_min_statements() -> usize {
    0
}

fn default_preview_chars() -> usize {
    200
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `codelens.yaml` from `dir` if present, otherwise the defaults.
    pub fn discover<P: AsRef<Path>>(dir: P) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let config = Self::parse_file(&candidate)?;
            Ok((config, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// The default configuration rendered as YAML.
    pub fn default_yaml() -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(&Self::default())?)
    }

    /// Reject configurations the analyzers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("complexity.max_complexity", self.complexity.max_complexity),
            ("complexity.low_threshold", self.complexity.low_threshold),
            ("size.max_lines", self.size.max_lines),
            ("size.max_parameters", self.size.max_parameters),
            ("duplication.preview_chars", self.duplication.preview_chars),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }

        if self.complexity.low_threshold > self.complexity.max_complexity {
            return Err(ConfigError::ThresholdOrder {
                low: self.complexity.low_threshold,
                max: self.complexity.max_complexity,
            });
        }

        for name in &self.disabled_analyzers {
            if !ANALYZER_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::UnknownAnalyzer(name.clone()));
            }
        }

        for pattern in &self.excluded_paths {
            globset::Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Returns whether the named analyzer is enabled.
    pub fn is_analyzer_enabled(&self, name: &str) -> bool {
        !self.disabled_analyzers.iter().any(|d| d == name)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}
