//! Configuration: category rules and global file filters.
//!
//! Configuration is read from TOML. Rules are evaluated in the order they
//! appear; when the file defines no rules the built-in table from
//! [`CategoryRule::defaults`] is used. Global filters apply to every rule and
//! are checked before a rule's own predicate.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! extensions = [".part", ".crdownload"]
//! patterns = ["~$*"]
//! regex = ["^draft_"]
//!
//! [[rules]]
//! destination = "Word_Files"
//! extensions = [".doc", ".docx"]
//! exclude_extensions = [".tmp", ".bak"]
//!
//! [[rules]]
//! destination = "Text_Files"
//! extensions = [".txt"]
//! exclude_names = ["README.txt"]
//! ```

use crate::category_rule::{CategoryRule, normalize_extensions};
use crate::error::FolderError;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".dirsortrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("IO error reading configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("Invalid rule for destination '{destination}': {source}")]
    InvalidRule {
        destination: String,
        #[source]
        source: FolderError,
    },

    #[error("Rule for destination '{0}' has no extensions")]
    EmptyRule(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterRules,

    /// Category rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Global filters applied before any category rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." are considered at all.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Files that no rule may move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Filename suffixes, matched case-insensitively (e.g. ".part").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Glob patterns matched against the filename (e.g. "~$*").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regular expressions matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// One `[[rules]]` table as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub destination: String,
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude_names: Vec<String>,
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
}

impl RuleConfig {
    fn build(&self) -> Result<CategoryRule, ConfigError> {
        let rule = CategoryRule::new(&self.destination, &self.extensions).map_err(|source| {
            ConfigError::InvalidRule {
                destination: self.destination.clone(),
                source,
            }
        })?;
        if rule.extensions().next().is_none() {
            return Err(ConfigError::EmptyRule(self.destination.clone()));
        }

        Ok(rule
            .with_excluded_names(&self.exclude_names)
            .with_excluded_extensions(&self.exclude_extensions))
    }
}

impl Config {
    /// Load configuration, falling back to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to the built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found (or explicitly given) but cannot be
    /// read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("no configuration file found, using built-in rules");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), rules = config.rules.len(), "loaded configuration");
        Ok(config)
    }

    /// Builds the category rules in evaluation order.
    ///
    /// An empty `rules` list yields the built-in defaults.
    pub fn category_rules(&self) -> Result<Vec<CategoryRule>, ConfigError> {
        if self.rules.is_empty() {
            return Ok(CategoryRule::defaults());
        }
        self.rules.iter().map(RuleConfig::build).collect()
    }

    /// Compiles the global filters for matching.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Global filters, pre-compiled for matching.
///
/// The `Default` value excludes nothing, hidden files included. Hidden files
/// are skipped only when compiled from [`FilterRules`] with
/// `enable_hidden_files = false`.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    skip_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: Vec<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    /// Compiles filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden_files: !rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: normalize_extensions(&rules.exclude.extensions)
                .into_iter()
                .collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns true if a file with this name may be considered by any rule.
    ///
    /// Checks, in order: hidden files, exact filenames, suffixes, glob
    /// patterns, regexes. The first hit excludes the file.
    pub fn allows(&self, file_name: &str) -> bool {
        if self.skip_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        let lower = file_name.to_lowercase();
        if self
            .exclude_extensions
            .iter()
            .any(|ext| lower.ends_with(ext.as_str()))
        {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|r| r.is_match(file_name))
    }
}
