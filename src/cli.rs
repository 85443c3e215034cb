//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality:
//! - Command parsing (clap)
//! - Classification orchestration with dry-run and JSON output
//! - Folder lifecycle commands (list, create, delete)
//! - Confirmation before recursive deletion

use crate::category_rule::CategoryRule;
use crate::config::Config;
use crate::error::Failure;
use crate::file_classifier::FileClassifier;
use crate::folder_manager::{FolderManager, FolderStatus};
use crate::output::OutputFormatter;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort loose files into category folders and manage subfolders.
#[derive(Parser, Debug)]
#[command(name = "dirsort", author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move loose files into category folders according to the rules.
    Classify {
        #[arg(value_hint = ValueHint::DirPath)]
        base_path: PathBuf,

        /// Configuration file (defaults: ./.dirsortrc.toml, ~/.config/dirsort/config.toml).
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,

        /// Show what would be moved without touching the filesystem.
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the subfolders of a directory.
    List {
        #[arg(value_hint = ValueHint::DirPath)]
        base_path: PathBuf,
    },

    /// Create subfolders (existing ones are left alone).
    Create {
        #[arg(value_hint = ValueHint::DirPath)]
        base_path: PathBuf,

        #[arg(required = true)]
        names: Vec<String>,

        /// Treat NAMES as the segments of one nested path.
        #[arg(long)]
        nested: bool,
    },

    /// Delete a subfolder. Only empty folders unless --recursive.
    Delete {
        #[arg(value_hint = ValueHint::DirPath)]
        base_path: PathBuf,

        name: String,

        /// Remove the folder and everything in it.
        #[arg(short, long)]
        recursive: bool,

        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the effective category rules in evaluation order.
    Rules {
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
}

/// How a command finished, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything requested was done.
    Success,
    /// The command ran to completion but some operations failed.
    PartialFailure,
}

/// Runs a command, reading confirmations from stdin.
///
/// # Errors
///
/// Returns an error when the command cannot run at all (bad configuration,
/// unusable base path). Failures of individual operations are reported and
/// reflected in the [`Outcome`] instead.
pub fn run(command: &Command) -> Result<Outcome> {
    let stdin = io::stdin();
    run_with_input(command, &mut stdin.lock())
}

/// Like [`run`], reading confirmations from `input`.
pub fn run_with_input(command: &Command, input: &mut dyn BufRead) -> Result<Outcome> {
    match command {
        Command::Classify {
            base_path,
            config,
            dry_run,
            json,
        } => classify_directory(base_path, config.as_deref(), *dry_run, *json),
        Command::List { base_path } => list_folders(base_path),
        Command::Create {
            base_path,
            names,
            nested,
        } => create_folders(base_path, names, *nested),
        Command::Delete {
            base_path,
            name,
            recursive,
            yes,
        } => delete_folder(base_path, name, *recursive, *yes, input),
        Command::Rules { config } => print_rules(config.as_deref()),
    }
}

/// Runs every configured rule against `base_path`, in order.
///
/// Loads the configuration, compiles the global filters, then classifies
/// (or plans, for a dry run) and prints one line per created folder, moved
/// file and failure.
pub fn classify_directory(
    base_path: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<Outcome> {
    let config = Config::load(config_path).context("Error loading configuration")?;
    let rules = config
        .category_rules()
        .context("Error building category rules")?;
    let filters = config
        .compile_filters()
        .context("Error compiling filters")?;

    let folders = FolderManager::new(base_path)
        .with_context(|| format!("Cannot use base path {}", base_path.display()))?;
    let classifier = FileClassifier::new(folders).with_filters(filters);

    let summary = if dry_run {
        classifier.plan_all(&rules)
    } else {
        classifier.classify_all(&rules)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        OutputFormatter::summary(&summary);
    }

    Ok(outcome(summary.is_success()))
}

fn list_folders(base_path: &Path) -> Result<Outcome> {
    let folders = FolderManager::new(base_path)?;
    let names = match folders.list_folders() {
        Ok(names) => names,
        Err(e) => {
            OutputFormatter::failure(&Failure::from(e));
            return Ok(Outcome::PartialFailure);
        }
    };

    OutputFormatter::info(&format!("Folders in {}:", base_path.display()));
    if names.is_empty() {
        OutputFormatter::plain("  (none)");
    }
    for name in names {
        OutputFormatter::plain(&format!(" - {}", name));
    }
    Ok(Outcome::Success)
}

fn create_folders(base_path: &Path, names: &[String], nested: bool) -> Result<Outcome> {
    let folders = FolderManager::new(base_path)?;

    let results = if nested {
        vec![(names.join("/"), folders.create_nested_folder(names))]
    } else {
        names
            .iter()
            .map(|name| (name.clone(), folders.create_folder(name)))
            .collect()
    };

    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok(FolderStatus::Created) => OutputFormatter::success(&format!("Created {}/", name)),
            Ok(_) => OutputFormatter::plain(&format!("  {}/ already exists", name)),
            Err(e) => {
                OutputFormatter::failure(&Failure::from(e));
                failed = true;
            }
        }
    }
    Ok(outcome(!failed))
}

fn delete_folder(
    base_path: &Path,
    name: &str,
    recursive: bool,
    yes: bool,
    input: &mut dyn BufRead,
) -> Result<Outcome> {
    let folders = FolderManager::new(base_path)?;

    let result = if recursive {
        let question = format!(
            "Delete folder '{}' and everything in it? [y/N]: ",
            name
        );
        if !yes && !confirm(&question, input)? {
            OutputFormatter::warning("Operation cancelled.");
            return Ok(Outcome::Success);
        }
        folders.delete_folder_recursive(name)
    } else {
        folders.delete_folder_if_empty(name)
    };

    match result {
        Ok(()) => {
            OutputFormatter::success(&format!("Deleted {}/", name));
            Ok(Outcome::Success)
        }
        Err(e) => {
            OutputFormatter::failure(&Failure::from(e));
            Ok(Outcome::PartialFailure)
        }
    }
}

fn print_rules(config_path: Option<&Path>) -> Result<Outcome> {
    let config = Config::load(config_path).context("Error loading configuration")?;
    let rules = config.category_rules()?;

    OutputFormatter::header("Rules (first match wins)");
    for (i, rule) in rules.iter().enumerate() {
        OutputFormatter::plain(&describe_rule(i + 1, rule));
    }
    Ok(Outcome::Success)
}

fn describe_rule(position: usize, rule: &CategoryRule) -> String {
    let join = |items: Vec<&str>| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    format!(
        "{}. {}/ <- {} (exclude names: {}; exclude extensions: {})",
        position,
        rule.destination(),
        join(rule.extensions().collect()),
        join(rule.excluded_names().collect()),
        join(rule.excluded_extensions().collect()),
    )
}

/// Asks a yes/no question; anything but "y"/"yes" (any case) is a no.
fn confirm(question: &str, input: &mut dyn BufRead) -> Result<bool> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn outcome(success: bool) -> Outcome {
    if success {
        Outcome::Success
    } else {
        Outcome::PartialFailure
    }
}
