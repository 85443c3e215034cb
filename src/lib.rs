//! dirsort - sort loose files into category folders
//!
//! This library manages the subfolders of a base directory (create, list,
//! delete-if-empty, delete recursively) and classifies the files directly
//! inside it by filename suffix, moving each into the folder of the first
//! category rule that selects it.

pub mod category_rule;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_classifier;
pub mod folder_manager;
pub mod logging;
pub mod output;

pub use category_rule::CategoryRule;
pub use config::{CompiledFilters, Config, ConfigError};
pub use error::{Failure, FailureKind, FolderError, FolderResult};
pub use file_classifier::{ClassifyReport, FileClassifier, MoveRecord, RunSummary};
pub use folder_manager::{FolderManager, FolderStatus};

pub use cli::{Command, Outcome, run};
