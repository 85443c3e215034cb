/// File classification: moving loose files into category folders.
///
/// A [`FileClassifier`] scans the immediate contents of its base directory,
/// selects plain files with a [`CategoryRule`] and the global filters, and
/// moves the selection into the rule's destination folder. Folder creation
/// goes through the [`FolderManager`].
///
/// Per-file move failures never abort the batch: they are collected into the
/// [`ClassifyReport`] and processing continues with the next file.
use crate::category_rule::CategoryRule;
use crate::config::CompiledFilters;
use crate::error::{Failure, FolderError, FolderResult};
use crate::folder_manager::{FolderManager, FolderStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single file relocation, performed or (in a dry run) planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub file_name: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of running one rule against the base directory.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    /// Destination folder name of the rule.
    pub destination: String,
    /// Whether the destination had to be created.
    pub destination_status: FolderStatus,
    /// Files moved (or, in a dry run, that would be moved).
    pub moved: Vec<MoveRecord>,
    /// Per-file failures; the remaining files were still processed.
    pub failures: Vec<Failure>,
    pub dry_run: bool,
}

impl ClassifyReport {
    fn new(destination: &str, destination_status: FolderStatus, dry_run: bool) -> Self {
        Self {
            destination: destination.to_string(),
            destination_status,
            moved: Vec::new(),
            failures: Vec::new(),
            dry_run,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of running a sequence of rules in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub base_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    /// One report per rule that could run, in evaluation order.
    pub reports: Vec<ClassifyReport>,
    /// Rule-level failures: a destination that could not be created or a
    /// base directory that could not be listed.
    pub failures: Vec<Failure>,
}

impl RunSummary {
    pub fn moved_count(&self) -> usize {
        self.reports.iter().map(|r| r.moved.len()).sum()
    }

    pub fn created_folders(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .filter(|r| r.destination_status == FolderStatus::Created)
            .map(|r| r.destination.as_str())
    }

    /// All failures, rule-level first, then per-file in report order.
    pub fn all_failures(&self) -> impl Iterator<Item = &Failure> {
        self.failures
            .iter()
            .chain(self.reports.iter().flat_map(|r| r.failures.iter()))
    }

    pub fn failure_count(&self) -> usize {
        self.all_failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

/// A plain file found directly inside the base directory.
#[derive(Debug)]
struct FileEntry {
    name: OsString,
    path: PathBuf,
}

/// Moves files selected by category rules into destination folders.
#[derive(Debug)]
pub struct FileClassifier {
    folders: FolderManager,
    filters: CompiledFilters,
}

impl FileClassifier {
    /// Creates a classifier over the manager's base path. No global filter is
    /// applied: every plain file the rule selects is a candidate, dotfiles
    /// included.
    pub fn new(folders: FolderManager) -> Self {
        Self {
            folders,
            filters: CompiledFilters::default(),
        }
    }

    /// Replaces the global filters applied before every rule.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn base_path(&self) -> &Path {
        self.folders.base_path()
    }

    pub fn folders(&self) -> &FolderManager {
        &self.folders
    }

    /// Moves every file selected by `rule` into its destination folder,
    /// creating the folder if needed.
    ///
    /// Re-running with the same rule is a no-op for files already moved:
    /// they are no longer in the base directory.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination cannot be created or the base
    /// directory cannot be listed. Failures moving individual files are
    /// collected in the report.
    pub fn classify(&self, rule: &CategoryRule) -> FolderResult<ClassifyReport> {
        self.run_rule(rule, &mut HashSet::new(), false)
    }

    /// Reports what [`classify`](FileClassifier::classify) would do without
    /// creating folders or moving files.
    pub fn plan(&self, rule: &CategoryRule) -> FolderResult<ClassifyReport> {
        self.run_rule(rule, &mut HashSet::new(), true)
    }

    /// Runs `rules` in order against the base directory.
    ///
    /// The first rule that selects a file claims it: later rules in the same
    /// pass never consider that file, whether its move succeeded or failed.
    pub fn classify_all(&self, rules: &[CategoryRule]) -> RunSummary {
        self.run_all(rules, false)
    }

    /// Dry-run counterpart of [`classify_all`](FileClassifier::classify_all).
    pub fn plan_all(&self, rules: &[CategoryRule]) -> RunSummary {
        self.run_all(rules, true)
    }

    fn run_all(&self, rules: &[CategoryRule], dry_run: bool) -> RunSummary {
        let mut summary = RunSummary {
            base_path: self.base_path().to_path_buf(),
            started_at: Utc::now(),
            dry_run,
            reports: Vec::with_capacity(rules.len()),
            failures: Vec::new(),
        };
        let mut claimed = HashSet::new();

        for rule in rules {
            match self.run_rule(rule, &mut claimed, dry_run) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    warn!(destination = rule.destination(), error = %e, "rule skipped");
                    summary.failures.push(Failure::from(e));
                }
            }
        }

        info!(
            moved = summary.moved_count(),
            failed = summary.failure_count(),
            dry_run,
            "classification finished"
        );
        summary
    }

    fn run_rule(
        &self,
        rule: &CategoryRule,
        claimed: &mut HashSet<OsString>,
        dry_run: bool,
    ) -> FolderResult<ClassifyReport> {
        let destination_status = if dry_run {
            FolderStatus::Skipped
        } else {
            self.folders.create_folder(rule.destination())?
        };
        let destination_dir = self.folders.folder_path(rule.destination())?;
        let mut report = ClassifyReport::new(rule.destination(), destination_status, dry_run);

        for entry in self.scan(&mut report.failures)? {
            if claimed.contains(&entry.name) {
                continue;
            }

            // Names that aren't valid UTF-8 are matched on their lossy form.
            let name = entry.name.to_string_lossy().into_owned();
            if !self.filters.allows(&name) || !rule.selects(&name) {
                continue;
            }
            claimed.insert(entry.name.clone());

            let to = destination_dir.join(&entry.name);
            if dry_run {
                debug!(file = %name, destination = rule.destination(), "would move");
            } else if let Err(e) = fs::rename(&entry.path, &to) {
                let err = FolderError::from_io(&entry.path, e);
                warn!(file = %name, destination = rule.destination(), error = %err, "move failed");
                report.failures.push(Failure::from(err));
                continue;
            } else {
                info!(file = %name, destination = rule.destination(), "moved");
            }

            report.moved.push(MoveRecord {
                file_name: name,
                from: entry.path,
                to,
            });
        }

        Ok(report)
    }

    /// Lists the plain files directly inside the base directory, sorted by
    /// name. Unreadable entries are recorded as failures and skipped.
    fn scan(&self, failures: &mut Vec<Failure>) -> FolderResult<Vec<FileEntry>> {
        let base = self.base_path();
        let entries = fs::read_dir(base).map_err(|e| FolderError::from_io(base, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    failures.push(Failure::from(FolderError::from_io(base, e)));
                    continue;
                }
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => files.push(FileEntry {
                    name: entry.file_name(),
                    path: entry.path(),
                }),
                Ok(_) => {}
                Err(e) => failures.push(Failure::from(FolderError::from_io(entry.path(), e))),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}
