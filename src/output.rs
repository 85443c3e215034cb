//! Output formatting and styling module.
//!
//! All human-facing CLI output goes through [`OutputFormatter`]: one line per
//! created folder, moved file and failure, followed by a summary table.
//! Machine-readable output (`--json`) bypasses this module entirely.

use crate::error::Failure;
use crate::file_classifier::{ClassifyReport, RunSummary};
use crate::folder_manager::FolderStatus;
use colored::*;

/// Prints CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints a failure as `kind: message`.
    pub fn failure(failure: &Failure) {
        Self::error(&format!("{}: {}", failure.kind.label(), failure.message));
    }

    /// Prints every creation, move and failure of one rule.
    pub fn report(report: &ClassifyReport) {
        Self::header(&format!("{}/", report.destination));

        if report.destination_status == FolderStatus::Created {
            Self::success(&format!("Created folder {}/", report.destination));
        }

        if report.moved.is_empty() && report.failures.is_empty() {
            Self::plain("  nothing to move");
        }

        for record in &report.moved {
            if report.dry_run {
                Self::plain(&format!(
                    " - {} → would move to {}/",
                    record.file_name, report.destination
                ));
            } else {
                Self::success(&format!(
                    "Moved {} → {}/",
                    record.file_name, report.destination
                ));
            }
        }

        for failure in &report.failures {
            Self::failure(failure);
        }
    }

    /// Prints the per-rule reports followed by a summary table.
    pub fn summary(summary: &RunSummary) {
        if summary.dry_run {
            Self::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                summary.base_path.display()
            ));
        } else {
            Self::info(&format!(
                "Organizing contents of: {}",
                summary.base_path.display()
            ));
        }

        for failure in &summary.failures {
            Self::failure(failure);
        }
        for report in &summary.reports {
            Self::report(report);
        }

        Self::summary_table(summary);

        if summary.dry_run {
            Self::dry_run_notice("No files were modified.");
        } else if summary.is_success() {
            Self::success("Organization complete!");
        } else {
            Self::warning(&format!(
                "{} operation(s) failed. Please review errors above.",
                summary.failure_count()
            ));
        }
    }

    fn summary_table(summary: &RunSummary) {
        Self::header("SUMMARY");

        let width = summary
            .reports
            .iter()
            .map(|r| r.destination.len())
            .max()
            .unwrap_or(0)
            .max("Destination".len());

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for report in &summary.reports {
            let count = report.moved.len();
            println!(
                "{:<width$} | {} {}",
                report.destination,
                count.to_string().green(),
                file_word(count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        let total = summary.moved_count();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            file_word(total),
            width = width
        );

        let failures = summary.failure_count();
        if failures > 0 {
            println!(
                "{:<width$} | {}",
                "Failed".bold(),
                failures.to_string().red().bold(),
                width = width
            );
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
