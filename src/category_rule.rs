//! Category rules: which files move to which destination folder.
//!
//! A [`CategoryRule`] is plain data. It names a destination folder, the
//! filename suffixes that select a file, and the names and suffixes that
//! veto the selection. Exclusions always win over inclusions.
//!
//! # Examples
//!
//! ```
//! use dirsort::category_rule::CategoryRule;
//!
//! let rule = CategoryRule::new("Text_Files", ["txt"])
//!     .unwrap()
//!     .with_excluded_names(["README.txt"]);
//!
//! assert!(rule.selects("notes.TXT"));
//! assert!(!rule.selects("README.txt"));
//! assert!(!rule.selects("notes.md"));
//! ```

use crate::error::{FolderError, FolderResult};
use crate::folder_manager::FolderManager;
use std::collections::BTreeSet;

/// Suffixes vetoed by every built-in rule (editor temp files and backups).
const DEFAULT_EXCLUDED_EXTENSIONS: [&str; 2] = [".tmp", ".bak"];

/// Selects files by filename suffix and names the folder they move into.
///
/// Immutable once built; the builder methods consume and return the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    destination: String,
    extensions: BTreeSet<String>,
    excluded_names: BTreeSet<String>,
    excluded_extensions: BTreeSet<String>,
}

impl CategoryRule {
    /// Creates a rule moving files ending in any of `extensions` into `destination`.
    ///
    /// Extensions are matched case-insensitively as filename suffixes; a
    /// missing leading dot is added, so `"docx"` and `".DOCX"` are equivalent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `destination` is not a valid folder name or is
    /// one of the `.`/`..` aliases.
    pub fn new<I, S>(destination: &str, extensions: I) -> FolderResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !FolderManager::is_folder_name(destination) {
            return Err(FolderError::invalid_name(destination));
        }

        Ok(Self {
            destination: destination.to_string(),
            extensions: normalize_extensions(extensions),
            excluded_names: BTreeSet::new(),
            excluded_extensions: BTreeSet::new(),
        })
    }

    /// Adds exact filenames (case-sensitive) that are never moved.
    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_names
            .extend(names.into_iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Adds suffixes that are never moved, even when an extension matches.
    pub fn with_excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_extensions
            .extend(normalize_extensions(extensions));
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn excluded_names(&self) -> impl Iterator<Item = &str> {
        self.excluded_names.iter().map(String::as_str)
    }

    pub fn excluded_extensions(&self) -> impl Iterator<Item = &str> {
        self.excluded_extensions.iter().map(String::as_str)
    }

    /// Decides whether a file with this name belongs to the category.
    ///
    /// True iff the lowercased name ends with a matched extension, the exact
    /// name is not excluded, and the lowercased name ends with no excluded
    /// extension.
    pub fn selects(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();

        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
            && !self.excluded_names.contains(file_name)
            && !self
                .excluded_extensions
                .iter()
                .any(|ext| lower.ends_with(ext.as_str()))
    }

    /// The built-in rule table, in evaluation order: Word, text, PDF and
    /// Excel documents.
    pub fn defaults() -> Vec<CategoryRule> {
        let table: [(&str, &[&str], &[&str]); 4] = [
            ("Word_Files", &[".doc", ".docx"], &[]),
            ("Text_Files", &[".txt"], &["README.txt"]),
            ("PDF_Files", &[".pdf"], &[]),
            ("Excel_Files", &[".xlsx", ".xls"], &[]),
        ];

        table
            .into_iter()
            .map(|(destination, extensions, excluded_names)| CategoryRule {
                destination: destination.to_string(),
                extensions: normalize_extensions(extensions),
                excluded_names: excluded_names.iter().map(|n| n.to_string()).collect(),
                excluded_extensions: normalize_extensions(DEFAULT_EXCLUDED_EXTENSIONS),
            })
            .collect()
    }
}

pub(crate) fn normalize_extensions<I, S>(extensions: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .filter_map(|ext| {
            let ext = ext.as_ref().trim().to_lowercase();
            match ext.as_str() {
                "" | "." => None,
                e if e.starts_with('.') => Some(ext),
                _ => Some(format!(".{}", ext)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_normalized() {
        let rule = CategoryRule::new("Docs", ["DOCX", ".Doc", "  pdf ", "", "."]).unwrap();
        let exts: Vec<_> = rule.extensions().collect();
        assert_eq!(exts, vec![".doc", ".docx", ".pdf"]);
    }

    #[test]
    fn test_invalid_destination_is_rejected() {
        let err = CategoryRule::new("Word/Files", [".doc"]).unwrap_err();
        assert!(matches!(err, FolderError::InvalidName { .. }));
        assert!(CategoryRule::new("", [".doc"]).is_err());
    }

    #[test]
    fn test_dot_alias_destinations_are_rejected() {
        for destination in [".", ".."] {
            let err = CategoryRule::new(destination, [".txt"]).unwrap_err();
            assert!(matches!(err, FolderError::InvalidName { name } if name == destination));
        }
        assert!(CategoryRule::new(".archive", [".txt"]).is_ok());
    }

    #[test]
    fn test_selects_case_insensitive_suffix() {
        let rule = CategoryRule::new("Word_Files", [".docx"]).unwrap();
        assert!(rule.selects("report.docx"));
        assert!(rule.selects("REPORT.DOCX"));
        assert!(!rule.selects("report.doc"));
        assert!(!rule.selects("docx"));
    }

    #[test]
    fn test_excluded_extension_wins_over_match() {
        let rule = CategoryRule::new("Word_Files", [".docx", ".tmp"])
            .unwrap()
            .with_excluded_extensions([".tmp"]);
        assert!(rule.selects("report.docx"));
        assert!(!rule.selects("report.tmp"));
    }

    #[test]
    fn test_excluded_suffix_spanning_two_extensions() {
        let rule = CategoryRule::new("Word_Files", [".docx"])
            .unwrap()
            .with_excluded_extensions([".bak.docx"]);
        assert!(!rule.selects("draft.bak.docx"));
        assert!(rule.selects("draft.docx"));
    }

    #[test]
    fn test_excluded_names_are_exact() {
        let rule = CategoryRule::new("Text_Files", [".txt"])
            .unwrap()
            .with_excluded_names(["README.txt"]);
        assert!(!rule.selects("README.txt"));
        assert!(rule.selects("readme.txt"));
        assert!(rule.selects("notes.txt"));
    }

    #[test]
    fn test_defaults_order_and_contents() {
        let rules = CategoryRule::defaults();
        let names: Vec<_> = rules.iter().map(|r| r.destination()).collect();
        assert_eq!(
            names,
            vec!["Word_Files", "Text_Files", "PDF_Files", "Excel_Files"]
        );

        let text = &rules[1];
        assert!(text.selects("notes.txt"));
        assert!(!text.selects("README.txt"));

        for rule in &rules {
            let excluded: Vec<_> = rule.excluded_extensions().collect();
            assert_eq!(excluded, vec![".bak", ".tmp"]);
        }
    }

    #[test]
    fn test_default_word_rule_does_not_take_docx_lookalikes() {
        let word = &CategoryRule::defaults()[0];
        assert!(word.selects("letter.doc"));
        assert!(word.selects("letter.docx"));
        assert!(!word.selects("letter.docm"));
        assert!(!word.selects("letter.docx.bak"));
    }
}
