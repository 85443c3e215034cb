/// Subfolder lifecycle management under a fixed base directory.
///
/// `FolderManager` owns every create/list/delete operation on the immediate
/// subfolders of its base path. Names are validated before any filesystem
/// call, creation is idempotent, and deletion comes in two explicitly
/// distinct flavours: empty-only and recursive.
///
/// # Examples
///
/// ```no_run
/// use dirsort::folder_manager::{FolderManager, FolderStatus};
///
/// let manager = FolderManager::new("/tmp/sorted").expect("base path");
/// assert_eq!(manager.create_folder("Word_Files").unwrap(), FolderStatus::Created);
/// assert_eq!(manager.create_folder("Word_Files").unwrap(), FolderStatus::AlreadyExists);
/// ```
use crate::error::{FolderError, FolderResult, RESERVED_CHARS};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of an idempotent folder creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FolderStatus {
    /// The folder did not exist and was created.
    Created,
    /// The folder was already present; nothing was done.
    AlreadyExists,
    /// The folder was not touched (dry run).
    Skipped,
}

/// Creates, lists and deletes subfolders of a base directory.
#[derive(Debug, Clone)]
pub struct FolderManager {
    base_path: PathBuf,
}

impl FolderManager {
    /// Binds a manager to `base_path`, creating it (and any missing parents)
    /// if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the base path cannot be created, or exists but is
    /// not a directory.
    pub fn new(base_path: impl Into<PathBuf>) -> FolderResult<Self> {
        let base_path = base_path.into();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| FolderError::from_io(&base_path, e))?;
            info!(path = %base_path.display(), "created base directory");
        } else if !base_path.is_dir() {
            return Err(FolderError::Io {
                path: base_path,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "base path is not a directory"),
            });
        }

        Ok(Self { base_path })
    }

    /// The directory this manager operates on.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns true iff `name` is non-empty and contains none of the
    /// reserved characters `< > : " / \ | ? *`.
    pub fn validate_name(name: &str) -> bool {
        !name.is_empty() && !name.contains(RESERVED_CHARS)
    }

    /// Like [`validate_name`], but also refuses the `.` and `..` aliases,
    /// which would resolve to the base path or its parent.
    ///
    /// [`validate_name`]: FolderManager::validate_name
    pub(crate) fn is_folder_name(name: &str) -> bool {
        Self::validate_name(name) && name != "." && name != ".."
    }

    /// Resolves a validated folder name to its full path.
    pub fn folder_path(&self, name: &str) -> FolderResult<PathBuf> {
        if !Self::is_folder_name(name) {
            return Err(FolderError::invalid_name(name));
        }
        Ok(self.base_path.join(name))
    }

    /// Creates `name` under the base path. Creating a folder that already
    /// exists is a no-op that reports [`FolderStatus::AlreadyExists`].
    ///
    /// # Errors
    ///
    /// * `InvalidName` if the name fails validation (no I/O is performed)
    /// * `Io` if a non-directory entry already occupies the name
    /// * `PermissionDenied` / `Io` if the directory cannot be created
    pub fn create_folder(&self, name: &str) -> FolderResult<FolderStatus> {
        let path = self.folder_path(name)?;
        Self::ensure_dir(&path, false)
    }

    /// Creates a multi-segment folder path, including every missing
    /// intermediate directory. Each segment must pass [`validate_name`] and
    /// may not be `.` or `..`.
    ///
    /// [`validate_name`]: FolderManager::validate_name
    pub fn create_nested_folder<S: AsRef<str>>(&self, segments: &[S]) -> FolderResult<FolderStatus> {
        if segments.is_empty() {
            return Err(FolderError::invalid_name(""));
        }

        let mut path = self.base_path.clone();
        for segment in segments {
            let segment = segment.as_ref();
            if !Self::is_folder_name(segment) {
                return Err(FolderError::invalid_name(segment));
            }
            path.push(segment);
        }

        Self::ensure_dir(&path, true)
    }

    fn ensure_dir(path: &Path, nested: bool) -> FolderResult<FolderStatus> {
        if path.is_dir() {
            debug!(path = %path.display(), "folder already exists");
            return Ok(FolderStatus::AlreadyExists);
        }
        if path.exists() {
            return Err(FolderError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a file with this name already exists",
                ),
            });
        }

        let created = if nested {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };

        match created {
            Ok(()) => {
                info!(path = %path.display(), "created folder");
                Ok(FolderStatus::Created)
            }
            // Lost a race with another creator; the folder is there either way.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
                Ok(FolderStatus::AlreadyExists)
            }
            Err(e) => Err(FolderError::from_io(path, e)),
        }
    }

    /// Lists the immediate subdirectories of the base path, in the order the
    /// platform returns them. Files and other non-directory entries are left out.
    pub fn list_folders(&self) -> FolderResult<Vec<String>> {
        let entries =
            fs::read_dir(&self.base_path).map_err(|e| FolderError::from_io(&self.base_path, e))?;

        let mut folders = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FolderError::from_io(&self.base_path, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| FolderError::from_io(entry.path(), e))?;
            if file_type.is_dir() {
                folders.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(folders)
    }

    /// Removes `name` only if it is an empty directory.
    ///
    /// # Errors
    ///
    /// * `InvalidName` if the name fails validation
    /// * `NotFound` if there is no directory with that name
    /// * `NotEmpty` if the directory has any entry; nothing is deleted
    pub fn delete_folder_if_empty(&self, name: &str) -> FolderResult<()> {
        let path = self.existing_dir(name)?;

        let mut entries = fs::read_dir(&path).map_err(|e| FolderError::from_io(&path, e))?;
        if entries.next().is_some() {
            return Err(FolderError::NotEmpty { path });
        }

        fs::remove_dir(&path).map_err(|e| FolderError::from_io(&path, e))?;
        info!(path = %path.display(), "deleted empty folder");
        Ok(())
    }

    /// Removes `name` and everything beneath it.
    ///
    /// # Errors
    ///
    /// * `InvalidName` if the name fails validation
    /// * `NotFound` if there is no directory with that name
    /// * `PermissionDenied` if removal is refused by the OS
    /// * `Io` for any other failure
    pub fn delete_folder_recursive(&self, name: &str) -> FolderResult<()> {
        let path = self.existing_dir(name)?;

        fs::remove_dir_all(&path).map_err(|e| match FolderError::from_io(&path, e) {
            // A vanished child is still a failure of the recursive delete itself.
            FolderError::NotFound { path } => FolderError::Io {
                source: io::Error::new(io::ErrorKind::NotFound, "entry vanished during removal"),
                path,
            },
            other => other,
        })?;
        info!(path = %path.display(), "deleted folder recursively");
        Ok(())
    }

    fn existing_dir(&self, name: &str) -> FolderResult<PathBuf> {
        let path = self.folder_path(name)?;
        if !path.is_dir() {
            return Err(FolderError::NotFound { path });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use tempfile::TempDir;

    fn manager() -> (TempDir, FolderManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let manager = FolderManager::new(temp_dir.path()).expect("Failed to bind manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_new_creates_missing_base_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path().join("a").join("b");

        let manager = FolderManager::new(&base).expect("Failed to bind manager");

        assert!(base.is_dir());
        assert_eq!(manager.base_path(), base.as_path());
    }

    #[test]
    fn test_new_rejects_file_as_base_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").expect("Failed to write file");

        let err = FolderManager::new(&file).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[test]
    fn test_validate_name() {
        assert!(FolderManager::validate_name("Word_Files"));
        assert!(FolderManager::validate_name("Ana-María 40"));
        assert!(!FolderManager::validate_name(""));
        for c in RESERVED_CHARS {
            let name = format!("bad{}name", c);
            assert!(!FolderManager::validate_name(&name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_create_folder_is_idempotent() {
        let (temp_dir, manager) = manager();

        assert_eq!(manager.create_folder("docs").unwrap(), FolderStatus::Created);
        assert_eq!(
            manager.create_folder("docs").unwrap(),
            FolderStatus::AlreadyExists
        );

        let count = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, 1);
        assert!(temp_dir.path().join("docs").is_dir());
    }

    #[test]
    fn test_create_folder_rejects_reserved_characters_without_io() {
        let (temp_dir, manager) = manager();

        for name in ["a<b", "a>b", "a:b", "a\"b", "a/b", "a\\b", "a|b", "a?b", "a*b", ""] {
            let err = manager.create_folder(name).unwrap_err();
            assert!(matches!(err, FolderError::InvalidName { .. }), "{name}");
        }

        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_folder_over_existing_file_fails() {
        let (temp_dir, manager) = manager();
        fs::write(temp_dir.path().join("taken"), "x").unwrap();

        let err = manager.create_folder("taken").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[test]
    fn test_create_nested_folder() {
        let (temp_dir, manager) = manager();

        let status = manager
            .create_nested_folder(&["2024", "invoices", "q1"])
            .unwrap();
        assert_eq!(status, FolderStatus::Created);
        assert!(temp_dir.path().join("2024/invoices/q1").is_dir());

        let again = manager
            .create_nested_folder(&["2024", "invoices", "q1"])
            .unwrap();
        assert_eq!(again, FolderStatus::AlreadyExists);
    }

    #[test]
    fn test_create_nested_folder_validates_every_segment() {
        let (temp_dir, manager) = manager();

        let err = manager.create_nested_folder(&["ok", "not?ok"]).unwrap_err();
        assert!(matches!(err, FolderError::InvalidName { name } if name == "not?ok"));
        assert!(!temp_dir.path().join("ok").exists());

        let empty: [&str; 0] = [];
        assert!(manager.create_nested_folder(&empty).is_err());
    }

    #[test]
    fn test_list_folders_excludes_files() {
        let (temp_dir, manager) = manager();
        manager.create_folder("one").unwrap();
        manager.create_folder("two").unwrap();
        fs::write(temp_dir.path().join("file.txt"), "x").unwrap();

        let mut folders = manager.list_folders().unwrap();
        folders.sort();
        assert_eq!(folders, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_delete_if_empty_removes_empty_folder() {
        let (temp_dir, manager) = manager();
        manager.create_folder("empty").unwrap();

        manager.delete_folder_if_empty("empty").unwrap();
        assert!(!temp_dir.path().join("empty").exists());
    }

    #[test]
    fn test_delete_if_empty_refuses_non_empty_folder() {
        let (temp_dir, manager) = manager();
        manager.create_folder("full").unwrap();
        let inner = temp_dir.path().join("full").join("keep.txt");
        fs::write(&inner, "precious").unwrap();

        let err = manager.delete_folder_if_empty("full").unwrap_err();
        assert!(matches!(err, FolderError::NotEmpty { .. }));
        assert_eq!(fs::read_to_string(&inner).unwrap(), "precious");
    }

    #[test]
    fn test_delete_if_empty_missing_folder_is_not_found() {
        let (_temp_dir, manager) = manager();
        let err = manager.delete_folder_if_empty("ghost").unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_delete_recursive_removes_descendants() {
        let (temp_dir, manager) = manager();
        manager
            .create_nested_folder(&["tree", "branch", "leaf"])
            .unwrap();
        fs::write(temp_dir.path().join("tree/root.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("tree/branch/leaf/deep.txt"), "b").unwrap();

        manager.delete_folder_recursive("tree").unwrap();

        assert!(!temp_dir.path().join("tree").exists());
        assert!(!manager.list_folders().unwrap().contains(&"tree".to_string()));
    }

    #[test]
    fn test_delete_recursive_on_file_is_not_found() {
        let (temp_dir, manager) = manager();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        let err = manager.delete_folder_recursive("notes.txt").unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_delete_rejects_invalid_names() {
        let (_temp_dir, manager) = manager();
        assert!(matches!(
            manager.delete_folder_recursive("../escape").unwrap_err(),
            FolderError::InvalidName { .. }
        ));
        assert!(matches!(
            manager.delete_folder_if_empty("").unwrap_err(),
            FolderError::InvalidName { .. }
        ));
        assert!(matches!(
            manager.delete_folder_recursive("..").unwrap_err(),
            FolderError::InvalidName { .. }
        ));
        assert!(manager.base_path().is_dir());
    }

    #[test]
    fn test_dot_aliases_are_not_folder_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path().join("base");
        let manager = FolderManager::new(&base).expect("Failed to bind manager");

        for name in [".", ".."] {
            assert!(FolderManager::validate_name(name));
            assert!(matches!(
                manager.folder_path(name).unwrap_err(),
                FolderError::InvalidName { .. }
            ));
            assert!(matches!(
                manager.create_folder(name).unwrap_err(),
                FolderError::InvalidName { .. }
            ));
            assert!(matches!(
                manager.create_nested_folder(&["sub", name]).unwrap_err(),
                FolderError::InvalidName { .. }
            ));
            assert!(matches!(
                manager.delete_folder_if_empty(name).unwrap_err(),
                FolderError::InvalidName { .. }
            ));
        }

        assert!(base.is_dir());
        assert_eq!(fs::read_dir(&base).unwrap().count(), 0);
        // Dotted names that are not aliases are ordinary folders.
        assert_eq!(manager.create_folder("...").unwrap(), FolderStatus::Created);
        assert_eq!(manager.create_folder(".config").unwrap(), FolderStatus::Created);
    }

    #[test]
    fn test_delete_recursive_over_file_leaves_it_alone() {
        let (temp_dir, manager) = manager();
        fs::write(temp_dir.path().join("report"), "x").unwrap();

        let err = manager.delete_folder_recursive("report").unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert_eq!(err.path(), temp_dir.path().join("report"));
        assert_eq!(fs::read_to_string(temp_dir.path().join("report")).unwrap(), "x");
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_recursive_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let (temp_dir, manager) = manager();
        manager
            .create_nested_folder(&["locked", "inner"])
            .unwrap();
        let locked = temp_dir.path().join("locked");
        fs::write(locked.join("inner/file.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions; nothing to observe then.
        let canary = locked.join("canary");
        if fs::write(&canary, "x").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = manager.delete_folder_recursive("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Permission);
        assert!(matches!(err, FolderError::PermissionDenied { .. }));
        assert!(locked.join("inner").is_dir());
    }
}
