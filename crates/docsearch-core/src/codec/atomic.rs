//! Atomic file operations for writing index files.
//!
//! Writes go through a temp file next to the target:
//! 1. Write to temp file with unique PID+TID suffix
//! 2. fsync to ensure data reaches disk
//! 3. Optional backup of the previous file
//! 4. Atomic rename to target path

use crate::config::IndexFileConfig;
use crate::{DocSearchError, Result};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::{debug, warn};

/// Read a whole file as UTF-8.
///
/// A missing file is reported as [`DocSearchError::FileNotFound`].
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| DocSearchError::io_with_path(e, path))
}

/// Path of the backup kept for `path`: `search_index.js` -> `search_index.js.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, IndexFileConfig::BACKUP_SUFFIX)
}

/// Write `contents` to `path` atomically.
pub fn atomic_write_text(path: &Path, contents: &str, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| DocSearchError::Io {
                message: format!("Failed to create directory {}", parent.display()),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }
    }

    let temp_path = sibling_with_suffix(
        path,
        &format!("{}.{}.tmp", process::id(), thread_id()),
    );

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| DocSearchError::Io {
                message: format!("Failed to create temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| DocSearchError::Io {
                message: format!("Failed to write temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        file.sync_all().map_err(|e| DocSearchError::Io {
            message: format!("Failed to sync temp file {}", temp_path.display()),
            path: Some(temp_path.clone()),
            source: Some(e),
        })?;
    }

    if keep_backup && path.exists() {
        let backup = backup_path(path);
        if let Err(e) = fs::copy(path, &backup) {
            // Backup failure is not fatal
            warn!("Failed to create backup {}: {}", backup.display(), e);
        } else {
            debug!("Created backup: {}", backup.display());
        }
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(DocSearchError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        });
    }

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from(IndexFileConfig::FILE_NAME));
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Get a unique thread identifier.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("search_index.js");

        atomic_write_text(&path, "var x = {\"docs\":[]}", false).unwrap();
        assert_eq!(read_text(&path).unwrap(), "var x = {\"docs\":[]}");
    }

    #[test]
    fn test_atomic_write_creates_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("search_index.js");

        atomic_write_text(&path, "first", true).unwrap();
        atomic_write_text(&path, "second", true).unwrap();

        let backup = backup_path(&path);
        assert!(backup.ends_with("search_index.js.bak"));
        assert_eq!(read_text(&backup).unwrap(), "first");
        assert_eq!(read_text(&path).unwrap(), "second");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("search_index.js");

        atomic_write_text(&path, "content", false).unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("search_index.js")]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.js");

        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, DocSearchError::FileNotFound(_)));
    }

    #[test]
    fn test_atomic_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build").join("search_index.js");

        atomic_write_text(&path, "nested", false).unwrap();
        assert!(path.exists());
    }
}
