//! Filesystem helpers shared by the pipeline stages.
//!
//! Directory listings are always sorted so that build output never depends
//! on the order the OS happens to return entries in.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{BuildError, Result};

/// Reads a file, returning `None` if it does not exist.
///
/// Existence check and read are a single operation, so there is no window
/// between "exists" and "read" for the file to disappear in.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// Reads a file that must exist.
pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

/// Writes `contents` to `path` through a temporary file in the same
/// directory, renamed into place once fully written.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| BuildError::io(&dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| BuildError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| BuildError::io(path, e.error))?;
    Ok(())
}

/// Lists regular files directly inside `dir` (no recursion), sorted by name.
///
/// When `suffix` is given only names ending in it are returned. A missing
/// directory yields an empty list.
pub fn list_files(dir: &Path, suffix: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BuildError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = match suffix {
            Some(suffix) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix)),
            None => true,
        };
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Recursively deletes every file under `dir` whose name ends in `suffix`.
///
/// Returns the deleted paths in sorted order.
pub fn remove_recursive(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    walk_remove(dir, suffix, &mut removed)?;
    removed.sort();
    Ok(removed)
}

fn walk_remove(current: &Path, suffix: &str, removed: &mut Vec<PathBuf>) -> Result<()> {
    let entries = match fs::read_dir(current) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(BuildError::io(current, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(current, e))?;
        let path = entry.path();

        if path.is_dir() {
            walk_remove(&path, suffix, removed)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix))
        {
            fs::remove_file(&path).map_err(|e| BuildError::io(&path, e))?;
            removed.push(path);
        }
    }
    Ok(())
}
