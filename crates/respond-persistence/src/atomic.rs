//! Crash-safe file writes and JSON reads.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PersistenceError, Result};

/// Writes `data` to `path` without ever exposing a partial file.
///
/// Data goes to a temp file in the target directory, which is then renamed
/// over the target. Missing parent directories are created.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Pretty-prints `value` as JSON and writes it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes a JSON file.
///
/// `kind` names the file in errors ("scenario", "layout", ...). Parse
/// failures carry the path and serde's line/column.
pub fn read_json<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T> {
    if !path.exists() {
        return Err(PersistenceError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|e| PersistenceError::InvalidData {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Like `read_json`, but a missing file is `Ok(None)`.
pub fn read_json_optional<T: DeserializeOwned>(
    path: &Path,
    kind: &'static str,
) -> Result<Option<T>> {
    match read_json(path, kind) {
        Ok(value) => Ok(Some(value)),
        Err(PersistenceError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
