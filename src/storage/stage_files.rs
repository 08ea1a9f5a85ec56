//! Stage file I/O
//!
//! Each crawl stage hands its output to the next one as a JSON array on
//! disk. Writes go to a temporary file beside the target and are renamed
//! over it, so a reader never observes a half-written array.

use crate::HarvestError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads a stage file
///
/// # Returns
///
/// * `Ok(None)` - The file does not exist (previous stage not run)
/// * `Ok(Some(items))` - Parsed array
/// * `Err(HarvestError::Json)` - The file exists but is not a valid array
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, HarvestError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let items = serde_json::from_str(&content).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(items))
}

/// Serializes `items` as a pretty-printed JSON array and replaces `path` with it
pub fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), HarvestError> {
    let json = serde_json::to_vec_pretty(items).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, &json)?;
    Ok(())
}

/// Replaces the file at `path` with `bytes` via a same-directory rename
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
