//! Directory materialization and JSON artifact helpers.

use crate::errors::PipelineError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Creates every directory in `paths`, including missing parents.
///
/// Directories that already exist are left alone, so calling this twice with
/// the same set is harmless. With `verbose` set, each path is logged.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] naming the first directory that could not
/// be created.
pub fn create_directories<P: AsRef<Path>>(paths: &[P], verbose: bool) -> Result<(), PipelineError> {
    for path in paths {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| PipelineError::io(path, e))?;
        if verbose {
            info!(path = %path.display(), "Created directory at: {}", path.display());
        }
    }
    Ok(())
}

/// Writes `data` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| PipelineError::Internal(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))?;
    info!(path = %path.display(), "json file saved at: {}", path.display());
    Ok(())
}

/// Reads a JSON file into `T`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let value = serde_json::from_str(&raw).map_err(|e| {
        PipelineError::Internal(format!("Invalid JSON in {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), "json file loaded successfully from: {}", path.display());
    Ok(value)
}

/// Writes `data` as a compact binary blob.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_bin<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), PipelineError> {
    let bytes = serde_json::to_vec(data)
        .map_err(|e| PipelineError::Internal(format!("binary serialization failed: {e}")))?;
    std::fs::write(path, bytes).map_err(|e| PipelineError::io(path, e))?;
    info!(path = %path.display(), "binary file saved at: {}", path.display());
    Ok(())
}

/// Reads a blob written by [`save_bin`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode into `T`.
pub fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
    let value = serde_json::from_slice(&bytes).map_err(|e| {
        PipelineError::Internal(format!("Invalid binary file {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), "binary file loaded from: {}", path.display());
    Ok(value)
}

/// Returns the file size in kilobytes, formatted as `~ N KB`.
///
/// Halves round to the nearest even kilobyte.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read.
pub fn get_size(path: &Path) -> Result<String, PipelineError> {
    let bytes = std::fs::metadata(path)
        .map_err(|e| PipelineError::io(path, e))?
        .len();
    Ok(format!("~ {} KB", round_kb(bytes)))
}

fn round_kb(bytes: u64) -> u64 {
    let (kb, rest) = (bytes / 1024, bytes % 1024);
    match rest.cmp(&512) {
        std::cmp::Ordering::Greater => kb + 1,
        std::cmp::Ordering::Equal if kb % 2 == 1 => kb + 1,
        _ => kb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_create_directories_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = [tmp.path().join("a/b"), tmp.path().join("c")];

        create_directories(&paths, true).unwrap();
        create_directories(&paths, false).unwrap();

        assert!(paths.iter().all(|p| p.is_dir()));
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_create_directories_order_independent() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("root/child");
        let parent = tmp.path().join("root");

        create_directories(&[nested.clone(), parent.clone()], false).unwrap();
        assert!(nested.is_dir() && parent.is_dir());
    }

    #[test]
    fn test_create_directories_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let err = create_directories(&[file.join("sub")], false).unwrap_err();
        assert!(err.to_string().contains("occupied"));
    }

    #[test]
    fn test_json_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scores.json");
        let mut data = BTreeMap::new();
        data.insert("loss".to_string(), 0.25);
        data.insert("accuracy".to_string(), 0.9);

        save_json(&path, &data).unwrap();
        let loaded: BTreeMap<String, f64> = load_json(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_load_json_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result: Result<serde_json::Value, _> = load_json(&tmp.path().join("absent.json"));
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }

    #[test]
    fn test_get_size_rounds_to_kb() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("blob.bin");
        std::fs::write(&path, vec![0u8; 3 * 1024 + 100]).unwrap();

        assert_eq!(get_size(&path).unwrap(), "~ 3 KB");
    }

    #[test]
    fn test_get_size_rounds_halves_to_even() {
        assert_eq!(round_kb(0), 0);
        assert_eq!(round_kb(511), 0);
        assert_eq!(round_kb(512), 0);
        assert_eq!(round_kb(513), 1);
        assert_eq!(round_kb(1024 + 512), 2);
        assert_eq!(round_kb(2 * 1024 + 512), 2);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("half.bin");
        std::fs::write(&path, vec![0u8; 512]).unwrap();
        assert_eq!(get_size(&path).unwrap(), "~ 0 KB");
    }

    #[test]
    fn test_save_bin_then_load_bin() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("class_names.bin");
        let names = vec!["cat".to_string(), "dog".to_string()];

        save_bin(&path, &names).unwrap();
        let loaded: Vec<String> = load_bin(&path).unwrap();
        assert_eq!(loaded, names);

        let wrong: Result<BTreeMap<String, f64>, _> = load_bin(&path);
        assert!(wrong.is_err());
    }
}
