//! JSON file helpers for snapshot files
//!
//! Snapshots are written to a sibling temp file, synced, then renamed over
//! the target, so a reader never sees a half-written backup.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{GestionError, GestionResult};

/// Read and parse a JSON file that must exist
pub fn read_json_required<T, P>(path: P) -> GestionResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| GestionError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| GestionError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write pretty JSON to `path` via temp file and rename
pub fn write_json_atomic<T, P>(path: P, data: &T) -> GestionResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            GestionError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let result = write_synced(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path)
            .map_err(|e| GestionError::Io(format!("Failed to rename temp file: {}", e)))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_synced<T: Serialize>(path: &Path, data: &T) -> GestionResult<()> {
    let file = File::create(path)
        .map_err(|e| GestionError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer
        .flush()
        .map_err(|e| GestionError::Io(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| GestionError::Io(format!("Failed to sync data: {}", e)))?;
    Ok(())
}
