// ============================================================
// Infrastructure — Checkpoint Discovery
// ============================================================
// Lists checkpoint files in a run directory, newest first.
//
// Checkpoint names encode recency, so reverse lexicographic
// order is newest-first:
//
//   checkpoints/
//     epoch_03.pt   ← returned first
//     epoch_02.pt
//     epoch_01.pt
//     notes.txt     ← ignored (wrong extension)
//
// A missing directory is an error, an empty one is not.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, UtilError};

/// Extension used by checkpoint files unless configured otherwise
pub const DEFAULT_CHECKPOINT_EXT: &str = "pt";

/// All `*.pt` files in `checkpoint_dir`, sorted by name descending.
pub fn get_latest_chkpts(checkpoint_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    latest_checkpoints(checkpoint_dir, DEFAULT_CHECKPOINT_EXT)
}

/// All files with extension `ext` in `checkpoint_dir`, sorted by name
/// descending.
pub fn latest_checkpoints(checkpoint_dir: impl AsRef<Path>, ext: &str) -> Result<Vec<PathBuf>> {
    let dir = checkpoint_dir.as_ref();
    let dir_error = |source| UtilError::CheckpointDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            found.push(path);
        }
    }

    // b.cmp(a) → descending
    found.sort_by(|a, b| b.cmp(a));

    tracing::debug!(
        "Found {} '.{}' checkpoints in '{}'",
        found.len(),
        ext,
        dir.display()
    );
    Ok(found)
}

/// The newest `*.pt` checkpoint in `checkpoint_dir`, if any.
pub fn latest_checkpoint(checkpoint_dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    Ok(get_latest_chkpts(checkpoint_dir)?.into_iter().next())
}
