//! File system utilities for the build pipeline.

use std::io;
use std::path::Path;

use tokio::fs;

use crate::error::{BundleError, Result};

/// Creates all of the directories of the specified path, erasing it first
/// if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        match fs::remove_dir_all(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(fs::create_dir_all(path).await?)
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves relative subdirectory structure and overwrites pre-existing
/// files at the destination. Fails if the source path is not a directory
/// or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(BundleError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{from:?} does not exist"),
        )));
    }
    if !from.is_dir() {
        return Err(BundleError::Io(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{from:?} is not a directory"),
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking walk + copy to the dedicated thread pool.
    tokio::task::spawn_blocking(move || -> Result<()> {
        std::fs::create_dir_all(&to)?;

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(|e| {
                BundleError::Io(io::Error::other(format!("walking {from:?}: {e}")))
            })?;
            debug_assert!(entry.path().starts_with(&from));
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| BundleError::Io(io::Error::other(e.to_string())))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)?;
            } else {
                if let Some(parent) = dest_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| BundleError::WorkerShutdown {
        detail: format!("directory copy task panicked: {e}"),
    })?
}
