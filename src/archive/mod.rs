//! Archive packaging.
//!
//! Walks a finished `dist/<platform>` tree and streams every regular file
//! into a compressed zip. File reads fan out concurrently; the zip writer
//! runs on a single blocking worker that serializes the actual compression,
//! so entry order inside the archive is not deterministic and must not be
//! relied upon.
//!
//! Partial failure is tolerated by design: a file that vanished or cannot
//! be read is logged, recorded in the report, and skipped. The resulting
//! archive is still valid and contains every entry that succeeded. The
//! writer worker is joined exactly once on every exit path.

mod entry;

pub use entry::{ArchiveEntry, clean_entry_name, collect_entries};

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use tokio::task::JoinSet;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{BundleError, Result};

/// One file that could not be added to the archive.
#[derive(Debug)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one packaging run.
#[derive(Debug)]
pub struct PackageReport {
    /// Number of entries written into the archive.
    pub written: usize,
    /// Files that were skipped, with the reason each one failed.
    pub failed: Vec<FailedEntry>,
    /// Where the archive was written.
    pub archive_path: PathBuf,
}

/// Packages `source_dir` into `<archive_base>.zip` in the current working
/// directory.
///
/// The caller must only invoke this once the platform's output tree is
/// complete; packaging an in-progress tree is undefined.
///
/// # Errors
///
/// Whole-archive failures only (zip finalize, writing the payload to disk,
/// worker join). Per-file read failures end up in
/// [`PackageReport::failed`] instead.
pub async fn package(source_dir: &Path, archive_base: &str) -> Result<PackageReport> {
    let source_dir = source_dir.to_path_buf();
    let walk_dir = source_dir.clone();
    let entries =
        tokio::task::spawn_blocking(move || collect_entries(&walk_dir))
            .await
            .map_err(|e| BundleError::WorkerShutdown {
                detail: format!("entry walk panicked: {e}"),
            })??;

    let (tx, rx) = mpsc::channel::<(String, Vec<u8>)>();
    let writer = tokio::task::spawn_blocking(move || write_archive(rx));

    // Fan out reads; the writer drains them in completion order.
    let mut reads = JoinSet::new();
    for entry in entries {
        let tx = tx.clone();
        reads.spawn(async move {
            match tokio::fs::read(&entry.path).await {
                Ok(bytes) => {
                    // Send failure means the writer already died; its error
                    // is picked up at join below.
                    let _ = tx.send((entry.name, bytes));
                    None
                }
                Err(e) => Some(FailedEntry {
                    path: entry.path,
                    error: e.to_string(),
                }),
            }
        });
    }
    drop(tx);

    let mut failed = Vec::new();
    while let Some(joined) = reads.join_next().await {
        if let Some(failure) = read_outcome(joined, &source_dir) {
            log::warn!(
                "skipping archive entry {}: {}",
                failure.path.display(),
                failure.error
            );
            failed.push(failure);
        }
    }

    // All senders are gone; the worker sees the closed channel, finalizes,
    // and terminates. This join is the single mandatory cleanup point.
    let (payload, written) = match writer.await {
        Ok(result) => result?,
        Err(e) => {
            return Err(BundleError::WorkerShutdown {
                detail: e.to_string(),
            });
        }
    };

    let archive_path = PathBuf::from(format!("{archive_base}.zip"));
    tokio::fs::write(&archive_path, payload).await?;
    log::info!(
        "packaged {} ({} entries, {} skipped)",
        archive_path.display(),
        written,
        failed.len()
    );

    Ok(PackageReport {
        written,
        failed,
        archive_path,
    })
}

/// Maps one settled read task onto its failure, if any.
///
/// A task that aborted or panicked loses its entry path; it is still
/// recorded against the packaged tree so that `written` plus `failed`
/// accounts for every walked file.
fn read_outcome(
    joined: std::result::Result<Option<FailedEntry>, tokio::task::JoinError>,
    source_dir: &Path,
) -> Option<FailedEntry> {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => Some(FailedEntry {
            path: source_dir.to_path_buf(),
            error: format!("read task failed: {e}"),
        }),
    }
}

/// Blocking worker: drains the channel and drives the zip writer.
///
/// Compression is Deflate at maximum level. The in-memory payload mirrors
/// how the archive is finalized first and only then streamed to disk.
fn write_archive(rx: mpsc::Receiver<(String, Vec<u8>)>) -> Result<(Vec<u8>, usize)> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut written = 0usize;
    for (name, bytes) in rx {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
        written += 1;
    }

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), written))
}
