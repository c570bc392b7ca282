//! Source bundling orchestration.
//!
//! The heavy lifting is done by the external esbuild binary; this module
//! prepares its input and drives it. Because esbuild cannot run our text
//! transforms itself, sources are first *staged*: the whole source tree is
//! mirrored into a temporary directory with every matching
//! [`ModuleTransform`] applied, and esbuild bundles the staged entry point.
//!
//! One-shot (prod) builds surface a bundler failure as fatal. Watch mode
//! re-stages and re-bundles on every source change, logging failures and
//! carrying on.

mod esbuild;
mod watch;

pub use esbuild::{ESBUILD, ImportMap, build_args};

use std::path::Path;

use tempfile::TempDir;

use crate::config::{BuildConfig, Platform};
use crate::error::{BundleError, Result};
use crate::transform::ModuleTransform;

/// Name of the bundle entry point within the source tree.
const ENTRY: &str = "background.ts";

/// Mirrors the source tree into a staging directory, applying every
/// matching transform to every file.
///
/// Files no transform claims are copied through unchanged. The returned
/// [`TempDir`] owns the staging tree; dropping it removes the tree.
pub async fn stage_sources(
    src_dir: &Path,
    transforms: &[Box<dyn ModuleTransform>],
) -> Result<TempDir> {
    let stage = TempDir::with_prefix("webext-stage-")?;

    for entry in walkdir::WalkDir::new(src_dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            BundleError::Io(std::io::Error::other(format!(
                "walking {}: {e}",
                src_dir.display()
            )))
        })?;
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|e| BundleError::Io(std::io::Error::other(e.to_string())))?;
        let dest = stage.path().join(rel);

        if entry.file_type().is_dir() {
            tokio::fs::create_dir_all(&dest).await?;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let matching: Vec<_> = transforms
            .iter()
            .filter(|t| t.applies_to(entry.path()))
            .collect();

        if matching.is_empty() {
            tokio::fs::copy(entry.path(), &dest).await?;
        } else {
            let mut content = tokio::fs::read_to_string(entry.path()).await?;
            for transform in matching {
                content = transform.apply(entry.path(), &content);
            }
            tokio::fs::write(&dest, content).await?;
        }
    }

    Ok(stage)
}

/// Compiles the entry point for one platform into
/// `<dist_dir>/<platform>/background.js`.
///
/// Resolves the entry and import map from the configuration, stages the
/// transformed sources, and runs esbuild once. Prod mode minifies and
/// strips console calls.
pub async fn compile(
    config: &BuildConfig,
    platform: &Platform,
    transforms: &[Box<dyn ModuleTransform>],
) -> Result<()> {
    let stage = stage_sources(Path::new(&config.src_dir), transforms).await?;
    let entry = stage.path().join(ENTRY);
    if !entry.is_file() {
        return Err(BundleError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("entry point {ENTRY} not found in {}", config.src_dir),
        )));
    }

    let import_map = ImportMap::load(Path::new(&config.import_map)).await?;
    let out_dir = config.platform_dist(platform);
    tokio::fs::create_dir_all(&out_dir).await?;
    let outfile = out_dir.join("background.js");

    let args = build_args(&entry, &outfile, config.mode, &import_map);
    esbuild::run(&args).await?;
    log::debug!("bundled {} for {platform}", outfile.display());

    Ok(())
}

/// Watch loop for dev mode. Never returns under normal operation; the
/// process is expected to be terminated externally.
///
/// Every debounced source change triggers a full re-stage and re-compile.
/// A failed rebuild is logged and the loop keeps watching.
pub async fn watch(
    config: &BuildConfig,
    platform: &Platform,
    transforms: &[Box<dyn ModuleTransform>],
) -> Result<()> {
    let src_dir = Path::new(&config.src_dir);
    let (_watcher, mut changes) = watch::watch_sources(src_dir)?;
    log::info!("watching {} for changes", src_dir.display());

    while let Some(path) = changes.recv().await {
        log::debug!("change detected: {}", path.display());
        match compile(config, platform, transforms).await {
            Ok(()) => log::info!("rebuilt {platform} bundle"),
            Err(e) => log::error!("rebuild failed: {e}"),
        }
    }

    Ok(())
}
