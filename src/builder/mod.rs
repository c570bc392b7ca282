//! Build orchestration.
//!
//! [`Builder`] sequences the whole pipeline for each target platform:
//! static-asset copy, manifest specialization, and source bundling (which
//! touch disjoint output paths and run concurrently), then archive
//! packaging strictly after the platform tree is complete.
//!
//! Platform builds are independent of each other; a prod build runs them
//! concurrently. Errors stay local to their platform: a broken manifest for
//! firefox does not abort the chrome build, but every platform failure is
//! surfaced to the caller.

mod checksum;

pub use checksum::calculate_sha256;

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::archive::{self, FailedEntry};
use crate::config::{BuildConfig, Mode, Platform};
use crate::error::{BundleError, Result};
use crate::transform::{ModuleTransform, PlatformInjection};
use crate::{bundler, fsutil, manifest};

/// One platform's packaged build output.
#[derive(Debug)]
pub struct BuiltArtifact {
    pub platform: Platform,
    /// Path of the produced zip archive.
    pub path: PathBuf,
    /// Archive size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the archive.
    pub checksum: String,
    /// Files skipped during packaging, if any.
    pub skipped: Vec<FailedEntry>,
}

/// Pipeline orchestrator. Owns one configuration for its whole lifetime.
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    /// Creates a builder over an explicit, caller-owned configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Read-only snapshot of the held configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Runs the pipeline for every configured platform.
    ///
    /// Prod: builds all platforms concurrently, packaging each one, and
    /// returns the produced artifacts. Dev: builds the configured platform
    /// (chrome when unset) once, then watches sources until terminated;
    /// nothing is packaged.
    pub async fn build(&self) -> Result<Vec<BuiltArtifact>> {
        log::info!("building with {:?}", self.config);

        match self.config.mode {
            Mode::Prod => self.build_all().await,
            Mode::Dev => {
                let platform = self
                    .config
                    .platform
                    .clone()
                    .unwrap_or(Platform::Chrome);
                self.build_dev(&platform).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn build_all(&self) -> Result<Vec<BuiltArtifact>> {
        let mut builds = JoinSet::new();
        for platform in self.config.platforms() {
            let config = self.config.clone();
            builds.spawn(async move { build_platform(config, platform).await });
        }

        let mut artifacts = Vec::new();
        let mut first_error = None;
        while let Some(joined) = builds.join_next().await {
            match joined {
                Ok(Ok(artifact)) => artifacts.push(artifact),
                Ok(Err(e)) => {
                    // Sibling platforms run to completion regardless.
                    log::error!("platform build failed: {e}");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(BundleError::WorkerShutdown {
                        detail: e.to_string(),
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                for artifact in &artifacts {
                    log::info!(
                        "{}: {} ({} bytes, sha256 {})",
                        artifact.platform,
                        artifact.path.display(),
                        artifact.size,
                        artifact.checksum
                    );
                }
                Ok(artifacts)
            }
        }
    }

    async fn build_dev(&self, platform: &Platform) -> Result<()> {
        let transforms = injection_for(platform);

        self.copy_static(platform).await?;
        self.write_manifest(platform).await?;

        // First compile surfaces errors like a one-shot build would; the
        // watch loop afterwards only logs them.
        if let Err(e) = bundler::compile(&self.config, platform, &transforms).await {
            log::error!("initial build failed: {e}");
        }
        bundler::watch(&self.config, platform, &transforms).await
    }

    /// Copies static assets into the platform's output tree.
    pub async fn copy_static(&self, platform: &Platform) -> Result<()> {
        fsutil::copy_dir(
            Path::new(&self.config.static_dir),
            &self.config.platform_dist(platform),
        )
        .await
    }

    /// Reads the manifest template, specializes it, and writes the result
    /// into the platform's output tree.
    pub async fn write_manifest(&self, platform: &Platform) -> Result<()> {
        let template = Path::new(&self.config.src_dir).join("manifest.json");
        let raw = tokio::fs::read_to_string(&template).await?;
        let specialized = manifest::specialize(&raw, self.config.mode, platform)?;

        let out_dir = self.config.platform_dist(platform);
        fsutil::create_dir_all(&out_dir, false).await?;
        tokio::fs::write(out_dir.join("manifest.json"), specialized).await?;
        Ok(())
    }

    /// Bundles the entry script for one platform.
    pub async fn bundle_source(&self, platform: &Platform) -> Result<()> {
        bundler::compile(&self.config, platform, &injection_for(platform)).await
    }

    /// Packages one platform's completed output tree into
    /// `<platform>.zip` in the current working directory.
    ///
    /// Must only run after the platform tree is complete.
    pub async fn package(&self, platform: &Platform) -> Result<archive::PackageReport> {
        archive::package(&self.config.platform_dist(platform), platform.name()).await
    }
}

fn injection_for(platform: &Platform) -> Vec<Box<dyn ModuleTransform>> {
    vec![Box::new(PlatformInjection::new(platform))]
}

/// Full prod pipeline for one platform: populate the tree, package it,
/// checksum the archive.
async fn build_platform(config: BuildConfig, platform: Platform) -> Result<BuiltArtifact> {
    let builder = Builder::new(config);

    // These three touch disjoint paths under dist/<platform>.
    tokio::try_join!(
        builder.copy_static(&platform),
        builder.write_manifest(&platform),
        builder.bundle_source(&platform),
    )?;

    // Packaging starts only once the tree is complete.
    let report = builder.package(&platform).await?;

    let size = tokio::fs::metadata(&report.archive_path).await?.len();
    let checksum = calculate_sha256(&report.archive_path).await?;

    Ok(BuiltArtifact {
        platform,
        path: report.archive_path,
        size,
        checksum,
        skipped: report.failed,
    })
}
