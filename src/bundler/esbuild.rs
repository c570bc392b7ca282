//! esbuild invocation: tool detection, flag construction, execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

use crate::config::Mode;
use crate::error::{BundleError, Result};

/// Location of the esbuild binary, if installed.
///
/// Cached result to avoid repeated PATH lookups across rebuilds in watch
/// mode.
pub static ESBUILD: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("esbuild") {
    Ok(path) => {
        log::debug!("Found esbuild at: {}", path.display());

        match std::process::Command::new(&path).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::info!("esbuild available: {}", version.trim());
                Some(path)
            }
            Ok(output) => {
                log::warn!(
                    "esbuild found at {} but --version check failed (exit code: {:?})",
                    path.display(),
                    output.status.code()
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "esbuild found at {} but failed to execute: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }
    Err(e) => {
        log::debug!("esbuild not found in PATH: {e}");
        None
    }
});

/// A parsed `import_map.json`.
///
/// Only the `imports` table is honored; scopes are a browser-runtime
/// concern with no bundling equivalent.
#[derive(Debug, Default, Deserialize)]
pub struct ImportMap {
    #[serde(default)]
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    /// Loads an import map, treating a missing file as an empty map.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no import map at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Converts the imports table into esbuild `--alias` flags.
    pub fn alias_flags(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|(name, target)| format!("--alias:{name}={target}"))
            .collect()
    }
}

/// Builds the esbuild argument list for one compile.
pub fn build_args(entry: &Path, outfile: &Path, mode: Mode, import_map: &ImportMap) -> Vec<String> {
    let mut args = vec![
        entry.to_string_lossy().into_owned(),
        "--bundle".to_string(),
        "--format=esm".to_string(),
        format!("--outfile={}", outfile.display()),
    ];
    args.extend(import_map.alias_flags());

    if mode == Mode::Prod {
        args.push("--minify".to_string());
        args.push("--drop:console".to_string());
    }

    args
}

/// Runs esbuild once and waits for it to finish.
///
/// The child is fully reaped before returning, so no bundler resources
/// outlive a one-shot build.
pub async fn run(args: &[String]) -> Result<()> {
    let binary = ESBUILD
        .as_ref()
        .ok_or(BundleError::MissingTool { tool: "esbuild" })?;

    let output = tokio::process::Command::new(binary)
        .args(args)
        .output()
        .await
        .map_err(|e| BundleError::Bundle {
            detail: format!("failed to spawn esbuild: {e}"),
        })?;

    if !output.status.success() {
        return Err(BundleError::Bundle {
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
