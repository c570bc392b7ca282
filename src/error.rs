//! Error types for the packaging pipeline.
//!
//! One taxonomy for the whole pipeline: manifest specialization, source
//! bundling, and archive packaging all fail through [`BundleError`].
//! Per-entry archive failures are deliberately *not* represented here:
//! they are data (see [`crate::archive::FailedEntry`]) so that partial
//! failure stays assertable by callers instead of only visible in logs.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum BundleError {
    /// Manifest template is not valid JSON.
    ///
    /// Fatal for that platform's manifest write; other platforms are
    /// unaffected.
    #[error("manifest is not valid JSON: {0}")]
    ManifestParse(#[source] serde_json::Error),

    /// Prod-mode stripping expects `commands` and `options_ui` to exist
    /// as objects. Their absence is fatal, never defaulted.
    #[error("manifest has no `{key}` object to strip in prod mode")]
    ManifestShape {
        /// The missing or malformed top-level key
        key: &'static str,
    },

    /// The external bundler exited with a failure.
    ///
    /// Fatal in one-shot builds; logged and tolerated in watch mode.
    #[error("bundler failed: {detail}")]
    Bundle {
        /// Bundler stderr or invocation failure detail
        detail: String,
    },

    /// A required external tool is not installed.
    #[error("`{tool}` not found in PATH; install it to bundle sources")]
    MissingTool {
        /// Name of the missing executable
        tool: &'static str,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors outside the manifest path (e.g. import map parsing)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Whole-archive failure from the zip writer (not a per-entry error)
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive writer worker could not be joined.
    ///
    /// Raised only when no earlier, more specific error exists; shutdown
    /// failures never mask the error that caused them.
    #[error("archive worker shutdown failed: {detail}")]
    WorkerShutdown {
        /// Join error detail
        detail: String,
    },

    /// File watcher errors in dev mode
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}
