//! Multi-target packaging pipeline for browser-extension source trees.
//!
//! From one TypeScript source tree and one manifest template, the pipeline
//! produces per target platform (chrome, firefox, or a generic target) and
//! per mode (dev/prod):
//!
//! - a specialized `manifest.json`,
//! - a bundled entry script with the platform baked in at build time,
//! - copied static assets,
//! - and, in prod mode, a `<platform>.zip` ready for store submission.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod archive;
pub mod builder;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod manifest;
pub mod transform;

// Re-export commonly used types
pub use builder::{Builder, BuiltArtifact};
pub use config::{BuildConfig, ConfigOverrides, Mode, Platform};
pub use error::{BundleError, Result};
