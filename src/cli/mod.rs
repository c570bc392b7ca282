//! Command line interface.

mod args;

pub use args::Args;

use crate::builder::Builder;
use crate::config::BuildConfig;
use crate::error::Result;

/// Main CLI entry point.
///
/// Parses arguments, resolves the configuration, and runs the build.
/// Returns the process exit code: 0 on success, 1 on a fatal pipeline
/// error (manifest parse/shape errors, one-shot bundler failures).
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    let mut config = BuildConfig::default();
    config.merge(&args.overrides());

    let builder = Builder::new(config);
    match builder.build().await {
        Ok(_artifacts) => Ok(0),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(1)
        }
    }
}
