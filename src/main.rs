//! webext-bundle - multi-target packager for browser-extension sources.
//!
//! This binary builds per-platform extension trees (specialized manifest,
//! platform-injected bundle, static assets) and packages them as store-ready
//! zip archives, with proper error handling and exit codes.

use std::process;

use webext_bundle::cli;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
