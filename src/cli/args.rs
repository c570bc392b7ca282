//! Command line argument parsing.
//!
//! Parsing is deliberately permissive: unknown flags are accepted and
//! ignored rather than rejected, so the tool keeps working when invoked by
//! wrappers that pass extra options. A pre-pass lexes the raw argument
//! vector and keeps only the recognized `--key value` / `--key=value`
//! pairs (plus help/version); clap then parses the filtered vector, so a
//! recognized flag overrides its default no matter where an unknown token
//! appears. Recognized flags with unparseable values are ignored the same
//! way, leaving the built-in default in place.

use clap::Parser;

use crate::config::{ConfigOverrides, Mode, Platform};

/// Flags the pipeline understands; everything else is skipped by the
/// pre-pass.
const RECOGNIZED: &[&str] = &[
    "--static-dir",
    "--src-dir",
    "--dist-dir",
    "--import-map",
    "--platform",
    "--mode",
];

/// Multi-target packaging pipeline for browser-extension source trees
#[derive(Parser, Debug, Default)]
#[command(
    name = "webext-bundle",
    version,
    about = "Builds, specializes, and packages a browser extension per target platform",
    long_about = "Builds a browser extension from one TypeScript source tree and one manifest \
template. Per platform (chrome, firefox, deno, ...) the pipeline copies static assets, writes \
a specialized manifest, bundles the entry script with the platform baked in, and in prod mode \
packages the result as <platform>.zip.

Unknown flags are ignored."
)]
pub struct Args {
    /// Directory of static assets copied into every platform tree
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<String>,

    /// Source tree containing background.ts and manifest.json
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<String>,

    /// Output root for per-platform build trees
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<String>,

    /// Import map consulted while bundling
    #[arg(long, value_name = "FILE")]
    pub import_map: Option<String>,

    /// Platform to build (chrome, firefox, deno, ...); default: all
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Build mode: dev or prod
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,
}

/// Filters an argument vector down to the tokens clap should see.
///
/// Keeps `--key value` and `--key=value` for every recognized key, and the
/// help/version flags. A recognized flag at the end of the line with no
/// value is dropped rather than left to trip a usage error. Everything
/// else is ignored.
pub fn recognized_args<I>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = argv.into_iter();
    let mut kept = vec![iter.next().unwrap_or_else(|| "webext-bundle".to_string())];

    while let Some(token) = iter.next() {
        if matches!(token.as_str(), "--help" | "-h" | "--version" | "-V") {
            kept.push(token);
        } else if RECOGNIZED.contains(&token.as_str()) {
            if let Some(value) = iter.next() {
                kept.push(token);
                kept.push(value);
            }
        } else if RECOGNIZED.iter().any(|key| is_inline_assignment(&token, key)) {
            kept.push(token);
        } else {
            log::debug!("ignoring unrecognized argument: {token}");
        }
    }

    kept
}

/// Whether `token` is `<key>=<value>` for the given recognized key.
fn is_inline_assignment(token: &str, key: &str) -> bool {
    token
        .strip_prefix(key)
        .is_some_and(|rest| rest.starts_with('='))
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse_from(recognized_args(std::env::args()))
    }

    /// Converts parsed flags into configuration overrides.
    ///
    /// Values that do not parse into their enum are dropped here, not
    /// rejected; the configuration keeps its default.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            static_dir: self.static_dir.clone(),
            src_dir: self.src_dir.clone(),
            dist_dir: self.dist_dir.clone(),
            import_map: self.import_map.clone(),
            platform: self.platform.as_deref().and_then(|s| {
                s.parse::<Platform>()
                    .map_err(|e| log::debug!("ignoring --platform: {e}"))
                    .ok()
            }),
            mode: self.mode.as_deref().and_then(|s| {
                s.parse::<Mode>()
                    .map_err(|e| log::debug!("ignoring --mode: {e}"))
                    .ok()
            }),
        }
    }
}
