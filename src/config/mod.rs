//! Build configuration: target platforms, build mode, and project paths.
//!
//! [`BuildConfig`] is a caller-owned value. It is created with built-in
//! defaults, updated only by [`BuildConfig::merge`], and passed explicitly
//! into [`crate::builder::Builder`]. There is no global configuration state.

use std::fmt;
use std::str::FromStr;

/// Target platform for a build.
///
/// The set is open: any platform name the CLI passes is accepted, so new
/// store targets (edge, whale, ...) work without code changes. Only `chrome`
/// and `firefox` have manifest override blocks today; every other platform
/// ships the common manifest as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Chrome,
    Firefox,
    /// Generic non-browser target; receives the common manifest unchanged.
    Deno,
    /// Any other target name, carried verbatim.
    Custom(String),
}

impl Platform {
    /// The platform name as used in output paths, archive names, and
    /// injected source text.
    pub fn name(&self) -> &str {
        match self {
            Platform::Chrome => "chrome",
            Platform::Firefox => "firefox",
            Platform::Deno => "deno",
            Platform::Custom(name) => name,
        }
    }

    /// Platforms built when none is configured.
    pub fn defaults() -> Vec<Platform> {
        vec![Platform::Chrome, Platform::Firefox, Platform::Deno]
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chrome" => Ok(Platform::Chrome),
            "firefox" => Ok(Platform::Firefox),
            "deno" => Ok(Platform::Deno),
            "" => Err("platform name is empty".to_string()),
            other => Ok(Platform::Custom(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Unminified, console calls kept, watch-capable.
    #[default]
    Dev,
    /// Minified, console calls stripped, one-shot, packaged.
    Prod,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Mode::Dev),
            "prod" => Ok(Mode::Prod),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Dev => "dev",
            Mode::Prod => "prod",
        })
    }
}

/// Optional overrides merged into a [`BuildConfig`].
///
/// A `None` field never overrides the held value. Unknown CLI input never
/// reaches this struct at all; permissive flag parsing lives in
/// [`crate::cli::args`].
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub static_dir: Option<String>,
    pub src_dir: Option<String>,
    pub dist_dir: Option<String>,
    pub import_map: Option<String>,
    pub platform: Option<Platform>,
    pub mode: Option<Mode>,
}

/// Resolved configuration for one builder instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Directory of static assets copied verbatim into each platform tree.
    pub static_dir: String,
    /// Source tree root; must contain `background.ts` and `manifest.json`.
    pub src_dir: String,
    /// Output root; per-platform trees land at `<dist_dir>/<platform>`.
    pub dist_dir: String,
    /// Import map consulted when bundling sources.
    pub import_map: String,
    /// Platform to build; `None` builds every default platform.
    pub platform: Option<Platform>,
    /// Build mode.
    pub mode: Mode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
            src_dir: "./src".to_string(),
            dist_dir: "./dist".to_string(),
            import_map: "./import_map.json".to_string(),
            platform: None,
            mode: Mode::Dev,
        }
    }
}

impl BuildConfig {
    /// Resets every field to its built-in default.
    pub fn init(&mut self) {
        *self = Self::default();
    }

    /// Merges overrides in place. Only fields that are `Some` overwrite the
    /// corresponding value; everything else is left untouched.
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.static_dir {
            self.static_dir = v.clone();
        }
        if let Some(v) = &overrides.src_dir {
            self.src_dir = v.clone();
        }
        if let Some(v) = &overrides.dist_dir {
            self.dist_dir = v.clone();
        }
        if let Some(v) = &overrides.import_map {
            self.import_map = v.clone();
        }
        if let Some(v) = &overrides.platform {
            self.platform = Some(v.clone());
        }
        if let Some(v) = overrides.mode {
            self.mode = v;
        }
    }

    /// Output directory for one platform's build tree.
    pub fn platform_dist(&self, platform: &Platform) -> std::path::PathBuf {
        std::path::Path::new(&self.dist_dir).join(platform.name())
    }

    /// Platforms this configuration builds.
    pub fn platforms(&self) -> Vec<Platform> {
        match &self.platform {
            Some(p) => vec![p.clone()],
            None => Platform::defaults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = BuildConfig::default();
        assert_eq!(config.static_dir, "static");
        assert_eq!(config.src_dir, "./src");
        assert_eq!(config.dist_dir, "./dist");
        assert_eq!(config.import_map, "./import_map.json");
        assert_eq!(config.platform, None);
        assert_eq!(config.mode, Mode::Dev);
    }

    #[test]
    fn merge_overwrites_only_set_fields() {
        let mut config = BuildConfig::default();
        config.merge(&ConfigOverrides {
            dist_dir: Some("./out".to_string()),
            platform: Some(Platform::Firefox),
            ..Default::default()
        });

        assert_eq!(config.dist_dir, "./out");
        assert_eq!(config.platform, Some(Platform::Firefox));
        // untouched fields keep their defaults
        assert_eq!(config.src_dir, "./src");
        assert_eq!(config.mode, Mode::Dev);
    }

    #[test]
    fn init_resets_merged_values() {
        let mut config = BuildConfig::default();
        config.merge(&ConfigOverrides {
            mode: Some(Mode::Prod),
            static_dir: Some("assets".to_string()),
            ..Default::default()
        });

        config.init();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn unknown_platform_names_stay_open() {
        let platform: Platform = "edge".parse().unwrap();
        assert_eq!(platform, Platform::Custom("edge".to_string()));
        assert_eq!(platform.name(), "edge");
        assert!("".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_dist_joins_platform_name() {
        let config = BuildConfig::default();
        assert_eq!(
            config.platform_dist(&Platform::Chrome),
            std::path::Path::new("./dist/chrome")
        );
    }
}
