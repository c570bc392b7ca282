//! Source transforms applied before the external bundler runs.
//!
//! Transforms are plain text functions behind the [`ModuleTransform`] trait,
//! free of any bundler-specific types, so each one is unit-testable on its
//! own. The staging step in [`crate::bundler`] applies every matching
//! transform to every source module it copies.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Platform;

/// A text-level transform over one source module.
pub trait ModuleTransform: Send + Sync {
    /// Whether this transform wants to see the file at `path`.
    fn applies_to(&self, path: &Path) -> bool;

    /// Transforms the module text. Must be pure over its inputs.
    fn apply(&self, path: &Path, content: &str) -> String;
}

/// Import lines recognized as the browser API shim.
///
/// Matched verbatim, single- and double-quoted forms as distinct literals.
/// This is intentionally a literal removal, not an AST pass: the shim import
/// is authored by the scaffold and always appears in exactly these forms.
const SHIM_IMPORTS: &[&str] = &[
    "import browserAPI from 'browser';",
    "import browserAPI from \"browser\";",
    "import browserAPI from 'https://raw.githubusercontent.com/jnosis/unWebExtension/master/src/mod.ts';",
    "import browserAPI from \"https://raw.githubusercontent.com/jnosis/unWebExtension/master/src/mod.ts\";",
];

static BROWSER_API: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbrowserAPI\b").expect("valid identifier pattern"));

/// Replaces the abstract `browserAPI` identifier with the literal platform
/// name, so the bundled output carries no runtime platform branching.
///
/// Known limitation: `browserAPI` inside a string literal or comment is
/// rewritten as well. The scaffold never produces such text, so this stays
/// a text transform rather than an AST one.
pub struct PlatformInjection {
    platform: String,
}

impl PlatformInjection {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.name().to_string(),
        }
    }
}

impl ModuleTransform for PlatformInjection {
    fn applies_to(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "ts")
    }

    fn apply(&self, _path: &Path, content: &str) -> String {
        let mut text = content.to_string();
        for import in SHIM_IMPORTS {
            text = text.replace(import, "");
        }
        BROWSER_API.replace_all(&text, self.platform.as_str()).into_owned()
    }
}
