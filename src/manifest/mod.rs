//! Manifest specialization.
//!
//! One manifest template serves every target. The template may carry
//! top-level `chrome` and `firefox` override blocks; specialization removes
//! both blocks, shallow-merges the block matching the requested platform
//! over the common keys, and in prod mode strips the dev-only
//! `commands.dev` and `options_ui.open_in_tab` entries.
//!
//! This is a pure function over strings. The caller owns all I/O.

use serde_json::{Map, Value};

use crate::config::{Mode, Platform};
use crate::error::{BundleError, Result};

/// Manifest keys recognized as platform override blocks.
///
/// Extension point: adding a store target with its own overrides means
/// adding its name here, nothing else.
const OVERRIDE_KEYS: &[&str] = &["chrome", "firefox"];

/// Specializes a raw manifest template for one (mode, platform) pair.
///
/// Returns the pretty-printed (2-space indented) manifest JSON. Key order
/// in the output equals insertion order after merging and stripping.
///
/// # Errors
///
/// * [`BundleError::ManifestParse`] if `raw` is not valid JSON.
/// * [`BundleError::ManifestShape`] if prod stripping finds `commands` or
///   `options_ui` missing or not an object. Never defaulted: a template
///   without them is structurally wrong for this pipeline.
pub fn specialize(raw: &str, mode: Mode, platform: &Platform) -> Result<String> {
    let value: Value = serde_json::from_str(raw).map_err(BundleError::ManifestParse)?;
    let mut manifest = match value {
        Value::Object(map) => map,
        _ => {
            // Not an object at all; surface it as a parse-level failure.
            return Err(BundleError::ManifestParse(serde::de::Error::custom(
                "manifest root is not a JSON object",
            )));
        }
    };

    // Override blocks are consumed here; the output never carries them.
    let mut blocks: Vec<(&str, Option<Value>)> = Vec::new();
    for key in OVERRIDE_KEYS {
        blocks.push((*key, manifest.shift_remove(*key)));
    }

    if let Some((_, Some(Value::Object(block)))) = blocks
        .into_iter()
        .find(|(key, _)| *key == platform.name())
    {
        // Shallow merge: block values win key-by-key over common keys.
        for (key, value) in block {
            manifest.insert(key, value);
        }
    }

    if mode == Mode::Prod {
        strip_dev_key(&mut manifest, "commands", "dev")?;
        strip_dev_key(&mut manifest, "options_ui", "open_in_tab")?;
    }

    Ok(serde_json::to_string_pretty(&Value::Object(manifest))?)
}

/// Removes `sub` from the object at `manifest[key]`, leaving siblings alone.
fn strip_dev_key(
    manifest: &mut Map<String, Value>,
    key: &'static str,
    sub: &str,
) -> Result<()> {
    match manifest.get_mut(key) {
        Some(Value::Object(object)) => {
            object.shift_remove(sub);
            Ok(())
        }
        _ => Err(BundleError::ManifestShape { key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{
        "name": "sample",
        "version": "0.1.0",
        "commands": { "dev": { "suggested_key": "Ctrl+D" }, "reload": {} },
        "options_ui": { "page": "options.html", "open_in_tab": true },
        "chrome": { "version_name": "1.0.0", "minimum_chrome_version": "88" },
        "firefox": { "browser_specific_settings": { "gecko": { "id": "sample@test" } } }
    }"#;

    fn parse(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn chrome_merge_wins_over_common() {
        let out = parse(&specialize(TEMPLATE, Mode::Dev, &Platform::Chrome).unwrap());
        assert_eq!(out["version_name"], "1.0.0");
        assert_eq!(out["minimum_chrome_version"], "88");
        assert_eq!(out["name"], "sample");
        assert!(!out.contains_key("chrome"));
        assert!(!out.contains_key("firefox"));
        assert!(!out.contains_key("browser_specific_settings"));
    }

    #[test]
    fn deno_ships_common_verbatim() {
        let out = parse(&specialize(TEMPLATE, Mode::Dev, &Platform::Deno).unwrap());
        assert!(!out.contains_key("version_name"));
        assert!(!out.contains_key("chrome"));
        assert!(!out.contains_key("firefox"));
        assert_eq!(out["name"], "sample");
    }

    #[test]
    fn custom_platform_without_block_ships_common() {
        let platform: Platform = "edge".parse().unwrap();
        let out = parse(&specialize(TEMPLATE, Mode::Dev, &platform).unwrap());
        assert!(!out.contains_key("version_name"));
        assert_eq!(out["name"], "sample");
    }

    #[test]
    fn prod_strips_dev_keys_keeps_siblings() {
        let out = parse(&specialize(TEMPLATE, Mode::Prod, &Platform::Chrome).unwrap());
        let commands = out["commands"].as_object().unwrap();
        assert!(!commands.contains_key("dev"));
        assert!(commands.contains_key("reload"));
        let options_ui = out["options_ui"].as_object().unwrap();
        assert!(!options_ui.contains_key("open_in_tab"));
        assert_eq!(options_ui["page"], "options.html");
    }

    #[test]
    fn dev_retains_every_key_after_merge() {
        let out = parse(&specialize(TEMPLATE, Mode::Dev, &Platform::Firefox).unwrap());
        assert!(out["commands"].as_object().unwrap().contains_key("dev"));
        assert_eq!(out["options_ui"]["open_in_tab"], true);
        assert!(out.contains_key("browser_specific_settings"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = specialize("{not json", Mode::Dev, &Platform::Chrome).unwrap_err();
        assert!(matches!(err, BundleError::ManifestParse(_)));
    }

    #[test]
    fn prod_without_commands_is_a_shape_error() {
        let raw = r#"{ "name": "x", "options_ui": {} }"#;
        let err = specialize(raw, Mode::Prod, &Platform::Chrome).unwrap_err();
        assert!(matches!(err, BundleError::ManifestShape { key: "commands" }));
    }

    #[test]
    fn prod_with_non_object_options_ui_is_a_shape_error() {
        let raw = r#"{ "commands": {}, "options_ui": "nope" }"#;
        let err = specialize(raw, Mode::Prod, &Platform::Chrome).unwrap_err();
        assert!(matches!(err, BundleError::ManifestShape { key: "options_ui" }));
    }

    #[test]
    fn output_is_two_space_indented() {
        let out = specialize(TEMPLATE, Mode::Dev, &Platform::Deno).unwrap();
        assert!(out.starts_with("{\n  \""));
    }
}
