//! Platform injection over staged source trees.

use std::path::Path;

use webext_bundle::Platform;
use webext_bundle::bundler::stage_sources;
use webext_bundle::transform::{ModuleTransform, PlatformInjection};

#[test]
fn firefox_injection_matches_expected_output() {
    let transform = PlatformInjection::new(&Platform::Firefox);
    let out = transform.apply(
        Path::new("background.ts"),
        "import browserAPI from 'browser';\nbrowserAPI.tabs.create();",
    );
    assert!(!out.contains("import"));
    assert!(out.contains("firefox.tabs.create();"));
}

#[tokio::test]
async fn staging_transforms_ts_and_copies_the_rest() {
    let src = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("util")).unwrap();
    std::fs::write(
        src.path().join("background.ts"),
        "import browserAPI from \"browser\";\nbrowserAPI.runtime.onInstalled.addListener(() => {});\n",
    )
    .unwrap();
    std::fs::write(
        src.path().join("util/logger.ts"),
        "export const tag = () => browserAPI.runtime.id;\n",
    )
    .unwrap();
    std::fs::write(src.path().join("options.css"), "body { margin: 0 }").unwrap();

    let transforms: Vec<Box<dyn ModuleTransform>> =
        vec![Box::new(PlatformInjection::new(&Platform::Chrome))];
    let stage = stage_sources(src.path(), &transforms).await.unwrap();

    let background = std::fs::read_to_string(stage.path().join("background.ts")).unwrap();
    assert!(!background.contains("import"));
    assert!(background.contains("chrome.runtime.onInstalled"));

    let logger = std::fs::read_to_string(stage.path().join("util/logger.ts")).unwrap();
    assert!(logger.contains("chrome.runtime.id"));

    // non-eligible files pass through byte-identical
    let css = std::fs::read_to_string(stage.path().join("options.css")).unwrap();
    assert_eq!(css, "body { margin: 0 }");
}
