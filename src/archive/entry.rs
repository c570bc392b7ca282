//! Archive entry collection and name normalization.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// One file destined for the archive: its on-disk path and the normalized
/// name it gets inside the zip.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub name: String,
}

/// Slash-delimited runs of dots (`/./`, `\.\`, `//..//`, ...).
static DOT_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\]+\.+[/\\]+").expect("valid dot-segment pattern"));

/// Interior of a path with at most one leading and one trailing slash.
static STRIP_OUTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/?(.*?)/?$").expect("valid outer-strip pattern"));

/// Normalizes a relative path into a canonical archive entry name.
///
/// Backslashes become forward slashes, a single leading and trailing slash
/// is stripped, and slash-delimited dot segments are collapsed. The last two
/// steps repeat until the string stops changing (fixpoint), so nested
/// redundancy like `a/.//./b` fully collapses.
///
/// The function is idempotent: `clean_entry_name(clean_entry_name(s))`
/// equals `clean_entry_name(s)`. The loop is bounded by the input length;
/// every productive pass strictly shortens the string, so the bound can
/// only be hit by a logic error in the patterns.
pub fn clean_entry_name(raw: &str) -> String {
    let mut current = strip_outer(&raw.replace('\\', "/"));

    for _ in 0..=raw.len() {
        let wrapped = format!("/{current}/");
        let next = strip_outer(&DOT_SEGMENTS.replace_all(&wrapped, "/"));
        if next == current {
            return current;
        }
        current = next;
    }

    debug_assert!(false, "entry name cleaning did not reach a fixpoint: {raw:?}");
    current
}

/// Strips leading and trailing slashes. The capture removes one slash per
/// pass, so this re-applies until the interior stops changing; doubled
/// separators at either end collapse completely.
fn strip_outer(s: &str) -> String {
    let mut current = s.to_string();
    loop {
        let next = match STRIP_OUTER.captures(&current) {
            Some(caps) => caps[1].to_string(),
            None => return current,
        };
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Recursively collects every regular file under `source_dir` with its
/// normalized archive name. Walk errors on individual entries are skipped
/// here; unreadable files surface later as per-entry failures when the
/// packager tries to read them.
pub fn collect_entries(source_dir: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for entry in walkdir::WalkDir::new(source_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unwalkable entry under {}: {e}", source_dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path());
        let name = clean_entry_name(&rel.to_string_lossy());
        if name.is_empty() {
            continue;
        }

        entries.push(ArchiveEntry {
            path: entry.path().to_path_buf(),
            name,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_become_forward_slashes() {
        assert_eq!(clean_entry_name(r"assets\icons\16.png"), "assets/icons/16.png");
    }

    #[test]
    fn leading_and_trailing_separators_are_stripped() {
        assert_eq!(clean_entry_name("/manifest.json"), "manifest.json");
        assert_eq!(clean_entry_name("scripts/"), "scripts");
        assert_eq!(clean_entry_name(r"\background.js"), "background.js");
    }

    #[test]
    fn dot_segments_collapse() {
        assert_eq!(clean_entry_name("a/./b"), "a/b");
        assert_eq!(clean_entry_name("./a/b"), "a/b");
        assert_eq!(clean_entry_name("a/.//./b"), "a/b");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let inputs = [
            "a/b/c",
            "/a/b/",
            r"a\.\b",
            "a//b",
            "./x/./y/",
            r"\\mixed/..\path",
            "",
            ".",
        ];
        for input in inputs {
            let once = clean_entry_name(input);
            assert_eq!(clean_entry_name(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn result_never_starts_with_separator() {
        for input in ["/a/b", r"\a\b", "//a", "/./a"] {
            let cleaned = clean_entry_name(input);
            assert!(!cleaned.starts_with('/'), "{input:?} -> {cleaned:?}");
            assert!(!cleaned.contains('\\'), "{input:?} -> {cleaned:?}");
        }
    }

    #[test]
    fn collect_entries_walks_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("_locales/en")).unwrap();
        std::fs::write(dir.path().join("manifest.json"), "{}").unwrap();
        std::fs::write(dir.path().join("_locales/en/messages.json"), "{}").unwrap();

        let mut names: Vec<String> = collect_entries(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["_locales/en/messages.json", "manifest.json"]);
    }
}
