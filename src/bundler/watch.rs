//! Dev-mode source watching.
//!
//! Watches the source tree and triggers a rebuild on every relevant change.
//! Rebuild failures are logged and never stop the loop; a transient syntax
//! error should not kill a development session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::Result;

/// How long to suppress duplicate events for the same path.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Per-path event debouncer.
///
/// Editors fire bursts of events, often across several paths at once
/// (write + rename, multi-file save), so the suppression window is
/// tracked per path rather than for the latest event only.
struct Debouncer {
    window: Duration,
    seen: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    /// Whether an event for `path` at `now` should pass through.
    fn admit(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.seen.get(path) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }
        self.seen.insert(path.to_path_buf(), now);
        true
    }
}

/// Watches `root` recursively and sends the changed path for every
/// debounced create/modify/remove event.
///
/// The returned watcher must stay alive for as long as events are wanted.
pub fn watch_sources(root: &Path) -> Result<(RecommendedWatcher, mpsc::Receiver<PathBuf>)> {
    let (tx, rx) = mpsc::channel(64);

    let mut debouncer = Debouncer::new(DEBOUNCE);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::warn!("watch event error: {e}");
                return;
            }
        };

        if !matches!(
            event.kind,
            notify::EventKind::Create(_)
                | notify::EventKind::Modify(_)
                | notify::EventKind::Remove(_)
        ) {
            return;
        }

        for path in event.paths {
            if !debouncer.admit(&path, Instant::now()) {
                continue;
            }

            let _ = tx.blocking_send(path);
        }
    })?;

    watcher.watch(root, RecursiveMode::Recursive)?;

    Ok((watcher, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_events_on_one_path_are_suppressed() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        let start = Instant::now();
        let path = Path::new("src/background.ts");

        assert!(debouncer.admit(path, start));
        assert!(!debouncer.admit(path, start + Duration::from_millis(50)));
        assert!(debouncer.admit(path, start + Duration::from_millis(250)));
    }

    #[test]
    fn alternating_paths_do_not_bypass_the_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        let start = Instant::now();
        let a = Path::new("src/background.ts");
        let b = Path::new("src/util/logger.ts");

        assert!(debouncer.admit(a, start));
        assert!(debouncer.admit(b, start + Duration::from_millis(10)));
        // the second burst on each path stays suppressed even though
        // events interleave
        assert!(!debouncer.admit(a, start + Duration::from_millis(20)));
        assert!(!debouncer.admit(b, start + Duration::from_millis(30)));
        assert!(debouncer.admit(a, start + Duration::from_millis(300)));
    }
}
