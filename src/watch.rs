//! Watch mode
//!
//! Polls the scan root for modified files and hands every change to a
//! callback. Runs are sequential; there is no debouncing, so each changed
//! file triggers its own regeneration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::debug;
use walkdir::WalkDir;

/// Default delay between two polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Modification time per watched file
pub type FileSnapshot = BTreeMap<PathBuf, SystemTime>;

/// What to watch
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub root: PathBuf,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Directories whose contents never count as changes
    pub ignore: Vec<PathBuf>,
    pub interval: Duration,
}

impl WatchOptions {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
            ignore: Vec::new(),
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn ignoring(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ignore.push(dir.into());
        self
    }

    fn is_watched(&self, path: &Path) -> bool {
        if self.ignore.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|w| w.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// Record the modification time of every watched file below the root
pub fn take_snapshot(options: &WatchOptions) -> FileSnapshot {
    let mut snapshot = FileSnapshot::new();

    for entry in WalkDir::new(&options.root).follow_links(true) {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_file() || !options.is_watched(entry.path()) {
            continue;
        }
        if let Ok(modified) = fs::metadata(entry.path()).and_then(|m| m.modified()) {
            snapshot.insert(entry.path().to_path_buf(), modified);
        }
    }

    snapshot
}

/// Paths added, removed or modified between two snapshots
pub fn changed_paths(before: &FileSnapshot, after: &FileSnapshot) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, modified)| before.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .collect();

    changed.extend(
        before
            .keys()
            .filter(|path| !after.contains_key(*path))
            .cloned(),
    );

    changed.sort();
    changed
}

/// Polling file watcher
#[derive(Debug)]
pub struct Watcher {
    options: WatchOptions,
    last: FileSnapshot,
}

impl Watcher {
    /// Start watching; the current state counts as unchanged
    pub fn new(options: WatchOptions) -> Self {
        let last = take_snapshot(&options);
        debug!(root = %options.root.display(), files = last.len(), "watching");
        Self { options, last }
    }

    /// Changes since the previous poll
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let current = take_snapshot(&self.options);
        let changed = changed_paths(&self.last, &current);
        self.last = current;
        changed
    }

    /// Poll forever, calling `on_change` once per changed file
    pub fn run<F>(&mut self, mut on_change: F) -> !
    where
        F: FnMut(&Path),
    {
        loop {
            thread::sleep(self.options.interval);
            for path in self.poll() {
                on_change(&path);
            }
        }
    }
}
