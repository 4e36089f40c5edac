//! Watch events, batching, and configuration.

use crate::config::WatchSettings;
use crate::scan::DefaultExcludes;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

/// Watch configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Directory watched recursively
    pub root: PathBuf,
    pub debounce_ms: u64,
    pub batch_window_ms: u64,
    /// Pending paths that force an early flush
    pub max_batch_size: usize,
    /// Changes to excluded names never reach the VFS
    pub excludes: DefaultExcludes,
}

impl WatchConfig {
    pub fn new(root: impl Into<PathBuf>, settings: &WatchSettings, excludes: DefaultExcludes) -> Self {
        Self {
            root: root.into(),
            debounce_ms: settings.debounce_ms,
            batch_window_ms: settings.batch_window_ms,
            max_batch_size: settings.max_batch_size,
            excludes,
        }
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new(
            ".",
            &WatchSettings::default(),
            DefaultExcludes::new(crate::scan::DEFAULT_EXCLUDES),
        )
    }
}

/// Filesystem change event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

impl ChangeEvent {
    /// The path the event is keyed by while batching
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Removed(p) => p,
            ChangeEvent::Renamed { to, .. } => to,
        }
    }

    /// Every path whose knowledge the event makes stale
    pub fn affected_paths(&self) -> Vec<&Path> {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Removed(p) => vec![p.as_path()],
            ChangeEvent::Renamed { from, to } => vec![from.as_path(), to.as_path()],
        }
    }
}

/// Groups events per path; a newer event for the same path replaces the pending one.
/// Paths only the replaced event touched stay queued as removals.
pub struct EventBatcher {
    config: WatchConfig,
    pending_events: HashMap<PathBuf, ChangeEvent>,
    last_event_time: HashMap<PathBuf, Instant>,
    debounced: usize,
}

impl EventBatcher {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            pending_events: HashMap::new(),
            last_event_time: HashMap::new(),
            debounced: 0,
        }
    }

    /// Queue `event`; returns true when the batch is full and should be flushed
    pub fn add_event(&mut self, event: ChangeEvent) -> bool {
        if self.should_ignore(&event) {
            return false;
        }
        let path = event.path().to_path_buf();
        let now = Instant::now();
        let debounce_window = Duration::from_millis(self.config.debounce_ms);

        if let Some(last_time) = self.last_event_time.get(&path) {
            if now.duration_since(*last_time) < debounce_window {
                self.queue(path, event);
                self.debounced += 1;
                return false;
            }
        }

        self.queue(path.clone(), event);
        self.last_event_time.insert(path, now);

        self.pending_events.len() >= self.config.max_batch_size
    }

    /// Pending events ordered by path
    pub fn take_batch(&mut self) -> Vec<ChangeEvent> {
        let mut events: Vec<_> = self.pending_events.drain().map(|(_, event)| event).collect();
        events.sort_by(|a, b| a.path().cmp(b.path()));
        self.last_event_time.clear();
        events
    }

    pub fn is_empty(&self) -> bool {
        self.pending_events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending_events.len()
    }

    /// Events merged into an already pending one so far
    pub fn debounced(&self) -> usize {
        self.debounced
    }

    fn queue(&mut self, path: PathBuf, event: ChangeEvent) {
        let covered: Vec<PathBuf> = event
            .affected_paths()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();
        let Some(replaced) = self.pending_events.insert(path, event) else {
            return;
        };
        for stale in replaced.affected_paths() {
            if covered.iter().any(|path| path == stale)
                || self.pending_events.contains_key(stale)
                || self.is_excluded(stale)
            {
                continue;
            }
            self.pending_events
                .insert(stale.to_path_buf(), ChangeEvent::Removed(stale.to_path_buf()));
        }
    }

    fn should_ignore(&self, event: &ChangeEvent) -> bool {
        event
            .affected_paths()
            .iter()
            .all(|path| self.is_excluded(path))
    }

    /// A path is excluded if any directory on the way to it is, or if its own name is
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);
        let names: Vec<&str> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        let Some((last, parents)) = names.split_last() else {
            return false;
        };
        let excludes = &self.config.excludes;
        parents.iter().any(|name| excludes.exclude_dir(name))
            || excludes.exclude_dir(last)
            || excludes.exclude_file(last)
    }
}
