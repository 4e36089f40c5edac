//! Watcher runtime: notify events in, VFS invalidations out.

use super::events::{ChangeEvent, EventBatcher, WatchConfig};
use crate::error::VfsError;
use crate::vfs::VirtualFileSystem;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Keeps a `VirtualFileSystem` in sync with a directory tree
pub struct VfsWatcher {
    vfs: Arc<VirtualFileSystem>,
    config: WatchConfig,
    running: Arc<RwLock<bool>>,
}

impl VfsWatcher {
    pub fn new(vfs: Arc<VirtualFileSystem>, config: WatchConfig) -> Self {
        Self {
            vfs,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Watch until `stop` is called or the OS watcher goes away. Blocks the caller.
    pub fn start(&self) -> Result<(), VfsError> {
        *self.running.write() = true;

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })?;
        watcher.watch(&self.config.root, RecursiveMode::Recursive)?;
        info!(root = ?self.config.root, "Watching directory");

        let mut batcher = EventBatcher::new(self.config.clone());
        let batch_window = self.config.batch_window();
        let mut last_batch_time = Instant::now();

        while self.is_running() {
            let timeout = batch_window
                .saturating_sub(last_batch_time.elapsed())
                .max(Duration::from_millis(1));
            match rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if let Some(change_event) = convert_event(event) {
                        if batcher.add_event(change_event) {
                            self.process_events(batcher.take_batch());
                            last_batch_time = Instant::now();
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if last_batch_time.elapsed() >= batch_window {
                if !batcher.is_empty() {
                    self.process_events(batcher.take_batch());
                }
                last_batch_time = Instant::now();
            }
        }

        if !batcher.is_empty() {
            self.process_events(batcher.take_batch());
        }
        *self.running.write() = false;
        info!(root = ?self.config.root, "Stopped watching directory");
        Ok(())
    }

    /// Ask a running `start` loop to return
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    /// Invalidate every path touched by `events`; returns the number of paths
    pub fn process_events(&self, events: Vec<ChangeEvent>) -> usize {
        if events.is_empty() {
            return 0;
        }

        let mut affected_paths = BTreeSet::new();
        for event in &events {
            for path in event.affected_paths() {
                match path.to_str() {
                    Some(path) => {
                        affected_paths.insert(path.to_string());
                    }
                    None => warn!(path = ?path, "Ignoring change to non UTF-8 path"),
                }
            }
        }

        info!(
            event_count = events.len(),
            path_count = affected_paths.len(),
            "Processing change events"
        );
        for path in &affected_paths {
            debug!(path = %path, "Invalidating changed path");
        }
        self.vfs.invalidate(&affected_paths);
        affected_paths.len()
    }
}

fn convert_event(event: Event) -> Option<ChangeEvent> {
    match event.kind {
        EventKind::Create(_) => event.paths.first().map(|p| ChangeEvent::Created(p.clone())),
        EventKind::Modify(ModifyKind::Name(_)) => match event.paths.as_slice() {
            [from, to, ..] => Some(ChangeEvent::Renamed {
                from: from.clone(),
                to: to.clone(),
            }),
            [path] => Some(ChangeEvent::Modified(path.clone())),
            [] => None,
        },
        EventKind::Modify(_) => event.paths.first().map(|p| ChangeEvent::Modified(p.clone())),
        EventKind::Remove(_) => event.paths.first().map(|p| ChangeEvent::Removed(p.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::CaseSensitivity;
    use crate::scan::{DefaultExcludes, DirectorySnapshotter};
    use crate::snapshot::fixtures::{dir, file};
    use crate::tree::hasher::DefaultFileHasher;
    use notify::event::{CreateKind, RenameMode};
    use std::path::PathBuf;

    fn vfs() -> Arc<VirtualFileSystem> {
        Arc::new(VirtualFileSystem::new(
            CaseSensitivity::CaseSensitive,
            DirectorySnapshotter::new(Arc::new(DefaultFileHasher), DefaultExcludes::default()),
        ))
    }

    #[test]
    fn test_convert_event() {
        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/a"));
        assert_eq!(convert_event(created), Some(ChangeEvent::Created(PathBuf::from("/a"))));

        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/a"))
            .add_path(PathBuf::from("/b"));
        assert_eq!(
            convert_event(renamed),
            Some(ChangeEvent::Renamed {
                from: PathBuf::from("/a"),
                to: PathBuf::from("/b"),
            })
        );

        assert_eq!(convert_event(Event::new(EventKind::Any)), None);
    }

    #[test]
    fn test_process_events_invalidates_paths() {
        let vfs = vfs();
        vfs.store(dir("/ws", vec![file("/ws/a", "a"), file("/ws/b", "b"), file("/ws/c", "c")]));
        let watcher = VfsWatcher::new(Arc::clone(&vfs), WatchConfig::default());

        let count = watcher.process_events(vec![
            ChangeEvent::Modified(PathBuf::from("/ws/a")),
            ChangeEvent::Renamed {
                from: PathBuf::from("/ws/b"),
                to: PathBuf::from("/ws/d"),
            },
        ]);

        assert_eq!(count, 3);
        assert!(vfs.find_snapshot("/ws/a").is_none());
        assert!(vfs.find_snapshot("/ws/b").is_none());
        assert_eq!(vfs.find_snapshot("/ws/c"), Some(file("/ws/c", "c")));
        assert_eq!(watcher.process_events(Vec::new()), 0);
    }

    #[test]
    fn test_rename_followed_by_modify_invalidates_source() {
        let vfs = vfs();
        vfs.store(dir("/ws", vec![file("/ws/a", "a"), file("/ws/c", "c")]));
        let config = WatchConfig {
            root: PathBuf::from("/ws"),
            ..WatchConfig::default()
        };
        let watcher = VfsWatcher::new(Arc::clone(&vfs), config.clone());

        let mut batcher = EventBatcher::new(config);
        batcher.add_event(ChangeEvent::Renamed {
            from: PathBuf::from("/ws/a"),
            to: PathBuf::from("/ws/b"),
        });
        batcher.add_event(ChangeEvent::Modified(PathBuf::from("/ws/b")));
        watcher.process_events(batcher.take_batch());

        assert!(vfs.find_snapshot("/ws/a").is_none());
        assert_eq!(vfs.find_snapshot("/ws/c"), Some(file("/ws/c", "c")));
    }

    #[test]
    fn test_stop_clears_running_flag() {
        let watcher = VfsWatcher::new(vfs(), WatchConfig::default());
        *watcher.running.write() = true;
        assert!(watcher.is_running());
        watcher.stop();
        assert!(!watcher.is_running());
    }
}
