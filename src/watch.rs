//! File watcher for the demo host — monitors the two pane source files via
//! notify (inotify on Linux).
//!
//! notify::RecommendedWatcher runs callbacks on an internal thread.
//! `PairWatcher` bridges change notifications to the main thread via
//! `mpsc::channel`, tagged with the pane the changed file belongs to.

use std::path::Path;
use std::sync::mpsc;

use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::pane::PaneSide;

pub struct PairWatcher {
    rx: mpsc::Receiver<PaneSide>,
    _watcher: RecommendedWatcher, // Drop stops watching
}

impl PairWatcher {
    /// Watch the files backing pane A and pane B for modification.
    ///
    /// Linux inotify loses the watch on rename (atomic save), so we watch
    /// each parent directory (NonRecursive) and filter events by path.
    pub fn new(path_a: &Path, path_b: &Path) -> Result<Self> {
        let target_a = path_a.canonicalize()?;
        let target_b = path_b.canonicalize()?;
        let (tx, rx) = mpsc::channel();

        let (filter_a, filter_b) = (target_a.clone(), target_b.clone());
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                if !event.kind.is_modify() {
                    return;
                }
                for p in &event.paths {
                    if *p == filter_a {
                        let _ = tx.send(PaneSide::A);
                    } else if *p == filter_b {
                        let _ = tx.send(PaneSide::B);
                    }
                }
            },
            notify::Config::default(),
        )?;

        for target in [&target_a, &target_b] {
            let parent = target
                .parent()
                .ok_or_else(|| anyhow::anyhow!("cannot watch root path"))?;
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        Ok(Self { rx, _watcher: watcher })
    }

    /// Drain queued notifications (non-blocking). Multiple notifications
    /// for the same pane collapse into one entry.
    pub fn changed(&self) -> Vec<PaneSide> {
        let mut changed = Vec::new();
        while let Ok(side) = self.rx.try_recv() {
            if !changed.contains(&side) {
                changed.push(side);
            }
        }
        changed
    }
}
