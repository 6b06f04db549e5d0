//! Rerun a callback whenever watched files change.
//!
//! [`watch`] registers a recursive [`notify::RecommendedWatcher`] on each
//! path, calls the callback once immediately, and then once per debounced
//! burst of filesystem events. Events that arrive while the callback is
//! running are coalesced into a single follow-up call; two calls never
//! overlap.

use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch {}: path does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;

/// Directory names whose contents never trigger a rerun.
pub const DEFAULT_IGNORED: [&str; 3] = [".git", "target", "node_modules"];

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub paths: Vec<PathBuf>,

    /// Quiet period after an event before the callback runs.
    pub debounce: Duration,

    /// Path components that mark an event as irrelevant.
    pub ignored: Vec<String>,
}

impl WatchOptions {
    pub fn new(paths: Vec<PathBuf>, debounce: Duration) -> Self {
        Self {
            paths,
            debounce,
            ignored: DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Watch `options.paths` and call `on_change` with the changed paths (empty
/// on the initial call) until it returns [`ControlFlow::Break`].
pub fn watch<F>(options: &WatchOptions, on_change: F) -> Result<()>
where
    F: FnMut(&[PathBuf]) -> ControlFlow<()>,
{
    for path in &options.paths {
        if !path.exists() {
            return Err(WatchError::PathNotFound(path.clone()));
        }
    }

    let (tx, rx) = channel();
    let mut watcher = notify::RecommendedWatcher::new(tx, notify::Config::default())?;
    for path in &options.paths {
        watcher.watch(path, RecursiveMode::Recursive)?;
        debug!(path = %path.display(), "watching");
    }

    drive(&rx, options, on_change);
    Ok(())
}

/// The event loop behind [`watch`], separated from watcher setup.
pub fn drive<F>(rx: &Receiver<notify::Result<Event>>, options: &WatchOptions, mut on_change: F)
where
    F: FnMut(&[PathBuf]) -> ControlFlow<()>,
{
    if on_change(&[]).is_break() {
        return;
    }

    loop {
        let mut changed = BTreeSet::new();
        match rx.recv() {
            Ok(event) => collect(event, options, &mut changed),
            Err(_) => return,
        }

        // Keep absorbing until the debounce window passes with no event.
        loop {
            match rx.recv_timeout(options.debounce) {
                Ok(event) => collect(event, options, &mut changed),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    if !changed.is_empty() {
                        let paths: Vec<PathBuf> = changed.into_iter().collect();
                        let _ = on_change(&paths);
                    }
                    return;
                }
            }
        }

        if changed.is_empty() {
            continue;
        }
        let paths: Vec<PathBuf> = changed.into_iter().collect();
        debug!(count = paths.len(), "change detected");
        if on_change(&paths).is_break() {
            return;
        }
    }
}

fn collect(
    event: notify::Result<Event>,
    options: &WatchOptions,
    changed: &mut BTreeSet<PathBuf>,
) {
    match event {
        Ok(event) if is_relevant(&event, &options.ignored) => {
            changed.extend(event.paths.into_iter());
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "watch error"),
    }
}

/// Access events and events confined to ignored directories are dropped.
pub fn is_relevant(event: &Event, ignored: &[String]) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.is_empty() || event.paths.iter().any(|p| !is_ignored(p, ignored))
}

fn is_ignored(path: &Path, ignored: &[String]) -> bool {
    path.components()
        .any(|c| ignored.iter().any(|name| c.as_os_str() == name.as_str()))
}
