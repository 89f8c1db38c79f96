//! File system events for the project root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::error::WatcherError;

/// A file must be quiet this long before its change is forwarded.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// A change to files in the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// Files were written or created.
    Saved(Vec<PathBuf>),
    /// Files were removed or renamed away.
    Deleted(Vec<PathBuf>),
}

impl FileEvent {
    /// Paths the event applies to.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            FileEvent::Saved(paths) | FileEvent::Deleted(paths) => paths,
        }
    }
}

/// Maps a raw notify event to a save or delete, ignoring everything else.
pub fn classify(event: &Event) -> Option<FileEvent> {
    let paths = event.paths.clone();
    match event.kind {
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            Some(FileEvent::Deleted(paths))
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileEvent::Saved(paths)),
        _ => None,
    }
}

/// Watches the project root and forwards saves and deletes.
///
/// The root is watched instead of the config file itself so that deleting
/// and re-creating the file keeps being observed.
pub struct ConfigWatcher {
    root: PathBuf,
    event_tx: mpsc::UnboundedSender<FileEvent>,
}

impl ConfigWatcher {
    /// Creates a watcher and the receiver its events arrive on.
    pub fn new(root: &Path) -> (Self, mpsc::UnboundedReceiver<FileEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                root: root.to_path_buf(),
                event_tx,
            },
            event_rx,
        )
    }

    /// Starts watching. Events stop when the returned watcher is dropped.
    ///
    /// Raw events are held until the root has been quiet for [`QUIET_PERIOD`],
    /// so a file written in several chunks is reported once, after the last one.
    pub async fn start(self) -> Result<RecommendedWatcher, WatcherError> {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(file_event) = classify(&event) {
                        let _ = raw_tx.send(file_event);
                    }
                }
                Err(e) => error!(error = %e, "Watch error"),
            },
            Config::default(),
        )?;

        watcher
            .watch(&self.root, RecursiveMode::NonRecursive)
            .map_err(|e| WatcherError::WatchFailed {
                path: self.root.clone(),
                message: e.to_string(),
            })?;

        tokio::spawn(debounce(raw_rx, self.event_tx, QUIET_PERIOD));

        info!(path = ?self.root, "Watching project root");
        Ok(watcher)
    }
}

/// Coalesces events until `quiet` passes without a new one, then forwards
/// the latest change per path. Ends once `raw` closes and pending changes
/// are flushed.
pub async fn debounce(
    mut raw: mpsc::UnboundedReceiver<FileEvent>,
    out: mpsc::UnboundedSender<FileEvent>,
    quiet: Duration,
) {
    let mut pending: BTreeMap<PathBuf, bool> = BTreeMap::new();
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            received = raw.recv() => match received {
                Some(event) => {
                    let deleted = matches!(event, FileEvent::Deleted(_));
                    for path in event.paths() {
                        pending.insert(path.clone(), deleted);
                    }
                    deadline = Instant::now() + quiet;
                }
                None => {
                    flush(&mut pending, &out);
                    return;
                }
            },
            _ = tokio::time::sleep_until(deadline), if !pending.is_empty() => {
                flush(&mut pending, &out);
            }
        }
    }
}

fn flush(pending: &mut BTreeMap<PathBuf, bool>, out: &mpsc::UnboundedSender<FileEvent>) {
    let (deleted, saved): (Vec<_>, Vec<_>) =
        std::mem::take(pending).into_iter().partition(|(_, deleted)| *deleted);

    forward(out, deleted, FileEvent::Deleted);
    forward(out, saved, FileEvent::Saved);
}

fn forward(
    out: &mpsc::UnboundedSender<FileEvent>,
    paths: Vec<(PathBuf, bool)>,
    make: fn(Vec<PathBuf>) -> FileEvent,
) {
    if paths.is_empty() {
        return;
    }
    let file_event = make(paths.into_iter().map(|(path, _)| path).collect());
    debug!(?file_event, "Project file event");
    let _ = out.send(file_event);
}
