//! Settings file watcher
//!
//! Other writers change the settings store behind the daemon's back. The
//! watcher observes the store file's directory (atomic writes replace the
//! file, so the inode itself cannot be watched) and forwards relevant
//! events into a tokio channel.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Change notification sent to the daemon loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    /// The watched file was created, modified or replaced
    Changed(PathBuf),
    /// The watched file disappeared
    Removed(PathBuf),
}

/// Watches a single settings file
pub struct SettingsWatcher {
    path: PathBuf,
    // Dropping the watcher stops the notifications
    _watcher: RecommendedWatcher,
}

impl SettingsWatcher {
    /// Start watching `path`, sending events to `tx`
    ///
    /// Events are dropped while the channel is full; one pending event is
    /// enough to trigger a refresh.
    pub fn start(path: &Path, tx: mpsc::Sender<SettingsEvent>) -> Result<Self, WatchError> {
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| WatchError::InvalidPath(path.to_path_buf()))?;
        if !dir.is_dir() {
            return Err(WatchError::InvalidPath(path.to_path_buf()));
        }

        let file = path.to_path_buf();
        let filter = file.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(ev) = classify(&event, &filter) {
                    if tx.try_send(ev).is_err() {
                        tracing::trace!("Settings event dropped, refresh already pending");
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "Settings watch error"),
        })
        .map_err(WatchError::Notify)?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(WatchError::Notify)?;

        tracing::info!(path = %file.display(), "Watching settings file");
        Ok(Self {
            path: file,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map a raw notify event to a settings event for `file`
fn classify(event: &Event, file: &Path) -> Option<SettingsEvent> {
    let file_name = file.file_name()?;
    if !event.paths.iter().any(|p| p.file_name() == Some(file_name)) {
        return None;
    }

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(SettingsEvent::Changed(file.to_path_buf())),
        EventKind::Remove(_) => Some(SettingsEvent::Removed(file.to_path_buf())),
        _ => None,
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Watcher setup error
#[derive(Debug)]
pub enum WatchError {
    /// Path has no existing parent directory
    InvalidPath(PathBuf),
    /// Backend error
    Notify(notify::Error),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::InvalidPath(p) => write!(f, "Cannot watch {}", p.display()),
            WatchError::Notify(e) => write!(f, "Watch error: {}", e),
        }
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchError::Notify(e) => Some(e),
            WatchError::InvalidPath(_) => None,
        }
    }
}
