//! Configuration file watcher for hot-reloading.
//!
//! Watches the configuration file's directory, waits for a burst of writes
//! to settle, then reloads the file into the [`PreferenceStore`]. The store
//! works out which preferences actually changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use super::load_config_from_path;
use crate::constants::timing::CONFIG_DEBOUNCE_MS;
use crate::error::OvernotchError;
use crate::platform::spawn_named_thread;
use crate::preferences::{PreferenceStore, Preferences};
use crate::services::Service;

/// Service reloading preferences when the config file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    store: Arc<PreferenceStore>,
    /// Dropping the watcher closes the event channel and ends the thread.
    watcher: Option<RecommendedWatcher>,
}

impl ConfigWatcher {
    #[must_use]
    pub const fn new(path: PathBuf, store: Arc<PreferenceStore>) -> Self {
        Self { path, store, watcher: None }
    }
}

/// Returns whether a notify event touches the config file.
fn affects_config(event: &notify::Event, file_name: &std::ffi::OsStr) -> bool {
    event.paths.iter().any(|p| p.file_name().is_some_and(|name| name == file_name))
}

/// Reloads the file into the store. Invalid files keep the current values.
fn reload(path: &Path, store: &PreferenceStore) {
    match load_config_from_path(path) {
        Ok((config, _)) => {
            let changed = store.replace(Preferences::from(&config));
            tracing::info!(changed = changed.len(), "overnotch: config: reloaded");
        }
        Err(err) => {
            tracing::warn!(error = %err, "overnotch: config: reload failed, keeping current settings");
        }
    }
}

fn watch_loop(
    rx: &Receiver<notify::Result<notify::Event>>,
    path: &Path,
    store: &PreferenceStore,
) {
    let Some(file_name) = path.file_name().map(std::ffi::OsStr::to_os_string) else {
        return;
    };
    let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);

    loop {
        match rx.recv() {
            Ok(Ok(event)) if affects_config(&event, &file_name) => {
                // Editors save in several steps; wait for quiet before reloading
                loop {
                    match rx.recv_timeout(debounce) {
                        Ok(_) => {}
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                reload(path, store);
            }
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "overnotch: config: watch error");
            }
            // Watcher dropped
            Err(_) => return,
        }
    }
}

impl Service for ConfigWatcher {
    fn name(&self) -> &'static str { "config-watcher" }

    fn start(&mut self) -> Result<(), OvernotchError> {
        // Watch the parent directory to catch editors that save by rename
        let Some(watch_dir) = self.path.parent().filter(|dir| dir.is_dir()) else {
            tracing::debug!(path = %self.path.display(), "overnotch: config: no directory to watch");
            return Ok(());
        };

        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)
            .map_err(|err| OvernotchError::ServiceError(format!("failed to create config watcher: {err}")))?;
        watcher
            .watch(watch_dir, RecursiveMode::NonRecursive)
            .map_err(|err| OvernotchError::ServiceError(format!("failed to watch config directory: {err}")))?;

        let path = self.path.clone();
        let store = Arc::clone(&self.store);
        spawn_named_thread("config-watcher", move || watch_loop(&rx, &path, &store));

        self.watcher = Some(watcher);
        tracing::info!(path = %self.path.display(), "overnotch: config: watching for changes");
        Ok(())
    }

    fn stop(&mut self) { self.watcher = None; }
}
