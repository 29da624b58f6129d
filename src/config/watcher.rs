//! Config file watching for `--watch`.
//!
//! ```text
//! notify callback (watcher thread) ──▶ tick channel ──▶ debounce task
//!                                                        │ quiet for `debounce`
//!                                                        ▼
//!                                   load_config ──▶ changed? ──▶ update channel
//! ```
//!
//! Editors save with bursts of modify/create/rename events; the debounce task
//! folds a burst into a single reload and drops reloads that produce the
//! config already in effect.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Quiet period after the last file event before reloading.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Publishes each distinct, valid version of a config file.
pub struct ConfigWatcher {
    path: PathBuf,
    debounce: Duration,
    updates: mpsc::UnboundedSender<GatewayConfig>,
}

/// Keeps the file watch alive; dropping it stops reloads.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (updates, updates_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            debounce: DEFAULT_DEBOUNCE,
            updates,
        };
        (watcher, updates_rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. `current` is the config already in effect, so a save
    /// that changes nothing is not republished. Must run inside a Tokio runtime.
    pub fn run(self, current: GatewayConfig) -> Result<WatchHandle, notify::Error> {
        let (ticks, ticks_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    let _ = ticks.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), debounce_ms = self.debounce.as_millis() as u64, "Config watcher started");
        tokio::spawn(debounce_reloads(
            self.path,
            self.debounce,
            ticks_rx,
            self.updates,
            Some(current),
        ));

        Ok(WatchHandle { _watcher: watcher })
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Turn bursts of ticks into reloads. Ends when either channel closes.
async fn debounce_reloads(
    path: PathBuf,
    debounce: Duration,
    mut ticks: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<GatewayConfig>,
    mut last: Option<GatewayConfig>,
) {
    while ticks.recv().await.is_some() {
        let mut coalesced = 1u32;
        loop {
            match tokio::time::timeout(debounce, ticks.recv()).await {
                Ok(Some(())) => coalesced += 1,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        match load_config(&path) {
            Ok(config) if last.as_ref() == Some(&config) => {
                tracing::debug!(events = coalesced, "Config file touched but unchanged");
            }
            Ok(config) => {
                tracing::info!(path = %path.display(), events = coalesced, "Config file changed, reloading");
                last = Some(config.clone());
                if updates.send(config).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}
