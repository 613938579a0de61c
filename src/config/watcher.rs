//! Server list file watcher for hot reload.
//!
//! The watcher only says "something changed". Loading and swapping the list
//! is the registry's job, on the receiving side of the channel.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Why a reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// The watched file was created or modified.
    FileChanged,
    /// SIGHUP.
    Signal,
    /// Admin API request.
    Admin,
}

impl ReloadEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadEvent::FileChanged => "file_changed",
            ReloadEvent::Signal => "signal",
            ReloadEvent::Admin => "admin",
        }
    }
}

/// A watcher that monitors the server list file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<ReloadEvent>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for reload events.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ReloadEvent>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval: Duration::from_secs(2),
                update_tx,
            },
            update_rx,
        )
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Another publisher on the same channel (signals, admin API).
    pub fn sender(&self) -> mpsc::UnboundedSender<ReloadEvent> {
        self.update_tx.clone()
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors which save by rename keep triggering reloads.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_file {
                        tracing::info!(kind = ?event.kind, "Server list change detected");
                        let _ = tx.send(ReloadEvent::FileChanged);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Server list watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sender_publishes_on_same_channel() {
        let (watcher, mut rx) = ConfigWatcher::new(Path::new("servers.json"));
        watcher.sender().send(ReloadEvent::Admin).unwrap();
        assert_eq!(rx.recv().await, Some(ReloadEvent::Admin));
    }

    #[tokio::test]
    async fn test_file_write_publishes_event() {
        let dir = std::env::temp_dir().join(format!("rr-gateway-watch-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("servers.json");
        std::fs::write(&path, "[]").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _guard = watcher.run().unwrap();

        std::fs::write(&path, r#"[{"host": "http://localhost:3001"}]"#).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(event.unwrap(), Some(ReloadEvent::FileChanged));
    }
}
