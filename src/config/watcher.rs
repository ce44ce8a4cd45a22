//! Config file watching for `--watch`.
//!
//! The parent directory is watched rather than the file, so editors that
//! save by rename still produce events. Unchanged content is not resent.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::GatewayConfig;

/// Sends a freshly validated [`GatewayConfig`] whenever the file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(|n| n.to_os_string());
        let last_applied = Mutex::new(fs::read_to_string(&path).ok());

        let handler_path = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                let touches_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !touches_file {
                    return;
                }

                reload(&handler_path, &last_applied, &update_tx);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload(
    path: &Path,
    last_applied: &Mutex<Option<String>>,
    update_tx: &mpsc::UnboundedSender<GatewayConfig>,
) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                path = ?path,
                error = %e,
                "Config file unreadable, keeping current configuration"
            );
            return;
        }
    };

    // The guarded value is a plain string; a panic elsewhere cannot corrupt it.
    let mut last = last_applied.lock().unwrap_or_else(PoisonError::into_inner);
    if last.as_deref() == Some(content.as_str()) {
        return;
    }

    match parse_config(&content, |key| std::env::var(key).ok()) {
        Ok(config) => {
            tracing::info!(path = ?path, "Config file changed, reloading");
            *last = Some(content);
            let _ = update_tx.send(config);
        }
        Err(e) => tracing::error!(
            path = ?path,
            error = %e,
            "Rejected config change, keeping current configuration"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let file = format!("tenant-gateway-{}-{name}.toml", std::process::id());
        let path = std::env::temp_dir().join(file);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reload_sends_once_per_change() {
        let path = temp_config("reload", "[routing]\nmain_domain = \"example.com\"\n");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let last = Mutex::new(None);

        reload(&path, &last, &tx);
        let config = rx.try_recv().unwrap();
        assert_eq!(config.routing.main_domain.as_deref(), Some("example.com"));

        reload(&path, &last, &tx);
        assert!(rx.try_recv().is_err());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_change_is_not_sent() {
        let path = temp_config("invalid", "[routing]\ndefault_locale = \"de\"\n");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let last = Mutex::new(None);

        reload(&path, &last, &tx);
        assert!(rx.try_recv().is_err());
        assert!(last.lock().unwrap().is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reload_survives_poisoned_lock() {
        let path = temp_config("poisoned", "[routing]\nmain_domain = \"example.org\"\n");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let last = std::sync::Arc::new(Mutex::new(None));

        let poisoner = last.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(last.is_poisoned());

        reload(&path, &last, &tx);
        let config = rx.try_recv().unwrap();
        assert_eq!(config.routing.main_domain.as_deref(), Some("example.org"));

        let _ = fs::remove_file(&path);
    }
}
