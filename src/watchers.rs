use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};

use crate::config::{AppConfig, load_app_config};

/// Watches the config file and hands back reparsed configs on change.
pub struct ConfigWatcher {
    path: PathBuf,
    rx: Receiver<()>,
}

impl ConfigWatcher {
    pub fn spawn(path: &Path) -> Self {
        let (tx, rx) = channel::<()>();
        let watch_path = path.to_path_buf();
        std::thread::spawn(move || {
            use notify::{EventKind, RecursiveMode, Watcher};
            if let Ok(mut watcher) =
                notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                    if let Ok(event) = res {
                        match event.kind {
                            EventKind::Modify(_)
                            | EventKind::Create(_)
                            | EventKind::Remove(_)
                            | EventKind::Any => {
                                let _ = tx.send(());
                            }
                            _ => {}
                        }
                    }
                })
            {
                if let Err(e) = watcher.watch(&watch_path, RecursiveMode::NonRecursive) {
                    log::warn!("config watch failed ({}): {}", watch_path.display(), e);
                    return;
                }
                loop {
                    std::thread::sleep(std::time::Duration::from_secs(3600));
                }
            }
        });
        Self {
            path: path.to_path_buf(),
            rx,
        }
    }

    /// Drain pending file events; reload once if there were any.
    pub fn poll(&self) -> Option<AppConfig> {
        let mut changed = false;
        for _ in self.rx.try_iter() {
            changed = true;
        }
        if !changed {
            return None;
        }
        if !self.path.exists() {
            log::warn!("config missing: {}", self.path.display());
            return None;
        }
        match load_app_config(&self.path) {
            Ok(cfg) => {
                log::info!("config reloaded from {}", self.path.display());
                Some(cfg)
            }
            Err(e) => {
                log::warn!("config reload failed ({}): {}", self.path.display(), e);
                None
            }
        }
    }
}
