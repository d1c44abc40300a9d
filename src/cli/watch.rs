//! Applies configuration changes to a running registry

use crate::cli::cli::commands::Context;
use crate::cli::config::Config;
use crate::cli::error::{CliError, Result};
use crate::core::{DurableStorage, ProjectService, Settings};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What a single watcher notification led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Not about the config file
    Ignored,
    /// Config file touched but the project settings are the same
    Unchanged,
    /// New settings applied; `invalidated` when the source directories changed
    Applied { invalidated: bool },
    /// Watcher or reload error, already logged; watching continues
    Failed(String),
}

/// Re-reads the config file and forwards project settings to the service
pub struct ConfigReloader<S> {
    config_path: PathBuf,
    service: ProjectService<S>,
    last: Settings,
}

impl<S: DurableStorage> ConfigReloader<S> {
    pub fn new(config_path: PathBuf, service: ProjectService<S>, current: Settings) -> Self {
        Self {
            config_path,
            service,
            last: current,
        }
    }

    /// Apply the file's settings if they differ from the last ones seen.
    ///
    /// Returns `Some(invalidated)` when settings were applied.
    pub async fn reload(&mut self) -> Result<Option<bool>> {
        if !self.config_path.exists() {
            debug!("Config file removed, keeping current settings");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.config_path)?;
        let settings = Config::parse(&content)?.projects;
        if settings == self.last {
            return Ok(None);
        }

        self.last = settings.clone();
        let (invalidated, flush) = self.service.on_configuration_changed(settings).await.into_parts();
        if let Some(e) = flush {
            return Err(CliError::Core(e));
        }
        info!(invalidated, "Applied configuration change");
        Ok(Some(invalidated))
    }

    /// Handle one notification from the file watcher
    pub async fn handle(&mut self, notification: notify::Result<Event>) -> WatchOutcome {
        let event = match notification {
            Ok(event) => event,
            Err(e) => {
                warn!("File watcher error: {}", e);
                return WatchOutcome::Failed(CliError::from(e).user_message());
            }
        };
        if !is_config_event(&event, &self.config_path) {
            return WatchOutcome::Ignored;
        }
        match self.reload().await {
            Ok(Some(invalidated)) => WatchOutcome::Applied { invalidated },
            Ok(None) => WatchOutcome::Unchanged,
            Err(e) => {
                warn!("Config reload failed: {}", e);
                WatchOutcome::Failed(e.user_message())
            }
        }
    }
}

/// Whether `event` touched the file at `config_path`
pub fn is_config_event(event: &Event, config_path: &Path) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant && event.paths.iter().any(|path| path.file_name() == config_path.file_name())
}

/// Watch the config file until Ctrl-C
pub async fn watch_config(ctx: &Context) -> Result<()> {
    let config_path = ctx.config_path.clone();
    let watch_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| CliError::configuration("config file has no parent directory"))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    let mut reloader = ConfigReloader::new(
        config_path,
        ctx.service.clone(),
        ctx.service.settings().await,
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(notification) = rx.recv() => match reloader.handle(notification).await {
                WatchOutcome::Applied { invalidated: true } => {
                    ctx.formatter.info("Source directories changed; projects will be rediscovered")
                }
                WatchOutcome::Applied { invalidated: false } => ctx.formatter.info("Settings updated"),
                WatchOutcome::Failed(message) => ctx.formatter.warn(&message),
                WatchOutcome::Ignored | WatchOutcome::Unchanged => {}
            },
        }
    }

    Ok(())
}
