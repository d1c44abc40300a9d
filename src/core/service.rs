//! Host-facing project service
//!
//! Every operation takes the registry lock for its whole duration, so
//! sequences like "compare source directories, then clear the cache" cannot
//! interleave with a listing triggered from elsewhere (for example a
//! configuration watcher running next to a user command).

use crate::core::error::{Error, Result};
use crate::core::paths::HomePath;
use crate::core::picker::{pick_list, PickItem};
use crate::core::project::ProjectEntry;
use crate::core::ranking::sort_entries;
use crate::core::registry::{Flushed, Listing, ProjectRegistry};
use crate::core::settings::Settings;
use crate::core::status::StatusIndicator;
use crate::core::store::{DurableStorage, Store};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Picker rows plus anything worth telling the user
#[derive(Debug)]
pub struct ProjectList {
    pub items: Vec<PickItem>,
    pub warnings: Vec<Error>,
}

impl ProjectList {
    /// Projects only, without the reload row
    pub fn projects(&self) -> impl Iterator<Item = &ProjectEntry> {
        self.items.iter().filter_map(PickItem::entry)
    }
}

/// Outcome of a workspace being opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub project: Option<ProjectEntry>,
    pub status: Option<StatusIndicator>,
}

/// Shared handle to a project registry
pub struct ProjectService<S> {
    registry: Arc<Mutex<ProjectRegistry<S>>>,
}

impl<S> Clone for ProjectService<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: DurableStorage> ProjectService<S> {
    pub fn new(registry: ProjectRegistry<S>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    /// Open `namespace` on `storage` and bind a registry to it
    pub async fn open(
        storage: S,
        namespace: &str,
        home: HomePath,
        settings: Settings,
    ) -> Result<Self> {
        let store = Store::open(storage, namespace).await?;
        Ok(Self::new(ProjectRegistry::new(store, home, settings).await))
    }

    /// Sorted picker rows; `current` is left out of the list
    pub async fn list_projects(&self, current: Option<&Path>) -> ProjectList {
        let mut registry = self.registry.lock().await;
        let criteria = registry.settings().sort_list;
        let listing = registry.list().await;
        ProjectList {
            items: pick_list(listing.projects, criteria, current),
            warnings: listing.warnings,
        }
    }

    /// All projects in configured order, nothing left out
    pub async fn projects(&self) -> Listing {
        let mut registry = self.registry.lock().await;
        let criteria = registry.settings().sort_list;
        let mut listing = registry.list().await;
        listing.projects = sort_entries(listing.projects, criteria);
        listing
    }

    /// Create a project in the first source directory
    pub async fn create_project(&self, name: &str) -> Result<Flushed<ProjectEntry>> {
        self.registry.lock().await.create(name, None).await
    }

    /// Rescan the source directories
    pub async fn reload_projects(&self, current: Option<&Path>) -> ProjectList {
        let mut registry = self.registry.lock().await;
        let criteria = registry.settings().sort_list;
        let listing = registry.reload().await;
        ProjectList {
            items: pick_list(listing.projects, criteria, current),
            warnings: listing.warnings,
        }
    }

    /// Count the activation of `path` and compute its status indicator
    pub async fn on_workspace_opened(&self, path: &Path) -> Flushed<Activation> {
        let mut registry = self.registry.lock().await;
        let (project, flush) = registry.record_activation(path).await.into_parts();
        let status = project
            .as_ref()
            .and_then(|project| StatusIndicator::for_project(project, registry.settings()));
        Flushed::new(Activation { project, status }, flush.map_or(Ok(()), Err))
    }

    /// Apply new settings; returns whether the cache was invalidated
    pub async fn on_configuration_changed(&self, settings: Settings) -> Flushed<bool> {
        self.registry.lock().await.apply_settings(settings).await
    }

    /// Status indicator for `path` without counting an activation
    pub async fn status(&self, path: &Path) -> Option<StatusIndicator> {
        let mut registry = self.registry.lock().await;
        let project = registry.find_by_path(path).await?;
        StatusIndicator::for_project(&project, registry.settings())
    }

    /// Find a project by path or name
    pub async fn resolve(&self, query: &str) -> Option<ProjectEntry> {
        self.registry.lock().await.resolve(query).await
    }

    /// Remove a project from the cache
    pub async fn forget(&self, path: &Path) -> Flushed<Option<ProjectEntry>> {
        self.registry.lock().await.forget(path).await
    }

    pub async fn settings(&self) -> Settings {
        self.registry.lock().await.settings().clone()
    }
}
