//! Project registry
//!
//! The registry keeps the list of known projects in a [`Store`]. While the
//! store holds no projects the registry is *empty*, and the next
//! [`ProjectRegistry::list`] scans the configured source directories. After
//! that it is *populated* and lists come straight from the cache until
//! [`ProjectRegistry::invalidate`] is called, either explicitly (reload) or
//! because the set of source directories changed.
//!
//! Usage counts survive invalidation: the entries being dropped are remembered
//! and seed the counters of the next discovery pass.

use crate::core::error::{Error, Result};
use crate::core::paths::HomePath;
use crate::core::project::{
    encode_entries, path_key, ProjectEntry, RegistryCache, SchemaVersion, PROJECTS_KEY,
    SCHEMA_VERSION_KEY,
};
use crate::core::settings::{source_set_changed, Settings};
use crate::core::store::{DurableStorage, Store};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Store key holding the source directories the cache was discovered from
pub const SOURCE_DIRECTORIES_KEY: &str = "sourceDirectories";

/// Whether the cache currently holds projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Populated,
}

/// Result of a mutation together with the outcome of persisting it.
///
/// A failed flush does not undo the mutation: the in-memory state already
/// reflects it and stays authoritative until the process exits.
#[derive(Debug)]
pub struct Flushed<T> {
    pub value: T,
    pub flush: Result<()>,
}

impl<T> Flushed<T> {
    pub fn new(value: T, flush: Result<()>) -> Self {
        Self { value, flush }
    }

    pub fn durable(value: T) -> Self {
        Self::new(value, Ok(()))
    }

    /// Whether the mutation reached durable storage
    pub fn is_durable(&self) -> bool {
        self.flush.is_ok()
    }

    /// The value, or the persistence error if the flush failed
    pub fn into_result(self) -> Result<T> {
        self.flush.map(|_| self.value)
    }

    /// Split into the value and the flush error, if any
    pub fn into_parts(self) -> (T, Option<Error>) {
        (self.value, self.flush.err())
    }
}

/// Projects returned by [`ProjectRegistry::list`], unranked
#[derive(Debug, Default)]
pub struct Listing {
    pub projects: Vec<ProjectEntry>,
    /// Problems reported to the user; none of them aborted the listing
    pub warnings: Vec<Error>,
    /// Whether this listing came from a fresh discovery pass
    pub discovered: bool,
}

/// Usage counts remembered from an invalidated cache
#[derive(Debug, Default)]
struct PreviousCounts {
    by_path: HashMap<PathBuf, u64>,
    by_name: HashMap<String, u64>,
}

impl PreviousCounts {
    fn from_entries(entries: &[ProjectEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            counts.by_path.insert(entry.path.clone(), entry.usage_count);
            let by_name = counts.by_name.entry(entry.name.clone()).or_insert(0);
            *by_name = (*by_name).max(entry.usage_count);
        }
        counts
    }

    fn seed(&self, entry: &ProjectEntry) -> u64 {
        self.by_path
            .get(&entry.path)
            .or_else(|| self.by_name.get(&entry.name))
            .copied()
            .unwrap_or(0)
    }
}

/// Discovers, caches and counts projects
#[derive(Debug)]
pub struct ProjectRegistry<S> {
    store: Store<S>,
    home: HomePath,
    settings: Settings,
    previous: Option<PreviousCounts>,
}

impl<S: DurableStorage> ProjectRegistry<S> {
    /// Bind a registry to an opened store.
    ///
    /// Migrates an older cache shape and invalidates the cache when the
    /// configured source directories differ from the ones it was built from.
    pub async fn new(store: Store<S>, home: HomePath, settings: Settings) -> Self {
        let mut registry = Self {
            store,
            home,
            settings,
            previous: None,
        };
        registry.migrate().await;
        registry.reconcile_sources().await;
        registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn home(&self) -> &HomePath {
        &self.home
    }

    pub fn state(&self) -> RegistryState {
        match self.store.get(PROJECTS_KEY) {
            Some(Value::Array(items)) if !items.is_empty() => RegistryState::Populated,
            _ => RegistryState::Empty,
        }
    }

    /// The cached projects, discovering them first if the cache is empty
    pub async fn list(&mut self) -> Listing {
        let mut warnings = Vec::new();
        match self.cached_entries() {
            Ok(Some(projects)) => {
                return Listing {
                    projects,
                    warnings,
                    discovered: false,
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Discarding unreadable project cache: {}", e);
                warnings.push(e);
            }
        }

        let mut listing = self.discover().await;
        warnings.append(&mut listing.warnings);
        listing.warnings = warnings;
        listing
    }

    /// Create a project directory and register it as used once
    pub async fn create(
        &mut self,
        name: &str,
        target_dir: Option<&Path>,
    ) -> Result<Flushed<ProjectEntry>> {
        let name = validate_name(name)?;

        let mut projects = self.list().await.projects;
        if projects.iter().any(|project| project.name == name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let target_dir = match target_dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .settings
                .source_directories(&self.home)
                .into_iter()
                .next()
                .ok_or_else(|| Error::configuration("no source directory configured"))?,
        };

        let path = target_dir.join(name);
        std::fs::create_dir(&path).map_err(|e| Error::directory_create(&path, &e))?;
        info!(name = %name, path = %path.display(), "Created project");

        // Counted as used: it is about to be opened.
        let entry = ProjectEntry::new(name, path).with_usage(1);
        projects.push(entry.clone());
        let flush = self.write_entries(&projects).await;
        Ok(Flushed::new(entry, flush))
    }

    /// Count one activation of the project at `path`.
    ///
    /// Returns the updated entry, or `None` when no project matches.
    pub async fn record_activation(&mut self, path: &Path) -> Flushed<Option<ProjectEntry>> {
        let mut projects = self.list().await.projects;

        let Some(index) = self.position_of(&projects, path) else {
            debug!(path = %path.display(), "Activated path is not a known project");
            return Flushed::durable(None);
        };
        let entry = &mut projects[index];
        entry.usage_count = entry.usage_count.saturating_add(1);
        let updated = entry.clone();
        debug!(name = %updated.name, count = updated.usage_count, "Recorded activation");

        let flush = self.write_entries(&projects).await;
        Flushed::new(Some(updated), flush)
    }

    /// Drop the cached projects so the next listing rediscovers them.
    pub async fn invalidate(&mut self) -> Flushed<()> {
        match self.cached_entries() {
            Ok(Some(entries)) => {
                self.previous = Some(PreviousCounts::from_entries(&entries));
            }
            Ok(None) => {}
            Err(e) => warn!("Project cache unreadable, usage counts are lost: {}", e),
        }
        info!("Invalidated project cache");
        let flush = self.store.clear(Some(PROJECTS_KEY)).await;
        Flushed::new((), flush)
    }

    /// Invalidate and rediscover
    pub async fn reload(&mut self) -> Listing {
        let (_, flush_error) = self.invalidate().await.into_parts();
        let mut listing = self.list().await;
        if let Some(e) = flush_error {
            listing.warnings.insert(0, e);
        }
        listing
    }

    /// Replace the settings, invalidating the cache if the set of source
    /// directories changed. Returns whether it was invalidated.
    pub async fn apply_settings(&mut self, settings: Settings) -> Flushed<bool> {
        let old = self.settings.source_set(&self.home);
        let new = settings.source_set(&self.home);
        self.settings = settings;

        if !source_set_changed(&old, &new) {
            return Flushed::durable(false);
        }
        info!(?old, ?new, "Source directories changed");
        let (_, flush) = self.invalidate().await.into_parts();
        Flushed::new(true, flush.map_or(Ok(()), Err))
    }

    /// Find a project by path, falling back to a case-insensitive match
    pub async fn find_by_path(&mut self, path: &Path) -> Option<ProjectEntry> {
        let mut projects = self.list().await.projects;
        let index = self.position_of(&projects, path)?;
        Some(projects.swap_remove(index))
    }

    /// Find a project by path, exact name, or case-insensitive name
    pub async fn resolve(&mut self, query: &str) -> Option<ProjectEntry> {
        let projects = self.list().await.projects;

        if let Some(index) = self.position_of(&projects, Path::new(query)) {
            return Some(projects[index].clone());
        }
        if let Some(found) = projects.iter().find(|p| p.name == query) {
            return Some(found.clone());
        }
        let lowered = query.to_lowercase();
        projects
            .into_iter()
            .find(|p| p.name.to_lowercase() == lowered)
    }

    /// Remove a project from the cache at the user's request
    pub async fn forget(&mut self, path: &Path) -> Flushed<Option<ProjectEntry>> {
        let mut projects = self.list().await.projects;

        let Some(index) = self.position_of(&projects, path) else {
            return Flushed::durable(None);
        };
        let removed = projects.remove(index);
        info!(name = %removed.name, "Forgot project");

        let flush = self.write_entries(&projects).await;
        Flushed::new(Some(removed), flush)
    }

    /// Index of the project at `path`: exact match first, then ignoring case
    fn position_of(&self, projects: &[ProjectEntry], path: &Path) -> Option<usize> {
        let path = self.home.expand_path(&path.to_string_lossy());
        projects.iter().position(|p| p.path == path).or_else(|| {
            let key = path_key(&path);
            projects.iter().position(|p| p.path_key() == key)
        })
    }

    fn cached_entries(&self) -> Result<Option<Vec<ProjectEntry>>> {
        let Some(projects) = self.store.get(PROJECTS_KEY) else {
            return Ok(None);
        };
        let cache = RegistryCache::decode(
            projects,
            self.store.get(SCHEMA_VERSION_KEY),
            &self.home,
        )?;
        if cache.entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(cache.entries))
    }

    async fn write_entries(&mut self, entries: &[ProjectEntry]) -> Result<()> {
        let encoded = encode_entries(entries, &self.home)?;
        let result = self
            .store
            .set_many([
                (PROJECTS_KEY, encoded),
                (SCHEMA_VERSION_KEY, Value::from(SchemaVersion::CURRENT.tag())),
            ])
            .await;
        if let Err(e) = &result {
            warn!("Failed to persist project cache: {}", e);
        }
        result
    }

    async fn discover(&mut self) -> Listing {
        let mut warnings = Vec::new();
        let directories = self.settings.source_directories(&self.home);
        if directories.is_empty() {
            warn!("No source directory configured");
            warnings.push(Error::configuration("no source directory configured"));
            return Listing {
                projects: Vec::new(),
                warnings,
                discovered: true,
            };
        }

        let mut seen = HashSet::new();
        let mut projects = Vec::new();
        for directory in &directories {
            match self.scan_directory(directory) {
                Ok(found) => {
                    for entry in found {
                        if seen.insert(entry.path.clone()) {
                            projects.push(entry);
                        }
                    }
                }
                Err(e) => {
                    warn!("{}", e);
                    warnings.push(e);
                }
            }
        }

        if let Some(previous) = &self.previous {
            for entry in &mut projects {
                entry.usage_count = previous.seed(entry);
            }
        }
        if warnings.is_empty() {
            self.previous = None;
        }
        info!(
            count = projects.len(),
            directories = directories.len(),
            "Discovered projects"
        );

        if let Err(e) = self.persist_discovery(&projects, &directories).await {
            warnings.push(e);
        }
        Listing {
            projects,
            warnings,
            discovered: true,
        }
    }

    fn scan_directory(&self, directory: &Path) -> Result<Vec<ProjectEntry>> {
        let metadata = std::fs::metadata(directory)
            .map_err(|e| source_directory_error(directory, &e))?;
        if !metadata.is_dir() {
            return Err(Error::configuration(format!(
                "{} is not a directory",
                directory.display()
            )));
        }
        let read_dir =
            std::fs::read_dir(directory).map_err(|e| source_directory_error(directory, &e))?;

        let mut found = Vec::new();
        for dir_entry in read_dir {
            // Entries can vanish between listing and stat
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", directory.display(), e);
                    continue;
                }
            };
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || self.settings.is_ignored(&name) {
                continue;
            }
            let path = dir_entry.path();
            match std::fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => found.push(ProjectEntry::new(name, path)),
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn persist_discovery(
        &mut self,
        projects: &[ProjectEntry],
        directories: &[PathBuf],
    ) -> Result<()> {
        let sources: BTreeSet<String> = directories
            .iter()
            .map(|dir| self.home.compact_path(dir))
            .collect();
        let result = self
            .store
            .set_many([
                (PROJECTS_KEY, encode_entries(projects, &self.home)?),
                (SCHEMA_VERSION_KEY, Value::from(SchemaVersion::CURRENT.tag())),
                (SOURCE_DIRECTORIES_KEY, serde_json::to_value(sources)?),
            ])
            .await;
        if let Err(e) = &result {
            warn!("Failed to persist discovered projects: {}", e);
        }
        result
    }

    async fn migrate(&mut self) {
        let Some(projects) = self.store.get(PROJECTS_KEY) else {
            return;
        };
        let tagged = self.store.contains(SCHEMA_VERSION_KEY);
        match RegistryCache::decode(projects, self.store.get(SCHEMA_VERSION_KEY), &self.home) {
            Ok(cache) if cache.needs_migration() || !tagged => {
                info!(
                    from = ?cache.stored_version,
                    to = ?SchemaVersion::CURRENT,
                    entries = cache.entries.len(),
                    "Migrating project cache"
                );
                // Failure is already logged; memory holds the migrated shape.
                let _ = self.write_entries(&cache.entries).await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Project cache is unreadable and will be rebuilt: {}", e);
                let _ = self.store.clear(Some(PROJECTS_KEY)).await;
            }
        }
    }

    async fn reconcile_sources(&mut self) {
        let current = self.settings.source_set(&self.home);
        let recorded: Option<BTreeSet<String>> =
            match self.store.get_as(SOURCE_DIRECTORIES_KEY) {
                Ok(recorded) => recorded,
                Err(e) => {
                    warn!("Ignoring unreadable source directory record: {}", e);
                    None
                }
            };

        match recorded {
            Some(recorded) if source_set_changed(&recorded, &current) => {
                info!(
                    ?recorded,
                    ?current,
                    "Source directories changed since the cache was built"
                );
                let _ = self.invalidate().await;
            }
            Some(_) => {}
            None if self.state() == RegistryState::Populated => {
                // Cache from before sources were recorded: adopt the current set.
                if let Err(e) = self.store.set(SOURCE_DIRECTORIES_KEY, &current).await {
                    warn!("Failed to record source directories: {}", e);
                }
            }
            None => {}
        }
    }
}

fn source_directory_error(directory: &Path, error: &std::io::Error) -> Error {
    let reason = match error.kind() {
        std::io::ErrorKind::NotFound => "does not exist".to_string(),
        std::io::ErrorKind::PermissionDenied => "cannot be read (permission denied)".to_string(),
        _ => format!("cannot be read ({})", error),
    };
    Error::configuration(format!("{} {}", directory.display(), reason))
}

/// Check a new project name, returning it trimmed
pub fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_name("name cannot be empty"));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(Error::invalid_name(format!("'{}' is not a valid name", trimmed)));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(Error::invalid_name("name cannot contain path separators"));
    }
    Ok(trimmed)
}

/// Fail with [`Error::StaleEntry`] when the project's directory is gone.
///
/// Stale entries are reported, never removed automatically; removal is the
/// caller's decision (see [`ProjectRegistry::forget`]).
pub fn ensure_present(entry: &ProjectEntry) -> Result<()> {
    if entry.exists() {
        Ok(())
    } else {
        Err(Error::StaleEntry(entry.path.clone()))
    }
}
