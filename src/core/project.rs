//! Project entries and their persisted shape
//!
//! In memory a [`ProjectEntry`] always carries an expanded absolute path and a
//! usage count. On disk the path is compacted with the `$home` placeholder and
//! the list is tagged with a [`SchemaVersion`]. Caches written before usage
//! counts existed carry no tag and no `usageCount`; [`RegistryCache::decode`]
//! materializes the current shape from them once, at load time.

use crate::core::error::Result;
use crate::core::paths::HomePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Store key holding the project list
pub const PROJECTS_KEY: &str = "projects";
/// Store key holding the schema tag
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// A directory the user can switch to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    /// Directory base name
    pub name: String,
    /// Absolute path with the home directory expanded
    pub path: PathBuf,
    /// Number of times the project has been activated
    pub usage_count: u64,
}

impl ProjectEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            usage_count: 0,
        }
    }

    pub fn with_usage(mut self, usage_count: u64) -> Self {
        self.usage_count = usage_count;
        self
    }

    /// Whether the directory still exists on disk
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Lowercased path used for case-insensitive identity checks
    pub fn path_key(&self) -> String {
        path_key(&self.path)
    }
}

/// Case-folded form of `path` for lookups from hosts whose filesystem
/// ignores case. Discovery keeps exact paths; only lookups fold.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Persisted record shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProject {
    name: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usage_count: Option<u64>,
}

/// Shape of the persisted project list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// Entries without usage counts, written before the tag existed
    Unversioned = 0,
    /// Entries with usage counts
    Counted = 1,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::Counted;

    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(Self::Unversioned),
            1 => Some(Self::Counted),
            _ => None,
        }
    }

    pub fn tag(self) -> u64 {
        self as u64
    }
}

/// The decoded project cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCache {
    /// Version the data was stored with, before migration
    pub stored_version: SchemaVersion,
    pub entries: Vec<ProjectEntry>,
}

impl RegistryCache {
    /// Decode the persisted list, migrating older shapes to the current one.
    ///
    /// Without an explicit tag the version is inferred: any entry carrying a
    /// `usageCount` marks the list as counted. Missing counts become 0.
    pub fn decode(
        projects: &Value,
        version_tag: Option<&Value>,
        home: &HomePath,
    ) -> Result<Self> {
        let stored: Vec<StoredProject> = serde_json::from_value(projects.clone())?;

        let stored_version = match version_tag.and_then(Value::as_u64) {
            Some(tag) => SchemaVersion::from_tag(tag).unwrap_or(SchemaVersion::CURRENT),
            None if stored.iter().any(|p| p.usage_count.is_some()) => SchemaVersion::Counted,
            None => SchemaVersion::Unversioned,
        };

        let entries = stored
            .into_iter()
            .map(|p| ProjectEntry {
                path: home.expand_path(&p.path),
                name: p.name,
                usage_count: p.usage_count.unwrap_or(0),
            })
            .collect();

        Ok(Self {
            stored_version,
            entries,
        })
    }

    /// Whether the persisted data must be rewritten in the current shape
    pub fn needs_migration(&self) -> bool {
        self.stored_version < SchemaVersion::CURRENT
    }
}

/// Encode entries in their persisted, home-compacted shape
pub fn encode_entries(entries: &[ProjectEntry], home: &HomePath) -> Result<Value> {
    let stored: Vec<StoredProject> = entries
        .iter()
        .map(|entry| StoredProject {
            name: entry.name.clone(),
            path: home.compact_path(&entry.path),
            usage_count: Some(entry.usage_count),
        })
        .collect();
    Ok(serde_json::to_value(stored)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn home() -> HomePath {
        HomePath::new("/home/alice")
    }

    #[test]
    fn test_encode_compacts_home() {
        let entries = vec![
            ProjectEntry::new("foo", "/home/alice/projects/foo").with_usage(3),
            ProjectEntry::new("bar", "/srv/bar"),
        ];

        let encoded = encode_entries(&entries, &home()).unwrap();
        assert_eq!(
            encoded,
            json!([
                {"name": "foo", "path": "$home/projects/foo", "usageCount": 3},
                {"name": "bar", "path": "/srv/bar", "usageCount": 0},
            ])
        );
    }

    #[test]
    fn test_decode_counted_entries() {
        let projects = json!([
            {"name": "foo", "path": "$home/projects/foo", "usageCount": 5},
        ]);

        let cache = RegistryCache::decode(&projects, Some(&json!(1)), &home()).unwrap();
        assert_eq!(cache.stored_version, SchemaVersion::Counted);
        assert!(!cache.needs_migration());
        assert_eq!(
            cache.entries,
            vec![ProjectEntry::new("foo", "/home/alice/projects/foo").with_usage(5)]
        );
    }

    #[test]
    fn test_decode_infers_unversioned_without_counts() {
        let projects = json!([
            {"name": "foo", "path": "$home/projects/foo"},
            {"name": "bar", "path": "/srv/bar"},
        ]);

        let cache = RegistryCache::decode(&projects, None, &home()).unwrap();
        assert_eq!(cache.stored_version, SchemaVersion::Unversioned);
        assert!(cache.needs_migration());
        assert!(cache.entries.iter().all(|e| e.usage_count == 0));
        assert_eq!(cache.entries[0].path, PathBuf::from("/home/alice/projects/foo"));
    }

    #[test]
    fn test_decode_infers_counted_without_tag() {
        let projects = json!([
            {"name": "foo", "path": "/a/foo", "usageCount": 2},
            {"name": "bar", "path": "/a/bar"},
        ]);

        let cache = RegistryCache::decode(&projects, None, &home()).unwrap();
        assert_eq!(cache.stored_version, SchemaVersion::Counted);
        assert!(!cache.needs_migration());
        assert_eq!(cache.entries[1].usage_count, 0);
    }

    #[test]
    fn test_decode_rejects_malformed_list() {
        let projects = json!({"name": "not a list"});
        assert!(RegistryCache::decode(&projects, None, &home()).is_err());
    }

    #[test]
    fn test_schema_tags() {
        assert_eq!(SchemaVersion::from_tag(0), Some(SchemaVersion::Unversioned));
        assert_eq!(SchemaVersion::from_tag(1), Some(SchemaVersion::Counted));
        assert_eq!(SchemaVersion::from_tag(9), None);
        assert_eq!(SchemaVersion::CURRENT.tag(), 1);
    }

    #[test]
    fn test_path_key_is_lowercase() {
        let entry = ProjectEntry::new("Foo", "/Home/Alice/Foo");
        assert_eq!(entry.path_key(), "/home/alice/foo");
        assert_eq!(path_key(Path::new("/Users/A/Foo")), path_key(Path::new("/users/a/foo")));
        assert_ne!(path_key(Path::new("/a/foo")), path_key(Path::new("/a/foo2")));
    }
}
