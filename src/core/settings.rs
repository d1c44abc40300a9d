//! Registry settings supplied by the host

use crate::core::paths::HomePath;
use crate::core::ranking::SortCriteria;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One configured location or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectsLocation {
    One(String),
    Many(Vec<String>),
}

impl Default for ProjectsLocation {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl ProjectsLocation {
    /// Configured entries, blanks dropped
    pub fn entries(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            Self::One(location) => vec![location.as_str()],
            Self::Many(locations) => locations.iter().map(String::as_str).collect(),
        };
        all.into_iter()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .collect()
    }
}

/// Settings the registry and status indicator read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directories whose immediate subdirectories are projects
    #[serde(default)]
    pub projects_location: ProjectsLocation,

    /// Directory names never treated as projects
    #[serde(default)]
    pub ignored_folders: BTreeSet<String>,

    /// Show the current project's name in the status indicator
    #[serde(default = "default_true")]
    pub show_project_name_in_status_bar: bool,

    /// Open selected projects in a new window
    #[serde(default = "default_true")]
    pub open_in_new_window: bool,

    /// Ordering of the project list
    #[serde(default)]
    pub sort_list: SortCriteria,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            projects_location: ProjectsLocation::default(),
            ignored_folders: BTreeSet::new(),
            show_project_name_in_status_bar: default_true(),
            open_in_new_window: default_true(),
            sort_list: SortCriteria::default(),
        }
    }
}

impl Settings {
    /// Settings scanning the given locations
    pub fn with_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects_location: ProjectsLocation::Many(
                locations.into_iter().map(Into::into).collect(),
            ),
            ..Self::default()
        }
    }

    /// Expanded source directories, duplicates removed, configured order kept
    pub fn source_directories(&self, home: &HomePath) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        self.projects_location
            .entries()
            .into_iter()
            .map(|location| home.expand_path(location))
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Compacted source directories as an order-independent set
    pub fn source_set(&self, home: &HomePath) -> BTreeSet<String> {
        self.source_directories(home)
            .iter()
            .map(|path| home.compact_path(path))
            .collect()
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_folders.contains(name)
    }
}

/// Whether switching from `old` to `new` adds or removes a source directory.
/// Reordering alone is not a change.
pub fn source_set_changed(old: &BTreeSet<String>, new: &BTreeSet<String>) -> bool {
    old != new
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> HomePath {
        HomePath::new("/home/alice")
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.projects_location.entries().is_empty());
        assert!(settings.show_project_name_in_status_bar);
        assert!(settings.open_in_new_window);
        assert_eq!(settings.sort_list, SortCriteria::Usage);
    }

    #[test]
    fn test_single_location_deserializes() {
        let settings: Settings =
            serde_json::from_str(r#"{"projects_location": "$home/code"}"#).unwrap();
        assert_eq!(
            settings.source_directories(&home()),
            vec![PathBuf::from("/home/alice/code")]
        );
    }

    #[test]
    fn test_location_list_deserializes() {
        let settings: Settings = serde_json::from_str(
            r#"{"projects_location": ["$home/code", "/srv/work", ""], "ignored_folders": ["node_modules"]}"#,
        )
        .unwrap();
        assert_eq!(
            settings.source_directories(&home()),
            vec![PathBuf::from("/home/alice/code"), PathBuf::from("/srv/work")]
        );
        assert!(settings.is_ignored("node_modules"));
        assert!(!settings.is_ignored("src"));
    }

    #[test]
    fn test_duplicate_locations_collapse() {
        let settings = Settings::with_locations(["$home/code", "/home/alice/code"]);
        assert_eq!(settings.source_directories(&home()).len(), 1);
    }

    #[test]
    fn test_reorder_is_not_a_change() {
        let before = Settings::with_locations(["/x", "/y"]).source_set(&home());
        let after = Settings::with_locations(["/y", "/x"]).source_set(&home());
        assert!(!source_set_changed(&before, &after));
    }

    #[test]
    fn test_removal_is_a_change() {
        let before = Settings::with_locations(["/x", "/y"]).source_set(&home());
        let after = Settings::with_locations(["/x"]).source_set(&home());
        assert!(source_set_changed(&before, &after));
    }

    #[test]
    fn test_placeholder_and_expanded_forms_compare_equal() {
        let before = Settings::with_locations(["$home/code"]).source_set(&home());
        let after = Settings::with_locations(["/home/alice/code"]).source_set(&home());
        assert!(!source_set_changed(&before, &after));
    }
}
