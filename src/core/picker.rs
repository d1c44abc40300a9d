//! Items offered to the user when switching projects

use crate::core::project::{path_key, ProjectEntry};
use crate::core::ranking::{sort_entries, SortCriteria};
use std::path::Path;

/// Label of the trailing reload item
pub const RELOAD_LABEL: &str = "Reload projects";

/// Detail shown for projects whose directory is gone
pub const MISSING_PATH_DETAIL: &str = "Path does not exist";

/// One row of the project picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickItem {
    Project {
        entry: ProjectEntry,
        /// The directory no longer exists
        missing: bool,
    },
    /// Rescan the source directories
    Reload,
}

impl PickItem {
    pub fn label(&self) -> &str {
        match self {
            Self::Project { entry, .. } => &entry.name,
            Self::Reload => RELOAD_LABEL,
        }
    }

    pub fn detail(&self) -> Option<&'static str> {
        match self {
            Self::Project { missing: true, .. } => Some(MISSING_PATH_DETAIL),
            _ => None,
        }
    }

    pub fn entry(&self) -> Option<&ProjectEntry> {
        match self {
            Self::Project { entry, .. } => Some(entry),
            Self::Reload => None,
        }
    }
}

/// Build the picker rows: sorted projects, the currently open one left out,
/// missing directories flagged, and the reload item last.
pub fn pick_list(
    entries: Vec<ProjectEntry>,
    criteria: SortCriteria,
    current: Option<&Path>,
) -> Vec<PickItem> {
    let current = current.map(path_key);
    let mut items: Vec<PickItem> = sort_entries(entries, criteria)
        .into_iter()
        .filter(|entry| current.as_ref() != Some(&entry.path_key()))
        .map(|entry| PickItem::Project {
            missing: !entry.exists(),
            entry,
        })
        .collect();
    items.push(PickItem::Reload);
    items
}
