//! Ordering of project lists for presentation

use crate::core::project::ProjectEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How the project list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriteria {
    /// Most used first, then by name
    #[default]
    Usage,
    /// Alphabetical by name
    Name,
    /// Alphabetical by path
    Path,
}

/// Most used first; equal counts ordered by name.
pub fn compare_by_usage(a: &ProjectEntry, b: &ProjectEntry) -> Ordering {
    b.usage_count
        .cmp(&a.usage_count)
        .then_with(|| a.name.cmp(&b.name))
}

/// Rank entries by usage count descending, then name ascending
pub fn rank(mut entries: Vec<ProjectEntry>) -> Vec<ProjectEntry> {
    entries.sort_by(compare_by_usage);
    entries
}

/// Order entries by the configured criteria
pub fn sort_entries(mut entries: Vec<ProjectEntry>, criteria: SortCriteria) -> Vec<ProjectEntry> {
    match criteria {
        SortCriteria::Usage => entries.sort_by(compare_by_usage),
        SortCriteria::Name => entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortCriteria::Path => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}
