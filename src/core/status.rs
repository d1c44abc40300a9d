//! Status indicator for the currently open project

use crate::core::project::ProjectEntry;
use crate::core::settings::Settings;
use serde::Serialize;
use std::path::PathBuf;

/// Command run when the indicator is clicked
pub const LIST_COMMAND: &str = "projects.list";
/// Same, opening the chosen project in a new window
pub const LIST_NEW_WINDOW_COMMAND: &str = "projects.listNewWindow";

/// What the host should render in its status bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub text: String,
    pub tooltip: PathBuf,
    pub command: &'static str,
}

impl StatusIndicator {
    /// Indicator for `project`, or `None` when the setting hides it
    pub fn for_project(project: &ProjectEntry, settings: &Settings) -> Option<Self> {
        if !settings.show_project_name_in_status_bar {
            return None;
        }
        let command = if settings.open_in_new_window {
            LIST_NEW_WINDOW_COMMAND
        } else {
            LIST_COMMAND
        };
        Some(Self {
            text: project.name.clone(),
            tooltip: project.path.clone(),
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_shows_name_and_path() {
        let project = ProjectEntry::new("foo", "/p/foo");
        let status = StatusIndicator::for_project(&project, &Settings::default()).unwrap();
        assert_eq!(status.text, "foo");
        assert_eq!(status.tooltip, PathBuf::from("/p/foo"));
        assert_eq!(status.command, LIST_NEW_WINDOW_COMMAND);
    }

    #[test]
    fn test_indicator_command_follows_window_setting() {
        let settings = Settings {
            open_in_new_window: false,
            ..Settings::default()
        };
        let status =
            StatusIndicator::for_project(&ProjectEntry::new("foo", "/p/foo"), &settings).unwrap();
        assert_eq!(status.command, LIST_COMMAND);
    }

    #[test]
    fn test_indicator_hidden_by_setting() {
        let settings = Settings {
            show_project_name_in_status_bar: false,
            ..Settings::default()
        };
        assert!(StatusIndicator::for_project(&ProjectEntry::new("foo", "/p/foo"), &settings).is_none());
    }
}
