use crate::core::picker::PickItem;
use crate::core::{ProjectEntry, StatusIndicator};
use colored::{Color, Colorize};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::path::PathBuf;

/// A project as printed by `list --json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRow {
    pub name: String,
    pub path: PathBuf,
    pub usage_count: u64,
    pub missing: bool,
}

impl ProjectRow {
    pub fn from_item(item: &PickItem) -> Option<Self> {
        match item {
            PickItem::Project { entry, missing } => Some(Self {
                name: entry.name.clone(),
                path: entry.path.clone(),
                usage_count: entry.usage_count,
                missing: *missing,
            }),
            PickItem::Reload => None,
        }
    }
}

/// Renders registry results for the terminal
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    pub color: bool,
    pub quiet: bool,
    pub show_counts: bool,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            color: true,
            quiet: false,
            show_counts: true,
        }
    }
}

impl OutputFormatter {
    pub fn new(color: bool, quiet: bool, show_counts: bool) -> Self {
        Self {
            color,
            quiet,
            show_counts,
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Picker rows as a borderless table, reload row last
    pub fn render_pick_list(&self, items: &[PickItem]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        for item in items {
            let row = match item {
                PickItem::Project { entry, missing } => {
                    let mut cells = vec![Cell::new(&self.paint(&entry.name, Color::Green))];
                    if self.show_counts {
                        cells.push(Cell::new(&entry.usage_count.to_string()));
                    }
                    let mut path = entry.path.display().to_string();
                    if let Some(detail) = item.detail() {
                        path = format!("{}  {}", path, self.paint(detail, Color::Red));
                    }
                    cells.push(Cell::new(&if *missing { path } else { self.dim(&path) }));
                    Row::new(cells)
                }
                PickItem::Reload => {
                    let mut cells = vec![Cell::new(&self.paint(item.label(), Color::Cyan))];
                    if self.show_counts {
                        cells.push(Cell::new(""));
                    }
                    cells.push(Cell::new(&self.dim("project-switcher reload")));
                    Row::new(cells)
                }
            };
            table.add_row(row);
        }

        table.to_string()
    }

    /// Picker rows as JSON, without the reload row
    pub fn render_json(&self, items: &[PickItem]) -> serde_json::Result<String> {
        let rows: Vec<ProjectRow> = items.iter().filter_map(ProjectRow::from_item).collect();
        serde_json::to_string_pretty(&rows)
    }

    pub fn render_created(&self, entry: &ProjectEntry) -> String {
        format!(
            "{} {} at {}",
            self.paint("Created", Color::Green),
            entry.name,
            entry.path.display()
        )
    }

    pub fn render_status(&self, status: &StatusIndicator) -> String {
        status.text.clone()
    }

    pub fn render_warning(&self, message: &str) -> String {
        format!("{} {}", self.paint("warning:", Color::Yellow), message)
    }

    /// Print a warning to stderr unless quiet
    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", self.render_warning(message));
        }
    }

    /// Print an informational line unless quiet
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::picker::RELOAD_LABEL;

    fn plain() -> OutputFormatter {
        OutputFormatter::new(false, false, true)
    }

    fn items() -> Vec<PickItem> {
        vec![
            PickItem::Project {
                entry: ProjectEntry::new("alpha", "/p/alpha").with_usage(3),
                missing: false,
            },
            PickItem::Project {
                entry: ProjectEntry::new("gone", "/p/gone"),
                missing: true,
            },
            PickItem::Reload,
        ]
    }

    #[test]
    fn test_render_pick_list_plain() {
        let rendered = plain().render_pick_list(&items());
        let lines: Vec<&str> = rendered.lines().filter(|l| !l.trim().is_empty()).collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("alpha"));
        assert!(lines[0].contains('3'));
        assert!(lines[0].contains("/p/alpha"));
        assert!(lines[1].contains("Path does not exist"));
        assert!(lines[2].contains(RELOAD_LABEL));
    }

    #[test]
    fn test_render_without_counts() {
        let formatter = OutputFormatter::new(false, false, false);
        let rendered = formatter.render_pick_list(&items());
        assert!(!rendered.lines().next().unwrap_or_default().contains('3'));
    }

    #[test]
    fn test_render_json_skips_reload() {
        let json = plain().render_json(&items()).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["name"], "alpha");
        assert_eq!(rows[0]["usage_count"], 3);
        assert_eq!(rows[1]["missing"], true);
    }

    #[test]
    fn test_warning_prefix() {
        assert_eq!(plain().render_warning("careful"), "warning: careful");
    }
}
