use crate::cli::error::Result;
use crate::core::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration settings for the project-switcher CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default verbosity level
    #[serde(default)]
    pub verbose: bool,

    /// Default quiet mode
    #[serde(default)]
    pub quiet: bool,

    /// Custom data directory (if not using system default)
    pub data_dir: Option<PathBuf>,

    /// Where projects live and how they are listed
    #[serde(default)]
    pub projects: Settings,

    /// Editor used to open projects
    #[serde(default)]
    pub editor: EditorDefaults,

    /// Output formatting preferences
    #[serde(default)]
    pub output: OutputDefaults,
}

/// Editor launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorDefaults {
    /// Editor executable, looked up on PATH
    #[serde(default = "default_editor")]
    pub command: String,

    /// Extra arguments placed before the project path
    #[serde(default)]
    pub args: Vec<String>,

    /// Flag asking the editor for a new window
    #[serde(default = "default_new_window_flag")]
    pub new_window_flag: String,

    /// Flag asking the editor to reuse the current window
    #[serde(default = "default_reuse_window_flag")]
    pub reuse_window_flag: String,
}

/// Output formatting defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Enable colored output by default
    #[serde(default = "default_true")]
    pub color: bool,

    /// Show usage counts in project listings
    #[serde(default = "default_true")]
    pub show_counts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            data_dir: None,
            projects: Settings::default(),
            editor: EditorDefaults::default(),
            output: OutputDefaults::default(),
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            command: default_editor(),
            args: Vec::new(),
            new_window_flag: default_new_window_flag(),
            reuse_window_flag: default_reuse_window_flag(),
        }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            color: default_true(),
            show_counts: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from file, with fallback to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            // Create default config file
            let config = Self::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            crate::cli::error::CliError::Configuration(format!(
                "Failed to parse config file: {}",
                e
            ))
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            crate::cli::error::CliError::Configuration(format!(
                "Failed to serialize config: {}",
                e
            ))
        })
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = crate::cli::ensure_data_dir()?;
        Ok(data_dir.join(crate::cli::CONFIG_FILE))
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from_file(path)
    }

    /// Merge with command-line arguments, giving priority to CLI args
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::cli::Cli) -> Self {
        // CLI args override config file settings
        if cli_args.verbose {
            self.verbose = true;
        }
        if cli_args.quiet {
            self.quiet = true;
        }
        if cli_args.no_color {
            self.output.color = false;
        }
        if let Some(ref data_dir) = cli_args.data_dir {
            self.data_dir = Some(data_dir.clone());
        }

        self
    }
}

// Helper functions for default values
fn default_editor() -> String {
    "code".to_string()
}

fn default_new_window_flag() -> String {
    "--new-window".to_string()
}

fn default_reuse_window_flag() -> String {
    "--reuse-window".to_string()
}

fn default_true() -> bool {
    true
}
