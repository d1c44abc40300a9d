//! Command-line front end for the project registry.
//! ## Usage
//!
//! ```bash
//! # Show projects, most used first
//! project-switcher list
//!
//! # Create a project in the first source directory and open it
//! project-switcher create my-project --open
//!
//! # Open a project in the configured editor
//! project-switcher open my-project
//!
//! # Rescan the source directories
//! project-switcher reload
//!
//! # Print the current project's name (for shell prompts)
//! project-switcher status
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod output;
pub mod watch;


// Re-export commonly used types
pub use error::{CliError, Result, UserFriendlyError};

/// Version information for the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File inside the data directory holding the durable store
pub const STATE_FILE: &str = "state.json";

/// File inside the data directory holding the configuration
pub const CONFIG_FILE: &str = "config.toml";

/// Default directory for storing the project cache and configuration
pub fn default_data_dir() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "project-switcher")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            // Fallback to home directory if project dirs not available
            dirs::home_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(".project-switcher")
        })
}

/// Initialize the data directory if it doesn't exist
pub fn ensure_data_dir() -> Result<std::path::PathBuf> {
    let data_dir = default_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir)
}
