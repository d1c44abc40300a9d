use thiserror::Error;

/// Error type for the project-switcher CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] crate::core::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Could not launch editor: {0}")]
    Launch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File watcher error: {0}")]
    FileWatcher(#[from] notify::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a project not found error
    pub fn project_not_found<S: Into<String>>(query: S) -> Self {
        Self::ProjectNotFound(query.into())
    }

    /// Create an editor launch error
    pub fn launch<S: Into<String>>(msg: S) -> Self {
        Self::Launch(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(err) => err.user_message(),
            Self::ProjectNotFound(query) => {
                format!(
                    "Project '{}' not found. Run 'project-switcher list' to see known projects, or 'project-switcher reload' to rescan.",
                    query
                )
            }
            Self::Launch(msg) => {
                format!(
                    "Could not launch editor: {}. Set `command` in the [editor] section of your config, or use --print.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the CLI
pub type Result<T> = std::result::Result<T, CliError>;

/// Trait for converting errors to user-friendly messages
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
}

impl UserFriendlyError for CliError {
    fn user_message(&self) -> String {
        self.user_message()
    }
}

impl UserFriendlyError for crate::core::Error {
    fn user_message(&self) -> String {
        crate::core::Error::user_message(self)
    }
}
