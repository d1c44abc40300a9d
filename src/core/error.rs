use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the project registry and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid project name: {0}")]
    InvalidName(String),

    #[error("A project named '{0}' already exists")]
    DuplicateName(String),

    #[error("Could not create project directory {}: {reason}", .path.display())]
    DirectoryCreate { path: PathBuf, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Project path does not exist: {}", .0.display())]
    StaleEntry(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid name error
    pub fn invalid_name<S: Into<String>>(msg: S) -> Self {
        Self::InvalidName(msg.into())
    }

    /// Create a persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a directory creation error from the underlying io failure
    pub fn directory_create(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        let reason = match source.kind() {
            std::io::ErrorKind::AlreadyExists => "directory already exists".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            std::io::ErrorKind::NotFound => "parent directory does not exist".to_string(),
            _ => source.to_string(),
        };
        Self::DirectoryCreate {
            path: path.into(),
            reason,
        }
    }

    /// Validation failures are shown inline while the user is typing a name
    /// and never reach persisted state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidName(_) | Self::DuplicateName(_))
    }

    /// Get a user-facing message with a hint where one helps
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(msg) => {
                format!(
                    "{}. Set `projects_location` in the [projects] section of your config.",
                    msg
                )
            }
            Self::StaleEntry(path) => {
                format!(
                    "The project at {} no longer exists. Run `reload` to rescan, or `forget` to remove it.",
                    path.display()
                )
            }
            Self::Persistence(msg) => {
                format!("Could not save the project cache ({}). Changes last until exit.", msg)
            }
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_validation_classification() {
        assert!(Error::invalid_name("blank").is_validation());
        assert!(Error::DuplicateName("foo".to_string()).is_validation());
        assert!(!Error::configuration("missing").is_validation());
        assert!(!Error::persistence("disk full").is_validation());
        assert!(!Error::StaleEntry(PathBuf::from("/tmp/x")).is_validation());
    }

    #[test]
    fn test_directory_create_reasons() {
        let exists = io::Error::new(io::ErrorKind::AlreadyExists, "exists");
        match Error::directory_create("/tmp/foo", &exists) {
            Error::DirectoryCreate { path, reason } => {
                assert_eq!(path, PathBuf::from("/tmp/foo"));
                assert_eq!(reason, "directory already exists");
            }
            other => panic!("Expected DirectoryCreate, got {:?}", other),
        }

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = Error::directory_create("/root/foo", &denied);
        assert_eq!(
            err.to_string(),
            "Could not create project directory /root/foo: permission denied"
        );
    }

    #[test]
    fn test_display_messages() {
        let cases = vec![
            (
                Error::configuration("no source directory configured"),
                "Configuration error: no source directory configured",
            ),
            (
                Error::DuplicateName("foo".to_string()),
                "A project named 'foo' already exists",
            ),
            (
                Error::StaleEntry(PathBuf::from("/gone")),
                "Project path does not exist: /gone",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_user_messages_carry_hints() {
        let message = Error::configuration("no source directory configured").user_message();
        assert!(message.contains("projects_location"));

        let message = Error::StaleEntry(PathBuf::from("/gone")).user_message();
        assert!(message.contains("/gone"));
        assert!(message.contains("forget"));

        let generic = Error::DuplicateName("foo".to_string());
        assert_eq!(generic.user_message(), generic.to_string());
    }

    #[test]
    fn test_conversions() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));

        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
