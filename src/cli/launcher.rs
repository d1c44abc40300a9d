//! Opens a project directory in the configured editor

use crate::cli::config::EditorDefaults;
use crate::cli::error::{CliError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Editor invocation resolved from configuration
#[derive(Debug, Clone)]
pub struct Launcher {
    program: PathBuf,
    args: Vec<String>,
    new_window_flag: String,
    reuse_window_flag: String,
}

impl Launcher {
    /// Resolve the editor executable on PATH
    pub fn from_config(editor: &EditorDefaults) -> Result<Self> {
        let program = which::which(&editor.command)
            .map_err(|e| CliError::launch(format!("'{}': {}", editor.command, e)))?;
        Ok(Self::with_program(program, editor))
    }

    /// Use an already known executable
    pub fn with_program(program: impl Into<PathBuf>, editor: &EditorDefaults) -> Self {
        Self {
            program: program.into(),
            args: editor.args.clone(),
            new_window_flag: editor.new_window_flag.clone(),
            reuse_window_flag: editor.reuse_window_flag.clone(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to the editor for `path`
    pub fn args_for(&self, path: &Path, new_window: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        let flag = if new_window {
            &self.new_window_flag
        } else {
            &self.reuse_window_flag
        };
        if !flag.is_empty() {
            args.push(OsString::from(flag));
        }
        args.push(path.as_os_str().to_owned());
        args
    }

    /// Run the editor and wait for it to hand the folder over
    pub async fn open(&self, path: &Path, new_window: bool) -> Result<()> {
        let args = self.args_for(path, new_window);
        tracing::debug!(program = %self.program.display(), ?args, "Launching editor");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|e| CliError::launch(format!("{}: {}", self.program.display(), e)))?;
        if !status.success() {
            return Err(CliError::launch(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_choose_window_flag() {
        let launcher = Launcher::with_program("/usr/bin/code", &EditorDefaults::default());
        let path = Path::new("/p/alpha");

        assert_eq!(
            launcher.args_for(path, true),
            vec![OsString::from("--new-window"), OsString::from("/p/alpha")]
        );
        assert_eq!(
            launcher.args_for(path, false),
            vec![OsString::from("--reuse-window"), OsString::from("/p/alpha")]
        );
    }

    #[test]
    fn test_extra_args_and_empty_flag() {
        let editor = EditorDefaults {
            command: "subl".to_string(),
            args: vec!["--add".to_string()],
            new_window_flag: String::new(),
            reuse_window_flag: String::new(),
        };
        let launcher = Launcher::with_program("/usr/bin/subl", &editor);

        assert_eq!(
            launcher.args_for(Path::new("/p/beta"), true),
            vec![OsString::from("--add"), OsString::from("/p/beta")]
        );
    }

    #[test]
    fn test_missing_editor_is_launch_error() {
        let editor = EditorDefaults {
            command: "definitely-not-an-editor-7f3a".to_string(),
            ..EditorDefaults::default()
        };
        let err = Launcher::from_config(&editor).unwrap_err();
        assert!(matches!(err, CliError::Launch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_reports_failing_editor() {
        let launcher = Launcher::with_program("false", &EditorDefaults::default());
        let err = launcher.open(Path::new("/tmp"), true).await.unwrap_err();
        assert!(matches!(err, CliError::Launch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_does_not_block_the_runtime() {
        // A slow editor on a current-thread runtime must not starve other tasks
        let launcher = Launcher::with_program(
            "sh",
            &EditorDefaults {
                command: "sh".to_string(),
                args: vec!["-c".to_string(), "sleep 1".to_string()],
                new_window_flag: String::new(),
                reuse_window_flag: String::new(),
            },
        );

        let ticker = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            std::time::Instant::now()
        });
        let started = std::time::Instant::now();
        launcher.open(Path::new("/tmp"), true).await.unwrap();
        let ticked = ticker.await.unwrap();

        assert!(ticked.duration_since(started) < std::time::Duration::from_millis(800));
    }
}
