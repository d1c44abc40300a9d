use crate::cli::cli::commands::*;
use crate::cli::config::Config;
use crate::cli::error::Result;
use crate::core::HomePath;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

/// Jump between the projects in your source directories
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Custom data directory path
    #[arg(long, global = true, env = "PROJECT_SWITCHER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects, most used first
    List(ListCommand),

    /// Create a project folder in the first source directory
    Create(CreateCommand),

    /// Rescan the source directories
    Reload(ReloadCommand),

    /// Open a project in the configured editor
    Open(OpenCommand),

    /// Record that a workspace was opened
    Activate(ActivateCommand),

    /// Print the status indicator for a workspace
    Status(StatusCommand),

    /// Remove a project from the cache
    Forget(ForgetCommand),

    /// Apply configuration changes as they are saved
    Watch(WatchCommand),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        if let Commands::Completion { shell } = self.command {
            generate_completion(shell);
            return Ok(());
        }

        let config_path = match &self.data_dir {
            Some(dir) => dir.join(crate::cli::CONFIG_FILE),
            None => Config::default_path()?,
        };
        let config = Config::load_from_file(&config_path)
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {}: {}", config_path.display(), e);
                Config::default()
            })
            .merge_with_cli_args(&self);

        // Prefer CLI arg, then config, then default
        let data_dir: PathBuf = match config.data_dir.clone() {
            Some(dir) => {
                if !dir.exists() {
                    std::fs::create_dir_all(&dir)?;
                }
                dir
            }
            None => crate::cli::ensure_data_dir()?,
        };

        let ctx = Context::open(data_dir, config, config_path, HomePath::from_env()).await?;

        match self.command {
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Create(cmd) => cmd.execute(&ctx).await,
            Commands::Reload(cmd) => cmd.execute(&ctx).await,
            Commands::Open(cmd) => cmd.execute(&ctx).await,
            Commands::Activate(cmd) => cmd.execute(&ctx).await,
            Commands::Status(cmd) => cmd.execute(&ctx).await,
            Commands::Forget(cmd) => cmd.execute(&ctx).await,
            Commands::Watch(cmd) => cmd.execute(&ctx).await,
            Commands::Config { action } => action.execute(&ctx).await,
            Commands::Completion { .. } => Ok(()),
        }
    }
}

/// Generate shell completion script
fn generate_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
