//! Subcommand arguments and their implementations

use crate::cli::config::Config;
use crate::cli::error::{CliError, Result};
use crate::cli::launcher::Launcher;
use crate::cli::output::OutputFormatter;
use crate::cli::STATE_FILE;
use crate::core::{
    ensure_present, Error, HomePath, JsonFileStorage, ProjectEntry, ProjectService,
    DEFAULT_NAMESPACE,
};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Everything a command needs to run
pub struct Context {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub home: HomePath,
    pub service: ProjectService<JsonFileStorage>,
    pub formatter: OutputFormatter,
}

impl Context {
    /// Bind the project service to the state file in `data_dir`
    pub async fn open(
        data_dir: PathBuf,
        config: Config,
        config_path: PathBuf,
        home: HomePath,
    ) -> Result<Self> {
        let storage = JsonFileStorage::new(data_dir.join(STATE_FILE));
        let service = ProjectService::open(
            storage,
            DEFAULT_NAMESPACE,
            home.clone(),
            config.projects.clone(),
        )
        .await?;
        let formatter = OutputFormatter::new(
            config.output.color,
            config.quiet,
            config.output.show_counts,
        );

        Ok(Self {
            data_dir,
            config_path,
            config,
            home,
            service,
            formatter,
        })
    }

    fn report(&self, warnings: &[Error]) {
        for warning in warnings {
            self.formatter.warn(&warning.user_message());
        }
    }

    fn report_flush(&self, flush: Option<Error>) {
        if let Some(e) = flush {
            self.formatter.warn(&e.user_message());
        }
    }

    /// Look a project up by name or path
    pub async fn find(&self, query: &str) -> Result<ProjectEntry> {
        self.service
            .resolve(query)
            .await
            .ok_or_else(|| CliError::project_not_found(query))
    }
}

fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{}", output);
    }
}

fn current_dir_or(path: &Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListCommand {
    /// Print projects as JSON
    #[arg(long)]
    pub json: bool,

    /// Include the project in the current directory
    #[arg(short, long)]
    pub all: bool,
}

impl ListCommand {
    pub async fn run(&self, ctx: &Context) -> Result<String> {
        let current = if self.all {
            None
        } else {
            std::env::current_dir().ok()
        };
        let list = ctx.service.list_projects(current.as_deref()).await;
        ctx.report(&list.warnings);

        if self.json {
            Ok(ctx.formatter.render_json(&list.items)?)
        } else {
            Ok(ctx.formatter.render_pick_list(&list.items))
        }
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print_output(&self.run(ctx).await?);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct CreateCommand {
    /// Name of the new project folder
    pub name: String,

    /// Open the project once created
    #[arg(long)]
    pub open: bool,
}

impl CreateCommand {
    pub async fn run(&self, ctx: &Context) -> Result<ProjectEntry> {
        let (entry, flush) = ctx.service.create_project(&self.name).await?.into_parts();
        ctx.report_flush(flush);
        Ok(entry)
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let entry = self.run(ctx).await?;
        ctx.formatter.info(&ctx.formatter.render_created(&entry));

        if self.open {
            let new_window = ctx.service.settings().await.open_in_new_window;
            Launcher::from_config(&ctx.config.editor)?
                .open(&entry.path, new_window)
                .await?;
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReloadCommand {
    /// Print the rediscovered projects as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReloadCommand {
    pub async fn run(&self, ctx: &Context) -> Result<String> {
        let list = ctx.service.reload_projects(None).await;
        ctx.report(&list.warnings);

        if self.json {
            Ok(ctx.formatter.render_json(&list.items)?)
        } else {
            Ok(ctx.formatter.render_pick_list(&list.items))
        }
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print_output(&self.run(ctx).await?);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct OpenCommand {
    /// Project name or path
    pub target: String,

    /// Open in a new window
    #[arg(long, conflicts_with = "reuse_window")]
    pub new_window: bool,

    /// Open in the current window
    #[arg(long)]
    pub reuse_window: bool,

    /// Print the project path instead of launching the editor
    #[arg(long)]
    pub print: bool,
}

impl OpenCommand {
    /// Window choice: flags first, then the configured default
    pub fn wants_new_window(&self, default: bool) -> bool {
        if self.new_window {
            true
        } else if self.reuse_window {
            false
        } else {
            default
        }
    }

    /// Resolve the target and count the activation
    pub async fn run(&self, ctx: &Context) -> Result<ProjectEntry> {
        let entry = ctx.find(&self.target).await?;
        ensure_present(&entry)?;

        let (activation, flush) = ctx.service.on_workspace_opened(&entry.path).await.into_parts();
        ctx.report_flush(flush);
        Ok(activation.project.unwrap_or(entry))
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let entry = self.run(ctx).await?;
        if self.print {
            println!("{}", entry.path.display());
            return Ok(());
        }

        let new_window = self.wants_new_window(ctx.service.settings().await.open_in_new_window);
        Launcher::from_config(&ctx.config.editor)?
            .open(&entry.path, new_window)
            .await
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ActivateCommand {
    /// Workspace folder (defaults to the current directory)
    pub path: Option<PathBuf>,
}

impl ActivateCommand {
    pub async fn run(&self, ctx: &Context) -> Result<String> {
        let path = current_dir_or(&self.path)?;
        let (activation, flush) = ctx.service.on_workspace_opened(&path).await.into_parts();
        ctx.report_flush(flush);

        Ok(activation
            .status
            .map(|status| ctx.formatter.render_status(&status))
            .unwrap_or_default())
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print_output(&self.run(ctx).await?);
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatusCommand {
    /// Workspace folder (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Print the full indicator as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn run(&self, ctx: &Context) -> Result<String> {
        let path = current_dir_or(&self.path)?;
        let Some(status) = ctx.service.status(&path).await else {
            return Ok(String::new());
        };

        if self.json {
            Ok(serde_json::to_string_pretty(&status)?)
        } else {
            Ok(ctx.formatter.render_status(&status))
        }
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print_output(&self.run(ctx).await?);
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ForgetCommand {
    /// Project name or path
    pub target: String,
}

impl ForgetCommand {
    pub async fn run(&self, ctx: &Context) -> Result<ProjectEntry> {
        let entry = ctx.find(&self.target).await?;
        let (removed, flush) = ctx.service.forget(&entry.path).await.into_parts();
        ctx.report_flush(flush);
        removed.ok_or_else(|| CliError::project_not_found(&self.target))
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let removed = self.run(ctx).await?;
        ctx.formatter.info(&format!(
            "Forgot {} ({})",
            removed.name,
            removed.path.display()
        ));
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchCommand {}

impl WatchCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        ctx.formatter.info(&format!(
            "Watching {} (Ctrl-C to stop)",
            ctx.config_path.display()
        ));
        crate::cli::watch::watch_config(ctx).await
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

impl ConfigAction {
    pub fn render(&self, ctx: &Context) -> Result<String> {
        match self {
            Self::Show => ctx.config.to_toml(),
            Self::Path => Ok(ctx.config_path.display().to_string()),
        }
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print_output(&self.render(ctx)?);
        Ok(())
    }
}
