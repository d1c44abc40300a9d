//! # project-switcher
//!
//! Treats every subdirectory of a few configured folders as a project, keeps
//! a small persisted cache of them with usage counts, and ranks them so the
//! projects you open most are the quickest to reach.
//!
//! The [`core`] module holds the registry and is usable on its own; the
//! `cli` module (behind the `cli` feature) is the command-line front end.
//!
//! ```rust,no_run
//! use project_switcher::core::{HomePath, MemoryStorage, ProjectService, Settings};
//!
//! # #[tokio::main]
//! # async fn main() -> project_switcher::core::Result<()> {
//! let settings = Settings::with_locations(["$home/projects"]);
//! let service =
//!     ProjectService::open(MemoryStorage::new(), "cache", HomePath::from_env(), settings).await?;
//! for project in service.list_projects(None).await.projects() {
//!     println!("{} ({})", project.name, project.usage_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::{Error, ProjectEntry, ProjectService, Result};
