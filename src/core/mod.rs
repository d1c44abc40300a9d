//! Project registry core
//!
//! Everything here is independent of any particular host: the storage backend
//! and the settings are injected, so the same registry runs behind the
//! command-line front end, inside an editor integration, or in tests.

pub mod error;
pub mod paths;
pub mod picker;
pub mod project;
pub mod ranking;
pub mod registry;
pub mod service;
pub mod settings;
pub mod status;
pub mod store;


pub use error::{Error, Result};
pub use paths::{HomePath, HOME_PLACEHOLDER};
pub use picker::{pick_list, PickItem};
pub use project::{ProjectEntry, SchemaVersion};
pub use ranking::{rank, SortCriteria};
pub use registry::{ensure_present, Flushed, Listing, ProjectRegistry, RegistryState};
pub use service::{Activation, ProjectList, ProjectService};
pub use settings::Settings;
pub use status::StatusIndicator;
pub use store::{DurableStorage, JsonFileStorage, MemoryStorage, Store, DEFAULT_NAMESPACE};
