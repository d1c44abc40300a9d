//! Output formatting and display utilities
//!
//! This module handles:
//! - Rendering the project picker as a table
//! - JSON output for scripting
//! - Colored warnings and status lines

pub mod formatter;

// Re-export key types for convenience
pub use formatter::{OutputFormatter, ProjectRow};
