//! Argument parsing and command dispatch

mod app;
pub mod commands;

pub use app::*;
