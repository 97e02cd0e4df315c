//! dbcatalog command-line application.
//!
//! The binary in `main.rs` only parses arguments, installs logging and the
//! Ctrl-C handler, and maps the outcome to an exit code; everything else
//! lives here so it can be tested.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{RunSummary, run};
pub use cli::Cli;
