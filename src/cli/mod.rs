//! cli
//!
//! Command-line interface layer for Mooring.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT perform repository mutations directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that drive a [`crate::session::RepositorySession`]. All
//! repository state changes flow through the session facade.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};

use crate::core::config::SessionOptions;

/// Shared context passed to command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Minimal output
    pub quiet: bool,
    /// Session options (from config file or defaults)
    pub options: SessionOptions,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(cwd) = &cli.cwd {
        std::env::set_current_dir(cwd)
            .with_context(|| format!("cannot change directory to {}", cwd.display()))?;
    }

    let options = match &cli.config {
        Some(path) => SessionOptions::load_from(path)?,
        None => SessionOptions::load()?,
    };

    let ctx = Context {
        quiet: cli.quiet,
        options,
    };

    commands::dispatch(cli.command, &ctx)
}
