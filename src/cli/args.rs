//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Load session options from this file
//! - `--quiet` / `-q`: Minimal output
//!
//! # Credentials
//!
//! Push/pull credentials come from `--username`/`--token` or the
//! `MOOR_USERNAME`/`MOOR_TOKEN` environment variables. They are never
//! read from source or config files.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mooring - a session facade for Git repositories
#[derive(Parser, Debug)]
#[command(name = "moor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if moor was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Load session options from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a repository, or reopen one that already exists
    #[command(
        name = "init",
        long_about = "Create a repository at the given path (default: current directory).\n\n\
            Initializing over an existing repository is safe: history is never \
            destroyed, so this doubles as open-or-create."
    )]
    Init {
        /// Directory to initialize
        path: Option<PathBuf>,
    },

    /// Stage files matching a pattern
    #[command(
        name = "add",
        long_about = "Add files matching the pattern to the staged change set.\n\n\
            The pattern is a path or glob; '.' (the default) stages everything \
            under the working tree. A pattern matching zero files succeeds and \
            stages nothing."
    )]
    Add {
        /// Path or glob to stage
        #[arg(default_value = ".")]
        pattern: String,
    },

    /// Create a commit from the staged changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Permit a commit with an empty staged diff
        #[arg(long)]
        allow_empty: bool,
    },

    /// Show commit history, newest first
    Log {
        /// Show at most this many commits
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Push local history to a remote
    Push {
        /// Remote to push to (default: configured default remote)
        #[arg(long)]
        remote: Option<String>,

        /// Local branch to push (default: current branch)
        #[arg(long)]
        branch: Option<String>,

        /// Remote branch to update (default: same as the local branch)
        #[arg(long)]
        to: Option<String>,

        /// Username for authentication (or MOOR_USERNAME)
        #[arg(long)]
        username: Option<String>,

        /// Personal-access token (or MOOR_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Fetch and integrate a remote branch
    Pull {
        /// Remote to pull from (default: configured default remote)
        #[arg(long)]
        remote: Option<String>,

        /// Remote branch to integrate (default: current branch)
        #[arg(long)]
        branch: Option<String>,

        /// Username for authentication (or MOOR_USERNAME)
        #[arg(long)]
        username: Option<String>,

        /// Personal-access token (or MOOR_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Manage branches
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Check out a branch
    Checkout {
        /// Branch to check out
        name: String,
    },

    /// Stage everything, commit, print the log, and push
    #[command(
        name = "sync",
        long_about = "Stage everything under the working tree, commit with the given \
            message, print the resulting history, and push to the remote.\n\n\
            If nothing is staged the commit step is skipped and the push still runs."
    )]
    Sync {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Remote to push to (default: configured default remote)
        #[arg(long)]
        remote: Option<String>,

        /// Local branch to push (default: current branch)
        #[arg(long)]
        branch: Option<String>,

        /// Username for authentication (or MOOR_USERNAME)
        #[arg(long)]
        username: Option<String>,

        /// Personal-access token (or MOOR_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

/// Branch management actions.
#[derive(Subcommand, Debug)]
pub enum BranchAction {
    /// Create a branch at the current HEAD
    Create {
        /// Name of the new branch
        name: String,
    },

    /// Delete a local branch
    Delete {
        /// Name of the branch to delete
        name: String,
    },

    /// List local branches
    List,
}
