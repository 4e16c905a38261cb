//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments into domain types
//! 2. Opens a session and calls it
//! 3. Formats and displays output
//!
//! Handlers do NOT touch the engine directly; every repository action
//! flows through [`RepositorySession`].

use anyhow::{Context as _, Result};

use crate::cli::args::{BranchAction, Command};
use crate::cli::Context;
use crate::core::types::{BranchName, Credentials, RefSpec, RemoteName};
use crate::session::{RepositorySession, SessionError};
use crate::ui::output::{self, Verbosity};

/// Dispatch a parsed command.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    let verbosity = Verbosity::from_quiet(ctx.quiet);

    match command {
        Command::Init { path } => init(path, ctx, verbosity),
        Command::Add { pattern } => add(&pattern, ctx, verbosity),
        Command::Commit {
            message,
            allow_empty,
        } => commit(&message, allow_empty, ctx, verbosity),
        Command::Log { limit } => log(limit, ctx, verbosity),
        Command::Push {
            remote,
            branch,
            to,
            username,
            token,
        } => push(remote, branch, to, username, token, ctx, verbosity),
        Command::Pull {
            remote,
            branch,
            username,
            token,
        } => pull(remote, branch, username, token, ctx, verbosity),
        Command::Branch { action } => branch(action, ctx, verbosity),
        Command::Checkout { name } => checkout(&name, ctx, verbosity),
        Command::Sync {
            message,
            remote,
            branch,
            username,
            token,
        } => sync(&message, remote, branch, username, token, ctx, verbosity),
    }
}

/// Open the ambient session.
fn open_session(ctx: &Context) -> Result<RepositorySession> {
    Ok(RepositorySession::open_ambient(ctx.options.clone())?)
}

/// Resolve credentials from flags, falling back to the environment.
fn credentials(username: Option<String>, token: Option<String>) -> Result<Credentials> {
    let username = username
        .or_else(|| std::env::var("MOOR_USERNAME").ok())
        .context("no username: pass --username or set MOOR_USERNAME")?;
    let token = token
        .or_else(|| std::env::var("MOOR_TOKEN").ok())
        .context("no token: pass --token or set MOOR_TOKEN")?;
    Ok(Credentials::new(username, token))
}

/// Resolve the remote: explicit flag or the configured default.
fn resolve_remote(explicit: Option<String>, ctx: &Context) -> Result<RemoteName> {
    match explicit {
        Some(name) => Ok(RemoteName::new(name)?),
        None => Ok(ctx.options.default_remote()?),
    }
}

/// Resolve the branch to synchronize: explicit flag or the current branch.
fn resolve_branch(
    explicit: Option<String>,
    session: &RepositorySession,
) -> Result<BranchName> {
    match explicit {
        Some(name) => Ok(BranchName::new(name)?),
        None => session
            .current_branch()?
            .context("detached HEAD: name a branch with --branch"),
    }
}

fn init(path: Option<std::path::PathBuf>, ctx: &Context, verbosity: Verbosity) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let session = RepositorySession::initialize(&path, ctx.options.clone())?;
    session.close();
    output::print(
        format!("Initialized repository at {}", path.display()),
        verbosity,
    );
    Ok(())
}

fn add(pattern: &str, ctx: &Context, verbosity: Verbosity) -> Result<()> {
    let mut session = open_session(ctx)?;
    session.stage(pattern)?;
    output::print(format!("Staged '{}'", pattern), verbosity);
    Ok(())
}

fn commit(message: &str, allow_empty: bool, ctx: &Context, verbosity: Verbosity) -> Result<()> {
    let mut options = ctx.options.clone();
    options.allow_empty_commits |= allow_empty;

    let mut session = RepositorySession::open_ambient(options)?;
    let record = session.commit(message)?;
    output::print(
        format!("[{}] {}", record.id.short(7), record.summary),
        verbosity,
    );
    Ok(())
}

fn log(limit: Option<usize>, ctx: &Context, _verbosity: Verbosity) -> Result<()> {
    let session = open_session(ctx)?;
    let history = session.list_history()?;
    let shown = limit.unwrap_or(history.len());

    for record in history.iter().take(shown) {
        println!("{}", output::format_commit(record));
    }
    Ok(())
}

fn push(
    remote: Option<String>,
    branch: Option<String>,
    to: Option<String>,
    username: Option<String>,
    token: Option<String>,
    ctx: &Context,
    verbosity: Verbosity,
) -> Result<()> {
    let mut session = open_session(ctx)?;
    let creds = credentials(username, token)?;
    let remote = resolve_remote(remote, ctx)?;
    let local = resolve_branch(branch, &session)?;

    let refspec = match to {
        Some(name) => RefSpec::mapped(local, BranchName::new(name)?),
        None => RefSpec::same(local),
    };

    session.push(&creds, &remote, &refspec)?;
    output::print(format!("Pushed {} to {}", refspec, remote), verbosity);
    Ok(())
}

fn pull(
    remote: Option<String>,
    branch: Option<String>,
    username: Option<String>,
    token: Option<String>,
    ctx: &Context,
    verbosity: Verbosity,
) -> Result<()> {
    let mut session = open_session(ctx)?;
    let creds = credentials(username, token)?;
    let remote = resolve_remote(remote, ctx)?;
    let branch = resolve_branch(branch, &session)?;

    session.pull(&creds, &remote, &branch)?;
    output::print(format!("Pulled {} from {}", branch, remote), verbosity);
    Ok(())
}

fn branch(action: BranchAction, ctx: &Context, verbosity: Verbosity) -> Result<()> {
    let mut session = open_session(ctx)?;

    match action {
        BranchAction::Create { name } => {
            let name = BranchName::new(name)?;
            session.create_branch(&name)?;
            output::print(format!("Created branch {}", name), verbosity);
        }
        BranchAction::Delete { name } => {
            let name = BranchName::new(name)?;
            session.delete_branch(&name)?;
            output::print(format!("Deleted branch {}", name), verbosity);
        }
        BranchAction::List => {
            for entry in session.list_branches()? {
                println!("{}", output::format_branch(&entry));
            }
        }
    }
    Ok(())
}

fn checkout(name: &str, ctx: &Context, verbosity: Verbosity) -> Result<()> {
    let mut session = open_session(ctx)?;
    let name = BranchName::new(name)?;
    session.checkout_branch(&name)?;
    output::print(format!("Switched to branch {}", name), verbosity);
    Ok(())
}

/// The whole loop in one command: stage everything, commit, show the log,
/// push. An empty staged diff skips the commit but still pushes.
fn sync(
    message: &str,
    remote: Option<String>,
    branch: Option<String>,
    username: Option<String>,
    token: Option<String>,
    ctx: &Context,
    verbosity: Verbosity,
) -> Result<()> {
    let mut session = open_session(ctx)?;
    let creds = credentials(username, token)?;
    let remote = resolve_remote(remote, ctx)?;

    session.stage(".")?;
    match session.commit(message) {
        Ok(record) => {
            output::print(
                format!("[{}] {}", record.id.short(7), record.summary),
                verbosity,
            );
        }
        Err(SessionError::NothingToCommit) => {
            output::print("Nothing to commit; pushing existing history", verbosity);
        }
        Err(e) => return Err(e.into()),
    }

    for record in session.list_history()? {
        println!("{}", output::format_commit(&record));
    }

    let local = resolve_branch(branch, &session)?;
    let refspec = RefSpec::same(local);
    session.push(&creds, &remote, &refspec)?;
    output::print(format!("Pushed {} to {}", refspec, remote), verbosity);
    Ok(())
}
