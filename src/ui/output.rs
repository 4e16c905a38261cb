//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Errors
//! always print; informational output is suppressed under `--quiet`.

use std::fmt::Display;

use crate::core::types::{BranchEntry, CommitRecord};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
}

impl Verbosity {
    /// Create verbosity from the quiet flag.
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Format a commit record the way `git log` presents one: id, author,
/// committer, timestamp, then the full message indented.
pub fn format_commit(record: &CommitRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("commit {}\n", record.id));
    out.push_str(&format!("Author:    {}\n", record.author));
    out.push_str(&format!("Committer: {}\n", record.committer));
    out.push_str(&format!(
        "Date:      {}\n",
        record.time.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push('\n');
    for line in record.message.lines() {
        out.push_str(&format!("    {}\n", line));
    }
    out
}

/// Format one branch listing line: marker, name, tip.
pub fn format_branch(entry: &BranchEntry) -> String {
    let marker = if entry.is_head { "*" } else { " " };
    match &entry.tip {
        Some(tip) => format!("{} {} {}", marker, entry.name, tip.short(7)),
        None => format!("{} {}", marker, entry.name),
    }
}
