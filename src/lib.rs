//! Mooring - a session facade for Git repositories
//!
//! Mooring wraps a Git engine behind a small, well-typed session object:
//! open or initialize a repository, stage working-tree changes, commit,
//! enumerate history, and synchronize with a remote using token
//! credentials.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to sessions)
//! - [`session`] - The repository session facade and its error taxonomy
//! - [`engine`] - The version-control capability interface and its implementations
//! - [`core`] - Domain types and session configuration
//! - [`ui`] - User-facing output utilities
//!
//! # Correctness Invariants
//!
//! Mooring maintains the following invariants:
//!
//! 1. No operation is callable before a repository has been opened;
//!    sessions exist only in the opened state
//! 2. Every engine failure surfaces as a typed [`session::SessionError`],
//!    never as a printed-and-swallowed side effect
//! 3. A failed operation never invalidates the session for subsequent calls
//! 4. The facade performs no retries and no rollback of its own

pub mod cli;
pub mod core;
pub mod engine;
pub mod session;
pub mod ui;
