//! engine
//!
//! The version-control capability interface and its implementations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the underlying Git engine. All
//! repository reads and writes flow through the [`Vcs`] trait; no other
//! module imports `git2`. The session facade is generic over [`Vcs`], so
//! the engine can be substituted with a deterministic test double.
//!
//! # Implementations
//!
//! - [`Libgit2Engine`] - the real engine, backed by the `git2` crate
//! - [`mock::MockVcs`] - in-memory engine for tests
//!
//! # Invariants
//!
//! - Every `git2` failure is categorized into a typed
//!   [`SessionError`](crate::session::SessionError) before it leaves this
//!   module
//! - No implementation retries, rolls back, or locks; the facade's
//!   contract is strictly sequential, single-handle access

mod libgit2;
pub mod mock;
mod traits;

pub use libgit2::Libgit2Engine;
pub use traits::Vcs;
