//! engine::traits
//!
//! The capability interface the session facade consumes.
//!
//! # Design
//!
//! The trait covers exactly the operations the facade sequences: staging,
//! commit creation, history enumeration, remote synchronization, and
//! branch management. Opening is not part of the trait — an implementation
//! exists only in the opened state, so a `Vcs` value *is* a repository
//! handle. That makes "operation called before open" unrepresentable.
//!
//! All methods are synchronous and blocking. Mutating operations take
//! `&mut self`, mirroring the contract that a handle is never used
//! concurrently.
//!
//! # Example
//!
//! ```ignore
//! use mooring::engine::Vcs;
//!
//! fn snapshot_and_commit(engine: &mut impl Vcs) -> Result<(), SessionError> {
//!     engine.stage(".")?;
//!     engine.commit("checkpoint", false)?;
//!     Ok(())
//! }
//! ```

use crate::core::types::{
    BranchEntry, BranchName, CommitRecord, Credentials, RefSpec, RemoteName,
};
use crate::session::SessionError;

/// Version-control engine capability interface.
///
/// An implementation owns one opened repository handle. Every failure is
/// reported as a typed [`SessionError`]; implementations never print and
/// swallow.
pub trait Vcs {
    /// Add files matching `pattern` to the staged change set.
    ///
    /// `"."` stages everything under the working tree. A pattern matching
    /// zero files succeeds and changes nothing.
    fn stage(&mut self, pattern: &str) -> Result<(), SessionError>;

    /// Create a commit from the staged change set.
    ///
    /// With `allow_empty` false, a staged tree identical to the parent's
    /// yields [`SessionError::NothingToCommit`].
    fn commit(&mut self, message: &str, allow_empty: bool) -> Result<CommitRecord, SessionError>;

    /// Enumerate commits reachable from HEAD, newest first.
    ///
    /// Ordering is reverse topological with committer time as tie-break.
    /// The result is a snapshot taken at call time; later mutations never
    /// invalidate it. An unborn HEAD yields an empty vector.
    fn history(&self) -> Result<Vec<CommitRecord>, SessionError>;

    /// Push local history to `remote` under the given ref mapping.
    fn push(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        refspec: &RefSpec,
    ) -> Result<(), SessionError>;

    /// Fetch and integrate `branch` from `remote` into the current branch.
    fn pull(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> Result<(), SessionError>;

    /// Create a branch at the current HEAD commit.
    fn create_branch(&mut self, name: &BranchName) -> Result<(), SessionError>;

    /// Delete a local branch.
    fn delete_branch(&mut self, name: &BranchName) -> Result<(), SessionError>;

    /// Check out a local branch, updating HEAD and the working tree.
    fn checkout_branch(&mut self, name: &BranchName) -> Result<(), SessionError>;

    /// List local branches with their tips.
    fn list_branches(&self) -> Result<Vec<BranchEntry>, SessionError>;

    /// The branch HEAD currently points at, if any.
    ///
    /// `None` for a detached or unborn HEAD.
    fn current_branch(&self) -> Result<Option<BranchName>, SessionError>;
}
