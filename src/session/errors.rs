//! session::errors
//!
//! The uniform error taxonomy for session operations.
//!
//! Every engine-level failure is caught at the engine boundary and
//! re-signaled as one of these kinds; no operation signals failure through
//! a side channel. The kinds are deliberately distinct where callers need
//! to react differently: an [`AuthFailure`](SessionError::AuthFailure)
//! wants new credentials, a [`NetworkFailure`](SessionError::NetworkFailure)
//! wants the transfer retried, and a
//! [`NonFastForward`](SessionError::NonFastForward) wants the caller to
//! integrate remote history first.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::TypeError;

/// Errors from repository session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No repository metadata exists at the given path (or anywhere above
    /// the working directory, for ambient discovery).
    #[error("not a git repository: {path}")]
    NotARepository {
        /// The path that was searched
        path: PathBuf,
    },

    /// Filesystem failure while creating or accessing a repository.
    #[error("repository I/O failure: {message}")]
    IoFailure {
        /// Description of the failure
        message: String,
    },

    /// The staging operation failed.
    ///
    /// A pattern matching zero files is NOT a stage failure; that case
    /// succeeds as a no-op.
    #[error("failed to stage '{pattern}': {message}")]
    StageFailure {
        /// The pathspec that was being staged
        pattern: String,
        /// Description of the failure
        message: String,
    },

    /// The staged tree is identical to the last commit's tree.
    #[error("nothing to commit (staged set is empty)")]
    NothingToCommit,

    /// Commit creation failed for a reason other than an empty diff.
    #[error("commit failed: {message}")]
    CommitFailure {
        /// Description of the failure
        message: String,
    },

    /// The remote rejected the supplied credentials.
    #[error("authentication failed for remote '{remote}': {message}")]
    AuthFailure {
        /// The remote that rejected authentication
        remote: String,
        /// Description from the transport
        message: String,
    },

    /// The remote was unreachable or the transfer was interrupted.
    #[error("network failure talking to '{remote}': {message}")]
    NetworkFailure {
        /// The remote that was unreachable
        remote: String,
        /// Description from the transport
        message: String,
    },

    /// The remote rejected a ref update because local history has
    /// diverged. The caller must integrate remote history before
    /// pushing again.
    #[error("non-fast-forward update rejected for {refspec}: {reason}")]
    NonFastForward {
        /// The refspec whose update was rejected
        refspec: String,
        /// The remote's rejection reason
        reason: String,
    },

    /// Integrating fetched history produced conflicts. Terminal for this
    /// facade; conflict resolution belongs to the underlying engine.
    #[error("merge of '{branch}' produced conflicts")]
    MergeConflict {
        /// The remote branch being integrated
        branch: String,
    },

    /// A branch with this name already exists.
    #[error("branch already exists: {name}")]
    BranchExists {
        /// The colliding branch name
        name: String,
    },

    /// No branch with this name exists.
    #[error("branch not found: {name}")]
    BranchNotFound {
        /// The missing branch name
        name: String,
    },

    /// A supplied name failed construction-time validation.
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    /// Engine fault outside the taxonomy.
    #[error("engine error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl SessionError {
    /// Whether retrying the same call unchanged could plausibly succeed.
    ///
    /// True only for network failures; every other kind needs the caller
    /// to change something first (credentials, history, inputs).
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::NetworkFailure { .. })
    }
}
