//! session
//!
//! The repository session facade.
//!
//! # Architecture
//!
//! A [`RepositorySession`] owns exactly one opened engine handle and
//! sequences the minimal set of version-control actions a caller needs:
//! open-or-init, stage, commit, enumerate history, synchronize with a
//! remote, and manage branches. It is generic over the
//! [`Vcs`](crate::engine::Vcs) capability interface, so the engine can be
//! replaced with a test double.
//!
//! # State Machine
//!
//! `Unopened -> Opened -> Closed`, enforced by the type system: the only
//! way to obtain a session is through an open variant that succeeded, and
//! [`RepositorySession::close`] consumes the session. Calling an operation
//! before open is unrepresentable rather than a runtime error.
//!
//! # Error Contract
//!
//! Every failure is a typed [`SessionError`]; nothing is printed and
//! swallowed. A failed operation never invalidates the session — the next
//! call on the same session is fully supported. The facade performs no
//! retries and no rollback: a failed push is retried whole by the caller.
//!
//! # Example
//!
//! ```ignore
//! use mooring::core::config::SessionOptions;
//! use mooring::core::types::{Credentials, RefSpec};
//! use mooring::session::RepositorySession;
//!
//! let mut session = RepositorySession::open_ambient(SessionOptions::default())?;
//! session.stage(".")?;
//! let record = session.commit("first commit")?;
//! for commit in session.list_history()? {
//!     println!("{} {}", commit.id.short(7), commit.summary);
//! }
//! ```

mod errors;

pub use errors::SessionError;

use std::path::Path;

use tracing::debug;

use crate::core::config::SessionOptions;
use crate::core::types::{
    BranchEntry, BranchName, CommitRecord, Credentials, RefSpec, RemoteName,
};
use crate::engine::{Libgit2Engine, Vcs};

/// A session over one opened repository.
///
/// Owns the repository handle for its whole lifetime; at most one handle
/// per session, established by the constructor that created it.
#[derive(Debug)]
pub struct RepositorySession<E: Vcs = Libgit2Engine> {
    engine: E,
    options: SessionOptions,
}

impl RepositorySession<Libgit2Engine> {
    /// Open the repository rooted at `path`.
    ///
    /// No upward discovery; `path` must be the repository root.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotARepository`] if no repository metadata exists
    ///   at `path`
    pub fn open_existing(path: &Path, options: SessionOptions) -> Result<Self, SessionError> {
        let engine = Libgit2Engine::open_existing(path)?;
        debug!(path = %path.display(), "opened repository");
        Ok(Self { engine, options })
    }

    /// Discover and open the ambient repository, walking upward from the
    /// current working directory with git's environment rules.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotARepository`] if no repository is found
    pub fn open_ambient(options: SessionOptions) -> Result<Self, SessionError> {
        let engine = Libgit2Engine::open_ambient()?;
        debug!("opened ambient repository");
        Ok(Self { engine, options })
    }

    /// Create a repository at `path`, or reopen one that already exists.
    ///
    /// Re-initializing never destroys history: the engine reuses the
    /// existing object database and refs, so this doubles as
    /// "open or create".
    ///
    /// # Errors
    ///
    /// - [`SessionError::IoFailure`] on filesystem failure
    pub fn initialize(path: &Path, options: SessionOptions) -> Result<Self, SessionError> {
        let engine = Libgit2Engine::initialize(path)?;
        debug!(path = %path.display(), "initialized repository");
        Ok(Self { engine, options })
    }
}

impl<E: Vcs> RepositorySession<E> {
    /// Build a session over an already-opened engine.
    ///
    /// This is the seam for substituting a test double.
    pub fn with_engine(engine: E, options: SessionOptions) -> Self {
        Self { engine, options }
    }

    /// The options this session was opened with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Add files matching `pattern` to the staged change set.
    ///
    /// `"."` stages everything under the working tree. A pattern matching
    /// zero files succeeds and leaves the change set unchanged.
    ///
    /// # Errors
    ///
    /// - [`SessionError::StageFailure`] if the engine cannot update the
    ///   staged set
    pub fn stage(&mut self, pattern: &str) -> Result<(), SessionError> {
        self.engine.stage(pattern)
    }

    /// Create a commit from the currently staged changes.
    ///
    /// With the default options, a staged tree identical to the last
    /// commit's yields [`SessionError::NothingToCommit`]; set
    /// [`SessionOptions::allow_empty_commits`] to permit empty commits.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NothingToCommit`] on an empty staged diff
    /// - [`SessionError::CommitFailure`] otherwise
    pub fn commit(&mut self, message: &str) -> Result<CommitRecord, SessionError> {
        self.engine.commit(message, self.options.allow_empty_commits)
    }

    /// Enumerate commits reachable from HEAD, newest first.
    ///
    /// Ordering is reverse topological with committer time as tie-break.
    /// The returned vector is a snapshot taken at call time; mutating the
    /// repository afterwards never invalidates it. An unborn HEAD yields
    /// an empty vector.
    pub fn list_history(&self) -> Result<Vec<CommitRecord>, SessionError> {
        self.engine.history()
    }

    /// Push local history to `remote` under the given ref mapping,
    /// authenticating with `credentials`.
    ///
    /// No retry and no rollback: a failed push never mutates local
    /// history, and the caller retries the whole push.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AuthFailure`] - retry with different credentials
    /// - [`SessionError::NetworkFailure`] - retry the transfer
    /// - [`SessionError::NonFastForward`] - integrate remote history first
    pub fn push(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        refspec: &RefSpec,
    ) -> Result<(), SessionError> {
        self.engine.push(credentials, remote, refspec)
    }

    /// Fetch and integrate `branch` from `remote` into the current branch.
    ///
    /// Fast-forwards when possible; otherwise creates a merge commit.
    /// Conflicts are terminal for this facade — no resolution is
    /// attempted, nothing is left half-merged, and the session stays
    /// valid.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AuthFailure`] / [`SessionError::NetworkFailure`]
    ///   as for push
    /// - [`SessionError::MergeConflict`] when integration conflicts
    pub fn pull(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> Result<(), SessionError> {
        self.engine.pull(credentials, remote, branch)
    }

    /// Create a branch at the current HEAD commit.
    ///
    /// # Errors
    ///
    /// - [`SessionError::BranchExists`] on name collision
    pub fn create_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        self.engine.create_branch(name)
    }

    /// Delete a local branch.
    ///
    /// # Errors
    ///
    /// - [`SessionError::BranchNotFound`] if no such branch exists
    pub fn delete_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        self.engine.delete_branch(name)
    }

    /// Check out a local branch, updating HEAD and the working tree.
    ///
    /// # Errors
    ///
    /// - [`SessionError::BranchNotFound`] if no such branch exists
    pub fn checkout_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        self.engine.checkout_branch(name)
    }

    /// List local branches with their tips.
    pub fn list_branches(&self) -> Result<Vec<BranchEntry>, SessionError> {
        self.engine.list_branches()
    }

    /// The branch HEAD currently points at; `None` when detached or
    /// unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, SessionError> {
        self.engine.current_branch()
    }

    /// End the session, releasing the repository handle.
    pub fn close(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{FailOn, MockVcs, MockOperation};

    fn mock_session() -> (RepositorySession<MockVcs>, MockVcs) {
        let engine = MockVcs::new();
        let handle = engine.clone();
        (
            RepositorySession::with_engine(engine, SessionOptions::default()),
            handle,
        )
    }

    mod commit_policy {
        use super::*;

        #[test]
        fn commit_after_stage_succeeds() {
            let (mut session, _) = mock_session();
            session.stage(".").unwrap();
            let record = session.commit("first commit").unwrap();
            assert_eq!(record.summary, "first commit");
        }

        #[test]
        fn second_commit_without_stage_is_nothing_to_commit() {
            let (mut session, _) = mock_session();
            session.stage(".").unwrap();
            session.commit("c1").unwrap();

            let second = session.commit("c2");
            assert!(matches!(second, Err(SessionError::NothingToCommit)));
        }

        #[test]
        fn allow_empty_option_permits_empty_commit() {
            let engine = MockVcs::new();
            let options = SessionOptions {
                allow_empty_commits: true,
                ..Default::default()
            };
            let mut session = RepositorySession::with_engine(engine, options);

            let record = session.commit("empty checkpoint").unwrap();
            assert_eq!(record.summary, "empty checkpoint");
        }

        #[test]
        fn failed_commit_does_not_poison_session() {
            let (mut session, _) = mock_session();
            assert!(session.commit("too early").is_err());

            // The session remains fully usable.
            session.stage(".").unwrap();
            assert!(session.commit("recovered").is_ok());
        }
    }

    mod history {
        use super::*;

        #[test]
        fn newest_first_ordering() {
            let (mut session, _) = mock_session();
            session.stage(".").unwrap();
            session.commit("c1").unwrap();
            session.stage(".").unwrap();
            session.commit("c2").unwrap();

            let history = session.list_history().unwrap();
            let summaries: Vec<&str> =
                history.iter().map(|r| r.summary.as_str()).collect();
            assert_eq!(summaries, vec!["c2", "c1"]);
        }

        #[test]
        fn commit_times_non_increasing() {
            let (mut session, _) = mock_session();
            for n in 0..4 {
                session.stage(".").unwrap();
                session.commit(&format!("c{n}")).unwrap();
            }

            let history = session.list_history().unwrap();
            assert_eq!(history.len(), 4);
            for pair in history.windows(2) {
                assert!(pair[0].epoch_seconds() >= pair[1].epoch_seconds());
            }
        }

        #[test]
        fn history_is_a_snapshot() {
            let (mut session, _) = mock_session();
            session.stage(".").unwrap();
            session.commit("c1").unwrap();

            let snapshot = session.list_history().unwrap();
            session.stage(".").unwrap();
            session.commit("c2").unwrap();

            // The previously taken snapshot is unaffected.
            assert_eq!(snapshot.len(), 1);
            assert_eq!(session.list_history().unwrap().len(), 2);
        }
    }

    mod remote_ops {
        use super::*;
        use crate::core::types::{BranchName, Credentials, RefSpec, RemoteName};

        #[test]
        fn auth_failure_leaves_history_unchanged() {
            let (mut session, handle) = mock_session();
            session.stage(".").unwrap();
            session.commit("c1").unwrap();
            let before = session.list_history().unwrap();

            handle.fail_on(FailOn::Push(SessionError::AuthFailure {
                remote: "origin".into(),
                message: "bad token".into(),
            }));

            let creds = Credentials::new("bot", "wrong");
            let origin = RemoteName::new("origin").unwrap();
            let spec = RefSpec::same(BranchName::new("main").unwrap());

            let result = session.push(&creds, &origin, &spec);
            assert!(matches!(result, Err(SessionError::AuthFailure { .. })));
            assert_eq!(session.list_history().unwrap(), before);
        }

        #[test]
        fn push_forwards_refspec_and_credentials() {
            let (mut session, handle) = mock_session();
            let creds = Credentials::new("ci-bot", "token");
            let origin = RemoteName::new("origin").unwrap();
            let spec = RefSpec::mapped(
                BranchName::new("main").unwrap(),
                BranchName::new("deploy").unwrap(),
            );

            session.push(&creds, &origin, &spec).unwrap();

            let ops = handle.operations();
            assert!(ops.contains(&MockOperation::Push {
                username: "ci-bot".to_string(),
                remote: "origin".to_string(),
                refspec: "refs/heads/main:refs/heads/deploy".to_string(),
            }));
        }

        #[test]
        fn network_failure_is_transient() {
            let (mut session, handle) = mock_session();
            handle.fail_on(FailOn::Pull(SessionError::NetworkFailure {
                remote: "origin".into(),
                message: "connection reset".into(),
            }));

            let creds = Credentials::new("bot", "token");
            let origin = RemoteName::new("origin").unwrap();
            let main = BranchName::new("main").unwrap();

            let err = session.pull(&creds, &origin, &main).unwrap_err();
            assert!(err.is_transient());
        }
    }

    mod branches {
        use super::*;
        use crate::core::types::BranchName;

        #[test]
        fn create_list_checkout_delete() {
            let (mut session, _) = mock_session();
            let feature = BranchName::new("feature").unwrap();

            session.create_branch(&feature).unwrap();
            let names: Vec<String> = session
                .list_branches()
                .unwrap()
                .into_iter()
                .map(|b| b.name.as_str().to_string())
                .collect();
            assert!(names.contains(&"feature".to_string()));

            session.checkout_branch(&feature).unwrap();
            assert_eq!(
                session.current_branch().unwrap().unwrap().as_str(),
                "feature"
            );

            session.checkout_branch(&BranchName::new("main").unwrap()).unwrap();
            session.delete_branch(&feature).unwrap();
            assert!(matches!(
                session.checkout_branch(&feature),
                Err(SessionError::BranchNotFound { .. })
            ));
        }

        #[test]
        fn duplicate_create_reports_exists() {
            let (mut session, _) = mock_session();
            let feature = BranchName::new("feature").unwrap();
            session.create_branch(&feature).unwrap();
            assert!(matches!(
                session.create_branch(&feature),
                Err(SessionError::BranchExists { .. })
            ));
        }
    }
}
