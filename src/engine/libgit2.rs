//! engine::libgit2
//!
//! The real engine, backed by the `git2` crate.
//!
//! # Architecture
//!
//! `Libgit2Engine` is the only type in the crate that touches `git2`.
//! Constructors cover the three open variants (explicit path, ambient
//! discovery, initialize); everything else implements the [`Vcs`]
//! capability interface. Every `git2::Error` is categorized into a typed
//! [`SessionError`] at this boundary.
//!
//! # Error Categorization
//!
//! Remote operations need three distinct failure kinds: authentication
//! rejection, network unreachability, and non-fast-forward rejection.
//! libgit2 reports the first two through error class/code and the third
//! through the push-update-reference callback, so the mapping lives in
//! [`remote_failure`] and the push path collects per-ref rejections.

use std::path::Path;

use tracing::debug;

use crate::core::types::{
    BranchEntry, BranchName, CommitId, CommitRecord, Credentials, Identity, RefSpec, RemoteName,
};
use crate::engine::Vcs;
use crate::session::SessionError;

/// Git engine backed by libgit2.
///
/// Owns exactly one opened repository. The handle stays valid across
/// failed operations; no call leaves the repository in a state that
/// poisons subsequent calls.
pub struct Libgit2Engine {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Libgit2Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Libgit2Engine")
            .field("path", &self.repo.path())
            .finish()
    }
}

/// Map a git2 error to the internal catch-all.
fn internal(err: git2::Error) -> SessionError {
    SessionError::Internal {
        message: err.message().to_string(),
    }
}

/// Categorize a git2 error from a push or fetch.
///
/// Authentication rejections surface either as `ErrorCode::Auth` or as an
/// HTTP-class error whose message mentions authentication (libgit2 reports
/// exhausted credential retries as "too many redirects or authentication
/// replays"). Everything else in the Net/Http/Ssh/Ssl classes is a
/// transport failure.
fn remote_failure(err: git2::Error, remote: &RemoteName) -> SessionError {
    let message = err.message().to_string();

    if err.code() == git2::ErrorCode::Auth
        || message.to_ascii_lowercase().contains("auth")
        || message.contains("401")
        || message.contains("403")
    {
        return SessionError::AuthFailure {
            remote: remote.as_str().to_string(),
            message,
        };
    }

    match err.class() {
        git2::ErrorClass::Net
        | git2::ErrorClass::Http
        | git2::ErrorClass::Ssh
        | git2::ErrorClass::Ssl => SessionError::NetworkFailure {
            remote: remote.as_str().to_string(),
            message,
        },
        _ if err.code() == git2::ErrorCode::NotFastForward => SessionError::NonFastForward {
            refspec: String::new(),
            reason: message,
        },
        _ => SessionError::Internal { message },
    }
}

/// Build remote callbacks that answer credential challenges with the
/// supplied username/token pair.
fn credential_callbacks<'cb>(credentials: &Credentials) -> git2::RemoteCallbacks<'cb> {
    let username = credentials.username().to_string();
    let token = credentials.token().to_string();

    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        git2::Cred::userpass_plaintext(username_from_url.unwrap_or(&username), &token)
    });
    callbacks
}

impl Libgit2Engine {
    // =========================================================================
    // Opening
    // =========================================================================

    /// Open the repository rooted at `path`.
    ///
    /// No upward discovery is performed; `path` must be the repository
    /// root.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotARepository`] if no repository metadata exists
    ///   at `path`
    pub fn open_existing(path: &Path) -> Result<Self, SessionError> {
        let repo = git2::Repository::open(path).map_err(|_| SessionError::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open the ambient repository.
    ///
    /// Walks upward from the current working directory, honoring the same
    /// environment variables git itself honors (`GIT_DIR`,
    /// `GIT_CEILING_DIRECTORIES`, ...).
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotARepository`] if no repository is found
    pub fn open_ambient() -> Result<Self, SessionError> {
        let repo = git2::Repository::open_from_env().map_err(|_| SessionError::NotARepository {
            path: std::env::current_dir().unwrap_or_default(),
        })?;
        Ok(Self { repo })
    }

    /// Create a repository at `path`, or reopen one that already exists.
    ///
    /// Initializing over an existing repository never destroys history;
    /// libgit2 reuses the existing object database and refs.
    ///
    /// # Errors
    ///
    /// - [`SessionError::IoFailure`] on filesystem failure
    pub fn initialize(path: &Path) -> Result<Self, SessionError> {
        let repo = git2::Repository::init(path).map_err(|e| SessionError::IoFailure {
            message: e.message().to_string(),
        })?;
        Ok(Self { repo })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Build a [`CommitRecord`] from a git2 commit.
    fn commit_record(&self, commit: &git2::Commit<'_>) -> Result<CommitRecord, SessionError> {
        let id = CommitId::new(commit.id().to_string())?;

        let time = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(CommitRecord {
            id,
            author: signature_identity(&commit.author()),
            committer: signature_identity(&commit.committer()),
            time,
            message: commit.message().unwrap_or("").to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
        })
    }

    /// The HEAD commit, or `None` when HEAD is unborn.
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, SessionError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit().map_err(internal)?)),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(internal(e)),
        }
    }

    /// Fast-forward the given ref to `target` and sync the working tree.
    fn fast_forward(&self, refname: &str, target: git2::Oid) -> Result<(), SessionError> {
        match self.repo.find_reference(refname) {
            Ok(mut reference) => {
                reference
                    .set_target(target, "pull: fast-forward")
                    .map_err(internal)?;
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                // Unborn branch: create the ref at the fetched commit.
                self.repo
                    .reference(refname, target, true, "pull: initial")
                    .map_err(internal)?;
            }
            Err(e) => return Err(internal(e)),
        }

        self.repo.set_head(refname).map_err(internal)?;
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
            .map_err(internal)?;
        Ok(())
    }

    /// Three-way merge of the fetched commit into HEAD.
    ///
    /// The merge is computed on trees, off to the side of the working
    /// tree; on conflict nothing has been touched and the session remains
    /// fully usable.
    fn merge_commit(
        &self,
        branch: &BranchName,
        fetched: git2::Oid,
    ) -> Result<(), SessionError> {
        let local = self
            .head_commit()?
            .ok_or_else(|| SessionError::Internal {
                message: "cannot merge into unborn HEAD".to_string(),
            })?;
        let remote = self.repo.find_commit(fetched).map_err(internal)?;

        let base = self
            .repo
            .merge_base(local.id(), remote.id())
            .map_err(internal)?;
        let ancestor = self
            .repo
            .find_commit(base)
            .map_err(internal)?
            .tree()
            .map_err(internal)?;
        let local_tree = local.tree().map_err(internal)?;
        let remote_tree = remote.tree().map_err(internal)?;

        let mut merged = self
            .repo
            .merge_trees(&ancestor, &local_tree, &remote_tree, None)
            .map_err(internal)?;

        if merged.has_conflicts() {
            return Err(SessionError::MergeConflict {
                branch: branch.as_str().to_string(),
            });
        }

        let tree_id = merged.write_tree_to(&self.repo).map_err(internal)?;
        let tree = self.repo.find_tree(tree_id).map_err(internal)?;
        let sig = self
            .repo
            .signature()
            .map_err(|e| SessionError::CommitFailure {
                message: e.message().to_string(),
            })?;
        let message = format!("Merge branch '{}'", branch);

        self.repo
            .commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&local, &remote])
            .map_err(internal)?;
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
            .map_err(internal)?;
        Ok(())
    }
}

impl Vcs for Libgit2Engine {
    fn stage(&mut self, pattern: &str) -> Result<(), SessionError> {
        let map = |e: git2::Error| SessionError::StageFailure {
            pattern: pattern.to_string(),
            message: e.message().to_string(),
        };

        let mut index = self.repo.index().map_err(map)?;
        index
            .add_all([pattern], git2::IndexAddOption::DEFAULT, None)
            .map_err(map)?;
        index.write().map_err(map)?;

        debug!(pattern, "staged working-tree changes");
        Ok(())
    }

    fn commit(&mut self, message: &str, allow_empty: bool) -> Result<CommitRecord, SessionError> {
        let mut index = self.repo.index().map_err(internal)?;
        let tree_id = index.write_tree().map_err(internal)?;
        let parent = self.head_commit()?;

        if !allow_empty {
            let staged_is_empty = match &parent {
                Some(commit) => commit.tree_id() == tree_id,
                None => index.is_empty(),
            };
            if staged_is_empty {
                return Err(SessionError::NothingToCommit);
            }
        }

        let sig = self
            .repo
            .signature()
            .map_err(|e| SessionError::CommitFailure {
                message: e.message().to_string(),
            })?;
        let tree = self.repo.find_tree(tree_id).map_err(internal)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(|e| SessionError::CommitFailure {
                message: e.message().to_string(),
            })?;

        debug!(id = %oid, "created commit");
        let commit = self.repo.find_commit(oid).map_err(internal)?;
        self.commit_record(&commit)
    }

    fn history(&self) -> Result<Vec<CommitRecord>, SessionError> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }

        let mut revwalk = self.repo.revwalk().map_err(internal)?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
            .map_err(internal)?;
        revwalk.push_head().map_err(internal)?;

        // Materialize eagerly: the sequence is a snapshot at call time,
        // immune to later repository mutation.
        let mut records = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(internal)?;
            let commit = self.repo.find_commit(oid).map_err(internal)?;
            records.push(self.commit_record(&commit)?);
        }
        Ok(records)
    }

    fn push(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        refspec: &RefSpec,
    ) -> Result<(), SessionError> {
        let mut git_remote =
            self.repo
                .find_remote(remote.as_str())
                .map_err(|e| SessionError::Internal {
                    message: format!("remote '{}': {}", remote, e.message()),
                })?;

        let mut rejection: Option<String> = None;
        let mut callbacks = credential_callbacks(credentials);
        callbacks.push_update_reference(|_refname, status| {
            if let Some(reason) = status {
                rejection = Some(reason.to_string());
            }
            Ok(())
        });

        let spec = refspec.to_push_format();
        debug!(remote = %remote, refspec = %spec, "pushing");
        {
            let mut options = git2::PushOptions::new();
            options.remote_callbacks(callbacks);

            git_remote
                .push(&[spec.as_str()], Some(&mut options))
                .map_err(|e| match remote_failure(e, remote) {
                    SessionError::NonFastForward { reason, .. } => SessionError::NonFastForward {
                        refspec: spec.clone(),
                        reason,
                    },
                    other => other,
                })?;
        }

        // libgit2 reports per-ref rejections through the callback while
        // the push call itself succeeds.
        if let Some(reason) = rejection {
            return Err(SessionError::NonFastForward {
                refspec: spec,
                reason,
            });
        }
        Ok(())
    }

    fn pull(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> Result<(), SessionError> {
        let fetched = {
            let mut git_remote =
                self.repo
                    .find_remote(remote.as_str())
                    .map_err(|e| SessionError::Internal {
                        message: format!("remote '{}': {}", remote, e.message()),
                    })?;

            let mut options = git2::FetchOptions::new();
            options.remote_callbacks(credential_callbacks(credentials));

            debug!(remote = %remote, branch = %branch, "fetching");
            git_remote
                .fetch(&[branch.as_str()], Some(&mut options), None)
                .map_err(|e| remote_failure(e, remote))?;

            let fetch_head = self.repo.find_reference("FETCH_HEAD").map_err(internal)?;
            self.repo
                .reference_to_annotated_commit(&fetch_head)
                .map_err(internal)?
                .id()
        };

        let annotated = self
            .repo
            .find_annotated_commit(fetched)
            .map_err(internal)?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated]).map_err(internal)?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_fast_forward() || analysis.is_unborn() {
            let refname = match self.current_branch()? {
                Some(current) => current.to_refname(),
                None => branch.to_refname(),
            };
            return self.fast_forward(&refname, fetched);
        }

        self.merge_commit(branch, fetched)
    }

    fn create_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let head = self.head_commit()?.ok_or_else(|| SessionError::Internal {
            message: "cannot create a branch before the first commit".to_string(),
        })?;

        match self.repo.branch(name.as_str(), &head, false) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::Exists => Err(SessionError::BranchExists {
                name: name.as_str().to_string(),
            }),
            Err(e) => Err(internal(e)),
        }
    }

    fn delete_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let mut branch = self
            .repo
            .find_branch(name.as_str(), git2::BranchType::Local)
            .map_err(|e| branch_lookup_failure(e, name))?;
        branch.delete().map_err(internal)
    }

    fn checkout_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let branch = self
            .repo
            .find_branch(name.as_str(), git2::BranchType::Local)
            .map_err(|e| branch_lookup_failure(e, name))?;

        let refname = branch
            .get()
            .name()
            .ok_or_else(|| SessionError::Internal {
                message: "branch ref name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let target = branch
            .get()
            .peel(git2::ObjectType::Commit)
            .map_err(internal)?;
        self.repo.checkout_tree(&target, None).map_err(internal)?;
        self.repo.set_head(&refname).map_err(internal)
    }

    fn list_branches(&self) -> Result<Vec<BranchEntry>, SessionError> {
        let branches = self
            .repo
            .branches(Some(git2::BranchType::Local))
            .map_err(internal)?;

        let mut entries = Vec::new();
        for branch in branches {
            let (branch, _) = branch.map_err(internal)?;

            // Skip names that are not valid UTF-8 or fail validation
            let name = match branch.name().ok().flatten() {
                Some(n) => n,
                None => continue,
            };
            let name = match BranchName::new(name) {
                Ok(n) => n,
                Err(_) => continue,
            };

            let tip = branch
                .get()
                .target()
                .and_then(|oid| CommitId::new(oid.to_string()).ok());

            entries.push(BranchEntry {
                is_head: branch.is_head(),
                name,
                tip,
            });
        }
        Ok(entries)
    }

    fn current_branch(&self) -> Result<Option<BranchName>, SessionError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(internal(e)),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None) // Detached HEAD
    }
}

/// Map a branch lookup failure, distinguishing the missing-branch case.
fn branch_lookup_failure(err: git2::Error, name: &BranchName) -> SessionError {
    if err.code() == git2::ErrorCode::NotFound {
        SessionError::BranchNotFound {
            name: name.as_str().to_string(),
        }
    } else {
        internal(err)
    }
}

/// Convert a git2 signature to an [`Identity`].
fn signature_identity(sig: &git2::Signature<'_>) -> Identity {
    Identity {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod remote_failure_mapping {
        use super::*;

        fn origin() -> RemoteName {
            RemoteName::new("origin").unwrap()
        }

        #[test]
        fn auth_code_maps_to_auth_failure() {
            let err = git2::Error::new(
                git2::ErrorCode::Auth,
                git2::ErrorClass::Http,
                "remote rejected credentials",
            );
            assert!(matches!(
                remote_failure(err, &origin()),
                SessionError::AuthFailure { .. }
            ));
        }

        #[test]
        fn auth_replay_message_maps_to_auth_failure() {
            let err = git2::Error::new(
                git2::ErrorCode::GenericError,
                git2::ErrorClass::Http,
                "too many redirects or authentication replays",
            );
            assert!(matches!(
                remote_failure(err, &origin()),
                SessionError::AuthFailure { .. }
            ));
        }

        #[test]
        fn net_class_maps_to_network_failure() {
            let err = git2::Error::new(
                git2::ErrorCode::GenericError,
                git2::ErrorClass::Net,
                "failed to resolve address",
            );
            let mapped = remote_failure(err, &origin());
            assert!(matches!(mapped, SessionError::NetworkFailure { .. }));
            assert!(mapped.is_transient());
        }

        #[test]
        fn not_fast_forward_code_maps() {
            let err = git2::Error::new(
                git2::ErrorCode::NotFastForward,
                git2::ErrorClass::Reference,
                "cannot push non-fastforwardable reference",
            );
            assert!(matches!(
                remote_failure(err, &origin()),
                SessionError::NonFastForward { .. }
            ));
        }

        #[test]
        fn unrelated_errors_stay_internal() {
            let err = git2::Error::new(
                git2::ErrorCode::GenericError,
                git2::ErrorClass::Odb,
                "object store corrupted",
            );
            assert!(matches!(
                remote_failure(err, &origin()),
                SessionError::Internal { .. }
            ));
        }
    }
}
