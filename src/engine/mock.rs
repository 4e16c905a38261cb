//! engine::mock
//!
//! Mock engine implementation for deterministic testing.
//!
//! # Design
//!
//! The mock engine provides a deterministic implementation of the [`Vcs`]
//! trait for use in tests. It stores commits and branches in memory and
//! allows configuring failure scenarios, so session sequencing and error
//! propagation can be exercised without touching a real repository or the
//! network.
//!
//! # Example
//!
//! ```
//! use mooring::engine::mock::MockVcs;
//! use mooring::engine::Vcs;
//!
//! let mut engine = MockVcs::new();
//!
//! engine.stage(".").unwrap();
//! let record = engine.commit("first commit", false).unwrap();
//! assert_eq!(record.summary, "first commit");
//!
//! let history = engine.history().unwrap();
//! assert_eq!(history.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::TimeZone;

use crate::core::types::{
    BranchEntry, BranchName, CommitId, CommitRecord, Credentials, Identity, RefSpec, RemoteName,
};
use crate::engine::Vcs;
use crate::session::SessionError;

/// Mock engine for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping, so a test can hold
/// a clone for assertions while the session owns the original.
#[derive(Debug, Clone)]
pub struct MockVcs {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockVcsInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockVcsInner {
    /// Commits in creation order (oldest first).
    commits: Vec<CommitRecord>,
    /// Count of staged paths pending commit.
    staged: usize,
    /// Local branches by name.
    branches: BTreeMap<String, Option<CommitId>>,
    /// The checked-out branch.
    head: String,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
    /// Counter for deterministic commit ids and timestamps.
    next_commit: u64,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail stage with the given error.
    Stage(SessionError),
    /// Fail commit with the given error.
    Commit(SessionError),
    /// Fail push with the given error.
    Push(SessionError),
    /// Fail pull with the given error.
    Pull(SessionError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    Stage {
        pattern: String,
    },
    Commit {
        message: String,
        allow_empty: bool,
    },
    Push {
        username: String,
        remote: String,
        refspec: String,
    },
    Pull {
        username: String,
        remote: String,
        branch: String,
    },
    CreateBranch {
        name: String,
    },
    DeleteBranch {
        name: String,
    },
    CheckoutBranch {
        name: String,
    },
}

impl MockVcs {
    /// Create a new empty mock engine on an unborn "main" branch.
    pub fn new() -> Self {
        let mut branches = BTreeMap::new();
        branches.insert("main".to_string(), None);

        Self {
            inner: Arc::new(Mutex::new(MockVcsInner {
                commits: Vec::new(),
                staged: 0,
                branches,
                head: "main".to_string(),
                fail_on: None,
                operations: Vec::new(),
                next_commit: 1,
            })),
        }
    }

    /// Configure one operation kind to fail.
    pub fn fail_on(&self, fail: FailOn) {
        self.inner.lock().unwrap().fail_on = Some(fail);
    }

    /// All operations recorded so far.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Number of commits created.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().unwrap().commits.len()
    }

    fn take_failure(inner: &mut MockVcsInner, matches: impl Fn(&FailOn) -> bool) -> Option<SessionError> {
        if inner.fail_on.as_ref().is_some_and(&matches) {
            match inner.fail_on.take() {
                Some(FailOn::Stage(e))
                | Some(FailOn::Commit(e))
                | Some(FailOn::Push(e))
                | Some(FailOn::Pull(e)) => Some(e),
                None => None,
            }
        } else {
            None
        }
    }
}

impl Default for MockVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vcs for MockVcs {
    fn stage(&mut self, pattern: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Stage {
            pattern: pattern.to_string(),
        });
        if let Some(err) = Self::take_failure(&mut inner, |f| matches!(f, FailOn::Stage(_))) {
            return Err(err);
        }

        // An empty pattern stands in for "matched nothing": success, no-op.
        if !pattern.is_empty() {
            inner.staged += 1;
        }
        Ok(())
    }

    fn commit(&mut self, message: &str, allow_empty: bool) -> Result<CommitRecord, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Commit {
            message: message.to_string(),
            allow_empty,
        });
        if let Some(err) = Self::take_failure(&mut inner, |f| matches!(f, FailOn::Commit(_))) {
            return Err(err);
        }

        if inner.staged == 0 && !allow_empty {
            return Err(SessionError::NothingToCommit);
        }

        let n = inner.next_commit;
        inner.next_commit += 1;
        inner.staged = 0;

        let identity = Identity {
            name: "Mock User".to_string(),
            email: "mock@example.com".to_string(),
        };
        let record = CommitRecord {
            id: CommitId::new(format!("{:040x}", n)).expect("mock id is valid hex"),
            author: identity.clone(),
            committer: identity,
            time: chrono::Utc
                .timestamp_opt(1_700_000_000 + n as i64, 0)
                .unwrap(),
            message: message.to_string(),
            summary: message.lines().next().unwrap_or("").to_string(),
        };

        inner.commits.push(record.clone());
        let head = inner.head.clone();
        inner.branches.insert(head, Some(record.id.clone()));
        Ok(record)
    }

    fn history(&self) -> Result<Vec<CommitRecord>, SessionError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.commits.iter().rev().cloned().collect())
    }

    fn push(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        refspec: &RefSpec,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Push {
            username: credentials.username().to_string(),
            remote: remote.as_str().to_string(),
            refspec: refspec.to_push_format(),
        });
        if let Some(err) = Self::take_failure(&mut inner, |f| matches!(f, FailOn::Push(_))) {
            return Err(err);
        }
        Ok(())
    }

    fn pull(
        &mut self,
        credentials: &Credentials,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::Pull {
            username: credentials.username().to_string(),
            remote: remote.as_str().to_string(),
            branch: branch.as_str().to_string(),
        });
        if let Some(err) = Self::take_failure(&mut inner, |f| matches!(f, FailOn::Pull(_))) {
            return Err(err);
        }
        Ok(())
    }

    fn create_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateBranch {
            name: name.as_str().to_string(),
        });

        if inner.branches.contains_key(name.as_str()) {
            return Err(SessionError::BranchExists {
                name: name.as_str().to_string(),
            });
        }
        let tip = inner.commits.last().map(|c| c.id.clone());
        inner.branches.insert(name.as_str().to_string(), tip);
        Ok(())
    }

    fn delete_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::DeleteBranch {
            name: name.as_str().to_string(),
        });

        if inner.branches.remove(name.as_str()).is_none() {
            return Err(SessionError::BranchNotFound {
                name: name.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn checkout_branch(&mut self, name: &BranchName) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CheckoutBranch {
            name: name.as_str().to_string(),
        });

        if !inner.branches.contains_key(name.as_str()) {
            return Err(SessionError::BranchNotFound {
                name: name.as_str().to_string(),
            });
        }
        inner.head = name.as_str().to_string();
        Ok(())
    }

    fn list_branches(&self) -> Result<Vec<BranchEntry>, SessionError> {
        let inner = self.inner.lock().unwrap();
        let mut entries = Vec::new();
        for (name, tip) in &inner.branches {
            entries.push(BranchEntry {
                name: BranchName::new(name.clone())?,
                tip: tip.clone(),
                is_head: *name == inner.head,
            });
        }
        Ok(entries)
    }

    fn current_branch(&self) -> Result<Option<BranchName>, SessionError> {
        let inner = self.inner.lock().unwrap();
        Ok(Some(BranchName::new(inner.head.clone())?))
    }
}
