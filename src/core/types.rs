//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`RemoteName`] - Validated remote name
//! - [`CommitId`] - Git object identifier (SHA)
//! - [`RefSpec`] - Local-to-remote branch mapping for push
//! - [`Credentials`] - Username + personal-access token for remote calls
//! - [`Identity`] - Author/committer name and email
//! - [`CommitRecord`] - Immutable snapshot of one commit's metadata
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use mooring::core::types::{BranchName, CommitId, RefSpec};
//!
//! // Valid constructions
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let id = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let spec = RefSpec::same(branch);
//!
//! // Invalid constructions fail at creation time
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(CommitId::new("not-a-sha").is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid remote name: {0}")]
    InvalidRemoteName(String),

    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use mooring::core::types::BranchName;
///
/// // Valid branch names
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
///
/// // Invalid branch names
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's
    /// refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a branch name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }

        // "@" alone is reserved
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }

        if name.starts_with('.') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '.'".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }

        if name.ends_with(".lock") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock'".into(),
            ));
        }
        if name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '/'".into(),
            ));
        }

        if name.contains("..") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '..'".into(),
            ));
        }
        if name.contains("@{") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '@{'".into(),
            ));
        }
        if name.contains("//") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '//'".into(),
            ));
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{c}'"
                )));
            }
        }

        for c in name.chars() {
            if c.is_ascii_control() {
                return Err(TypeError::InvalidBranchName(
                    "branch name cannot contain control characters".into(),
                ));
            }
        }

        for component in name.split('/') {
            if component.is_empty() {
                continue;
            }
            if component.starts_with('.') {
                return Err(TypeError::InvalidBranchName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidBranchName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref name for this branch (`refs/heads/<name>`).
    pub fn to_refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated remote name (e.g. "origin").
///
/// Remote names follow the same character rules as branch names; Git
/// additionally forbids `/` in a remote name.
///
/// # Example
///
/// ```
/// use mooring::core::types::RemoteName;
///
/// let origin = RemoteName::new("origin").unwrap();
/// assert_eq!(origin.as_str(), "origin");
///
/// assert!(RemoteName::new("").is_err());
/// assert!(RemoteName::new("up/stream").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Create a new validated remote name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRemoteName` if the name is empty,
    /// contains `/`, or violates the refname character rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.contains('/') {
            return Err(TypeError::InvalidRemoteName(
                "remote name cannot contain '/'".into(),
            ));
        }
        BranchName::validate(&name)
            .map_err(|_| TypeError::InvalidRemoteName(format!("'{name}' is not a valid name")))?;
        Ok(Self(name))
    }

    /// Get the remote name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemoteName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteName> for String {
    fn from(name: RemoteName) -> Self {
        name.0
    }
}

impl std::fmt::Display for RemoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git commit identifier (SHA-1 or SHA-256).
///
/// Ids are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use mooring::core::types::CommitId;
///
/// let id = CommitId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(id.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a new validated commit id.
    ///
    /// The id is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` if the string is not a valid
    /// hex object id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get an abbreviated form of the id.
    ///
    /// Returns the first `len` characters. If `len` exceeds the id length,
    /// returns the full id.
    ///
    /// # Example
    ///
    /// ```
    /// use mooring::core::types::CommitId;
    ///
    /// let id = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(id.short(7), "abc123d");
    /// assert_eq!(id.short(4), "abc1");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate a commit id.
    fn validate(id: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if id.len() != 40 && id.len() != 64 {
            return Err(TypeError::InvalidCommitId(format!(
                "expected 40 or 64 hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidCommitId(
                "commit id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the commit id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A local-to-remote branch mapping for push.
///
/// `remote: None` means "same name on the remote side".
///
/// # Example
///
/// ```
/// use mooring::core::types::{BranchName, RefSpec};
///
/// let main = BranchName::new("main").unwrap();
/// let spec = RefSpec::same(main.clone());
/// assert_eq!(spec.to_push_format(), "refs/heads/main:refs/heads/main");
///
/// let deploy = BranchName::new("deploy").unwrap();
/// let spec = RefSpec::mapped(main, deploy);
/// assert_eq!(spec.to_push_format(), "refs/heads/main:refs/heads/deploy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSpec {
    /// The local branch being pushed.
    pub local: BranchName,
    /// The remote branch to update; `None` mirrors the local name.
    pub remote: Option<BranchName>,
}

impl RefSpec {
    /// Push a branch to the same name on the remote.
    pub fn same(local: BranchName) -> Self {
        Self {
            local,
            remote: None,
        }
    }

    /// Push a branch to a differently named remote branch.
    pub fn mapped(local: BranchName, remote: BranchName) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }

    /// The remote-side branch name.
    pub fn remote_branch(&self) -> &BranchName {
        self.remote.as_ref().unwrap_or(&self.local)
    }

    /// Render as a full `src:dst` push refspec.
    pub fn to_push_format(&self) -> String {
        format!(
            "{}:{}",
            self.local.to_refname(),
            self.remote_branch().to_refname()
        )
    }
}

impl std::fmt::Display for RefSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_push_format())
    }
}

/// Username + personal-access-token credentials for remote operations.
///
/// Caller-supplied per push/pull call; never persisted by the facade.
/// The token is redacted from `Debug` output so it cannot leak through
/// logging.
///
/// # Example
///
/// ```
/// use mooring::core::types::Credentials;
///
/// let creds = Credentials::new("ci-bot", "s3cr3t-token");
/// assert_eq!(creds.username(), "ci-bot");
/// assert!(!format!("{:?}", creds).contains("s3cr3t"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    /// Create credentials from a username and token.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// The username to authenticate as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The personal-access token (password substitute).
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// An author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Immutable metadata for one commit, produced by history enumeration.
///
/// Records are value objects: once produced they never change, and their
/// lifetime is independent of the session that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// The commit id
    pub id: CommitId,
    /// Author identity
    pub author: Identity,
    /// Committer identity
    pub committer: Identity,
    /// Commit timestamp
    pub time: DateTime<Utc>,
    /// Full commit message
    pub message: String,
    /// First line of the commit message
    pub summary: String,
}

impl CommitRecord {
    /// Commit timestamp as seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> i64 {
        self.time.timestamp()
    }
}

/// One entry in a branch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    /// The branch name
    pub name: BranchName,
    /// The commit the branch points at; `None` for an unborn branch
    pub tip: Option<CommitId>,
    /// Whether HEAD currently points at this branch
    pub is_head: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("feature/nested/deep").is_ok());
            assert!(BranchName::new("user@feature").is_ok());
            assert!(BranchName::new("v1.2.3").is_ok());
        }

        #[test]
        fn rejects_empty_and_reserved() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
        }

        #[test]
        fn rejects_bad_affixes() {
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-flag").is_err());
            assert!(BranchName::new("branch.lock").is_err());
            assert!(BranchName::new("trailing/").is_err());
            assert!(BranchName::new("feature/.hidden").is_err());
        }

        #[test]
        fn rejects_bad_sequences() {
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("a@{b").is_err());
            assert!(BranchName::new("a//b").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("col:on").is_err());
            assert!(BranchName::new("star*").is_err());
        }

        #[test]
        fn refname_rendering() {
            let name = BranchName::new("feature/x").unwrap();
            assert_eq!(name.to_refname(), "refs/heads/feature/x");
        }
    }

    mod remote_name {
        use super::*;

        #[test]
        fn accepts_common_names() {
            assert!(RemoteName::new("origin").is_ok());
            assert!(RemoteName::new("upstream").is_ok());
        }

        #[test]
        fn rejects_slash_and_empty() {
            assert!(RemoteName::new("").is_err());
            assert!(RemoteName::new("up/stream").is_err());
        }
    }

    mod commit_id {
        use super::*;

        #[test]
        fn normalizes_to_lowercase() {
            let id = CommitId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn accepts_sha256_length() {
            let hex64 = "a".repeat(64);
            assert!(CommitId::new(hex64).is_ok());
        }

        #[test]
        fn rejects_wrong_length_and_non_hex() {
            assert!(CommitId::new("abc123").is_err());
            assert!(CommitId::new("z".repeat(40)).is_err());
        }

        #[test]
        fn short_clamps_to_length() {
            let id = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(id.short(7), "abc123d");
            assert_eq!(id.short(100).len(), 40);
        }
    }

    mod refspec {
        use super::*;

        #[test]
        fn same_name_mapping() {
            let spec = RefSpec::same(BranchName::new("main").unwrap());
            assert_eq!(spec.to_push_format(), "refs/heads/main:refs/heads/main");
            assert_eq!(spec.remote_branch().as_str(), "main");
        }

        #[test]
        fn explicit_mapping() {
            let spec = RefSpec::mapped(
                BranchName::new("main").unwrap(),
                BranchName::new("deploy").unwrap(),
            );
            assert_eq!(spec.to_push_format(), "refs/heads/main:refs/heads/deploy");
            assert_eq!(spec.remote_branch().as_str(), "deploy");
        }
    }

    mod credentials {
        use super::*;

        #[test]
        fn debug_redacts_token() {
            let creds = Credentials::new("bot", "hunter2");
            let rendered = format!("{:?}", creds);
            assert!(rendered.contains("bot"));
            assert!(!rendered.contains("hunter2"));
            assert!(rendered.contains("<redacted>"));
        }
    }

    mod commit_record {
        use super::*;
        use chrono::TimeZone;

        #[test]
        fn epoch_seconds_round_trip() {
            let record = CommitRecord {
                id: CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap(),
                author: Identity {
                    name: "A".into(),
                    email: "a@example.com".into(),
                },
                committer: Identity {
                    name: "C".into(),
                    email: "c@example.com".into(),
                },
                time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                message: "subject\n\nbody\n".into(),
                summary: "subject".into(),
            };
            assert_eq!(record.epoch_seconds(), 1_700_000_000);
        }

        #[test]
        fn identity_display() {
            let id = Identity {
                name: "Test User".into(),
                email: "test@example.com".into(),
            };
            assert_eq!(id.to_string(), "Test User <test@example.com>");
        }
    }
}
