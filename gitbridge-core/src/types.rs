//! Domain newtypes shared by every gitbridge crate.
//!
//! Commit identifiers are validated and normalised on construction so that
//! every map keyed by them is case-insensitive without further effort.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Shortest abbreviated commit identifier accepted.
pub const MIN_COMMIT_SHA_LEN: usize = 4;

/// Longest commit identifier accepted (SHA-256 object format).
pub const MAX_COMMIT_SHA_LEN: usize = 64;

// ---------------------------------------------------------------------------
// CommitSha
// ---------------------------------------------------------------------------

/// A commit identifier in the primary host's addressing scheme.
///
/// Always stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitSha(String);

impl CommitSha {
    /// Validate and normalise a raw hex digest.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let length_ok = (MIN_COMMIT_SHA_LEN..=MAX_COMMIT_SHA_LEN).contains(&trimmed.len());
        if !length_ok || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidCommitSha(raw.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CommitSha {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CommitSha {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CommitSha> for String {
    fn from(sha: CommitSha) -> Self {
        sha.0
    }
}

// ---------------------------------------------------------------------------
// CheckRunId
// ---------------------------------------------------------------------------

/// Opaque handle the primary host assigns when a check-run is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckRunId(pub u64);

impl fmt::Display for CheckRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for CheckRunId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// RepoSlug
// ---------------------------------------------------------------------------

/// `owner/repository` pair addressing a repository on the primary host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repository: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    /// Derive the slug from a clone URL.
    ///
    /// Understands scp-like (`git@github.com:owner/repo.git`) and URL forms
    /// (`https://github.com/owner/repo`, `ssh://git@host/owner/repo.git`).
    /// The last two path segments are used.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let path = match trimmed.split_once("://") {
            Some((_scheme, rest)) => rest.split_once('/').map(|(_host, path)| path)?,
            None => match trimmed.split_once(':') {
                Some((_host, path)) => path,
                None => trimmed,
            },
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty()).rev();
        let repository = segments.next()?;
        let owner = segments.next()?;
        Some(Self::new(owner, repository))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_sha_is_lowercased() {
        let sha = CommitSha::parse("ABC123def").unwrap();
        assert_eq!(sha.as_str(), "abc123def");
        assert_eq!(sha, CommitSha::parse("abc123DEF").unwrap());
    }

    #[test]
    fn commit_sha_accepts_full_digest() {
        let full = "0123456789abcdef0123456789abcdef01234567";
        assert_eq!(CommitSha::parse(full).unwrap().as_str(), full);
    }

    #[test]
    fn commit_sha_rejects_non_hex_and_bad_lengths() {
        for raw in ["", "abc", "xyz123", "refs/heads/main", &"a".repeat(65)] {
            assert_eq!(
                CommitSha::parse(raw),
                Err(CoreError::InvalidCommitSha(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn commit_sha_deserializes_through_validation() {
        let ok: CommitSha = serde_yaml::from_str("\"ABCDEF12\"").unwrap();
        assert_eq!(ok.as_str(), "abcdef12");
        assert!(serde_yaml::from_str::<CommitSha>("\"not-a-sha\"").is_err());
    }

    #[test]
    fn slug_from_scp_url() {
        let slug = RepoSlug::from_remote_url("git@github.com:alex/registrator.git").unwrap();
        assert_eq!(slug, RepoSlug::new("alex", "registrator"));
    }

    #[test]
    fn slug_from_https_and_ssh_urls() {
        assert_eq!(
            RepoSlug::from_remote_url("https://github.com/acme/widgets").unwrap(),
            RepoSlug::new("acme", "widgets")
        );
        assert_eq!(
            RepoSlug::from_remote_url("ssh://git@github.com/acme/widgets.git/").unwrap(),
            RepoSlug::new("acme", "widgets")
        );
    }

    #[test]
    fn slug_needs_two_segments() {
        assert_eq!(RepoSlug::from_remote_url("https://github.com/acme"), None);
        assert_eq!(RepoSlug::from_remote_url("widgets"), None);
    }

    #[test]
    fn slug_display() {
        assert_eq!(RepoSlug::new("acme", "widgets").to_string(), "acme/widgets");
    }
}
