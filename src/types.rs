use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::FetchError;

/// Repository a pull request belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    pub id: String,
    pub name: String,
}

/// Identity of the pull request author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub unique_name: String,
}

/// A reviewer and their vote.
///
/// Azure DevOps records 10 (approved), 5 (approved with suggestions), 0 (no
/// vote), -5 (waiting for author) and -10 (rejected). Only the sign matters
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reviewer {
    pub display_name: String,
    pub vote: i32,
}

/// An active pull request as returned by the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullRequest {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub repository: Repository,
    pub author: Identity,
    pub source_ref: String,
    pub target_ref: String,
    pub reviewers: Vec<Reviewer>,
    pub web_url: String,
}

impl PullRequest {
    /// Formats the branch pair as `source->target` with ref prefixes removed.
    pub fn branches(&self) -> String {
        format!(
            "{}->{}",
            short_ref(&self.source_ref),
            short_ref(&self.target_ref)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckContext {
    pub name: String,
    pub genre: String,
}

impl fmt::Display for CheckContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.genre.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.genre, self.name)
        }
    }
}

/// A single build or policy status posted against a pull request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckStatus {
    pub state: String,
    pub description: Option<String>,
    pub context: CheckContext,
    pub target_url: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// Strips `refs/heads/` and then `refs/` from a branch reference.
pub fn short_ref(reference: &str) -> &str {
    let reference = reference.strip_prefix("refs/heads/").unwrap_or(reference);
    reference.strip_prefix("refs/").unwrap_or(reference)
}

/// Source of pull requests and their check statuses.
#[async_trait]
pub trait ReviewService {
    /// Lists the active pull requests selected by the service configuration.
    async fn list_active_pull_requests(&self) -> Result<Vec<PullRequest>, FetchError>;

    /// Lists the check statuses posted against one pull request.
    async fn list_check_statuses(&self, pr: &PullRequest) -> Result<Vec<CheckStatus>, FetchError>;
}
