//! lazydevops: a terminal summary of active Azure DevOps pull requests.
//!
//! Lists a project's active pull requests, reduces each one's reviewer
//! votes and CI check statuses to short labels, and hands the rows to the
//! binary for table rendering.

pub mod azure;
pub mod cli;
pub mod error;
pub mod report;
pub mod status;
pub mod types;
pub mod votes;
pub mod wire;

pub use azure::{AzureDevOps, fetch_with_fallback};
pub use cli::{AccessToken, Config, PAT_ENV_VAR, USAGE_HINT, UsageError, parse_args};
pub use error::FetchError;
pub use report::{ReportRow, build_report, sort_by_recency};
pub use status::{CheckOutcome, OverallStatus};
pub use types::{
    CheckContext, CheckStatus, Identity, PullRequest, Repository, ReviewService, Reviewer,
    short_ref,
};
pub use votes::{VoteTally, summarize_votes};
