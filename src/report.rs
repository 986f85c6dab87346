use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::{
    status::OverallStatus,
    types::{PullRequest, ReviewService},
    votes::VoteTally,
};

/// One table row: a pull request with its reduced vote and check state.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub pull_request: PullRequest,
    pub votes: VoteTally,
    pub checks: OverallStatus,
}

/// Orders pull requests newest first, keeping fetch order for ties.
pub fn sort_by_recency(prs: &mut [PullRequest]) {
    prs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Lists active pull requests and reduces each one to a report row.
///
/// A failure to list pull requests is fatal. Check statuses are fetched one
/// pull request at a time, and a failure there only degrades that row.
pub async fn build_report<S>(service: &S) -> Result<Vec<ReportRow>>
where
    S: ReviewService + Sync,
{
    let mut prs = service
        .list_active_pull_requests()
        .await
        .context("Failed to list active pull requests")?;

    sort_by_recency(&mut prs);

    let mut rows = Vec::with_capacity(prs.len());
    for pr in prs {
        let statuses = service.list_check_statuses(&pr).await;

        match &statuses {
            Ok(statuses) => {
                for status in statuses {
                    debug!(pr = pr.id, context = %status.context, state = %status.state, "Check status");
                }
            }
            Err(err) => warn!(pr = pr.id, error = %err, "Could not fetch check statuses"),
        }

        rows.push(ReportRow {
            votes: VoteTally::from_reviewers(&pr.reviewers),
            checks: OverallStatus::from_fetch(&statuses),
            pull_request: pr,
        });
    }

    Ok(rows)
}
