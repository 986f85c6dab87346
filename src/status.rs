use std::fmt;

use crate::{error::FetchError, types::CheckStatus};

/// Classification of a single check state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Succeeded,
    Pending,
    Failed,
    Errored,
    Neutral,
    Unrecognized,
}

impl CheckOutcome {
    /// Classifies a state case-insensitively.
    pub fn classify(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "succeeded" | "success" => CheckOutcome::Succeeded,
            "pending" | "inprogress" | "in_progress" => CheckOutcome::Pending,
            "failed" | "failure" => CheckOutcome::Failed,
            "error" => CheckOutcome::Errored,
            "notapplicable" | "not_applicable" | "notset" => CheckOutcome::Neutral,
            _ => CheckOutcome::Unrecognized,
        }
    }
}

/// The overall check state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    NoChecks,
    Failed,
    InProgress,
    Passed,
    Unknown,
    Unauthorized,
}

impl OverallStatus {
    /// Reduces a set of check statuses to one overall state.
    ///
    /// Failed and errored checks take precedence over pending ones, which
    /// take precedence over a pass. A pass needs at least one succeeded
    /// check with every other check neutral. Anything else is unknown.
    pub fn from_statuses(statuses: &[CheckStatus]) -> Self {
        if statuses.is_empty() {
            return OverallStatus::NoChecks;
        }

        let mut has_failure = false;
        let mut has_pending = false;
        let mut has_success = false;
        let mut all_succeeded_or_neutral = true;

        for status in statuses {
            match CheckOutcome::classify(&status.state) {
                CheckOutcome::Succeeded => has_success = true,
                CheckOutcome::Neutral => {}
                CheckOutcome::Pending => {
                    has_pending = true;
                    all_succeeded_or_neutral = false;
                }
                CheckOutcome::Failed | CheckOutcome::Errored => {
                    has_failure = true;
                    all_succeeded_or_neutral = false;
                }
                CheckOutcome::Unrecognized => all_succeeded_or_neutral = false,
            }
        }

        if has_failure {
            OverallStatus::Failed
        } else if has_pending {
            OverallStatus::InProgress
        } else if has_success && all_succeeded_or_neutral {
            OverallStatus::Passed
        } else {
            OverallStatus::Unknown
        }
    }

    /// Reduces the outcome of a status fetch, degrading on failure.
    pub fn from_fetch(result: &Result<Vec<CheckStatus>, FetchError>) -> Self {
        match result {
            Ok(statuses) => Self::from_statuses(statuses),
            Err(err) if err.is_unauthorized() => OverallStatus::Unauthorized,
            Err(_) => OverallStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::NoChecks => "No checks",
            OverallStatus::Failed => "Failed",
            OverallStatus::InProgress => "In Progress",
            OverallStatus::Passed => "Passed",
            OverallStatus::Unknown => "Unknown",
            OverallStatus::Unauthorized => "Unauthorized",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
