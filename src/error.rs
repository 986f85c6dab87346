use reqwest::StatusCode;
use thiserror::Error;

use crate::cli::PAT_ENV_VAR;

/// Failure of a single call against the review service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service rejected the credential (HTTP 401 or 403).
    #[error(
        "authentication failed ({status}). Ensure {} is valid and has Code (Read) scope",
        PAT_ENV_VAR
    )]
    Unauthorized { status: StatusCode },

    /// Any other non-2xx response.
    #[error("request failed: {status}")]
    Status { status: StatusCode },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classifies a response status, returning None for success codes.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Some(FetchError::Unauthorized { status })
        } else if !status.is_success() {
            Some(FetchError::Status { status })
        } else {
            None
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }
}
