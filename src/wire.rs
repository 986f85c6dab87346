//! JSON shapes returned by the Azure DevOps Git REST API.
//!
//! The pull request list is decoded twice over: once strictly, where any
//! field not modelled here is an error, and once permissively. Both variants
//! are generated from the same definitions so they cannot drift apart.

use serde::Deserialize;

use crate::types::{CheckStatus, PullRequest};

macro_rules! pull_request_wire_types {
    ($(#[$strictness:meta])*) => {
        use chrono::{DateTime, Utc};
        use serde::Deserialize;

        use crate::types;

        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        $(#[$strictness])*
        pub struct PullRequestList {
            pub value: Vec<PullRequest>,
            pub count: i64,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        $(#[$strictness])*
        pub struct PullRequest {
            pub pull_request_id: i64,
            pub title: String,
            pub status: String,
            pub creation_date: DateTime<Utc>,
            pub repository: Repository,
            pub created_by: Identity,
            pub source_ref_name: String,
            pub target_ref_name: String,
            pub reviewers: Vec<Reviewer>,
            #[serde(rename = "_links")]
            pub links: Links,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        $(#[$strictness])*
        pub struct Repository {
            pub id: String,
            pub name: String,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        $(#[$strictness])*
        pub struct Identity {
            pub display_name: String,
            pub unique_name: String,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        $(#[$strictness])*
        pub struct Reviewer {
            pub display_name: String,
            pub vote: i32,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        $(#[$strictness])*
        pub struct Links {
            pub web: Href,
        }

        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        $(#[$strictness])*
        pub struct Href {
            pub href: String,
        }

        impl From<PullRequest> for types::PullRequest {
            fn from(pr: PullRequest) -> Self {
                types::PullRequest {
                    id: pr.pull_request_id,
                    title: pr.title,
                    status: pr.status,
                    created_at: pr.creation_date,
                    repository: types::Repository {
                        id: pr.repository.id,
                        name: pr.repository.name,
                    },
                    author: types::Identity {
                        display_name: pr.created_by.display_name,
                        unique_name: pr.created_by.unique_name,
                    },
                    source_ref: pr.source_ref_name,
                    target_ref: pr.target_ref_name,
                    reviewers: pr
                        .reviewers
                        .into_iter()
                        .map(|r| types::Reviewer {
                            display_name: r.display_name,
                            vote: r.vote,
                        })
                        .collect(),
                    web_url: pr.links.web.href,
                }
            }
        }

        impl PullRequestList {
            pub fn into_pull_requests(self) -> Vec<types::PullRequest> {
                self.value.into_iter().map(Into::into).collect()
            }
        }
    };
}

/// Rejects any field not modelled here, anywhere in the document.
pub mod strict {
    pull_request_wire_types!(#[serde(deny_unknown_fields)]);
}

/// Ignores fields not modelled here.
pub mod permissive {
    pull_request_wire_types!();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckStatusList {
    pub value: Vec<CheckStatus>,
    pub count: i64,
}

/// Decodes a pull request list, failing on any unknown field.
pub fn decode_strict(body: &[u8]) -> Result<Vec<PullRequest>, serde_json::Error> {
    serde_json::from_slice::<strict::PullRequestList>(body)
        .map(strict::PullRequestList::into_pull_requests)
}

/// Decodes a pull request list, ignoring unknown fields.
pub fn decode_permissive(body: &[u8]) -> Result<Vec<PullRequest>, serde_json::Error> {
    serde_json::from_slice::<permissive::PullRequestList>(body)
        .map(permissive::PullRequestList::into_pull_requests)
}

pub fn decode_check_statuses(body: &[u8]) -> Result<Vec<CheckStatus>, serde_json::Error> {
    serde_json::from_slice::<CheckStatusList>(body).map(|list| list.value)
}
