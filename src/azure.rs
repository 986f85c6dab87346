//! Azure DevOps Git REST client.
//!
//! Two read-only calls: the active pull request list for a project (or one
//! repository), and the check statuses posted against one pull request.
//! Both authenticate with the personal access token as the password half of
//! HTTP Basic authentication.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header::ACCEPT};
use tracing::debug;
use url::Url;

use crate::{
    cli::{AccessToken, Config},
    error::FetchError,
    types::{CheckStatus, PullRequest, ReviewService},
    wire,
};

const USER_AGENT: &str = concat!("lazydevops/", env!("CARGO_PKG_VERSION"));

pub struct AzureDevOps {
    client: Client,
    base_url: Url,
    org: String,
    project: String,
    repo: Option<String>,
    token: AccessToken,
    top: Option<u32>,
    api_version: String,
    status_timeout: Option<Duration>,
}

impl AzureDevOps {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            org: config.org.clone(),
            project: config.project.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
            top: config.top,
            api_version: config.api_version.clone(),
            status_timeout: config.status_timeout,
        })
    }

    /// Builds `{base}/{org}/{project}/_apis/git/{segments...}` with each
    /// segment percent-encoded.
    fn git_endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([self.org.as_str(), self.project.as_str(), "_apis", "git"])
            .extend(segments);
        Ok(url)
    }

    pub fn pull_requests_url(&self) -> Result<Url, FetchError> {
        let mut url = match &self.repo {
            Some(repo) => self.git_endpoint(&["repositories", repo.as_str(), "pullrequests"])?,
            None => self.git_endpoint(&["pullrequests"])?,
        };

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("searchCriteria.status", "active");
            if let Some(top) = self.top {
                query.append_pair("$top", &top.to_string());
            }
            query.append_pair("api-version", &self.api_version);
        }

        Ok(url)
    }

    pub fn check_statuses_url(&self, pr: &PullRequest) -> Result<Url, FetchError> {
        let id = pr.id.to_string();
        let mut url = self.git_endpoint(&[
            "repositories",
            pr.repository.id.as_str(),
            "pullRequests",
            id.as_str(),
            "statuses",
        ])?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn request(&self, url: Url, timeout: Option<Duration>) -> RequestBuilder {
        let builder = self
            .client
            .get(url)
            .basic_auth("", Some(self.token.expose()))
            .header(ACCEPT, "application/json");

        match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn get(&self, url: Url, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "GET");

        let response = self.request(url, timeout).send().await?;
        if let Some(err) = FetchError::from_status(response.status()) {
            return Err(err);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Fetches and decodes a pull request list, strictly first.
///
/// If the strict decode fails, `fetch` is called exactly once more and the
/// new body is decoded permissively. Errors from the second fetch or the
/// permissive decode are returned as-is.
pub async fn fetch_with_fallback<F, Fut>(mut fetch: F) -> Result<Vec<PullRequest>, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<u8>, FetchError>>,
{
    let body = fetch().await?;

    match wire::decode_strict(&body) {
        Ok(prs) => Ok(prs),
        Err(err) => {
            debug!(error = %err, "Strict decode failed, refetching with permissive decode");
            let body = fetch().await?;
            Ok(wire::decode_permissive(&body)?)
        }
    }
}

#[async_trait]
impl ReviewService for AzureDevOps {
    async fn list_active_pull_requests(&self) -> Result<Vec<PullRequest>, FetchError> {
        let url = self.pull_requests_url()?;
        fetch_with_fallback(move || self.get(url.clone(), None)).await
    }

    async fn list_check_statuses(&self, pr: &PullRequest) -> Result<Vec<CheckStatus>, FetchError> {
        let url = self.check_statuses_url(pr)?;
        let body = self.get(url, self.status_timeout).await?;
        Ok(wire::decode_check_statuses(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use reqwest::{StatusCode, header::AUTHORIZATION};

    use super::*;
    use crate::types::Repository;

    const STRICT_BODY: &[u8] = br#"{"value": [{"pullRequestId": 1, "title": "one"}], "count": 1}"#;
    const SKEWED_BODY: &[u8] =
        br#"{"value": [{"pullRequestId": 2, "title": "two", "isDraft": true}], "count": 1}"#;

    fn config() -> Config {
        Config {
            org: "acme".to_string(),
            project: "Web Platform".to_string(),
            repo: None,
            token: AccessToken::new("secret").unwrap(),
            top: Some(50),
            api_version: "7.1-preview.1".to_string(),
            max_title_width: None,
            status_timeout: Some(Duration::from_secs(15)),
            base_url: Url::parse("https://dev.azure.com").unwrap(),
        }
    }

    fn pull_request() -> PullRequest {
        PullRequest {
            id: 17,
            repository: Repository {
                id: "6a1e-42".to_string(),
                name: "frontend".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_pull_requests_url() {
        let service = AzureDevOps::new(&config()).unwrap();
        assert_eq!(
            service.pull_requests_url().unwrap().as_str(),
            "https://dev.azure.com/acme/Web%20Platform/_apis/git/pullrequests?searchCriteria.status=active&%24top=50&api-version=7.1-preview.1"
        );
    }

    #[test]
    fn test_pull_requests_url_without_limit() {
        let service = AzureDevOps::new(&Config {
            top: None,
            ..config()
        })
        .unwrap();
        let url = service.pull_requests_url().unwrap();
        assert!(!url.as_str().contains("top"));
        assert!(url.as_str().contains("searchCriteria.status=active"));
    }

    #[test]
    fn test_pull_requests_url_for_repository() {
        let service = AzureDevOps::new(&Config {
            repo: Some("frontend".to_string()),
            ..config()
        })
        .unwrap();
        assert!(
            service
                .pull_requests_url()
                .unwrap()
                .as_str()
                .starts_with(
                    "https://dev.azure.com/acme/Web%20Platform/_apis/git/repositories/frontend/pullrequests?"
                )
        );
    }

    #[test]
    fn test_server_collection_base_url() {
        let service = AzureDevOps::new(&Config {
            base_url: Url::parse("https://tfs.example.com/DefaultCollection/").unwrap(),
            ..config()
        })
        .unwrap();
        assert!(
            service
                .pull_requests_url()
                .unwrap()
                .as_str()
                .starts_with(
                    "https://tfs.example.com/DefaultCollection/acme/Web%20Platform/_apis/git/pullrequests?"
                )
        );
    }

    #[test]
    fn test_check_statuses_url() {
        let service = AzureDevOps::new(&config()).unwrap();
        assert_eq!(
            service.check_statuses_url(&pull_request()).unwrap().as_str(),
            "https://dev.azure.com/acme/Web%20Platform/_apis/git/repositories/6a1e-42/pullRequests/17/statuses?api-version=7.1-preview.1"
        );
    }

    #[test]
    fn test_cannot_be_a_base_url_is_rejected() {
        let service = AzureDevOps::new(&Config {
            base_url: Url::parse("mailto:ops@example.com").unwrap(),
            ..config()
        })
        .unwrap();
        assert!(matches!(
            service.pull_requests_url(),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_request_headers() {
        let service = AzureDevOps::new(&config()).unwrap();
        let url = service.check_statuses_url(&pull_request()).unwrap();
        let request = service
            .request(url, Some(Duration::from_secs(15)))
            .build()
            .unwrap();

        // base64(":secret")
        assert_eq!(request.headers()[AUTHORIZATION], "Basic OnNlY3JldA==");
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(15)));
    }

    #[test]
    fn test_list_request_has_no_timeout() {
        let service = AzureDevOps::new(&config()).unwrap();
        let url = service.pull_requests_url().unwrap();
        let request = service.request(url, None).build().unwrap();
        assert_eq!(request.timeout(), None);
    }

    #[tokio::test]
    async fn test_strict_body_is_fetched_once() {
        let mut calls = 0;
        let prs = fetch_with_fallback(|| {
            calls += 1;
            ready(Ok(STRICT_BODY.to_vec()))
        })
        .await
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].title, "one");
    }

    #[tokio::test]
    async fn test_schema_skew_refetches_once_and_decodes_permissively() {
        let mut calls = 0;
        let prs = fetch_with_fallback(|| {
            calls += 1;
            ready(Ok(SKEWED_BODY.to_vec()))
        })
        .await
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].id, 2);
    }

    #[tokio::test]
    async fn test_fallback_uses_the_fresh_body() {
        let mut bodies = vec![SKEWED_BODY.to_vec(), STRICT_BODY.to_vec()].into_iter();
        let prs = fetch_with_fallback(|| ready(Ok(bodies.next().unwrap())))
            .await
            .unwrap();

        assert_eq!(prs[0].title, "one");
        assert!(bodies.next().is_none());
    }

    #[tokio::test]
    async fn test_failed_refetch_is_returned() {
        let mut responses = vec![
            Ok(SKEWED_BODY.to_vec()),
            Err(FetchError::Status {
                status: StatusCode::BAD_GATEWAY,
            }),
        ]
        .into_iter();

        let err = fetch_with_fallback(|| ready(responses.next().unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status } if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_fails_after_one_retry() {
        let mut calls = 0;
        let err = fetch_with_fallback(|| {
            calls += 1;
            ready(Ok(b"not json".to_vec()))
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 2);
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_first_fetch_error_is_not_retried() {
        let mut calls = 0;
        let err = fetch_with_fallback(|| {
            calls += 1;
            ready(Err(FetchError::Unauthorized {
                status: StatusCode::UNAUTHORIZED,
            }))
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(err.is_unauthorized());
    }
}
