use std::{fmt, time::Duration};

use anyhow::Result;
use clap::Parser;
use thiserror::Error;
use url::Url;

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Environment variable holding the personal access token.
pub const PAT_ENV_VAR: &str = "LAZY_DEV_OPS_PAT";

pub const DEFAULT_API_VERSION: &str = "7.1-preview.1";
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

/// Printed after a usage error.
pub const USAGE_HINT: &str = "Usage: lazydevops --org <org> --project <project> [--repo <repo>] [--top N]\nSet LAZY_DEV_OPS_PAT environment variable with a Personal Access Token (Code: Read).";

/// Invalid invocation detected after flag parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("--org and --project are required and must not be empty")]
    EmptyArgument,

    #[error("Environment variable {} is required for authentication.", PAT_ENV_VAR)]
    MissingToken,
}

/// Personal access token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Result<Self, UsageError> {
        let token = token.into();
        if token.is_empty() {
            return Err(UsageError::MissingToken);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub org: String,
    pub project: String,
    pub repo: Option<String>,
    pub token: AccessToken,
    /// Maximum pull requests to request; `None` when unlimited.
    pub top: Option<u32>,
    pub api_version: String,
    pub max_title_width: Option<usize>,
    pub status_timeout: Option<Duration>,
    pub base_url: Url,
}

#[derive(Parser, Debug)]
#[command(
    name = "lazydevops",
    about = "List active Azure DevOps pull requests with their votes and check status"
)]
#[command(version, long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// Azure DevOps organization (e.g., myorg)
    #[arg(long, value_name = "ORG")]
    pub org: String,

    /// Azure DevOps project name
    #[arg(long, value_name = "PROJECT")]
    pub project: String,

    /// Only list pull requests in this repository (name or id)
    #[arg(short = 'r', long, value_name = "REPO")]
    pub repo: Option<String>,

    /// Max number of PRs to fetch (0 or less means no limit)
    #[arg(long, default_value_t = 50, allow_negative_numbers = true, value_name = "NUM")]
    pub top: i64,

    /// Azure DevOps API version
    #[arg(long = "api-version", default_value = DEFAULT_API_VERSION, value_name = "VERSION")]
    pub api_version: String,

    /// Truncate titles longer than this many characters
    #[arg(long = "max-title-width", value_name = "CHARS")]
    pub max_title_width: Option<usize>,

    /// Timeout in seconds for each check status request (0 disables)
    #[arg(long = "status-timeout", default_value_t = 15, value_name = "SECS")]
    pub status_timeout: u64,

    /// Service root, for Azure DevOps Server collections
    #[arg(long = "base-url", default_value = DEFAULT_BASE_URL, value_name = "URL")]
    pub base_url: Url,
}

impl CliArgs {
    fn into_config(self, token: Option<String>) -> Result<Config, UsageError> {
        if self.org.is_empty() || self.project.is_empty() {
            return Err(UsageError::EmptyArgument);
        }

        let token = AccessToken::new(token.unwrap_or_default())?;

        Ok(Config {
            org: self.org,
            project: self.project,
            repo: self.repo.filter(|r| !r.is_empty()),
            token,
            top: u32::try_from(self.top).ok().filter(|&n| n > 0),
            api_version: self.api_version,
            max_title_width: self.max_title_width,
            status_timeout: Some(self.status_timeout)
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            base_url: self.base_url,
        })
    }
}

/// Parses command-line arguments and the access token into a `Config`.
///
/// The token is passed in rather than read here so callers decide where it
/// comes from. Errors are either a `clap::Error` (including help and version
/// requests) or a `UsageError`.
pub fn parse_args<I, T>(args: I, token: Option<String>) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    Ok(cli.into_config(token)?)
}
