use crate::cli::Cli;
use crate::error::{GitHubTailError, Result};
use crate::models::SourceType;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const SEARCH_DEFAULT_MIN_STARS: u32 = 20;
const USER_DEFAULT_MIN_STARS: u32 = 10;

/// Upstream endpoint a run reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// `GET /search/repositories`
    Search,
    /// `GET /users/{username}/repos`
    User,
}

/// Timestamp field projects are ordered by, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[value(name = "pushed_at")]
    PushedAt,
    #[value(name = "updated_at")]
    UpdatedAt,
}

/// What a missing upstream description becomes in the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Written as `""`
    Empty,
    /// Written as `null`
    Null,
}

impl FetchMode {
    pub fn default_min_stars(self) -> u32 {
        match self {
            FetchMode::Search => SEARCH_DEFAULT_MIN_STARS,
            FetchMode::User => USER_DEFAULT_MIN_STARS,
        }
    }

    pub fn default_sort_key(self) -> SortKey {
        match self {
            FetchMode::Search => SortKey::PushedAt,
            FetchMode::User => SortKey::UpdatedAt,
        }
    }

    pub fn default_null_policy(self) -> NullPolicy {
        match self {
            FetchMode::Search => NullPolicy::Empty,
            FetchMode::User => NullPolicy::Null,
        }
    }

    pub fn source_type(self) -> SourceType {
        match self {
            FetchMode::Search => SourceType::GithubSearch,
            FetchMode::User => SourceType::GithubUserRepos,
        }
    }
}

/// Everything a run needs, resolved once at process start
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub mode: FetchMode,
    pub keyword: String,
    pub min_stars: u32,
    pub max_results: usize,
    pub out_path: PathBuf,
    pub token: Option<String>,
    pub username: Option<String>,
    pub sort_key: SortKey,
    pub null_policy: NullPolicy,
    pub api_base_url: Url,
    pub timeout: Duration,
    pub page_headroom: u32,
}

impl FetchConfig {
    /// Validate CLI/env input and fill in the mode-dependent defaults.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.max_results == 0 {
            return Err(GitHubTailError::ConfigError(
                "max-results must be greater than zero".to_string(),
            ));
        }

        let username = cli
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        if cli.mode == FetchMode::User && username.is_none() {
            return Err(GitHubTailError::ConfigError(
                "GITHUB_USERNAME (or --username) is required in user mode".to_string(),
            ));
        }

        let api_base_url = Url::parse(&cli.api_url)?;
        if api_base_url.cannot_be_a_base() {
            return Err(GitHubTailError::ConfigError(format!(
                "API URL cannot be used as a base: {}",
                cli.api_url
            )));
        }

        let token = cli
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(FetchConfig {
            mode: cli.mode,
            keyword: cli.keyword.trim().to_string(),
            min_stars: cli.min_stars.unwrap_or_else(|| cli.mode.default_min_stars()),
            max_results: cli.max_results,
            out_path: cli.out_path,
            token,
            username,
            sort_key: cli.sort_key.unwrap_or_else(|| cli.mode.default_sort_key()),
            null_policy: cli
                .null_policy
                .unwrap_or_else(|| cli.mode.default_null_policy()),
            api_base_url,
            timeout: Duration::from_secs(cli.timeout_secs),
            page_headroom: cli.page_headroom,
        })
    }
}
