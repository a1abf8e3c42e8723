use crate::error::{GitHubTailError, Result};
use crate::models::RateLimitState;
use crate::types::{GitHubRepo, SearchResponse};
use chrono::DateTime;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("github-tail/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(token: Option<String>, base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(GitHubClient {
            client,
            token,
            base_url,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Join path segments onto the configured base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GitHubTailError::ConfigError(format!(
                    "API URL cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a single GET. There is no retry: 403 is reported as a rate limit,
    /// every other non-success status is an error.
    async fn make_request(&self, url: Url) -> Result<Response> {
        debug!(%url, "GET");
        let mut request = self.client.get(url.clone()).header("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let rate_limit = self.get_rate_limit_state(&response);

        match response.status() {
            status if status.is_success() => {
                if rate_limit.is_low() {
                    warn!(%rate_limit, "Rate limit running low");
                }
                Ok(response)
            }
            StatusCode::FORBIDDEN => Err(GitHubTailError::RateLimitExceeded(format!(
                "{} returned 403 ({})",
                url.path(),
                rate_limit
            ))),
            StatusCode::NOT_FOUND => Err(GitHubTailError::NotFound(format!(
                "Resource not found: {}",
                url.path()
            ))),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(GitHubTailError::ApiError(format!(
                    "API request failed with status {}: {}",
                    status, error_text
                )))
            }
        }
    }

    /// Rate limit headers of a response; absent headers stay `None`.
    pub fn get_rate_limit_state(&self, response: &Response) -> RateLimitState {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned)
        };

        RateLimitState {
            remaining: header("X-RateLimit-Remaining").and_then(|s| s.parse().ok()),
            limit: header("X-RateLimit-Limit").and_then(|s| s.parse().ok()),
            reset_time: header("X-RateLimit-Reset")
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0)),
        }
    }

    /// Fetch one page of `GET /search/repositories`, newest updates first.
    pub async fn search_repositories_page(&self, query: &str, page: u32) -> Result<SearchResponse> {
        let mut url = self.endpoint(&["search", "repositories"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "updated")
            .append_pair("order", "desc")
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let response = self.make_request(url).await?;
        let body: SearchResponse = response.json().await?;
        if body.incomplete_results {
            warn!(page, "Search timed out upstream; results may be incomplete");
        }
        Ok(body)
    }

    /// Fetch one page of `GET /users/{username}/repos`, most recently updated first.
    pub async fn list_user_repos_page(&self, username: &str, page: u32) -> Result<Vec<GitHubRepo>> {
        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("direction", "desc")
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let response = self.make_request(url).await?;
        let repos: Vec<GitHubRepo> = response.json().await?;
        Ok(repos)
    }
}
