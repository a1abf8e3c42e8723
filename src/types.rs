use chrono::{DateTime, Utc};
use serde::Deserialize;

// GitHub API response structures
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub language: Option<String>,
    // Empty repositories come back with a null pushed_at
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fork: bool,
    pub owner: GitHubOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// Body of `GET /search/repositories`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubRepo>,
}
