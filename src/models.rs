use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized repository record written to the snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub language: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fork: bool,
    pub owner: ProjectOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectOwner {
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

/// Which upstream endpoint produced a snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    GithubSearch,
    GithubUserRepos,
}

/// Provenance block of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSource {
    #[serde(rename = "type")]
    pub kind: SourceType,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub min_stars: u32,
}

/// The JSON document persisted at the end of every run.
///
/// Fields are private so `count` can only ever be derived from `projects`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    source: SnapshotSource,
    last_updated: DateTime<Utc>,
    count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_available: Option<u64>,
    projects: Vec<Project>,
}

impl Snapshot {
    pub fn new(
        source: SnapshotSource,
        last_updated: DateTime<Utc>,
        total_available: Option<u64>,
        projects: Vec<Project>,
    ) -> Self {
        Self {
            source,
            last_updated,
            count: projects.len(),
            total_available,
            projects,
        }
    }

    pub fn source(&self) -> &SnapshotSource {
        &self.source
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total_available(&self) -> Option<u64> {
        self.total_available
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

/// Rate limit state reported by the last response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: Option<u32>,
    pub limit: Option<u32>,
    pub reset_time: Option<DateTime<Utc>>,
}

impl RateLimitState {
    pub fn is_low(&self) -> bool {
        matches!(self.remaining, Some(remaining) if remaining < 10)
    }
}

impl std::fmt::Display for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let remaining = self
            .remaining
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        let reset = self
            .reset_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "?".to_string());
        write!(f, "remaining: {}, reset: {}", remaining, reset)
    }
}
