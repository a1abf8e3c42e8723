#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use github_tail::config::{FetchConfig, FetchMode, NullPolicy, SortKey};
use github_tail::error::{GitHubTailError, Result};
use github_tail::fetcher::{Page, PageSource};
use github_tail::types::GitHubRepo;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use url::Url;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Upstream-shaped repository JSON, pushed `pushed_minutes` after [`base_time`].
pub fn repo_json(id: u64, stars: u32, pushed_minutes: i64) -> Value {
    let pushed = base_time() + Duration::minutes(pushed_minutes);
    let updated = pushed + Duration::seconds(30);
    json!({
        "id": id,
        "name": format!("repo-{}", id),
        "full_name": format!("owner-{}/repo-{}", id, id),
        "html_url": format!("https://github.com/owner-{}/repo-{}", id, id),
        "description": if id % 2 == 0 { Value::Null } else { json!(format!("Repository {}", id)) },
        "stargazers_count": stars,
        "language": "Rust",
        "pushed_at": pushed.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "updated_at": updated.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "fork": false,
        "private": false,
        "owner": {
            "login": format!("owner-{}", id),
            "id": id * 10,
            "avatar_url": format!("https://avatars.githubusercontent.com/u/{}", id * 10),
            "html_url": format!("https://github.com/owner-{}", id)
        }
    })
}

pub fn raw_repo(id: u64, stars: u32, pushed_minutes: i64) -> GitHubRepo {
    serde_json::from_value(repo_json(id, stars, pushed_minutes)).expect("valid repo fixture")
}

/// `count` repos starting at id `first_id`, with push times scattered so that
/// fetch order and recency disagree.
pub fn scattered_repos(first_id: u64, count: u64) -> Vec<Value> {
    (first_id..first_id + count)
        .map(|id| repo_json(id, 50, ((id * 37) % 1000) as i64))
        .collect()
}

pub fn config(out_path: PathBuf, api_base_url: Url) -> FetchConfig {
    FetchConfig {
        mode: FetchMode::Search,
        keyword: String::new(),
        min_stars: 20,
        max_results: 50,
        out_path,
        token: None,
        username: None,
        sort_key: SortKey::PushedAt,
        null_policy: NullPolicy::Empty,
        api_base_url,
        timeout: std::time::Duration::from_secs(5),
        page_headroom: 1,
    }
}

/// In-memory page source that records which pages were asked for.
pub struct FakeSource {
    pages: Vec<Vec<GitHubRepo>>,
    total_count: Option<u64>,
    fail_on_page: Option<u32>,
    requested: Mutex<Vec<u32>>,
}

impl FakeSource {
    pub fn new(pages: Vec<Vec<GitHubRepo>>) -> Self {
        let total: u64 = pages.iter().map(|p| p.len() as u64).sum();
        Self {
            pages,
            total_count: Some(total),
            fail_on_page: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

impl PageSource for FakeSource {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        self.requested.lock().unwrap().push(page);
        if self.fail_on_page == Some(page) {
            return Err(GitHubTailError::RateLimitExceeded(format!("page {}", page)));
        }
        let items = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            items,
            total_count: self.total_count,
        })
    }
}

/// A request the mock server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Default)]
struct MockState {
    pages: Vec<Vec<Value>>,
    fail: Option<(u32, u16)>,
    requests: Vec<RecordedRequest>,
}

/// Minimal stand-in for the GitHub REST API, serving canned pages for both
/// the search and the user-repos endpoints.
#[derive(Clone, Default)]
pub struct MockGitHub {
    state: Arc<Mutex<MockState>>,
}

impl MockGitHub {
    pub fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().pages = pages;
        mock
    }

    /// Answer `page` with `status` instead of data.
    pub fn fail_page(self, page: u32, status: u16) -> Self {
        self.state.lock().unwrap().fail = Some((page, status));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/search/repositories", get(search))
            .route("/users/:username/repos", get(user_repos))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Url::parse(&format!("http://{}", addr)).expect("mock url")
    }

    fn respond(
        &self,
        path: String,
        headers: &HeaderMap,
        params: HashMap<String, String>,
        wrap: impl FnOnce(Vec<Value>, u64) -> Response,
    ) -> Response {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let page: u32 = params
            .get("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);

        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            path,
            params,
            accept: header("accept"),
            authorization: header("authorization"),
            user_agent: header("user-agent"),
        });

        if let Some((fail_page, status)) = state.fail {
            if fail_page == page {
                let status = StatusCode::from_u16(status).expect("valid status");
                return (
                    status,
                    [
                        ("X-RateLimit-Remaining", "0"),
                        ("X-RateLimit-Reset", "1717243200"),
                    ],
                    Json(json!({ "message": "API rate limit exceeded" })),
                )
                    .into_response();
            }
        }

        let total: u64 = state.pages.iter().map(|p| p.len() as u64).sum();
        let items = state
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        wrap(items, total)
    }
}

async fn search(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.respond(
        "/search/repositories".to_string(),
        &headers,
        params,
        |items, total| {
            Json(json!({
                "total_count": total,
                "incomplete_results": false,
                "items": items
            }))
            .into_response()
        },
    )
}

async fn user_repos(
    State(mock): State<MockGitHub>,
    Path(username): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.respond(
        format!("/users/{}/repos", username),
        &headers,
        params,
        |items, _| Json(Value::Array(items)).into_response(),
    )
}
