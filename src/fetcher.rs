//! Incremental fetch pipeline: paginate, normalize, select, wrap in a snapshot.

use crate::checkpoint::load_last_checkpoint;
use crate::config::{FetchConfig, FetchMode, NullPolicy, SortKey};
use crate::error::{GitHubTailError, Result};
use crate::github::{GitHubClient, PER_PAGE};
use crate::models::{Project, ProjectOwner, Snapshot, SnapshotSource};
use crate::query::{build_query, compute_query, parse_checkpoint};
use crate::types::GitHubRepo;
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::{info, warn};

/// The search API never serves more than 1000 results (10 pages of 100).
pub const MAX_PAGES: u32 = 10;

/// One page of raw records
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<GitHubRepo>,
    /// Upstream total, when the endpoint reports one
    pub total_count: Option<u64>,
}

/// Anything that can serve numbered pages of repositories, starting at 1.
pub trait PageSource {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Page>>;
}

/// `GET /search/repositories` for a fixed query
pub struct SearchSource<'a> {
    client: &'a GitHubClient,
    query: &'a str,
}

impl<'a> SearchSource<'a> {
    pub fn new(client: &'a GitHubClient, query: &'a str) -> Self {
        Self { client, query }
    }
}

impl PageSource for SearchSource<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        let response = self.client.search_repositories_page(self.query, page).await?;
        Ok(Page {
            items: response.items,
            total_count: Some(response.total_count),
        })
    }
}

/// `GET /users/{username}/repos`
pub struct UserReposSource<'a> {
    client: &'a GitHubClient,
    username: &'a str,
}

impl<'a> UserReposSource<'a> {
    pub fn new(client: &'a GitHubClient, username: &'a str) -> Self {
        Self { client, username }
    }
}

impl PageSource for UserReposSource<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        let items = self.client.list_user_repos_page(self.username, page).await?;
        Ok(Page {
            items,
            total_count: None,
        })
    }
}

/// Raw records of every page fetched, in request order
#[derive(Debug, Default)]
pub struct FetchedPages {
    pub items: Vec<GitHubRepo>,
    /// `total_count` reported by page 1
    pub total_count: Option<u64>,
    pub pages_fetched: u32,
}

/// Pages needed to cover `max_results`, plus `headroom`, capped at [`MAX_PAGES`].
pub fn page_limit(max_results: usize, headroom: u32) -> u32 {
    let needed = max_results.div_ceil(PER_PAGE as usize);
    let needed = u32::try_from(needed).unwrap_or(u32::MAX);
    needed.saturating_add(headroom).clamp(1, MAX_PAGES)
}

/// Request pages one at a time until a short page or the page limit.
///
/// The first failing page aborts the whole fetch; nothing fetched so far is
/// returned.
pub async fn fetch_pages<S: PageSource>(
    source: &S,
    max_results: usize,
    headroom: u32,
) -> Result<FetchedPages> {
    let limit = page_limit(max_results, headroom);
    let mut fetched = FetchedPages::default();

    for page in 1..=limit {
        let Page { items, total_count } = source.fetch_page(page).await?;
        let received = items.len();
        if page == 1 {
            fetched.total_count = total_count;
        }
        fetched.items.extend(items);
        fetched.pages_fetched = page;

        info!(page, limit, received, "Fetched page");

        if received < PER_PAGE as usize {
            break;
        }
    }

    Ok(fetched)
}

/// Map raw records onto the snapshot's project schema.
pub fn normalize(raw: Vec<GitHubRepo>, null_policy: NullPolicy) -> Vec<Project> {
    raw.into_iter()
        .map(|repo| {
            let description = match null_policy {
                NullPolicy::Empty => Some(repo.description.unwrap_or_default()),
                NullPolicy::Null => repo.description,
            };
            Project {
                id: repo.id,
                name: repo.name,
                full_name: repo.full_name,
                html_url: repo.html_url,
                description,
                stargazers_count: repo.stargazers_count,
                language: repo.language,
                pushed_at: repo.pushed_at,
                updated_at: repo.updated_at,
                fork: repo.fork,
                owner: ProjectOwner {
                    login: repo.owner.login,
                    avatar_url: repo.owner.avatar_url,
                    html_url: repo.owner.html_url,
                },
            }
        })
        .collect()
}

fn sort_value(project: &Project, sort_key: SortKey) -> Option<DateTime<Utc>> {
    match sort_key {
        SortKey::PushedAt => project.pushed_at,
        SortKey::UpdatedAt => project.updated_at,
    }
}

/// Newest first by `sort_key`, truncated to `max_results`.
///
/// Projects without the timestamp sort last. Ties keep fetch order.
pub fn select_top(mut projects: Vec<Project>, max_results: usize, sort_key: SortKey) -> Vec<Project> {
    projects.sort_by(|a, b| sort_value(b, sort_key).cmp(&sort_value(a, sort_key)));
    projects.truncate(max_results);
    projects
}

/// Client-side narrowing for endpoints that cannot filter themselves.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilter {
    pub min_stars: u32,
    pub pushed_after: Option<DateTime<Utc>>,
}

impl LocalFilter {
    pub fn matches(&self, repo: &GitHubRepo) -> bool {
        if repo.stargazers_count < self.min_stars {
            return false;
        }
        match self.pushed_after {
            Some(bound) => repo.pushed_at.is_some_and(|pushed| pushed > bound),
            None => true,
        }
    }
}

/// Fetch from `source` and assemble the snapshot for this run.
pub async fn build_snapshot<S: PageSource>(
    source: &S,
    config: &FetchConfig,
    query: String,
    local_filter: Option<LocalFilter>,
    now: DateTime<Utc>,
) -> Result<Snapshot> {
    let fetched = fetch_pages(source, config.max_results, config.page_headroom).await?;
    let fetched_count = fetched.items.len();

    let raw = match local_filter {
        Some(filter) => fetched
            .items
            .into_iter()
            .filter(|repo| filter.matches(repo))
            .collect(),
        None => fetched.items,
    };

    info!(
        fetched = fetched_count,
        kept = raw.len(),
        pages = fetched.pages_fetched,
        total_available = ?fetched.total_count,
        "Fetch complete"
    );

    let projects = select_top(
        normalize(raw, config.null_policy),
        config.max_results,
        config.sort_key,
    );

    let keyword = (config.mode == FetchMode::Search && !config.keyword.is_empty())
        .then(|| config.keyword.clone());
    let source_block = SnapshotSource {
        kind: config.mode.source_type(),
        query,
        keyword,
        username: match config.mode {
            FetchMode::User => config.username.clone(),
            FetchMode::Search => None,
        },
        min_stars: config.min_stars,
    };

    Ok(Snapshot::new(source_block, now, fetched.total_count, projects))
}

/// One full incremental run against GitHub. Writing the result is left to the
/// caller so a failed run never touches the previous snapshot.
pub async fn run(client: &GitHubClient, config: &FetchConfig) -> Result<Snapshot> {
    let checkpoint = load_last_checkpoint(&config.out_path);
    let pushed_after = match checkpoint.as_deref() {
        Some(raw) => {
            let parsed = parse_checkpoint(raw);
            if parsed.is_none() {
                warn!(checkpoint = raw, "Unparsable checkpoint, running a full query");
            }
            parsed
        }
        None => None,
    };
    if let Some(since) = pushed_after {
        info!(%since, "Incremental mode");
    }

    match config.mode {
        FetchMode::Search => {
            let query = compute_query(&config.keyword, config.min_stars, checkpoint.as_deref());
            info!(%query, "Searching repositories");
            let source = SearchSource::new(client, &query);
            build_snapshot(&source, config, query.clone(), None, Utc::now()).await
        }
        FetchMode::User => {
            let username = config.username.as_deref().ok_or_else(|| {
                GitHubTailError::ConfigError("user mode needs a username".to_string())
            })?;
            if !config.keyword.is_empty() {
                warn!(keyword = %config.keyword, "Keyword is ignored in user mode");
            }
            let query = build_query("", config.min_stars, pushed_after);
            info!(%username, %query, "Listing user repositories");
            let filter = LocalFilter {
                min_stars: config.min_stars,
                pushed_after,
            };
            let source = UserReposSource::new(client, username);
            build_snapshot(&source, config, query, Some(filter), Utc::now()).await
        }
    }
}
