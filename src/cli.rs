use crate::config::{FetchMode, NullPolicy, SortKey};
use crate::github::API_BASE_URL;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "github-tail")]
#[command(about = "Fetches recently pushed GitHub repositories and writes a JSON snapshot")]
#[command(version)]
pub struct Cli {
    /// Search keyword placed in front of the star qualifier
    #[arg(short = 'k', long, env = "GITHUB_KEYWORD", default_value = "")]
    pub keyword: String,

    /// Maximum number of projects kept in the snapshot
    #[arg(long, env = "MAX_RESULTS", default_value_t = 50)]
    pub max_results: usize,

    /// Minimum star count (defaults to 20 in search mode, 10 in user mode)
    #[arg(long, env = "MIN_STARS")]
    pub min_stars: Option<u32>,

    /// Snapshot output path
    #[arg(long = "out", env = "OUT_PATH", default_value = "data/projects.json")]
    pub out_path: PathBuf,

    /// GitHub API token sent as a bearer credential
    #[arg(long, env = "GH_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account whose repositories are listed in user mode
    #[arg(long, env = "GITHUB_USERNAME")]
    pub username: Option<String>,

    /// Upstream endpoint to read from
    #[arg(long, env = "FETCH_MODE", value_enum, default_value_t = FetchMode::Search)]
    pub mode: FetchMode,

    /// Timestamp the snapshot is ordered by
    #[arg(long, env = "SORT_KEY", value_enum)]
    pub sort_key: Option<SortKey>,

    /// How a missing repository description is written
    #[arg(long = "null-description", env = "NULL_DESCRIPTION", value_enum)]
    pub null_policy: Option<NullPolicy>,

    /// GitHub REST API base URL
    #[arg(long = "api-url", env = "GITHUB_API_URL", default_value = API_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Extra pages fetched beyond what max-results strictly needs
    #[arg(long, env = "PAGE_HEADROOM", default_value_t = 1)]
    pub page_headroom: u32,
}
