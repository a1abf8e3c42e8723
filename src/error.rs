use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubTailError {
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl GitHubTailError {
    /// Errors the process reports itself and exits on with status 1, instead of
    /// bubbling out of `main`.
    pub fn is_handled_exit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_) | Self::ConfigError(_))
    }
}

pub type Result<T> = std::result::Result<T, GitHubTailError>;
