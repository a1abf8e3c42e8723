use clap::Parser;
use colored::*;
use github_tail::cli::Cli;
use github_tail::config::{FetchConfig, FetchMode};
use github_tail::error::{GitHubTailError, Result};
use github_tail::fetcher;
use github_tail::github::GitHubClient;
use github_tail::snapshot;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match FetchConfig::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    print_banner(&config);

    let client = GitHubClient::new(
        config.token.clone(),
        config.api_base_url.clone(),
        config.timeout,
    )?;

    let snapshot = match fetcher::run(&client, &config).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_handled_exit() => exit_with(&e),
        Err(e) => return Err(e),
    };

    snapshot::persist(&snapshot, &config.out_path)?;

    eprintln!(
        "\n{} Saved {} projects → {}",
        "✅".green(),
        snapshot.count(),
        config.out_path.display()
    );

    Ok(())
}

fn print_banner(config: &FetchConfig) {
    eprintln!("{}", "GitHub Tail".bold().green());
    eprintln!("{}", "=".repeat(50).dimmed());
    match config.mode {
        FetchMode::Search => {
            let keyword = if config.keyword.is_empty() {
                "none"
            } else {
                config.keyword.as_str()
            };
            eprintln!("Keyword      → {}", keyword);
        }
        FetchMode::User => {
            eprintln!("User         → {}", config.username.as_deref().unwrap_or("?"));
        }
    }
    eprintln!("Min stars    → {}", config.min_stars);
    eprintln!("Max results  → {}", config.max_results);
    eprintln!("Output       → {}", config.out_path.display());
    let token = if config.token.is_some() {
        "provided".green()
    } else {
        "not provided".yellow()
    };
    eprintln!("Token        → {}", token);
    eprintln!("{}", "=".repeat(50).dimmed());
}

fn exit_with(error: &GitHubTailError) -> ! {
    eprintln!("{} {}", "❌".red(), error.to_string().red());
    if let GitHubTailError::RateLimitExceeded(_) = error {
        eprintln!(
            "{}",
            "Supply a token with --token or GH_API_TOKEN, or retry after the reset time.".yellow()
        );
    }
    std::process::exit(1);
}
