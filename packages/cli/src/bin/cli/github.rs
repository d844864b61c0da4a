// ABOUTME: GitHub account and repository commands
// ABOUTME: Connect or disconnect the account used for sync, and browse repositories directly

use std::time::Duration;

use agentboard_cli::output::repos_table;
use agentboard_config::constants::{
    AGENTBOARD_GITHUB_API_URL, DEFAULT_GITHUB_API_URL, DEFAULT_HTTP_TIMEOUT_SECS,
};
use agentboard_core::{parse_repo_slug, CLAUDE_DIR};
use agentboard_github::GitHubClient;
use anyhow::anyhow;
use clap::Subcommand;
use colored::*;

use super::utils::ServerArgs;

#[derive(Subcommand)]
pub enum GitHubCommands {
    /// Show whether a GitHub account is connected
    Status,
    /// Store a personal access token for syncing
    Connect {
        /// Personal access token
        #[arg(long, env = "GITHUB_TOKEN")]
        github_token: String,
        /// GitHub username to display
        #[arg(long)]
        username: Option<String>,
    },
    /// Remove the stored token
    Disconnect,
}

#[derive(Subcommand)]
pub enum ReposCommands {
    /// List repositories visible to a token
    List {
        /// Also check each repository for a .claude directory
        #[arg(long)]
        check_claude: bool,
    },
    /// Show one repository
    Show {
        /// Repository as owner/repo or a GitHub URL
        repo: String,
    },
}

pub async fn handle_github_command(command: GitHubCommands, server: &ServerArgs) -> anyhow::Result<()> {
    let client = server.client()?;

    let user = match command {
        GitHubCommands::Status => client.current_user().await?,
        GitHubCommands::Connect {
            github_token,
            username,
        } => client.connect_github(username.as_deref(), &github_token).await?,
        GitHubCommands::Disconnect => client.disconnect_github().await?,
    };

    if user.github_connected {
        println!(
            "{} GitHub connected{}",
            "●".green(),
            user.github_username
                .map(|name| format!(" as {}", name))
                .unwrap_or_default()
        );
    } else {
        println!("{} GitHub not connected", "○".dimmed());
    }
    Ok(())
}

pub async fn handle_repos_command(command: ReposCommands, github_token: &str) -> anyhow::Result<()> {
    let base_url = std::env::var(AGENTBOARD_GITHUB_API_URL)
        .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string());
    let github = GitHubClient::new(base_url, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))?;

    match command {
        ReposCommands::List { check_claude } => {
            let repos = github.list_user_repos(github_token).await?;
            let mut rows = Vec::with_capacity(repos.len());

            for repo in repos {
                let has_claude = if check_claude {
                    match parse_repo_slug(&repo.full_name) {
                        Some(slug) => github
                            .has_claude_directory(github_token, &slug.owner, &slug.repo)
                            .await
                            .ok(),
                        None => None,
                    }
                } else {
                    None
                };
                rows.push((repo, has_claude));
            }

            println!("{}", repos_table(&rows));
            println!("Total: {} repositories", rows.len().to_string().cyan());
        }
        ReposCommands::Show { repo } => {
            let slug = parse_repo_slug(&repo)
                .ok_or_else(|| anyhow!("'{}' is not an owner/repo reference", repo))?;

            let info = github
                .get_repo_info(github_token, &slug.owner, &slug.repo)
                .await?
                .ok_or_else(|| anyhow!("repository {} not found", slug))?;
            let has_claude = github
                .has_claude_directory(github_token, &slug.owner, &slug.repo)
                .await?;

            println!("{}", info.full_name.blue().bold());
            if let Some(description) = info.description {
                println!("{}", description);
            }
            println!("Visibility: {}", if info.private { "private" } else { "public" });
            println!("Language:   {}", info.language.unwrap_or_else(|| "-".to_string()));
            println!(
                "{}:    {}",
                CLAUDE_DIR,
                if has_claude { "present".green() } else { "missing".yellow() }
            );
        }
    }

    Ok(())
}
