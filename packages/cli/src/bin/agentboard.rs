// ABOUTME: `agentboard` command-line entry point
// ABOUTME: Runs the API server, issues local session tokens, and drives the REST API from the terminal

use std::process;

use agentboard_auth::SessionVerifier;
use agentboard_cli::{init_tracing, run_server};
use agentboard_client::MemoryFilter;
use agentboard_config::Config;
use agentboard_core::{AgentMetricUpsert, MemoryEntryInput, ProjectCreateInput, Trend};
use agentboard_storage::DbState;
use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::json;

mod cli;

use cli::github::{handle_github_command, handle_repos_command, GitHubCommands, ReposCommands};
use cli::projects::{handle_projects_command, ProjectsCommands};
use cli::utils::ServerArgs;

#[derive(Parser)]
#[command(name = "agentboard")]
#[command(about = "Agentboard - metrics dashboard for AI coding agents")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Override AGENTBOARD_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Issue a session token signed with AGENTBOARD_IDENTITY_SECRET
    Token {
        /// Identity subject, e.g. "local|me"
        subject: String,
        #[arg(long)]
        email: String,
        /// Validity in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
    /// Create a demo project with sample metrics and memory entries
    SeedDemo {
        /// Identity subject that will own the project
        subject: String,
        #[arg(long)]
        email: String,
    },
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectsCommands),
    /// Manage the connected GitHub account
    #[command(subcommand)]
    Github(GitHubCommands),
    /// Browse GitHub repositories with a personal access token
    Repos {
        #[arg(long, env = "GITHUB_TOKEN")]
        github_token: String,
        #[command(subcommand)]
        command: ReposCommands,
    },
    /// Show agent metrics for a project
    Metrics {
        project_id: String,
    },
    /// Show the memory log for a project
    Memory {
        project_id: String,
        /// Free-text search across entity and observation
        #[arg(short, long)]
        search: Option<String>,
        /// Exact entity name
        #[arg(long)]
        entity_name: Option<String>,
        /// Exact entity type
        #[arg(long)]
        entity_type: Option<String>,
    },
    /// Follow live metrics for a project
    Watch {
        project_id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command, &cli.server).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands, server: &ServerArgs) -> anyhow::Result<()> {
    match command {
        Commands::Serve { port } => {
            let mut config = Config::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await
        }
        Commands::Token {
            subject,
            email,
            hours,
        } => {
            let config = Config::from_env()?;
            let verifier = SessionVerifier::new(&config.identity_secret)?;
            let token = verifier.issue(&subject, Some(&email), Duration::hours(hours))?;
            println!("{}", token);
            Ok(())
        }
        Commands::SeedDemo { subject, email } => seed_demo(&subject, &email).await,
        Commands::Projects(command) => handle_projects_command(command, server).await,
        Commands::Github(command) => handle_github_command(command, server).await,
        Commands::Repos {
            github_token,
            command,
        } => handle_repos_command(command, &github_token).await,
        Commands::Metrics { project_id } => cli::view::show_metrics(&project_id, server).await,
        Commands::Memory {
            project_id,
            search,
            entity_name,
            entity_type,
        } => {
            let filter = MemoryFilter {
                entity_name,
                entity_type,
            };
            cli::view::show_memory(&project_id, search.as_deref(), filter, server).await
        }
        Commands::Watch { project_id } => cli::view::watch_metrics(&project_id, server).await,
    }
}

/// Writes straight to the configured database; the server does not need to be running
async fn seed_demo(subject: &str, email: &str) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let db = DbState::init_with_path(Some(config.database_path.clone()), config.change_feed_capacity)
        .await
        .context("failed to open database")?;

    let user = db.user_storage.resolve_identity(subject, Some(email)).await?;
    let project = db
        .project_storage
        .create(
            &user.id,
            ProjectCreateInput {
                name: "Demo project".to_string(),
                github_repo: None,
            },
        )
        .await?;

    let agents = [
        ("code-reviewer", 42, 39, 48.2, Trend::Improving, json!({"style": 12, "bugs": 3})),
        ("test-runner", 120, 96, 95.0, Trend::Stable, json!({"flaky": 4})),
        ("security-auditor", 18, 7, 210.5, Trend::Regressing, json!({"secrets": 1})),
    ];

    for (name, total, passed, avg, trend, findings) in agents {
        let mut metric = AgentMetricUpsert::empty(name);
        metric.total_runs = total;
        metric.successful_runs = passed;
        metric.failed_runs = total - passed;
        metric.success_rate = passed as f64 / total as f64;
        metric.avg_duration_seconds = avg;
        metric.last_run = Some(Utc::now() - Duration::minutes(total));
        metric.findings = findings;
        metric.trend = trend;
        db.metrics_storage.upsert(&project.id, &metric).await?;
    }

    let observations = [
        ("code-reviewer", "agent", "found unused imports in src/lib.rs"),
        ("test-runner", "agent", "retried 4 flaky integration tests"),
        ("src/auth.rs", "file", "flagged by security-auditor for a hardcoded secret"),
    ];
    for (entity_name, entity_type, observation) in observations {
        db.memory_storage
            .append(
                &project.id,
                MemoryEntryInput {
                    entity_name: entity_name.to_string(),
                    entity_type: entity_type.to_string(),
                    observation: observation.to_string(),
                    metadata: None,
                },
            )
            .await?;
    }

    println!("{} {} ({})", "Seeded".green().bold(), project.name, project.id);
    println!("Owner: {} <{}>", subject, user.email);
    Ok(())
}
