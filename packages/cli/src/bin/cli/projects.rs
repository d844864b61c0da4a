// ABOUTME: Project management commands backed by the REST API
// ABOUTME: List, add, delete, and sync projects for the signed-in user

use agentboard_cli::output::{metrics_summary, projects_table};
use clap::Subcommand;
use colored::*;

use super::utils::ServerArgs;

#[derive(Subcommand)]
pub enum ProjectsCommands {
    /// List your projects
    List,
    /// Add a new project
    Add {
        /// Project name
        #[arg(short, long)]
        name: String,
        /// GitHub repository as owner/repo
        #[arg(short, long)]
        repo: Option<String>,
    },
    /// Delete a project and its metrics
    Delete {
        /// Project ID to delete
        id: String,
    },
    /// Pull the latest agent metrics from GitHub
    Sync {
        /// Project ID to sync
        id: String,
    },
}

pub async fn handle_projects_command(command: ProjectsCommands, server: &ServerArgs) -> anyhow::Result<()> {
    let client = server.client()?;

    match command {
        ProjectsCommands::List => {
            let projects = client.list_projects().await?;
            if projects.is_empty() {
                println!("{}", "No projects found".yellow());
                println!("{}", "Use 'agentboard projects add' to create your first project".dimmed());
                return Ok(());
            }

            println!("{}", projects_table(&projects));
            println!("Total: {} projects", projects.len().to_string().cyan());
        }
        ProjectsCommands::Add { name, repo } => {
            let project = client.create_project(&name, repo.as_deref()).await?;
            println!("{} {} ({})", "Created".green().bold(), project.name, project.id);
        }
        ProjectsCommands::Delete { id } => {
            client.delete_project(&id).await?;
            println!("{} project {}", "Deleted".green().bold(), id);
        }
        ProjectsCommands::Sync { id } => {
            let summary = client.sync_project(&id).await?;
            println!(
                "{} {}/{} agents at {}",
                "Synced".green().bold(),
                summary.synced_agents,
                summary.total_agents,
                summary.last_synced_at.format("%Y-%m-%d %H:%M:%S")
            );

            for error in summary.errors.unwrap_or_default() {
                println!("  {} {}", "skipped".yellow(), error);
            }

            let metrics = client.list_metrics(&id).await?;
            println!("{}", metrics_summary(&metrics));
        }
    }

    Ok(())
}
