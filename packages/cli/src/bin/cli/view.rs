// ABOUTME: Read-only dashboard views in the terminal
// ABOUTME: Metrics snapshot, memory log search, and a live-updating metrics watch

use agentboard_cli::output::{memory_table, metrics_summary, metrics_table};
use agentboard_client::{
    filter_memories, subscribe_metrics, ConnectionStatus, MemoryFilter, ReconnectPolicy,
};
use colored::*;

use super::utils::ServerArgs;

pub async fn show_metrics(project_id: &str, server: &ServerArgs) -> anyhow::Result<()> {
    let client = server.client()?;
    let metrics = client.list_metrics(project_id).await?;

    if metrics.is_empty() {
        println!("{}", "No agent metrics yet".yellow());
        println!("{}", "Run 'agentboard projects sync <id>' to pull them from GitHub".dimmed());
        return Ok(());
    }

    println!("{}", metrics_summary(&metrics));
    println!("{}", metrics_table(&metrics));
    Ok(())
}

pub async fn show_memory(
    project_id: &str,
    search: Option<&str>,
    filter: MemoryFilter,
    server: &ServerArgs,
) -> anyhow::Result<()> {
    let client = server.client()?;
    let entries = client.list_memories(project_id, &filter).await?;
    let matched = filter_memories(&entries, search.unwrap_or_default());

    if matched.is_empty() {
        println!("{}", "No memory entries match".yellow());
        return Ok(());
    }

    println!("{}", memory_table(&matched));
    println!("Showing {} of {} entries", matched.len().to_string().cyan(), entries.len());
    Ok(())
}

/// Redraw the metrics table whenever the live view changes, until Ctrl-C
pub async fn watch_metrics(project_id: &str, server: &ServerArgs) -> anyhow::Result<()> {
    let client = server.client()?;
    let subscription = subscribe_metrics(client, project_id, ReconnectPolicy::default());
    let mut snapshots = subscription.snapshots();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        let snapshot = snapshots.borrow_and_update().clone();
        // Clear screen and home the cursor
        print!("\x1b[2J\x1b[H");

        match &snapshot.status {
            ConnectionStatus::Connecting => println!("{}", "connecting...".dimmed()),
            ConnectionStatus::Live => println!("{} {}", "●".green(), "live".green()),
            ConnectionStatus::Reconnecting { attempt } => {
                println!("{} reconnecting (attempt {})", "●".yellow(), attempt)
            }
            ConnectionStatus::Ended(reason) => {
                subscription.close();
                anyhow::bail!("live metrics ended: {}", reason);
            }
        }

        println!("{}", metrics_summary(&snapshot.metrics));
        println!("{}", metrics_table(&snapshot.metrics));
    }

    subscription.close();
    Ok(())
}
