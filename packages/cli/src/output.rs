// ABOUTME: Terminal rendering for CLI commands
// ABOUTME: comfy-table layouts for projects, metrics, memory entries, and repositories

use agentboard_core::{
    format_duration, format_percentage, truncate, AgentMetric, MemoryEntry, Project, SuccessBand,
};
use agentboard_github::RepoSummary;
use chrono::{DateTime, Utc};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn optional_date(at: Option<&DateTime<Utc>>) -> String {
    at.map(format_date).unwrap_or_else(|| "never".to_string())
}

pub fn projects_table(projects: &[Project]) -> Table {
    let mut table = new_table(vec!["ID", "Name", "Repository", "Last synced", "Created"]);
    for project in projects {
        table.add_row(vec![
            project.id.clone(),
            truncate(&project.name, 30),
            project.github_repo.clone().unwrap_or_else(|| "-".to_string()),
            optional_date(project.last_synced_at.as_ref()),
            format_date(&project.created_at),
        ]);
    }
    table
}

fn band_color(band: SuccessBand) -> Color {
    match band {
        SuccessBand::Healthy => Color::Green,
        SuccessBand::Degraded => Color::Yellow,
        SuccessBand::Failing => Color::Red,
    }
}

pub fn metrics_table(metrics: &[AgentMetric]) -> Table {
    let mut table = new_table(vec![
        "Agent", "Runs", "Passed", "Failed", "Success", "Avg duration", "Trend", "Last run",
    ]);
    for metric in metrics {
        let band = SuccessBand::from_rate(metric.success_rate);
        table.add_row(vec![
            Cell::new(&metric.agent_name),
            Cell::new(metric.total_runs),
            Cell::new(metric.successful_runs),
            Cell::new(metric.failed_runs),
            Cell::new(format_percentage(metric.success_rate)).fg(band_color(band)),
            Cell::new(format_duration(metric.avg_duration_seconds)),
            Cell::new(format!("{} {}", metric.trend.symbol(), metric.trend.as_str())),
            Cell::new(optional_date(metric.last_run.as_ref())),
        ]);
    }
    table
}

pub fn memory_table(entries: &[&MemoryEntry]) -> Table {
    let mut table = new_table(vec!["When", "Entity", "Type", "Observation"]);
    for entry in entries {
        table.add_row(vec![
            format_date(&entry.created_at),
            truncate(&entry.entity_name, 30),
            entry.entity_type.clone(),
            truncate(&entry.observation, 80),
        ]);
    }
    table
}

pub fn repos_table(repos: &[(RepoSummary, Option<bool>)]) -> Table {
    let mut header = vec!["Repository", "Visibility", "Updated"];
    let checked = repos.iter().any(|(_, has_claude)| has_claude.is_some());
    if checked {
        header.push(".claude");
    }

    let mut table = new_table(header);
    for (repo, has_claude) in repos {
        let mut row = vec![
            repo.full_name.clone(),
            if repo.private { "private" } else { "public" }.to_string(),
            repo.updated_at.clone().unwrap_or_else(|| "-".to_string()),
        ];
        if checked {
            row.push(match has_claude {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "?".to_string(),
            });
        }
        table.add_row(row);
    }
    table
}

/// One-line summary shown above a metrics table
pub fn metrics_summary(metrics: &[AgentMetric]) -> String {
    let runs: i64 = metrics.iter().map(|m| m.total_runs).sum();
    let passed: i64 = metrics.iter().map(|m| m.successful_runs).sum();
    let rate = if runs > 0 { passed as f64 / runs as f64 } else { 0.0 };

    format!(
        "{} agents, {} runs, {} overall success",
        metrics.len().to_string().cyan(),
        runs.to_string().cyan(),
        format_percentage(rate).cyan()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentboard_core::Trend;
    use serde_json::json;

    fn metric(name: &str, total: i64, passed: i64) -> AgentMetric {
        AgentMetric {
            id: name.to_string(),
            project_id: "p".to_string(),
            agent_name: name.to_string(),
            total_runs: total,
            successful_runs: passed,
            failed_runs: total - passed,
            success_rate: if total > 0 { passed as f64 / total as f64 } else { 0.0 },
            avg_duration_seconds: 75.0,
            last_run: None,
            findings: json!({}),
            trend: Trend::Improving,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_metrics_table_renders_rows() {
        let rendered = metrics_table(&[metric("reviewer", 10, 9)]).to_string();
        assert!(rendered.contains("reviewer"));
        assert!(rendered.contains("90.0%"));
        assert!(rendered.contains("1m 15.0s"));
        assert!(rendered.contains("never"));
    }

    #[test]
    fn test_metrics_summary_totals() {
        colored::control::set_override(false);
        let summary = metrics_summary(&[metric("a", 4, 2), metric("b", 6, 6)]);
        assert_eq!(summary, "2 agents, 10 runs, 80.0% overall success");
    }

    #[test]
    fn test_repos_table_claude_column_only_when_checked() {
        let repo = RepoSummary {
            name: "widgets".to_string(),
            full_name: "octo/widgets".to_string(),
            private: true,
            description: None,
            html_url: None,
            updated_at: None,
        };

        let plain = repos_table(&[(repo.clone(), None)]).to_string();
        assert!(!plain.contains(".claude"));

        let checked = repos_table(&[(repo, Some(true))]).to_string();
        assert!(checked.contains(".claude"));
        assert!(checked.contains("private"));
    }
}
