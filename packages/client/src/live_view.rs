// ABOUTME: Client-side view of one project's agent metrics
// ABOUTME: Seeded from a full read, then kept current by applying change events

use agentboard_core::{AgentMetric, MetricChange};

/// Metrics for a single project, always ordered by agent name
#[derive(Debug, Clone, Default)]
pub struct LiveMetricsView {
    project_id: String,
    metrics: Vec<AgentMetric>,
}

impl LiveMetricsView {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            metrics: Vec::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn metrics(&self) -> &[AgentMetric] {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Replace the view with a fresh full read
    pub fn seed(&mut self, metrics: Vec<AgentMetric>) {
        self.metrics = metrics
            .into_iter()
            .filter(|m| m.project_id == self.project_id)
            .collect();
        self.sort();
    }

    /// Apply one change; returns whether the view changed
    pub fn apply(&mut self, change: &MetricChange) -> bool {
        if change.project_id() != self.project_id {
            return false;
        }

        match change {
            MetricChange::Insert { record } | MetricChange::Update { record } => {
                self.upsert(record.clone());
                true
            }
            MetricChange::Delete { id, .. } => {
                let before = self.metrics.len();
                self.metrics.retain(|m| &m.id != id);
                self.metrics.len() != before
            }
        }
    }

    fn upsert(&mut self, record: AgentMetric) {
        match self.metrics.iter_mut().find(|m| m.id == record.id) {
            Some(existing) => *existing = record,
            None => self.metrics.push(record),
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.metrics.sort_by(|a, b| a.agent_name.cmp(&b.agent_name));
    }
}
