use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Criterion, Priority, RankedRecord};

/// The backend's aggregated multi-metric snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the backend finished collecting this snapshot.
    pub timestamp: DateTime<Utc>,
    /// One result per collected criterion.
    pub results: HashMap<Criterion, MetricResult>,
    /// Totals across all criteria.
    pub stats: AggregateStats,
}

impl Snapshot {
    /// Result for one criterion.
    pub fn get(&self, criterion: &Criterion) -> Option<&MetricResult> {
        self.results.get(criterion)
    }

    /// Number of criteria in the snapshot.
    pub fn total_metrics(&self) -> usize {
        self.results.len()
    }

    /// Metrics ordered high → medium → low priority, then by criterion name.
    pub fn metrics_by_priority(&self) -> Vec<(&Criterion, &MetricResult)> {
        let mut out: Vec<_> = self.results.iter().collect();
        out.sort_by(|(ca, a), (cb, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| ca.as_str().cmp(cb.as_str()))
        });
        out
    }
}

/// Outcome of collecting one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Display name, e.g. `Market Cap`.
    pub name: String,
    /// Display priority.
    pub priority: Priority,
    /// One-line description.
    pub description: String,
    /// Whether collection succeeded.
    pub success: bool,
    /// Ranked rows, empty on failure.
    pub records: Vec<RankedRecord>,
    /// Backend error text when `success` is false.
    pub error_message: Option<String>,
    /// Time the backend spent on this criterion.
    pub fetch_duration_ms: u64,
}

impl MetricResult {
    /// The first `n` records (the whole list if shorter).
    pub fn preview(&self, n: usize) -> &[RankedRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

/// Totals across one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Criteria collected successfully.
    pub success_count: u32,
    /// Criteria that failed.
    pub failure_count: u32,
    /// Wall time of the whole collection run.
    pub total_duration_ms: u64,
    /// Backend's own "last update" label, if it sent one.
    pub last_update: Option<String>,
}

/// Catalog entry describing one metric the backend collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInfo {
    /// The metric's criterion.
    pub criterion: Criterion,
    /// Display name.
    pub name: String,
    /// Display priority.
    pub priority: Priority,
    /// One-line description.
    pub description: String,
}

/// Backend liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when the backend is up.
    pub status: String,
    /// Whether the backend's store is connected, when reported.
    pub store_connected: Option<bool>,
}

impl HealthStatus {
    /// Whether the backend reported itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
