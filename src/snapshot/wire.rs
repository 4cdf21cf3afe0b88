use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::wire::WireRecord;
use crate::core::{Criterion, Priority, RankError};

use super::model::{AggregateStats, HealthStatus, MetricInfo, MetricResult, Snapshot};

#[derive(Deserialize)]
pub(crate) struct SnapshotEnvelope {
    pub(crate) timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "perCriterionResults")]
    pub(crate) all_metrics: HashMap<String, WireMetric>,
    #[serde(default, alias = "aggregateStats")]
    pub(crate) fetch_stats: WireStats,
}

#[derive(Deserialize)]
pub(crate) struct WireMetric {
    pub(crate) name: Option<String>,
    pub(crate) priority: Option<Priority>,
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default, alias = "records")]
    pub(crate) all_data: Option<Vec<WireRecord>>,
    #[serde(default, alias = "fetchDurationMs")]
    pub(crate) fetch_time_ms: u64,
    #[serde(alias = "errorMessage")]
    pub(crate) error: Option<String>,
}

#[derive(Deserialize, Default)]
pub(crate) struct WireStats {
    #[serde(default, alias = "totalDurationMs")]
    pub(crate) total_duration_ms: u64,
    #[serde(default, alias = "successCount")]
    pub(crate) successful_fetches: u32,
    #[serde(default, alias = "failureCount")]
    pub(crate) failed_fetches: u32,
    pub(crate) last_update: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct InfoEnvelope {
    #[serde(default)]
    pub(crate) metrics: HashMap<String, WireMetricInfo>,
}

#[derive(Deserialize)]
pub(crate) struct WireMetricInfo {
    pub(crate) name: Option<String>,
    pub(crate) priority: Option<Priority>,
    pub(crate) description: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct HealthEnvelope {
    #[serde(default)]
    pub(crate) status: String,
    pub(crate) redis: Option<bool>,
}

impl TryFrom<SnapshotEnvelope> for Snapshot {
    type Error = RankError;

    fn try_from(env: SnapshotEnvelope) -> Result<Self, Self::Error> {
        let timestamp = env
            .timestamp
            .ok_or_else(|| RankError::Data("snapshot lacks a timestamp".into()))?;

        let results = env
            .all_metrics
            .into_iter()
            .map(|(key, m)| {
                let criterion = Criterion::from(key.as_str());
                let records = m
                    .all_data
                    .unwrap_or_default()
                    .into_iter()
                    .map(|r| r.into_record(&criterion))
                    .collect();
                let result = MetricResult {
                    name: m.name.unwrap_or_else(|| criterion.label().to_string()),
                    priority: m.priority.unwrap_or_else(|| criterion.default_priority()),
                    description: m.description.unwrap_or_default(),
                    success: m.success,
                    records,
                    error_message: m.error.filter(|e| !e.is_empty()),
                    fetch_duration_ms: m.fetch_time_ms,
                };
                (criterion, result)
            })
            .collect();

        Ok(Snapshot {
            timestamp,
            results,
            stats: AggregateStats {
                success_count: env.fetch_stats.successful_fetches,
                failure_count: env.fetch_stats.failed_fetches,
                total_duration_ms: env.fetch_stats.total_duration_ms,
                last_update: env.fetch_stats.last_update.filter(|s| !s.is_empty()),
            },
        })
    }
}

impl InfoEnvelope {
    pub(crate) fn into_catalog(self) -> Vec<MetricInfo> {
        let mut out: Vec<MetricInfo> = self
            .metrics
            .into_iter()
            .map(|(key, m)| {
                let criterion = Criterion::from(key.as_str());
                MetricInfo {
                    name: m.name.unwrap_or_else(|| criterion.label().to_string()),
                    priority: m.priority.unwrap_or_else(|| criterion.default_priority()),
                    description: m.description.unwrap_or_default(),
                    criterion,
                }
            })
            .collect();
        out.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.criterion.as_str().cmp(b.criterion.as_str()))
        });
        out
    }
}

impl From<HealthEnvelope> for HealthStatus {
    fn from(h: HealthEnvelope) -> Self {
        HealthStatus {
            status: h.status,
            store_connected: h.redis,
        }
    }
}
