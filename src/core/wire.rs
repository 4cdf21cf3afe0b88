//! Serde shapes for the job trigger and job result endpoints.

use serde::Deserialize;

use crate::core::models::{Criterion, RankedRecord};
use crate::format::split_coin_label;

#[derive(Deserialize)]
pub(crate) struct TriggerEnvelope {
    #[serde(alias = "jobId", alias = "event_id")]
    pub(crate) job_id: Option<String>,
    // only read to warn about mismatched echoes
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    #[serde(alias = "echoedCriterion", alias = "sort")]
    pub(crate) echoed_criterion: Option<String>,
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    #[serde(alias = "echoedLimit", alias = "limit")]
    pub(crate) echoed_limit: Option<u32>,
    #[allow(dead_code)]
    pub(crate) message: Option<String>,
}

/// Any body lacking a populated record array counts as "not ready".
#[derive(Deserialize, Default)]
pub(crate) struct ResultEnvelope {
    #[serde(default)]
    pub(crate) ready: Option<bool>,
    #[serde(alias = "records")]
    pub(crate) data: Option<Vec<WireRecord>>,
}

#[derive(Deserialize, Clone)]
pub(crate) struct WireRecord {
    #[serde(default, alias = "coin", alias = "displayName")]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) symbol: Option<String>,
    #[serde(default, alias = "formattedValue")]
    pub(crate) value: String,
    #[serde(default, alias = "criterion", alias = "original_field")]
    pub(crate) sort: Option<String>,
}

impl WireRecord {
    /// `fallback` is used when the record does not name its own criterion.
    pub(crate) fn into_record(self, fallback: &Criterion) -> RankedRecord {
        let (display_name, symbol) = match self.symbol.filter(|s| !s.trim().is_empty()) {
            Some(sym) => (self.name, sym),
            None => {
                let (name, sym) = split_coin_label(&self.name);
                (name.to_string(), sym.to_string())
            }
        };
        RankedRecord {
            display_name,
            symbol,
            formatted_value: self.value,
            criterion: self
                .sort
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| fallback.clone(), |s| Criterion::from(s.as_str())),
        }
    }
}

impl ResultEnvelope {
    /// Records if the job has finished with a non-empty result, `None` otherwise.
    pub(crate) fn into_ready_records(self, fallback: &Criterion) -> Option<Vec<RankedRecord>> {
        if self.ready == Some(false) {
            return None;
        }
        let data = self.data.filter(|d| !d.is_empty())?;
        Some(data.into_iter().map(|r| r.into_record(fallback)).collect())
    }
}
