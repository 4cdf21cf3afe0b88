//! Public client surface + builder.
//! Internals are split into `retry` (backoff policy) and `constants` (UA + endpoint paths).

mod constants;
/// Retry budget and backoff strategy used by steady-state reads.
pub mod retry;

pub use retry::{Backoff, RetryConfig};

use crate::core::services::{JobPoll, RankingService, ServiceFuture, SnapshotService};
use crate::core::wire::{ResultEnvelope, TriggerEnvelope};
use crate::core::{JobHandle, RankError, RankingRequest, net};
use crate::snapshot::Snapshot;
use constants::{
    BASE_URL_ENV, DEFAULT_API_KEY, DEFAULT_BASE_URL, HEALTH_PATH, INFO_PATH, MANUAL_TRIGGER_PATH,
    RESULTS_PATH, SNAPSHOT_PATH, TRIGGER_PATH, USER_AGENT,
};
use futures::FutureExt;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Thin wrapper that holds a configured HTTP client and the backend base URL.
#[derive(Debug, Clone)]
pub struct RankClient {
    http: Client,
    base: Url,
    api_key: String,
}

impl Default for RankClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl RankClient {
    /// Create a new builder.
    pub fn builder() -> RankClientBuilder {
        RankClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// The backend base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins the fixed `path` and then `params`, each param as one encoded segment.
    pub(crate) fn endpoint(&self, path: &str, params: &[&str]) -> Result<Url, RankError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RankError::Data(format!("base URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(path.split('/'))
            .extend(params);
        Ok(url)
    }

    pub(crate) fn snapshot_url(&self) -> Result<Url, RankError> {
        self.endpoint(SNAPSHOT_PATH, &[])
    }

    pub(crate) fn info_url(&self) -> Result<Url, RankError> {
        self.endpoint(INFO_PATH, &[])
    }

    pub(crate) fn manual_trigger_url(&self) -> Result<Url, RankError> {
        self.endpoint(MANUAL_TRIGGER_PATH, &[])
    }

    pub(crate) fn health_url(&self) -> Result<Url, RankError> {
        self.endpoint(HEALTH_PATH, &[])
    }

    /// Starts a background ranking job.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Trigger`] if the backend answers with a non-success status,
    /// the request cannot be sent, or the response carries no job id.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(criterion = %request.criterion())))]
    pub async fn trigger(&self, request: &RankingRequest) -> Result<JobHandle, RankError> {
        let limit = request.result_count().to_string();
        let mut url = self
            .endpoint(TRIGGER_PATH, &[request.criterion().as_str(), &limit])
            .map_err(|e| RankError::Trigger(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let resp = self
            .http
            .get(url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| RankError::Trigger(e.to_string()))?;
        let body = net::get_text(resp, &url, "trigger")
            .await
            .map_err(|e| RankError::Trigger(e.to_string()))?;

        let env: TriggerEnvelope = serde_json::from_str(&body)
            .map_err(|e| RankError::Trigger(format!("undecodable trigger response: {e}")))?;
        let job_id = env
            .job_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| RankError::Trigger("response lacks a job id".into()))?;

        #[cfg(feature = "tracing")]
        if env.echoed_criterion.as_deref().is_some_and(|c| c != request.criterion().as_str())
            || env.echoed_limit.is_some_and(|l| l != request.result_count())
        {
            tracing::warn!(
                job_id = %job_id,
                echoed_criterion = ?env.echoed_criterion,
                echoed_limit = ?env.echoed_limit,
                "backend echoed different job parameters"
            );
        }

        Ok(JobHandle::new(job_id, request.clone()))
    }

    /// Looks once at a job's result endpoint.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses, and bodies that are not JSON.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(job = %job)))]
    pub async fn job_result(&self, job: &JobHandle) -> Result<JobPoll, RankError> {
        let url = self.endpoint(RESULTS_PATH, &[job.id()])?;
        let resp = self
            .http
            .get(url.clone())
            .header("accept", "application/json")
            .send()
            .await?;
        let body = net::get_text(resp, &url, "results").await?;
        let env: ResultEnvelope = serde_json::from_str(&body)?;

        Ok(env
            .into_ready_records(job.request().criterion())
            .map_or(JobPoll::Pending, JobPoll::Ready))
    }
}

impl RankingService for RankClient {
    fn trigger_job<'a>(&'a self, request: &'a RankingRequest) -> ServiceFuture<'a, JobHandle> {
        self.trigger(request).boxed()
    }

    fn fetch_job_result<'a>(&'a self, job: &'a JobHandle) -> ServiceFuture<'a, JobPoll> {
        self.job_result(job).boxed()
    }
}

impl SnapshotService for RankClient {
    fn fetch_snapshot(&self) -> ServiceFuture<'_, Snapshot> {
        crate::snapshot::api::fetch_snapshot(self).boxed()
    }

    fn request_refresh(&self) -> ServiceFuture<'_, ()> {
        crate::snapshot::api::request_refresh(self).boxed()
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`RankClient`].
#[derive(Debug, Default)]
pub struct RankClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl RankClientBuilder {
    /// Start from the environment: `CRYPTORANK_API_URL` sets the base URL when present.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Url`] if the variable is set but not a valid URL.
    pub fn from_env() -> Result<Self, RankError> {
        let mut builder = Self::default();
        if let Ok(raw) = std::env::var(BASE_URL_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                builder.base_url = Some(Url::parse(trimmed)?);
            }
        }
        Ok(builder)
    }

    /// Override the backend base URL (e.g. a mock server in tests).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Key sent with trigger requests. Default: `demo`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails if the default base URL cannot be parsed or the HTTP client cannot be built.
    pub fn build(self) -> Result<RankClient, RankError> {
        let base = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        Ok(RankClient {
            http: httpb.build()?,
            base,
            api_key: self.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
        })
    }
}
