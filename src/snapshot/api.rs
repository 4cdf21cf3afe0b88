use crate::core::{RankClient, RankError, net};

use super::model::{HealthStatus, MetricInfo, Snapshot};
use super::wire::{HealthEnvelope, InfoEnvelope, SnapshotEnvelope};

pub(crate) async fn fetch_snapshot(client: &RankClient) -> Result<Snapshot, RankError> {
    let url = client.snapshot_url()?;
    let resp = client
        .http()
        .get(url.clone())
        .header("accept", "application/json")
        .send()
        .await?;
    let body = net::get_text(resp, &url, "snapshot").await?;
    let env: SnapshotEnvelope = serde_json::from_str(&body)?;
    Snapshot::try_from(env)
}

pub(crate) async fn request_refresh(client: &RankClient) -> Result<(), RankError> {
    let url = client.manual_trigger_url()?;
    let resp = client.http().post(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(RankError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}

pub(crate) async fn fetch_metric_catalog(client: &RankClient) -> Result<Vec<MetricInfo>, RankError> {
    let url = client.info_url()?;
    let resp = client
        .http()
        .get(url.clone())
        .header("accept", "application/json")
        .send()
        .await?;
    let body = net::get_text(resp, &url, "info").await?;
    let env: InfoEnvelope = serde_json::from_str(&body)?;
    Ok(env.into_catalog())
}

pub(crate) async fn fetch_health(client: &RankClient) -> Result<HealthStatus, RankError> {
    let url = client.health_url()?;
    let resp = client.http().get(url.clone()).send().await?;
    let body = net::get_text(resp, &url, "health").await?;
    let env: HealthEnvelope = serde_json::from_str(&body)?;
    Ok(env.into())
}
