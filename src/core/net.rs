use url::Url;

use crate::core::RankError;

/// Read the response body as text, mapping non-success statuses to a [`RankError`].
///
/// `endpoint` only labels log events.
pub(crate) async fn get_text(
    resp: reqwest::Response,
    url: &Url,
    _endpoint: &str,
) -> Result<String, RankError> {
    let status = resp.status();
    let text = resp.text().await?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        endpoint = _endpoint,
        status = status.as_u16(),
        bytes = text.len(),
        "response received"
    );

    if !status.is_success() {
        return Err(RankError::from_status(status.as_u16(), url, &text));
    }
    Ok(text)
}
