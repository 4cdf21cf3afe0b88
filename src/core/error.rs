use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// The job-polling path never hands [`RankError::PollTransient`] to callers: those are
/// absorbed by the poll loop and counted against its transport-error budget. Exhaustion
/// of a poll budget is not an error at all (see [`crate::jobs::ExhaustReason`]).
#[derive(Debug, Error)]
pub enum RankError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The resource does not exist yet (the backend has not collected any data).
    #[error("Not found at {url}: {message}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
        /// Server-provided explanation, or a default hint.
        message: String,
    },

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// A request was rejected before any network call (e.g. result count outside `1..=100`).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Triggering a background job failed. Terminal for this attempt; a fresh trigger is required.
    #[error("job trigger failed: {0}")]
    Trigger(String),

    /// A single poll attempt failed at the transport level.
    #[error("poll attempt {attempt} failed: {message}")]
    PollTransient {
        /// 1-based attempt number.
        attempt: u32,
        /// Description of the underlying failure.
        message: String,
    },

    /// A steady-state read failed after its retry budget was consumed.
    #[error("fetch failed after {attempts} attempts: {message}")]
    CacheFetch {
        /// How many attempts were made.
        attempts: u32,
        /// Description of the last failure.
        message: String,
    },

    /// The operation was superseded by a newer trigger.
    #[error("operation cancelled by a newer request")]
    Cancelled,
}

impl RankError {
    /// Maps a non-success HTTP status to the most specific variant.
    pub(crate) fn from_status(status: u16, url: &url::Url, body: &str) -> Self {
        let url = url.to_string();
        match status {
            404 => RankError::NotFound {
                url,
                message: not_found_message(body),
            },
            _ => RankError::Status { status, url },
        }
    }
}

fn not_found_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(e),
            message: Some(m),
        }) => format!("{e}. {m}"),
        Ok(ErrorBody { error: Some(e), .. }) => e,
        Ok(ErrorBody {
            message: Some(m), ..
        }) => m,
        _ => "no data available yet".to_string(),
    }
}
