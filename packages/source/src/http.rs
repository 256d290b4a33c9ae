//! Single-attempt HTTP helpers shared by the provider clients.
//!
//! Fetches are not retried: a failed request aborts the run
//! for the selected region and the user retries the whole operation.
//!
//! ```ignore
//! let body = http::send_json(client.get(&url).query(&params)).await?;
//! ```

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Final request URL.
        url: String,
    },

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    /// Maps the error into the climate stage's taxonomy: an unparseable
    /// body is a parse error, anything else a fetch error.
    #[must_use]
    pub fn into_climate_error(self) -> SourceError {
        match self {
            Self::Json(e) => SourceError::ClimateParse {
                message: format!("response is not JSON: {e}"),
            },
            other => SourceError::ClimateFetch(other),
        }
    }
}

/// Sends a request once and parses the response body as JSON.
///
/// # Errors
///
/// Returns [`HttpError::Request`] on connection/timeout/body errors,
/// [`HttpError::Status`] for any non-2xx status and [`HttpError::Json`]
/// if the body is not JSON.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, HttpError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();
    log::debug!("{status} {url}");

    if !status.is_success() {
        return Err(HttpError::Status { status, url });
    }

    let text = response.text().await?;
    log::debug!("Received {} bytes from {url}", text.len());

    decode_body(&url, status, &text)
}

/// Parses a response body, logging a preview of it on failure.
fn decode_body(
    url: &str,
    status: reqwest::StatusCode,
    text: &str,
) -> Result<serde_json::Value, HttpError> {
    serde_json::from_str(text).map_err(|e| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {}",
            text.len(),
            preview(text),
        );
        HttpError::Json(e)
    })
}

/// Truncates `text` to at most [`BODY_PREVIEW_LEN`] bytes on a character
/// boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
