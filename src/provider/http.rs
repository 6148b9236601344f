//! HTTP utilities for provider REST API calls

use anyhow::{anyhow, Context};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::ScanError;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and masks potentially sensitive patterns
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // The cut must land on a char boundary or slicing panics on
        // multibyte bodies.
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Remote API session for one account scope.
///
/// This is the connection type REST-backed adapters hand back from
/// `connect`: a pooled client plus the bearer token and base URL the scope
/// was established with. Throttling responses surface as
/// [`ScanError::RateLimited`] so the retry wrapper can absorb them.
#[derive(Clone)]
pub struct HttpConnection {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpConnection {
    /// Create a session against `base_url` authenticated by `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent(concat!("driftwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request and parse the response as JSON.
    pub async fn get_json(&self, path: &str) -> Result<Value, ScanError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        if is_throttle(status) {
            tracing::debug!("provider throttled: {} - {}", status, sanitize_for_log(&body));
            return Err(ScanError::RateLimited);
        }

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow!("API request failed: {status}").into());
        }

        serde_json::from_str(&body)
            .context("failed to parse response JSON")
            .map_err(ScanError::from)
    }

    /// Like [`get_json`](Self::get_json), treating HTTP 404 as "not
    /// configured". The natural building block for optional sub-fetches.
    pub async fn get_json_optional(&self, path: &str) -> Result<Option<Value>, ScanError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to send request")?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        if is_throttle(status) {
            tracing::debug!("provider throttled: {} - {}", status, sanitize_for_log(&body));
            return Err(ScanError::RateLimited);
        }

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow!("API request failed: {status}").into());
        }

        serde_json::from_str(&body)
            .context("failed to parse response JSON")
            .map(Some)
            .map_err(ScanError::from)
    }
}

/// Throttling signals: 429 always, and 503 which several providers use for
/// rate limiting.
fn is_throttle(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}
