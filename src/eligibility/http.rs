//! HTTP eligibility oracle.
//!
//! Calls `GET {base_url}/users/{member_id}` and reads a verdict token from
//! the body. The body may be the bare token, a JSON string, or a JSON object
//! with a `status` field. Non-2xx statuses, timeouts and unparseable bodies
//! all resolve to `Verdict::Unknown`.

use super::traits::{EligibilityOracle, Verdict};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP oracle client
#[derive(Debug, Clone)]
pub struct HttpOracleConfig {
    /// Service root, e.g. `https://members.example.org`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpOracleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Transport-level failures. Logged, then mapped to `Verdict::Unknown`.
#[derive(Debug, thiserror::Error)]
pub enum OracleTransportError {
    #[error("Invalid oracle URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),
}

/// Eligibility oracle backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpEligibilityOracle {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpEligibilityOracle {
    pub fn new(config: HttpOracleConfig) -> Result<Self, OracleTransportError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| OracleTransportError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(OracleTransportError::InvalidUrl(config.base_url));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Build the lookup URL with the member id as one encoded path segment.
    pub fn member_url(&self, member_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(member_id);
        }
        url
    }

    async fn fetch_token(&self, member_id: &str) -> Result<String, OracleTransportError> {
        let response = self
            .client
            .get(self.member_url(member_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleTransportError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl EligibilityOracle for HttpEligibilityOracle {
    async fn check_eligibility(&self, member_id: &str) -> Verdict {
        match self.fetch_token(member_id).await {
            Ok(body) => {
                let verdict = parse_verdict_body(&body);
                if verdict == Verdict::Unknown {
                    warn!(body = %body.trim(), "oracle returned an unrecognised verdict");
                } else {
                    debug!(%verdict, "oracle verdict received");
                }
                verdict
            }
            Err(e) => {
                warn!(error = %e, "eligibility oracle unavailable");
                Verdict::Unknown
            }
        }
    }
}

/// Extract a verdict from a response body.
pub fn parse_verdict_body(body: &str) -> Verdict {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(token)) => Verdict::from_token(&token),
        Ok(serde_json::Value::Object(map)) => map
            .get("status")
            .and_then(|v| v.as_str())
            .map(Verdict::from_token)
            .unwrap_or(Verdict::Unknown),
        Ok(_) => Verdict::Unknown,
        Err(_) => Verdict::from_token(body),
    }
}
