use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ApiConfig;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;
use url::Url;

pub mod auth;
pub mod error;
pub mod request;
pub mod responses;
// --- Public API ---
pub use auth::ApiToken;
pub use request::OutboundRequest;
pub use responses::{ApiOutcome, Failure, FailureKind, classify_response};

/// The abstract interface to the export API.
///
/// The dispatcher only ever talks to this trait, so tests can substitute a
/// stub that records calls instead of touching the network. Implementations
/// never return an `Err`: every transport or HTTP problem is folded into
/// [`ApiOutcome::Failure`].
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Issues a single GET for `request` and classifies the result.
    async fn execute(&self, request: &OutboundRequest) -> ApiOutcome;
}

/// A concrete `ApiClient` backed by reqwest.
#[derive(Clone)]
pub struct SwarmiaClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl SwarmiaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swarmia-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
            timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Base URL + endpoint path + encoded query.
    pub fn url_for(&self, request: &OutboundRequest) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), request.endpoint());
        url.set_path(&path);
        url.set_query(Some(&request.query_string()));
        url
    }

    fn transport_failure(&self, error: reqwest::Error) -> ApiOutcome {
        // The URL carries the token, so it never makes it into a message.
        let error = error.without_url();
        if error.is_timeout() {
            ApiOutcome::failure(
                FailureKind::Timeout,
                None,
                format!("request timed out after {}s", self.timeout.as_secs_f64()),
            )
        } else {
            ApiOutcome::failure(
                FailureKind::ConnectionError,
                None,
                format!("request failed: {}", error),
            )
        }
    }
}

#[async_trait]
impl ApiClient for SwarmiaClient {
    async fn execute(&self, request: &OutboundRequest) -> ApiOutcome {
        let url = self.url_for(request);
        tracing::debug!(
            endpoint = request.endpoint(),
            query = %request.redacted_query_string(),
            "Sending export request."
        );

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(e),
        };

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(e),
        };

        let outcome = classify_response(status, body, retry_after.as_deref());
        match &outcome {
            ApiOutcome::Success { body } => {
                tracing::info!(endpoint = request.endpoint(), status, bytes = body.len(), "Export request succeeded.");
            }
            ApiOutcome::Failure(failure) => {
                tracing::warn!(endpoint = request.endpoint(), status, kind = %failure.kind, "Export request failed.");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OutboundRequest {
        OutboundRequest::new(
            "/reports/capex/employees",
            vec![("year", "2024".into()), ("timezone", "UTC".into())],
            &ApiToken::new("abc").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn url_joins_base_path_and_endpoint() {
        let client = SwarmiaClient::new("https://app.swarmia.com/api/v0/", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.url_for(&request()).as_str(),
            "https://app.swarmia.com/api/v0/reports/capex/employees?year=2024&timezone=UTC&token=abc"
        );
    }

    #[test]
    fn non_http_base_urls_are_rejected() {
        for bad in ["not a url", "mailto:someone@example.com", "ftp://example.com/api"] {
            assert!(
                matches!(SwarmiaClient::new(bad, Duration::from_secs(1)), Err(ApiError::InvalidBaseUrl(_))),
                "{bad}"
            );
        }
    }
}
