use crate::auth::{ApiToken, TOKEN_PARAM, redact_query};
use crate::error::ApiError;

/// A fully assembled export request: endpoint path plus ordered query pairs.
///
/// Construction enforces that no key repeats and that the token is present
/// exactly once, as the final pair.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    endpoint: &'static str,
    query: Vec<(&'static str, String)>,
}

impl OutboundRequest {
    pub fn new(
        endpoint: &'static str,
        params: Vec<(&'static str, String)>,
        token: &ApiToken,
    ) -> Result<Self, ApiError> {
        let mut query: Vec<(&'static str, String)> = Vec::with_capacity(params.len() + 1);
        for (key, value) in params {
            if key == TOKEN_PARAM {
                return Err(ApiError::ReservedParameter(key.to_string()));
            }
            if query.iter().any(|(existing, _)| *existing == key) {
                return Err(ApiError::DuplicateParameter(key.to_string()));
            }
            query.push((key, value));
        }
        query.push((TOKEN_PARAM, token.expose().to_string()));
        Ok(Self { endpoint, query })
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    /// Value of a query parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The URL-encoded query string, pairs in insertion order.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }

    /// The query string with the token value masked, for logging.
    pub fn redacted_query_string(&self) -> String {
        redact_query(&self.query_string())
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("endpoint", &self.endpoint)
            .field("query", &self.redacted_query_string())
            .finish()
    }
}
