use std::fmt;

/// Name of the query parameter the export API reads the token from.
pub const TOKEN_PARAM: &str = "token";

const REDACTED: &str = "<redacted>";

/// The export API token.
///
/// Swarmia authenticates export requests with a `token` query parameter
/// rather than a header. The wrapper keeps the raw value out of `Debug`
/// output and log lines.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a token, returning `None` for an empty or blank value.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiToken").field(&REDACTED).finish()
    }
}

/// Replaces the value of the `token` parameter in an encoded query string.
pub fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == TOKEN_PARAM => format!("{}={}", key, REDACTED),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
