use std::fmt;

/// Longest slice of an error body carried into a failure message.
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Why an export request did not produce a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ConnectionError,
    Unauthorized,
    Forbidden,
    RateLimited,
    ApiError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::ConnectionError => "ConnectionError",
            FailureKind::Unauthorized => "Unauthorized",
            FailureKind::Forbidden => "Forbidden",
            FailureKind::RateLimited => "RateLimited",
            FailureKind::ApiError => "ApiError",
        };
        f.write_str(label)
    }
}

/// A classified transport or HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub status_code: Option<u16>,
    pub message: String,
}

/// Result of executing one export request. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// The response body, byte for byte. Normally CSV.
    Success { body: String },
    Failure(Failure),
}

impl ApiOutcome {
    pub fn failure(kind: FailureKind, status_code: Option<u16>, message: impl Into<String>) -> Self {
        ApiOutcome::Failure(Failure {
            kind,
            status_code,
            message: message.into(),
        })
    }
}

/// Maps an HTTP status and body to an outcome.
///
/// `retry_after` is the raw `Retry-After` header, surfaced on 429s. It is
/// reported to the caller only; nothing here retries.
pub fn classify_response(status: u16, body: String, retry_after: Option<&str>) -> ApiOutcome {
    match status {
        200..=299 => ApiOutcome::Success { body },
        401 => ApiOutcome::failure(
            FailureKind::Unauthorized,
            Some(status),
            "HTTP 401 Unauthorized: the export API rejected the token; check SWARMIA_API_TOKEN",
        ),
        403 => ApiOutcome::failure(
            FailureKind::Forbidden,
            Some(status),
            "HTTP 403 Forbidden: the token is not allowed to access this report",
        ),
        429 => {
            let hint = match retry_after.map(str::trim) {
                // Either delay-seconds or an HTTP-date.
                Some(after) if after.parse::<u64>().is_ok() => format!("; retry after {}s", after),
                Some(after) if !after.is_empty() => format!("; retry after {}", after),
                _ => "; retry later".to_string(),
            };
            ApiOutcome::failure(
                FailureKind::RateLimited,
                Some(status),
                format!("HTTP 429 Too Many Requests: rate limited by the export API{}", hint),
            )
        }
        _ => {
            let excerpt = body_excerpt(&body);
            let message = if excerpt.is_empty() {
                format!("API request failed with status {}", status)
            } else {
                format!("API request failed with status {}: {}", status, excerpt)
            };
            ApiOutcome::failure(FailureKind::ApiError, Some(status), message)
        }
    }
}

/// The first [`BODY_EXCERPT_CHARS`] characters of a trimmed body.
pub fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
