use crate::error::DispatchError;
use crate::state::InvocationState;
use api_client::{ApiOutcome, FailureKind};
use serde::Serialize;
use std::fmt;

/// Caller-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    Timeout,
    ConnectionError,
    Unauthorized,
    Forbidden,
    RateLimited,
    ApiError,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::ApiError => "ApiError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(label)
    }
}

impl From<FailureKind> for ErrorKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => ErrorKind::Timeout,
            FailureKind::ConnectionError => ErrorKind::ConnectionError,
            FailureKind::Unauthorized => ErrorKind::Unauthorized,
            FailureKind::Forbidden => ErrorKind::Forbidden,
            FailureKind::RateLimited => ErrorKind::RateLimited,
            FailureKind::ApiError => ErrorKind::ApiError,
        }
    }
}

/// A structured failure returned to the caller in place of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// The last state the invocation reached before failing.
    pub failed_at: InvocationState,
    pub message: String,
}

impl ErrorReport {
    pub fn from_error(error: &DispatchError, failed_at: InvocationState) -> Self {
        let (kind, status_code) = match error {
            DispatchError::UnknownOperation(_) | DispatchError::Validation(_) => {
                (ErrorKind::ValidationError, None)
            }
            DispatchError::Transport(failure) => (failure.kind.into(), failure.status_code),
            DispatchError::Request(_) | DispatchError::Internal(_) => (ErrorKind::InternalError, None),
        };
        Self {
            kind,
            status_code,
            failed_at,
            message: error.to_string(),
        }
    }

    /// The single line shown to the caller, e.g. `Error: [Unauthorized] HTTP 401 ...`.
    pub fn render(&self) -> String {
        format!("Error: [{}] {}", self.kind, self.message)
    }
}

/// The one result every invocation yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Raw CSV from the export API, unmodified.
    Success { csv: String },
    Error(ErrorReport),
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Error(_))
    }

    /// The text payload handed back to the caller.
    pub fn text(&self) -> String {
        match self {
            ToolOutcome::Success { csv } => csv.clone(),
            ToolOutcome::Error(report) => report.render(),
        }
    }
}

/// Unwraps a transport outcome into the CSV payload or a typed error.
pub fn into_payload(outcome: ApiOutcome) -> Result<String, DispatchError> {
    match outcome {
        ApiOutcome::Success { body } => Ok(body),
        ApiOutcome::Failure(failure) => Err(DispatchError::Transport(failure)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::classify_response;
    use core_types::ValidationError;
    use pretty_assertions::assert_eq;

    #[test]
    fn success_body_passes_through() {
        let csv = "Start Date,End Date\n2024-01-01,2024-01-07\n";
        let payload = into_payload(classify_response(200, csv.to_string(), None)).unwrap();
        assert_eq!(payload, csv);
    }

    #[test]
    fn unauthorized_maps_to_its_own_kind() {
        let err = into_payload(classify_response(401, String::new(), None)).unwrap_err();
        let report = ErrorReport::from_error(&err, InvocationState::Requested);
        assert_eq!(report.kind, ErrorKind::Unauthorized);
        assert_eq!(report.status_code, Some(401));
        let text = report.render();
        assert!(text.starts_with("Error: [Unauthorized]"), "{text}");
        assert!(text.contains("401"));
    }

    #[test]
    fn api_errors_keep_status_and_excerpt() {
        let err = into_payload(classify_response(502, "bad gateway".into(), None)).unwrap_err();
        let report = ErrorReport::from_error(&err, InvocationState::Requested);
        assert_eq!(report.kind, ErrorKind::ApiError);
        assert_eq!(report.render(), "Error: [ApiError] API request failed with status 502: bad gateway");
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err = DispatchError::from(ValidationError::missing("start_date"));
        let report = ErrorReport::from_error(&err, InvocationState::Received);
        assert_eq!(report.kind, ErrorKind::ValidationError);
        assert_eq!(report.render(), "Error: [ValidationError] missing required field 'start_date'");
    }

    #[test]
    fn report_serializes_for_structured_callers() {
        let report = ErrorReport {
            kind: ErrorKind::RateLimited,
            status_code: Some(429),
            failed_at: InvocationState::Requested,
            message: "slow down".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "RateLimited",
                "status_code": 429,
                "failed_at": "requested",
                "message": "slow down"
            })
        );
    }
}
