use crate::error::DispatchError;
use crate::state::Invocation;
use api_client::{ApiClient, ApiToken};
use core_types::{Timeframe, Tz, ValidationError, calendar, find_spec};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

pub mod builder;
pub mod clock;
pub mod error;
pub mod mapper;
pub mod state;
pub mod timeframe;
pub mod validator;

// --- Public API ---
pub use clock::{Clock, FixedClock, SystemClock};
pub use mapper::{ErrorKind, ErrorReport, ToolOutcome};
pub use state::InvocationState;

/// Fallbacks applied when a caller leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchDefaults {
    /// Zone used when a call has no `timezone`, both for "today" and on the wire.
    pub timezone: Tz,
    /// `None` makes a missing timeframe on the metrics tools an error.
    pub timeframe: Option<Timeframe>,
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            timeframe: Some(Timeframe::Last7Days),
        }
    }
}

impl DispatchDefaults {
    pub fn from_settings(defaults: &configuration::Defaults) -> Result<Self, ValidationError> {
        let timezone = calendar::parse_timezone(defaults.timezone.trim()).ok_or_else(|| {
            ValidationError::invalid_format("defaults.timezone", "an IANA zone name")
        })?;
        Ok(Self {
            timezone,
            timeframe: defaults.default_timeframe(),
        })
    }
}

/// Routes tool invocations through validation, resolution, request building
/// and execution. One instance serves every concurrent invocation.
pub struct Dispatcher {
    client: Arc<dyn ApiClient>,
    token: ApiToken,
    defaults: DispatchDefaults,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ApiClient>, token: ApiToken, defaults: DispatchDefaults) -> Self {
        Self {
            client,
            token,
            defaults,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the source of "today" used for named timeframes.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one invocation to completion. Never fails: every problem,
    /// including a panic inside the pipeline, comes back as [`ToolOutcome::Error`].
    pub async fn dispatch(&self, tool: &str, arguments: &Value) -> ToolOutcome {
        let span = tracing::info_span!("invocation", id = %uuid::Uuid::new_v4(), tool = %tool);
        async {
            let mut invocation = Invocation::new();
            let result = AssertUnwindSafe(self.run(tool, arguments, &mut invocation))
                .catch_unwind()
                .await;

            let result = match result {
                Ok(result) => result,
                Err(panic) => Err(DispatchError::Internal(panic_message(panic.as_ref()))),
            };

            match result {
                Ok(csv) => {
                    invocation.advance();
                    tracing::info!(state = %invocation.state(), bytes = csv.len(), "Invocation completed.");
                    ToolOutcome::Success { csv }
                }
                Err(err) => {
                    let failed_at = invocation.fail();
                    let report = mapper::ErrorReport::from_error(&err, failed_at);
                    match report.kind {
                        ErrorKind::ValidationError => {
                            tracing::info!(failed_at = %failed_at, error = %err, "Invocation rejected.")
                        }
                        ErrorKind::InternalError => {
                            tracing::error!(failed_at = %failed_at, error = %err, "Invocation failed.")
                        }
                        _ => tracing::warn!(failed_at = %failed_at, kind = %report.kind, "Invocation failed."),
                    }
                    ToolOutcome::Error(report)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        tool: &str,
        arguments: &Value,
        invocation: &mut Invocation,
    ) -> Result<String, DispatchError> {
        let spec = find_spec(tool).ok_or_else(|| DispatchError::UnknownOperation(tool.to_string()))?;

        let empty = Map::new();
        let raw = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(ValidationError::NotAnObject.into()),
        };

        let args = validator::validate(spec, raw)?;
        invocation.advance();

        let zone = args.timezone("timezone").unwrap_or(self.defaults.timezone);
        let today = calendar::today_in(self.clock.now(), zone);
        let range = timeframe::resolve(spec, &args, today, self.defaults.timeframe)?;
        tracing::debug!(range = %range, zone = zone.name(), "Timeframe resolved.");
        invocation.advance();

        let request = builder::build_request(spec, &args, &range, &self.token, self.defaults.timezone)?;
        tracing::debug!(request = ?request, "Export request built.");
        invocation.advance();

        let outcome = self.client.execute(&request).await;
        mapper::into_payload(outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("invocation panicked: {}", msg)
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("invocation panicked: {}", msg)
    } else {
        "invocation panicked".to_string()
    }
}
