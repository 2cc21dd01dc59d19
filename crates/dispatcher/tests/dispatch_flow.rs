use api_client::{ApiClient, ApiOutcome, ApiToken, OutboundRequest, classify_response};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dispatcher::{DispatchDefaults, Dispatcher, ErrorKind, FixedClock, InvocationState, ToolOutcome};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns a canned outcome and remembers every request it was handed.
struct RecordingClient {
    outcome: ApiOutcome,
    calls: AtomicUsize,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingClient {
    fn returning(outcome: ApiOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> OutboundRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

#[async_trait]
impl ApiClient for RecordingClient {
    async fn execute(&self, request: &OutboundRequest) -> ApiOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

struct PanickingClient;

#[async_trait]
impl ApiClient for PanickingClient {
    async fn execute(&self, _request: &OutboundRequest) -> ApiOutcome {
        panic!("socket exploded");
    }
}

const CSV: &str = "Month,Headcount\n2024-01,12\n";

fn dispatcher_with(client: Arc<dyn ApiClient>) -> Dispatcher {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    Dispatcher::new(client, ApiToken::new("secret-token").unwrap(), DispatchDefaults::default())
        .with_clock(Arc::new(FixedClock::on(today)))
}

/// 05:00 UTC on 2024-03-10, still 2024-03-09 west of roughly UTC-5.
fn early_morning_utc() -> FixedClock {
    FixedClock(
        DateTime::parse_from_rfc3339("2024-03-10T05:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    )
}

fn ok_client() -> Arc<RecordingClient> {
    RecordingClient::returning(classify_response(200, CSV.to_string(), None))
}

fn error_report(outcome: ToolOutcome) -> dispatcher::ErrorReport {
    match outcome {
        ToolOutcome::Error(report) => report,
        other => panic!("expected an error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_required_field_never_reaches_the_network() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher
        .dispatch("get_investment_balance", &json!({ "end_date": "2024-01-31" }))
        .await;

    assert!(outcome.is_error());
    assert!(outcome.text().contains("start_date"), "{}", outcome.text());
    let report = error_report(outcome);
    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert_eq!(report.failed_at, InvocationState::Received);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unauthorized_is_reported_with_its_status() {
    let client = RecordingClient::returning(classify_response(401, "invalid token".into(), None));
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher
        .dispatch("get_pull_request_metrics", &json!({ "timeframe": "last_30_days" }))
        .await;

    let text = outcome.text();
    assert!(text.contains("401"), "{text}");
    let report = error_report(outcome);
    assert_eq!(report.kind, ErrorKind::Unauthorized);
    assert_eq!(report.failed_at, InvocationState::Requested);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn csv_passes_through_byte_for_byte() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher
        .dispatch("get_software_capitalization_employees", &json!({ "year": 2024 }))
        .await;

    assert_eq!(outcome, ToolOutcome::Success { csv: CSV.to_string() });
    assert_eq!(outcome.text(), CSV);
}

#[tokio::test]
async fn capex_employees_sends_timezone_once() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    dispatcher
        .dispatch("get_software_capitalization_employees", &json!({ "year": 2024 }))
        .await;

    let request = client.last_request();
    assert_eq!(request.endpoint(), "/reports/capex/employees");
    let timezones: Vec<_> = request.query().iter().filter(|(k, _)| *k == "timezone").collect();
    assert_eq!(timezones.len(), 1);
    assert_eq!(request.param("timezone"), Some("UTC"));
    assert_eq!(request.param("year"), Some("2024"));
}

#[tokio::test]
async fn timeframe_with_explicit_dates_is_rejected() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher
        .dispatch(
            "get_dora_metrics",
            &json!({ "timeframe": "last_7_days", "start_date": "2024-01-01", "end_date": "2024-01-31" }),
        )
        .await;

    let report = error_report(outcome);
    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert_eq!(report.failed_at, InvocationState::Validated);
    assert!(report.message.contains("conflicting"), "{}", report.message);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher
        .dispatch(
            "get_pull_request_metrics",
            &json!({ "start_date": "2024-02-01", "end_date": "2024-01-01" }),
        )
        .await;

    let report = error_report(outcome);
    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert!(report.message.contains("inverted"), "{}", report.message);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn default_timeframe_fills_in_for_metrics() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let outcome = dispatcher.dispatch("get_pull_request_metrics", &Value::Null).await;

    assert!(!outcome.is_error());
    let request = client.last_request();
    assert_eq!(
        request.query_string(),
        "startDate=2024-03-04&endDate=2024-03-10&timezone=UTC&token=secret-token"
    );
}

#[tokio::test]
async fn named_timeframe_ends_today_in_the_request_zone() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone()).with_clock(Arc::new(early_morning_utc()));

    let outcome = dispatcher
        .dispatch(
            "get_pull_request_metrics",
            &json!({ "timeframe": "last_7_days", "timezone": "Pacific/Pago_Pago" }),
        )
        .await;

    assert!(!outcome.is_error(), "{}", outcome.text());
    let request = client.last_request();
    assert_eq!(request.param("startDate"), Some("2024-03-03"));
    assert_eq!(request.param("endDate"), Some("2024-03-09"));
    assert_eq!(request.param("timezone"), Some("Pacific/Pago_Pago"));

    dispatcher
        .dispatch("get_pull_request_metrics", &json!({ "timeframe": "last_7_days" }))
        .await;
    assert_eq!(client.last_request().param("endDate"), Some("2024-03-10"));
}

#[tokio::test]
async fn configured_default_zone_decides_today() {
    let client = ok_client();
    let defaults = DispatchDefaults {
        timezone: "America/Los_Angeles".parse().unwrap(),
        ..DispatchDefaults::default()
    };
    let dispatcher = Dispatcher::new(client.clone(), ApiToken::new("secret-token").unwrap(), defaults)
        .with_clock(Arc::new(early_morning_utc()));

    dispatcher.dispatch("get_dora_metrics", &json!({})).await;

    let request = client.last_request();
    assert_eq!(request.param("endDate"), Some("2024-03-09"));
    assert_eq!(request.param("timezone"), Some("America/Los_Angeles"));
}

#[tokio::test]
async fn unknown_zone_is_rejected_before_any_request() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let report = error_report(
        dispatcher
            .dispatch("get_pull_request_metrics", &json!({ "timezone": "Foo/Bar" }))
            .await,
    );

    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert!(report.message.contains("timezone"), "{}", report.message);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unknown_tool_is_a_validation_error() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let report = error_report(dispatcher.dispatch("get_everything", &json!({})).await);

    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert!(report.message.contains("get_everything"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn non_object_arguments_are_rejected() {
    let client = ok_client();
    let dispatcher = dispatcher_with(client.clone());

    let report = error_report(dispatcher.dispatch("get_dora_metrics", &json!(["last_7_days"])).await);

    assert_eq!(report.kind, ErrorKind::ValidationError);
    assert_eq!(report.message, "tool arguments must be a JSON object");
}

#[tokio::test]
async fn panicking_client_becomes_an_internal_error() {
    let dispatcher = dispatcher_with(Arc::new(PanickingClient));

    let outcome = dispatcher
        .dispatch("get_effort_reporting", &json!({ "month": "2024-01-01" }))
        .await;

    let report = error_report(outcome);
    assert_eq!(report.kind, ErrorKind::InternalError);
    assert_eq!(report.failed_at, InvocationState::Requested);
    assert!(report.message.contains("socket exploded"), "{}", report.message);
}

#[tokio::test]
async fn token_never_appears_in_error_text() {
    let client = RecordingClient::returning(classify_response(500, "upstream broke".into(), None));
    let dispatcher = dispatcher_with(client);

    let outcome = dispatcher
        .dispatch("get_pull_request_metrics", &json!({ "timeframe": "last_14_days" }))
        .await;

    let text = outcome.text();
    assert_eq!(text, "Error: [ApiError] API request failed with status 500: upstream broke");
    assert!(!text.contains("secret-token"));
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    let client = ok_client();
    let dispatcher = Arc::new(dispatcher_with(client.clone()));

    let mut handles = Vec::new();
    for year in 2020..2026 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            dispatcher
                .dispatch("get_software_capitalization_employees", &json!({ "year": year }))
                .await
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().is_error());
    }
    assert_eq!(client.calls(), 6);
}
