use api_client::{ApiClient, ApiOutcome, ApiToken, FailureKind, OutboundRequest, SwarmiaClient};
use mockito::Matcher;
use pretty_assertions::assert_eq;
use std::time::Duration;

const CSV: &str = "Start Date,End Date\n2024-01-01,2024-01-07\n";

fn path(endpoint: &str) -> Matcher {
    Matcher::Regex(format!(r"^/api/v0{}($|\?)", endpoint))
}

fn pr_request(token: &str) -> OutboundRequest {
    OutboundRequest::new(
        "/reports/pullRequests",
        vec![
            ("startDate", "2024-01-01".to_string()),
            ("endDate", "2024-01-07".to_string()),
            ("timezone", "Europe/Helsinki".to_string()),
        ],
        &ApiToken::new(token).unwrap(),
    )
    .unwrap()
}

fn client_for(server: &mockito::ServerGuard) -> SwarmiaClient {
    SwarmiaClient::new(&format!("{}/api/v0", server.url()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn success_returns_body_verbatim_and_sends_token_as_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", path("/reports/pullRequests"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("startDate".into(), "2024-01-01".into()),
            Matcher::UrlEncoded("endDate".into(), "2024-01-07".into()),
            Matcher::UrlEncoded("timezone".into(), "Europe/Helsinki".into()),
            Matcher::UrlEncoded("token".into(), "secret-token".into()),
        ]))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(CSV)
        .expect(1)
        .create_async()
        .await;

    let outcome = client_for(&server).execute(&pr_request("secret-token")).await;

    assert_eq!(outcome, ApiOutcome::Success { body: CSV.to_string() });
    mock.assert_async().await;
}

#[tokio::test]
async fn status_codes_are_classified() {
    let cases = [
        (401, FailureKind::Unauthorized),
        (403, FailureKind::Forbidden),
        (429, FailureKind::RateLimited),
        (400, FailureKind::ApiError),
        (503, FailureKind::ApiError),
    ];

    for (status, kind) in cases {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", path("/reports/pullRequests"))
            .with_status(status)
            .with_body("{\"error\":\"nope\"}")
            .create_async()
            .await;

        let outcome = client_for(&server).execute(&pr_request("t")).await;
        let ApiOutcome::Failure(failure) = outcome else {
            panic!("status {status} should fail");
        };
        assert_eq!(failure.kind, kind, "status {status}");
        assert_eq!(failure.status_code, Some(status as u16));
        assert!(failure.message.contains(&status.to_string()), "{}", failure.message);
    }
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after_without_retrying() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", path("/reports/pullRequests"))
        .with_status(429)
        .with_header("retry-after", "12")
        .expect(1)
        .create_async()
        .await;

    let outcome = client_for(&server).execute(&pr_request("t")).await;
    let ApiOutcome::Failure(failure) = outcome else {
        panic!("429 should fail");
    };
    assert_eq!(failure.kind, FailureKind::RateLimited);
    assert!(failure.message.contains("retry after 12s"));
    mock.assert_async().await;
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SwarmiaClient::new(&format!("http://{}/api/v0", addr), Duration::from_secs(5)).unwrap();
    let outcome = client.execute(&pr_request("do-not-leak")).await;

    let ApiOutcome::Failure(failure) = outcome else {
        panic!("closed port should fail");
    };
    assert_eq!(failure.kind, FailureKind::ConnectionError);
    assert_eq!(failure.status_code, None);
    assert!(!failure.message.contains("do-not-leak"));
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = SwarmiaClient::new(&format!("http://{}/api/v0", addr), Duration::from_millis(200)).unwrap();
    let outcome = client.execute(&pr_request("t")).await;

    let ApiOutcome::Failure(failure) = outcome else {
        panic!("silent server should time out");
    };
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(failure.message.contains("timed out"));
}
