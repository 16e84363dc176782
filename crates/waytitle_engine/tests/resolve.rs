use std::time::Duration;

use pretty_assertions::assert_eq;
use waytitle_core::{RetryPolicy, TitleOutcome};
use waytitle_engine::{ArchiveClient, ArchiveSettings, TitleResolver};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(server: &MockServer) -> TitleResolver {
    let settings = ArchiveSettings {
        cdx_base_url: format!("{}/cdx/search/cdx", server.uri()),
        replay_base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        snapshot_limit: 3,
        retry: RetryPolicy::new(3, Duration::ZERO),
    };
    TitleResolver::new(ArchiveClient::new(settings).expect("client"))
}

async fn mount_index(server: &MockServer, domain: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", domain))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_capture_resolves_to_its_title() {
    let server = MockServer::start().await;
    mount_index(&server, "example.com", r#"[["timestamp"],["20200101000000"]]"#).await;
    Mock::given(method("GET"))
        .and(path("/web/20200101000000/http://example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Example</title></head></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve("example.com").await;
    assert_eq!(outcome, TitleOutcome::Title("Example".to_string()));
}

#[tokio::test]
async fn header_only_index_response_means_no_snapshot() {
    let server = MockServer::start().await;
    mount_index(&server, "none.example", r#"[["timestamp"]]"#).await;

    let outcome = resolver(&server).resolve("none.example").await;
    assert_eq!(outcome, TitleOutcome::NoSnapshot);
    assert_eq!(outcome.display_value(), "no snapshot available");
}

#[tokio::test]
async fn oldest_capture_of_the_recent_window_is_fetched() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        "example.com",
        r#"[["timestamp"],["20240101000000"],["20230101000000"],["20200101000000"]]"#,
    )
    .await;
    // Only the last (least recent) timestamp of the window is mounted; a
    // request for any other capture would fail the test.
    Mock::given(method("GET"))
        .and(path("/web/20200101000000/http://example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><title>Oldest Of Window</title></html>",
            "text/html; charset=utf-8",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve("example.com").await;
    assert_eq!(outcome, TitleOutcome::Title("Oldest Of Window".to_string()));
}

#[tokio::test]
async fn exhausted_index_retries_become_a_fetch_error_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve("example.com").await;
    match outcome {
        TitleOutcome::FetchError(detail) => assert!(detail.contains("500")),
        other => panic!("expected FetchError, got {other:?}"),
    }
}

#[tokio::test]
async fn title_less_snapshot_becomes_extraction_failed() {
    let server = MockServer::start().await;
    mount_index(&server, "example.com", r#"[["timestamp"],["20200101000000"]]"#).await;
    Mock::given(method("GET"))
        .and(path("/web/20200101000000/http://example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body>no title here</body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve("example.com").await;
    assert_eq!(
        outcome,
        TitleOutcome::ExtractionFailed {
            timestamp: "20200101000000".to_string()
        }
    );
    assert!(outcome.display_value().contains("20200101000000"));
}

#[tokio::test]
async fn malformed_capture_row_becomes_a_data_error_outcome() {
    let server = MockServer::start().await;
    mount_index(&server, "example.com", r#"[["timestamp"],[]]"#).await;

    let outcome = resolver(&server).resolve("example.com").await;
    assert!(matches!(outcome, TitleOutcome::DataError(_)));
}

#[tokio::test]
async fn legacy_encoded_snapshot_is_decoded_before_extraction() {
    let server = MockServer::start().await;
    mount_index(&server, "example.ru", r#"[["timestamp"],["20050101000000"]]"#).await;

    // "Пример" in windows-1251, the common encoding of early-2000s captures.
    let mut body = b"<html><head><title>".to_vec();
    body.extend_from_slice(&[0xCF, 0xF0, 0xE8, 0xEC, 0xE5, 0xF0]);
    body.extend_from_slice(b"</title></head></html>");
    Mock::given(method("GET"))
        .and(path("/web/20050101000000/http://example.ru/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=windows-1251"),
        )
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve("example.ru").await;
    assert_eq!(outcome, TitleOutcome::Title("Пример".to_string()));
}
