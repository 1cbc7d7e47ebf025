//! HTTP client tests against a mock question source.

use iqm::api::{QuestionSource, StackExchangeClient};
use iqm::config::Config;
use iqm::error::FetchError;
use iqm::pagination::{Completion, FetchStatus, Paginator};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: server.uri(),
        ..Config::default()
    }
}

fn question(id: u64) -> serde_json::Value {
    json!({
        "owner": {"display_name": format!("user{}", id), "user_id": id},
        "title": format!("question {}", id),
        "question_id": id,
        "creation_date": 1_600_000_000u64 + id,
        "link": format!("https://stackoverflow.com/q/{}", id),
        "body": "<p>hello</p>"
    })
}

#[tokio::test]
async fn sends_paging_and_site_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/questions"))
        .and(query_param("page", "3"))
        .and(query_param("pagesize", "30"))
        .and(query_param("unsafe", "false"))
        .and(query_param("filter", "withbody"))
        .and(query_param("site", "stackoverflow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [question(1), question(2)],
            "has_more": true,
            "quota_max": 300,
            "quota_remaining": 299
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StackExchangeClient::new(&config_for(&server)).unwrap();
    let page = client.fetch_page(3, 30).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].title, "question 2");
    assert!(page.has_more());
    assert_eq!(page.quota_remaining, Some(299));
}

#[tokio::test]
async fn error_status_carries_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/questions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_id": 400,
            "error_name": "bad_parameter",
            "error_message": "site is required"
        })))
        .mount(&server)
        .await;

    let client = StackExchangeClient::new(&config_for(&server)).unwrap();
    let err = client.fetch_page(1, 30).await.unwrap_err();

    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "site is required");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_without_body_uses_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = StackExchangeClient::new(&config_for(&server)).unwrap();
    let err = client.fetch_page(1, 30).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 503, .. }), "{:?}", err);
}

#[tokio::test]
async fn unexpected_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"questions": []})))
        .mount(&server)
        .await;

    let client = StackExchangeClient::new(&config_for(&server)).unwrap();
    let err = client.fetch_page(1, 30).await.unwrap_err();

    assert!(matches!(err, FetchError::Malformed(_)), "{:?}", err);
}

#[tokio::test]
async fn slow_source_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": [], "has_more": false}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = Config {
        request_timeout: Duration::from_millis(200),
        ..config_for(&server)
    };
    let client = StackExchangeClient::new(&config).unwrap();
    let err = client.fetch_page(1, 30).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)), "{:?}", err);
}

#[tokio::test]
async fn unreachable_source_is_transport_error() {
    let config = Config {
        base_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    };
    let client = StackExchangeClient::new(&config).unwrap();
    let err = client.fetch_page(1, 30).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn paginator_walks_pages_until_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [question(1), question(2)],
            "has_more": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StackExchangeClient::new(&config_for(&server)).unwrap();
    let mut paginator = Paginator::new(2, 300);

    assert_eq!(paginator.fetch_next_page(&client).await, Completion::Appended(2));
    assert_eq!(paginator.fetch_next_page(&client).await, Completion::Appended(0));
    assert_eq!(paginator.status(), &FetchStatus::Exhausted);
    assert_eq!(paginator.fetch_next_page(&client).await, Completion::Skipped);
    assert_eq!(paginator.items().len(), 2);
    assert_eq!(paginator.page(), 2);
}
