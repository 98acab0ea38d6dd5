mod common;

use axum::http::StatusCode;
use common::{ANSWER, Harness};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_chat_answers_with_sources() {
    let harness = Harness::ready(0, false).await;

    let (status, body) = harness
        .chat(r#"{"query": "Tell me about the Scratch course"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], ANSWER);
    assert_eq!(
        body["sources"],
        json!([
            "Unknown Source",
            "https://brainlox.com/about",
            "https://brainlox.com/courses/python"
        ])
    );
}

#[tokio::test]
async fn test_chat_sources_are_capped_and_labelled() {
    let harness = Harness::ready(0, false).await;

    let (status, body) = harness
        .chat(r#"{"query": "Which courses do you offer?", "chat_history": [["Hi", "Hello!"]]}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    let sources = body["sources"].as_array().unwrap();
    assert!(sources.len() <= 3);
    for source in sources {
        let source = source.as_str().unwrap();
        assert!(source == "Unknown Source" || source.starts_with("https://brainlox.com/"));
    }
}

#[tokio::test]
async fn test_chat_without_body_is_rejected() {
    let harness = Harness::ready(0, false).await;

    let (status, body) = harness.chat("").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "no input data", "code": "no_input"}));
}

#[tokio::test]
async fn test_chat_with_empty_object_reports_missing_query() {
    let harness = Harness::ready(0, false).await;

    let (status, body) = harness.chat("{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "query missing", "code": "query_missing"}));
}

#[tokio::test]
async fn test_chat_rejects_malformed_history() {
    let harness = Harness::ready(0, false).await;

    let (status, body) = harness
        .chat(r#"{"query": "Python?", "chat_history": "we talked before"}"#)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_chat_history");
}

#[tokio::test]
async fn test_processing_failure_hides_upstream_detail() {
    let harness = Harness::ready(0, true).await;

    let (status, body) = harness.chat(r#"{"query": "Python?"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "processing error");
    assert_eq!(body["code"], "embedding_failed");
    assert!(!body.to_string().contains("4242"));
}

#[tokio::test]
async fn test_chat_unavailable_when_initialization_keeps_failing() {
    let harness = Harness::new(usize::MAX, false);

    let (status, body) = harness.chat(r#"{"query": "Python?"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({"error": "service unavailable", "code": "service_unavailable"})
    );
    assert!(!body.to_string().contains("origin unavailable"));
    assert_eq!(harness.loader.calls(), 1);
}

#[tokio::test]
async fn test_chat_recovers_after_failed_startup() {
    let harness = Harness::new(1, false);
    assert!(harness.pipeline.initialize().await.is_err());

    let (status, _) = harness.health().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = harness.chat(r#"{"query": "Python?"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], ANSWER);

    let (status, _) = harness.health().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.loader.calls(), 2);
}

#[tokio::test]
async fn test_health_reports_degraded_then_operational() {
    let harness = Harness::new(0, false);

    let (status, body) = harness.health().await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({"status": "degraded", "reason": "not fully initialized"})
    );
    assert_eq!(harness.loader.calls(), 0);

    harness.pipeline.initialize().await.unwrap();

    for _ in 0..3 {
        let (status, body) = harness.health().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "operational"}));
    }
    assert_eq!(harness.loader.calls(), 1);
}
