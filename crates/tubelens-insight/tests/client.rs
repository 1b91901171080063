//! Integration tests for `AnthropicClient` using wiremock HTTP mocks.

use serde_json::json;
use tubelens_insight::{
    request_insights, AnthropicClient, InsightError, InsightService, ModelSettings, PromptInput,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AnthropicClient {
    AnthropicClient::with_base_url("test-claude-key", 5, base_url)
        .expect("client construction should not fail")
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-haiku-20240307",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

#[tokio::test]
async fn complete_sends_headers_and_model_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-claude-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "max_tokens": 1200,
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_settings(ModelSettings {
        model: "claude-test".to_string(),
        max_tokens: 1200,
        temperature: 0.0,
    });
    let text = client.complete("hello").await.expect("completion should succeed");
    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn rejected_key_maps_to_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::Auth(_)), "got {err:?}");
    assert!(!err.to_string().contains("test-claude-key"));
}

#[tokio::test]
async fn rate_limit_keeps_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "20")
                .set_body_json(json!({
                    "type": "error",
                    "error": { "type": "rate_limit_error", "message": "Too many requests" }
                })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete("hello")
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            InsightError::RateLimited {
                retry_after_secs: Some(20),
                ..
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn reply_without_text_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_reply_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("late"))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = AnthropicClient::with_base_url("test-claude-key", 1, &server.uri())
        .expect("client construction should not fail");
    let err = client.complete("hello").await.unwrap_err();
    assert!(matches!(err, InsightError::Timeout { secs: 1 }), "got {err:?}");
}

#[tokio::test]
async fn request_insights_issues_two_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("1️⃣ Findings\n• ok")))
        .expect(2)
        .mount(&server)
        .await;

    let report = request_insights(&test_client(&server.uri()), &PromptInput::default(), 100_000)
        .await
        .expect("insight run should succeed");

    assert_eq!(report.sections.len(), 2);
    assert!(report.sections[0].body.contains("### 1️⃣ Findings"));
    assert!(report.sections[0].body.contains("    * ok"));
}
