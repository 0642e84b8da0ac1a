//! Mock HTTP server tests for `OpenAiCompatProvider::complete()`.
//!
//! Uses [`wiremock`] to stand up a local HTTP server that emulates
//! OpenAI-compatible chat completion responses, exercising the full
//! request/response path without hitting a real API.

use std::collections::HashMap;
use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tutorflow_llm::config::LlmProviderConfig;
use tutorflow_llm::error::ProviderError;
use tutorflow_llm::openai_compat::OpenAiCompatProvider;
use tutorflow_llm::provider::Provider;
use tutorflow_llm::types::{ChatMessage, ChatRequest};

fn mock_config(server_url: &str) -> LlmProviderConfig {
    LlmProviderConfig {
        name: "mock-provider".into(),
        base_url: server_url.into(),
        api_key_env: "TUTORFLOW_MOCK_UNUSED_KEY".into(),
        headers: HashMap::new(),
        timeout_secs: None,
    }
}

fn test_request() -> ChatRequest {
    ChatRequest::new(
        "qwen-flash",
        vec![
            ChatMessage::system("You are a rigorous subject expert."),
            ChatMessage::user("Review this."),
        ],
    )
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test-001",
        "object": "chat.completion",
        "model": "qwen-flash",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
    })
}

// ── Successful completion ──────────────────────────────────────────────

#[tokio::test]
async fn complete_success_text_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-mock-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("PASS\nLooks fine")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk-mock-key".into());
    let response = provider.complete(&test_request()).await.unwrap();

    assert_eq!(response.id, "chatcmpl-test-001");
    assert_eq!(response.model, "qwen-flash");
    assert_eq!(response.first_text(), Some("PASS\nLooks fine"));
    assert_eq!(response.choices[0].finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 18);
}

#[tokio::test]
async fn complete_sends_system_and_user_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen-flash",
            "messages": [
                { "role": "system", "content": "You are a rigorous subject expert." },
                { "role": "user", "content": "Review this." }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    provider.complete(&test_request()).await.unwrap();
}

#[tokio::test]
async fn complete_forwards_custom_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("X-DashScope-WorkSpace", "ws-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = mock_config(&server.uri());
    config
        .headers
        .insert("X-DashScope-WorkSpace".into(), "ws-123".into());
    let provider = OpenAiCompatProvider::with_api_key(config, "sk".into());
    provider.complete(&test_request()).await.unwrap();
}

#[tokio::test]
async fn complete_reads_key_from_env() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-env-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = mock_config(&server.uri());
    config.api_key_env = "TUTORFLOW_MOCK_ENV_KEY".into();
    let provider = OpenAiCompatProvider::new(config);

    temp_env::async_with_vars([("TUTORFLOW_MOCK_ENV_KEY", Some("sk-env-key"))], async {
        provider.complete(&test_request()).await.unwrap();
    })
    .await;
}

// ── Error responses ────────────────────────────────────────────────────

#[tokio::test]
async fn complete_401_returns_auth_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            "{\"error\":{\"message\":\"Invalid API-key provided.\",\"type\":\"invalid_request_error\"}}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk-bad".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(
        matches!(err, ProviderError::AuthFailed(_)),
        "expected AuthFailed, got: {err:?}"
    );
    assert!(err.to_string().contains("Invalid API-key provided."));
}

#[tokio::test]
async fn complete_429_returns_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "2")
                .set_body_string("{\"error\":{\"message\":\"Requests rate limit exceeded\"}}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    match provider.complete(&test_request()).await.unwrap_err() {
        ProviderError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 2000),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn complete_429_arrearage_is_not_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string(
            "{\"error\":{\"code\":\"Arrearage\",\"message\":\"Access denied, please make sure your account is in good standing.\"}}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)), "got: {err:?}");
    assert!(err.to_string().contains("good standing"));
}

#[tokio::test]
async fn complete_404_returns_model_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("{\"error\":{\"message\":\"The model does not exist\"}}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::ModelNotFound(_)));
    assert!(err.to_string().contains("qwen-flash"));
}

#[tokio::test]
async fn complete_500_returns_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
    let msg = err.to_string();
    assert!(msg.contains("500"), "{msg}");
    assert!(msg.contains("upstream exploded"), "{msg}");
}

#[tokio::test]
async fn complete_malformed_json_returns_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\": [oops"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)), "got: {err:?}");
}

#[tokio::test]
async fn complete_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = mock_config(&server.uri());
    config.timeout_secs = Some(1);
    let provider = OpenAiCompatProvider::with_api_key(config, "sk".into());
    let err = provider.complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout), "got: {err:?}");
}

#[tokio::test]
async fn complete_missing_api_key_returns_not_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("never")))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = mock_config(&server.uri());
    config.api_key_env = "TUTORFLOW_MOCK_MISSING_KEY_31337".into();
    let provider = OpenAiCompatProvider::new(config);

    temp_env::async_with_vars(
        [("TUTORFLOW_MOCK_MISSING_KEY_31337", None::<&str>)],
        async {
            let err = provider.complete(&test_request()).await.unwrap_err();
            assert!(matches!(err, ProviderError::NotConfigured(_)));
        },
    )
    .await;
}
