//! HTTP transport behavior against a local mock server.

use copyforge::domain::ports::ProviderError;
use copyforge::infrastructure::provider::{HttpTransport, TextRequest, Transport};

fn request() -> TextRequest {
    TextRequest {
        prompt: "Write one headline".to_string(),
        system: "You are a copywriter".to_string(),
        model: "claude-sonnet-4-5-20250929".to_string(),
        temperature: 0.8,
        max_tokens: 2048,
    }
}

#[tokio::test]
async fn success_parses_text_and_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "content": [
                    {"type": "text", "text": "{\"headlines\": "},
                    {"type": "text", "text": "[\"One\"]}"}
                ],
                "usage": {"input_tokens": 42, "output_tokens": 7}
            }"#,
        )
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("test-key", &server.url()).unwrap();
    let response = transport.send(&request()).await.unwrap();

    assert_eq!(response.text, r#"{"headlines": ["One"]}"#);
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 42);
    assert_eq!(usage.output_tokens, 7);
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_carries_retry_after_hint() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(429)
        .with_header("retry-after", "7")
        .with_body(r#"{"error": {"message": "rate limited"}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("test-key", &server.url()).unwrap();
    let err = transport.send(&request()).await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::RateLimited {
            retry_after_secs: Some(hint)
        } if (hint - 7.0).abs() < 1e-9
    ));
    assert!(err.is_transient());
}

#[tokio::test]
async fn server_error_maps_by_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("test-key", &server.url()).unwrap();
    let err = transport.send(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::ServerError { status: 503, .. }));
}

#[tokio::test]
async fn auth_failure_is_not_transient() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid x-api-key"}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("bad-key", &server.url()).unwrap();
    let err = transport.send(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn overload_maps_to_overloaded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(529)
        .with_body(r#"{"error": {"message": "overloaded"}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("test-key", &server.url()).unwrap();
    let err = transport.send(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Overloaded { .. }));
}

#[tokio::test]
async fn garbage_body_on_200_is_unexpected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let transport = HttpTransport::with_base_url("test-key", &server.url()).unwrap();
    let err = transport.send(&request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unexpected { status: 200, .. }));
}
