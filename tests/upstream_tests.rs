use chatgpt_relay::config::Config;
use chatgpt_relay::error::AppError;
use chatgpt_relay::services::upstream::{ChatCompletion, OpenAiClient};

use std::time::Duration;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const PATH: &str = "/v1/chat/completions";

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = Config {
        openai_api_key: Some("test-key".to_string()),
        upstream_url: format!("{}{PATH}", server.uri()),
        upstream_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    OpenAiClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn sends_single_user_message_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(PATH))
        .and(matchers::header("authorization", "Bearer test-key"))
        .and(matchers::body_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "What is DNS?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete("What is DNS?").await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn upstream_error_object_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "rate limited upstream", "type": "requests"}
        })))
        .mount(&server)
        .await;

    match client_for(&server).complete("hi").await {
        Err(AppError::Upstream(msg)) => assert_eq!(msg, "rate limited upstream"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn payload_without_choices_is_no_response() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let result = client_for(&server).complete("hi").await;
    assert!(matches!(result, Err(AppError::NoResponse)), "got {result:?}");
}

#[tokio::test]
async fn wrongly_shaped_json_is_no_response() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": "oops"})))
        .mount(&server)
        .await;

    let result = client_for(&server).complete("hi").await;
    assert!(matches!(result, Err(AppError::NoResponse)), "got {result:?}");
}

#[tokio::test]
async fn non_json_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).complete("hi").await;
    assert!(matches!(result, Err(AppError::Transport(_))), "got {result:?}");
}

#[tokio::test]
async fn slow_upstream_hits_timeout() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"choices": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = Config {
        openai_api_key: Some("test-key".to_string()),
        upstream_url: format!("{}{PATH}", server.uri()),
        upstream_timeout: Duration::from_millis(200),
        ..Config::default()
    };
    let client = OpenAiClient::from_config(&config).unwrap();

    let result = client.complete("hi").await;
    assert!(matches!(result, Err(AppError::Transport(_))), "got {result:?}");
}

#[tokio::test]
async fn missing_key_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        openai_api_key: None,
        upstream_url: format!("{}{PATH}", server.uri()),
        ..Config::default()
    };
    let result = OpenAiClient::from_config(&config).unwrap().complete("hi").await;
    assert!(matches!(result, Err(AppError::MissingApiKey)));
}
