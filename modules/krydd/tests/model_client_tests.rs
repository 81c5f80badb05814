//! HTTP model client against a mock model runtime.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use krydd::domain::ports::{Invocation, LanguageModel, ModelError};
use krydd::infra::llm::{HttpModelClient, HttpModelConfig, ANTHROPIC_VERSION};

fn client(server: &MockServer, api_key: Option<&str>, dimensions: usize) -> HttpModelClient {
    HttpModelClient::new(HttpModelConfig {
        base_url: Url::parse(&server.base_url()).unwrap(),
        api_key: api_key.map(str::to_string),
        chat_model_id: "chat-model".into(),
        embedding_model_id: "embed-model".into(),
        embedding_dimensions: dimensions,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn invoke_posts_messages_and_joins_text_blocks() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/model/chat-model/invoke")
                .header("authorization", "Bearer secret")
                .body_includes(ANTHROPIC_VERSION)
                .body_includes("\"content\":\"What can I cook?\"");
            then.status(200).json_body(json!({
                "content": [
                    {"type": "text", "text": "Try a "},
                    {"type": "tool_use", "name": "lookup", "input": {"q": "soup"}},
                    {"type": "text", "text": "tomato soup."}
                ]
            }));
        })
        .await;

    let reply = client(&server, Some("secret"), 4)
        .invoke(Invocation::new("What can I cook?"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.text, "Try a tomato soup.");
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "lookup");
    assert_eq!(reply.tool_calls[0].input["q"], "soup");
}

#[tokio::test]
async fn invoke_accepts_plain_completion_bodies() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/model/chat-model/invoke");
            then.status(200).json_body(json!({"completion": "plain answer"}));
        })
        .await;

    let reply = client(&server, None, 4)
        .invoke(Invocation::new("hi"))
        .await
        .unwrap();
    assert_eq!(reply.text, "plain answer");
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test]
async fn embed_checks_dimensions() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/model/embed-model/invoke")
                .body_includes("\"inputText\":\"tomato soup\"");
            then.status(200)
                .json_body(json!({"embedding": [0.1, 0.2, 0.3], "inputTextTokenCount": 2}));
        })
        .await;

    let embedding = client(&server, None, 3).embed("tomato soup").await.unwrap();
    assert_eq!(embedding.len(), 3);
    mock.assert_async().await;

    let err = client(&server, None, 1024).embed("tomato soup").await.unwrap_err();
    assert!(matches!(err, ModelError::InvalidResponse(_)), "{err}");
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/model/chat-model/invoke");
            then.status(429).body("slow down");
        })
        .await;

    let err = client(&server, None, 4)
        .invoke(Invocation::new("hi"))
        .await
        .unwrap_err();
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_runtime_is_a_transport_error() {
    let client = HttpModelClient::new(HttpModelConfig {
        base_url: Url::parse("http://127.0.0.1:9").unwrap(),
        api_key: None,
        chat_model_id: "chat-model".into(),
        embedding_model_id: "embed-model".into(),
        embedding_dimensions: 4,
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = client.embed("anything").await.unwrap_err();
    assert!(matches!(err, ModelError::Transport(_)), "{err}");
}
