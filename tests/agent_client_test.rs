use board_flow::agent::{CodingAgent, OpenCodeClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: impl Into<String>) -> OpenCodeClient {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    OpenCodeClient::new(base_url)
}

#[tokio::test]
async fn new_session_then_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ses_42" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/ses_42/message"))
        .and(body_partial_json(json!({
            "model": { "providerID": "anthropic", "modelID": "claude-sonnet" },
            "parts": [{ "type": "text", "text": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": { "id": "msg_1" },
            "parts": [
                { "type": "step-start" },
                { "type": "text", "text": "Hi there." },
                { "type": "text", "text": "Anything else?" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = client(server.uri());
    let reply = agent
        .ask("hello", "anthropic/claude-sonnet", None)
        .await
        .unwrap();
    assert_eq!(reply.session_id, "ses_42");
    assert_eq!(reply.text, "Hi there.\nAnything else?");
}

#[tokio::test]
async fn existing_session_is_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "unused" })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/ses_7/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{ "type": "text", "text": "ok" }]
        })))
        .mount(&server)
        .await;

    let agent = client(format!("{}/", server.uri()));
    let reply = agent
        .ask("continue", "openai/gpt-4o", Some("ses_7"))
        .await
        .unwrap();
    assert_eq!(reply.session_id, "ses_7");
    assert_eq!(reply.text, "ok");
}

#[tokio::test]
async fn empty_reply_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/ses_7/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "parts": [] })))
        .mount(&server)
        .await;

    let agent = client(server.uri());
    assert!(agent.ask("x", "openai/gpt-4o", Some("ses_7")).await.is_err());
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let agent = client(server.uri());
    let err = agent.ask("x", "openai/gpt-4o", None).await.unwrap_err();
    assert!(format!("{err:#}").contains("session"));
}
