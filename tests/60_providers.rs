use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use imgmotion_api::providers::openai::DocumentationRequest;
use imgmotion_api::providers::{
    DocParser, FalGateway, HttpFalGateway, HttpSceneGateway, OpenAiDocParser, ProviderError,
    SceneGateway,
};

const WEBHOOK: &str = "https://proj.supabase.co/functions/v1/fal-webhook";

#[tokio::test]
async fn fal_submit_posts_params_with_key_and_webhook() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fal-ai/hidream-i1-dev")
        .match_query(Matcher::UrlEncoded("fal_webhook".into(), WEBHOOK.into()))
        .match_header("authorization", "Key fal-secret")
        .match_body(Matcher::PartialJson(json!({"prompt": "a lantern"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"request_id":"abc-1","gateway_request_id":"gw-9","status":"IN_QUEUE"}"#)
        .create_async()
        .await;

    let gateway = HttpFalGateway::new(server.url(), Some("fal-secret".into()), Duration::from_secs(5));
    let submission = gateway
        .submit("fal-ai/hidream-i1-dev", WEBHOOK, &json!({"prompt": "a lantern"}))
        .await
        .unwrap();

    assert_eq!(submission.request_id, "abc-1");
    assert_eq!(submission.gateway_request_id.as_deref(), Some("gw-9"));
    mock.assert_async().await;
}

#[tokio::test]
async fn fal_errors_are_classified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/fal-ai/ltxv")
        .match_query(Matcher::Any)
        .with_status(422)
        .with_body(r#"{"detail":"content_policy_violation: prompt flagged"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/fal-ai/empty")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"IN_QUEUE"}"#)
        .create_async()
        .await;

    let gateway = HttpFalGateway::new(server.url(), Some("k".into()), Duration::from_secs(5));

    match gateway.submit("fal-ai/ltxv", WEBHOOK, &json!({})).await {
        Err(ProviderError::Fal(info)) => {
            assert_eq!(info.status_code, 422);
            assert_eq!(info.error_type, "content_violation");
            assert_eq!(info.technical_message, "content_policy_violation: prompt flagged");
        }
        other => panic!("expected a FAL error, got {:?}", other.map(|s| s.request_id)),
    }

    assert!(matches!(
        gateway.submit("fal-ai/empty", WEBHOOK, &json!({})).await,
        Err(ProviderError::MissingRequestId)
    ));
}

#[tokio::test]
async fn fal_without_a_key_is_not_configured() {
    let gateway = HttpFalGateway::new("http://127.0.0.1:1", None, Duration::from_secs(1));
    assert!(matches!(
        gateway.submit("fal-ai/ltxv", WEBHOOK, &json!({})).await,
        Err(ProviderError::NotConfigured("FAL_API_KEY"))
    ));
}

#[tokio::test]
async fn scene_gateway_reads_generation_id_and_detail_errors() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/api/v1/generate-scene")
        .match_header("authorization", "Bearer railway-key")
        .match_body(Matcher::PartialJson(json!({"model_type": "luma"})))
        .with_status(200)
        .with_body(r#"{"generation_id":"rw-7"}"#)
        .create_async()
        .await;

    let gateway = HttpSceneGateway::new(server.url(), "railway-key", Duration::from_secs(5));
    let submission = gateway.submit(&json!({"model_type": "luma"})).await.unwrap();
    assert_eq!(submission.generation_id.as_deref(), Some("rw-7"));
    ok.assert_async().await;

    server
        .mock("POST", "/api/v1/generate-scene")
        .match_body(Matcher::PartialJson(json!({"model_type": "wan"})))
        .with_status(503)
        .with_body(r#"{"detail":"GPU pool exhausted"}"#)
        .create_async()
        .await;
    match gateway.submit(&json!({"model_type": "wan"})).await {
        Err(ProviderError::Upstream(message)) => assert_eq!(message, "GPU pool exhausted"),
        other => panic!("expected an upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn doc_parser_extracts_json_from_the_model_reply() {
    let mut server = mockito::Server::new_async().await;
    let content = "Here you go:\n```json\n{\"parameters\":[{\"name\":\"prompt\",\"type\":\"string\",\"required\":true,\"uiComponent\":\"textarea\"}],\"processingTime\":\"10-20 seconds\"}\n```";
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_body(json!({"choices": [{"message": {"content": content}}]}).to_string())
        .create_async()
        .await;

    let parser = OpenAiDocParser::new(server.url(), Some("sk-test".into()));
    let parsed = parser
        .parse(&DocumentationRequest {
            documentation: Some("prompt (string, required)".into()),
            tool_name: Some("Dream".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(parsed.parameters.len(), 1);
    assert!(parsed.parameters[0].required);
    assert_eq!(parsed.processing_time, "10-20 seconds");
    assert_eq!(parsed.token_cost_info["baseTokens"], 10);
    mock.assert_async().await;
}

#[tokio::test]
async fn doc_parser_surfaces_api_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let parser = OpenAiDocParser::new(server.url(), Some("sk-test".into()));
    let err = parser.parse(&DocumentationRequest::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "OpenAI API error: 429 - rate limited");

    let unconfigured = OpenAiDocParser::new(server.url(), None);
    assert!(matches!(
        unconfigured.parse(&DocumentationRequest::default()).await,
        Err(ProviderError::NotConfigured("OPENAI_API_KEY"))
    ));
}
