//! Mock API tests for the generation, model and account endpoints.
//!
//! These tests use wiremock to simulate Artifex API responses, asserting both
//! the request shape (auth header, exact JSON body, query string) and the
//! decoded results.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use artifex::prelude::*;

fn client_for(server: &MockServer) -> ArtifexClient {
    ArtifexClient::builder()
        .api_key("test-api-key")
        .base_url(server.uri())
        .max_retries(0)
        .build()
        .unwrap()
}

fn generation_response() -> serde_json::Value {
    json!({
        "id": "gen_1",
        "imageUrl": "https://x/i.png",
        "model": "m",
        "mode": "production",
        "usage": {"creditsUsed": 0.02, "balanceRemaining": 9.98}
    })
}

#[tokio::test]
async fn generate_decodes_the_full_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_json(json!({"prompt": "A cat wearing a hat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let generation = client
        .generate(&GenerateRequest::new("A cat wearing a hat"))
        .await
        .unwrap();

    assert_eq!(generation.id, "gen_1");
    assert_eq!(generation.image_url, "https://x/i.png");
    assert_eq!(generation.mode, GenerationMode::Production);
    assert_eq!(generation.usage.credits_used, 0.02);
    assert_eq!(generation.usage.balance_remaining, 9.98);
}

#[tokio::test]
async fn generate_sends_optional_fields_when_set() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(body_json(json!({
            "prompt": "a fox",
            "model": "artifex-v2",
            "mode": "test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .generate(
            &GenerateRequest::new("a fox")
                .with_model("artifex-v2")
                .with_mode(GenerationMode::Test),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn generate_rejects_empty_prompt_before_any_request() {
    let server = MockServer::start().await;
    // No mocks mounted: a request would 404 and fail differently.
    let client = client_for(&server);

    let err = client.generate(&GenerateRequest::new("  ")).await.unwrap_err();
    assert!(matches!(err, ArtifexError::InvalidInput(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn list_models_unwraps_the_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"id": "artifex-v2", "name": "Artifex v2"},
                {"id": "artifex-turbo"}
            ]
        })))
        .mount(&server)
        .await;

    let models = client_for(&server).list_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "artifex-v2");
    assert_eq!(models[1].name, None);
}

#[tokio::test]
async fn prices_and_balance_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": {"artifex-v2": 0.02}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 12.5})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let prices = client.get_prices().await.unwrap();
    assert_eq!(prices.prices.get("artifex-v2"), Some(&0.02));

    let balance = client.get_balance().await.unwrap();
    assert_eq!(balance.balance, 12.5);
}

#[tokio::test]
async fn history_appends_only_supplied_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/history"))
        .and(query_param("limit", "5"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations": [{"id": "gen_9", "prompt": "a boat"}],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server).get_history(Some(5), None).await.unwrap();
    assert_eq!(page.generations.len(), 1);
    assert_eq!(page.generations[0].id, "gen_9");
    assert_eq!(page.total, Some(1));
    assert_eq!(page.generations[0].image_url, None);
}

#[tokio::test]
async fn history_without_params_has_no_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/history"))
        .and(query_param_is_missing("limit"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generations": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server).get_history(None, None).await.unwrap();
    assert!(page.generations.is_empty());
}

#[tokio::test]
async fn empty_success_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/balance"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client_for(&server).get_balance().await.unwrap_err();
    match err {
        ArtifexError::Parse(msg) => assert!(msg.contains("empty")),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_fatal_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"balance\":"))
        .expect(1)
        .mount(&server)
        .await;

    // Retries configured, but a parse failure must surface immediately.
    let client = ArtifexClient::builder()
        .api_key("test-api-key")
        .base_url(server.uri())
        .max_retries(3)
        .build()
        .unwrap();

    let err = client.get_balance().await.unwrap_err();
    assert!(matches!(err, ArtifexError::Parse(_)));
}
