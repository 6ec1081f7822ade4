#![cfg(feature = "google")]

mod support;

use std::time::Duration;

use httpmock::prelude::*;
use parley_llm::{GenerationConfig, Generator, GoogleClient, ModelCatalog, ParleyError, SamplingParams};
use secrecy::SecretString;
use serde_json::json;

fn client(base_url: String) -> GoogleClient {
    client_with_key(base_url, "test-key")
}

fn client_with_key(base_url: String, key: &str) -> GoogleClient {
    GoogleClient::new(SecretString::new(key.to_string()), "gemini-2.5-flash")
        .expect("client")
        .with_base_url(base_url)
        .expect("base url")
}

#[tokio::test]
async fn google_generate_joins_text_parts() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent")
            .header("x-goog-api-key", "test-key")
            .json_body(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Write a detailed recipe for dal"}]}
                ]
            }));
        then.status(200).json_body(json!({
            "candidates": [
                {
                    "content": {"role": "model", "parts": [{"text": "Step 1. "}, {"text": "Rinse."}]},
                    "finishReason": "STOP"
                }
            ]
        }));
    });

    let text = client(server.url(""))
        .generate(GenerationConfig::new("").request("Write a detailed recipe for dal"))
        .await
        .expect("generate");

    assert_eq!(text, "Step 1. Rinse.");
    mock.assert();
}

#[tokio::test]
async fn google_generate_sends_generation_config() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .json_body(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"temperature": 0.5, "maxOutputTokens": 100}
            }));
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        }));
    });

    let sampling = SamplingParams::default()
        .with_temperature(0.5)
        .with_max_output_tokens(100);
    let text = client(server.url(""))
        .generate(
            GenerationConfig::new("models/gemini-2.0-flash")
                .with_sampling(sampling)
                .request("hi"),
        )
        .await
        .expect("generate");

    assert_eq!(text, "hello");
    mock.assert();
}

#[tokio::test]
async fn google_generate_maps_api_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(400).json_body(json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        }));
    });

    let err = client(server.url(""))
        .generate(GenerationConfig::new("").request("hi"))
        .await
        .expect_err("bad key");

    assert!(matches!(
        err,
        ParleyError::Upstream { status: 400, ref message } if message == "API key not valid"
    ));
}

#[tokio::test]
async fn google_generate_flags_blocked_candidates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
    });

    let err = client(server.url(""))
        .generate(GenerationConfig::new("").request("hi"))
        .await
        .expect_err("blocked");

    assert!(
        matches!(err, ParleyError::MalformedResponse(ref reason) if reason.contains("SAFETY"))
    );
}

#[tokio::test]
async fn google_generate_flags_missing_candidates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.5-flash:generateContent");
        then.status(200).json_body(json!({}));
    });

    let err = client(server.url(""))
        .generate(GenerationConfig::new("").request("hi"))
        .await
        .expect_err("empty body");

    assert!(matches!(err, ParleyError::MalformedResponse(_)));
}

#[tokio::test]
async fn google_generate_times_out_on_silent_server() {
    let base_url = support::spawn_silent_server().await;
    let client = client(base_url)
        .with_timeout(Duration::from_millis(300))
        .expect("timeout");

    let err = client
        .generate(GenerationConfig::new("").request("hi"))
        .await
        .expect_err("silent server");

    assert!(matches!(err, ParleyError::NetworkFailure(_)));
}

#[tokio::test]
async fn google_network_errors_never_carry_the_api_key() {
    let key = "AIza-never-print-me";

    let silent = client_with_key(support::spawn_silent_server().await, key)
        .with_timeout(Duration::from_millis(200))
        .expect("timeout");
    let err = silent
        .generate(GenerationConfig::new("").request("hi"))
        .await
        .expect_err("silent server");
    assert!(matches!(err, ParleyError::NetworkFailure(_)));
    assert!(!err.to_string().contains(key), "leaked key: {err}");

    let refused = client_with_key(support::closed_port_url().await, key);
    let err = refused.list_models().await.expect_err("closed port");
    assert!(matches!(err, ParleyError::NetworkFailure(_)));
    assert!(!err.to_string().contains(key), "leaked key: {err}");
}

#[tokio::test]
async fn google_model_listing_stops_on_repeated_page_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1beta/models");
        then.status(200).json_body(json!({
            "models": [
                {
                    "name": "models/gemini-2.5-flash",
                    "supportedGenerationMethods": ["generateContent"]
                }
            ],
            "nextPageToken": "same-token"
        }));
    });

    let models = client(server.url("")).list_models().await.expect("list");

    mock.assert_hits(2);
    assert_eq!(models.len(), 2);
}

#[tokio::test]
async fn google_lists_only_generate_content_models() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1beta/models")
            .header("x-goog-api-key", "test-key");
        then.status(200).json_body(json!({
            "models": [
                {
                    "name": "models/gemini-2.5-flash",
                    "displayName": "Gemini 2.5 Flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/text-embedding-004",
                    "displayName": "Text Embedding 004",
                    "supportedGenerationMethods": ["embedContent"]
                }
            ]
        }));
    });

    let models = client(server.url("")).list_models().await.expect("list");

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "models/gemini-2.5-flash");
    assert_eq!(models[0].display_name.as_deref(), Some("Gemini 2.5 Flash"));
    assert_eq!(models[0].size, None);
    mock.assert();
}

#[test]
fn google_client_rejects_empty_key_and_redacts_debug() {
    let err = GoogleClient::new(SecretString::new("  ".to_string()), "gemini-2.5-flash")
        .expect_err("empty key");
    assert!(matches!(err, ParleyError::InvalidConfig(_)));

    let client = GoogleClient::new(SecretString::new("sk-secret".to_string()), "gemini-2.5-flash")
        .expect("client");
    let debug = format!("{client:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("<redacted>"));
}
