#![cfg(feature = "ollama")]

use httpmock::prelude::*;
use parley_llm::{ModelCatalog, OllamaClient, ParleyError};
use serde_json::json;

#[tokio::test]
async fn ollama_lists_installed_models() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(200).json_body(json!({
            "models": [
                {"name": "tinyllama:latest", "size": 637700138_u64, "digest": "abc"},
                {"name": "qwen2.5:0.5b", "size": 397821319_u64}
            ]
        }));
    });

    let client = OllamaClient::new(server.url("/"), "tinyllama").expect("client");
    let models = client.list_models().await.expect("list");

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "tinyllama:latest");
    assert_eq!(models[0].size, Some(637700138));
    assert_eq!(models[1].name, "qwen2.5:0.5b");
    mock.assert();
}

#[tokio::test]
async fn ollama_model_listing_surfaces_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(503).json_body(json!({"error": "loading"}));
    });

    let client = OllamaClient::new(server.url(""), "tinyllama").expect("client");
    let err = client.list_models().await.expect_err("503");
    assert!(matches!(
        err,
        ParleyError::Upstream { status: 503, ref message } if message == "loading"
    ));
}
