//! End-to-end tests for the degenerate no-retrieval pipeline.
//!
//! Configuration is process-global, so this binary runs with
//! `ANSWER_MODE=direct` while its sibling covers retrieval mode. The mock
//! generation endpoint discriminates tests by their question text.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use contract_qa::{api, config, logging, processing::AnswerService};
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use regex::Regex;
use serde_json::json;
use tokio::sync::{Mutex, OnceCell};
use tower::ServiceExt;

static INIT: OnceCell<()> = OnceCell::const_new();
static MOCK_SERVER: OnceCell<&'static MockServer> = OnceCell::const_new();
static EMBED_MOCK: OnceCell<Mock<'static>> = OnceCell::const_new();
static TEST_LOCK: Mutex<()> = Mutex::const_new(());

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

async fn harness() -> &'static MockServer {
    INIT.get_or_init(|| async {
        let mock_server = Box::leak(Box::new(MockServer::start_async().await));

        set_env("GEMINI_API_KEY", "test-key");
        set_env("GEMINI_API_BASE_URL", &mock_server.base_url());
        set_env("ANSWER_MODE", "direct");

        MOCK_SERVER.set(mock_server).ok();

        // Registered only to prove it never gets hit.
        let embed = mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/embedding-001:batchEmbedContents");
                then.status(200).json_body(json!({ "embeddings": [] }));
            })
            .await;
        EMBED_MOCK.set(embed).ok();

        config::init_config();
        logging::init_tracing();
    })
    .await;

    MOCK_SERVER.get().expect("mock server initialized")
}

fn build_app() -> axum::Router {
    api::create_router(Arc::new(AnswerService::new()))
}

fn post_ask(payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

#[tokio::test]
async fn forwards_the_bare_file_path_to_the_model() {
    let server = harness().await;
    let _guard = TEST_LOCK.lock().await;

    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-pro:generateContent")
                .header("x-goog-api-key", "test-key")
                .body_contains("Summarize the termination clause")
                .body_matches(Regex::new(r"contracts/lease-9\.pdf").expect("regex"));
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Thirty days written notice." }] }
                }]
            }));
        })
        .await;

    let response = build_app()
        .oneshot(post_ask(json!({
            "question": "Summarize the termination clause",
            "file_path": "contracts/lease-9.pdf"
        })))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(parsed["answer"], "Thirty days written notice.");

    generate.assert();
    // The document itself is never fetched, chunked, or embedded.
    assert_eq!(EMBED_MOCK.get().expect("embed mock").hits(), 0);
}

#[tokio::test]
async fn prefers_file_url_over_file_path_in_the_mention() {
    let server = harness().await;
    let _guard = TEST_LOCK.lock().await;

    let with_url = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-pro:generateContent")
                .body_contains("Which file is mentioned?")
                .body_contains("https://docs.example/lease-10.pdf");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "The hosted copy." }] }
                }]
            }));
        })
        .await;
    let with_path = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-pro:generateContent")
                .body_contains("local/lease-10.pdf");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "The local copy." }] }
                }]
            }));
        })
        .await;

    let response = build_app()
        .oneshot(post_ask(json!({
            "question": "Which file is mentioned?",
            "file_url": "https://docs.example/lease-10.pdf",
            "file_path": "local/lease-10.pdf"
        })))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    with_url.assert();
    assert_eq!(with_path.hits(), 0);
}

#[tokio::test]
async fn question_alone_goes_straight_through() {
    let server = harness().await;
    let _guard = TEST_LOCK.lock().await;

    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-pro:generateContent")
                .body_contains("What is a lease?");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "A rental contract." }] }
                }]
            }));
        })
        .await;

    let response = build_app()
        .oneshot(post_ask(json!({ "question": "What is a lease?" })))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    generate.assert();
    assert_eq!(EMBED_MOCK.get().expect("embed mock").hits(), 0);
}

#[tokio::test]
async fn missing_question_is_still_a_400_in_direct_mode() {
    let _ = harness().await;
    let _guard = TEST_LOCK.lock().await;

    let response = build_app()
        .oneshot(post_ask(json!({ "file_path": "contracts/lease-11.pdf" })))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(&body[..], br#"{"error":"Question is required"}"#);
}
