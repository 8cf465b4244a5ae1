//! HTTP server tests
//!
//! Router-level tests driven through tower's `oneshot`, no network
//! listener. Batch tests point the Ethos client at an unroutable local
//! port so every lookup fails fast with a contained transport error.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tower::util::ServiceExt;

use trust_api::{build_router, AppState};
use trust_common::events::EventBus;
use trust_common::TrustConfig;

/// Router wired to a dead upstream: lookups fail with connection refused
fn test_app() -> axum::Router {
    let config = TrustConfig {
        // TCP port 9 (discard) refuses connections immediately
        api_base: "http://127.0.0.1:9".to_string(),
        force_ipv4: false,
        request_timeout_secs: 1,
        ..TrustConfig::default()
    };
    let state = AppState::new(config, EventBus::new(100)).unwrap();
    build_router(state)
}

/// Router wired to a blackhole upstream: each lookup hangs until the
/// one-second client timeout, keeping sessions in RUNNING long enough
/// to race cancellation against batch completion.
fn slow_test_app() -> axum::Router {
    let config = TrustConfig {
        // Non-routable address: connections hang instead of refusing
        api_base: "http://10.255.255.1:9".to_string(),
        force_ipv4: false,
        request_timeout_secs: 1,
        ..TrustConfig::default()
    };
    let state = AppState::new(config, EventBus::new(100)).unwrap();
    build_router(state)
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_request(file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "trustcheck-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/batch")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Poll a session until it reaches a terminal state
async fn wait_for_terminal(app: &axum::Router, session_id: &str) -> Value {
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/batch/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let session = response_json(response).await;
        match session["state"].as_str() {
            Some("RUNNING") => tokio::time::sleep(Duration::from_millis(50)).await,
            Some(_) => return session,
            None => panic!("session missing state: {session}"),
        }
    }
    panic!("session did not reach a terminal state");
}

#[tokio::test]
async fn health_reports_module_and_version() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "trust-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn unknown_session_is_404() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/batch/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_address_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/user")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"address": "  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn upload_with_no_addresses_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(multipart_request("wallets.csv", b"address\n\n\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "EMPTY_BATCH");
}

#[tokio::test]
async fn upload_with_wrong_extension_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(multipart_request("wallets.txt", b"address\n0xAA\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "PARSE_ERROR");
}

#[tokio::test]
async fn batch_completes_with_contained_failures() {
    let app = test_app();

    // Dead upstream: every lookup fails, but every address gets a record
    let response = app
        .clone()
        .oneshot(multipart_request(
            "wallets.csv",
            b"address\n0xAA\n0xBB\n0xCC\n",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["state"], "RUNNING");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let session = wait_for_terminal(&app, &session_id).await;
    assert_eq!(session["state"], "COMPLETED");

    let records = session["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    let addresses: Vec<&str> = records
        .iter()
        .map(|r| r["address"].as_str().unwrap())
        .collect();
    assert_eq!(addresses, vec!["0xAA", "0xBB", "0xCC"]);
    for record in records {
        assert!(record["score"].is_null());
        assert_eq!(record["error"], "Failed to fetch score");
    }
}

#[tokio::test]
async fn filter_endpoint_views_completed_session() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(multipart_request("wallets.csv", b"address\n0xAA\n0xBB\n"))
        .await
        .unwrap();
    let body = response_json(response).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    wait_for_terminal(&app, &session_id).await;

    // Every record failed: "Non User" matches all, "Ethos User" none
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/batch/{session_id}/filter"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status": "Non User"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["matched"], 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/batch/{session_id}/filter"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status": "Ethos User"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["matched"], 0);
}

#[tokio::test]
async fn cancelled_batch_never_delivers_records() {
    let app = slow_test_app();

    let response = app
        .clone()
        .oneshot(multipart_request(
            "wallets.csv",
            b"address\n0x01\n0x02\n0x03\n",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["state"], "RUNNING");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Cancel while the first lookup is still in flight
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/batch/{session_id}/cancel"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["state"], "CANCELLED");

    // Give the background run time to finish every timed-out lookup it
    // could possibly issue. The in-flight call may complete after the
    // cancel, but the session must stay CANCELLED with no records.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/batch/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = response_json(response).await;
    assert_eq!(session["state"], "CANCELLED");
    assert!(session["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn new_batch_supersedes_running_batch() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(multipart_request(
            "first.csv",
            b"address\n0x01\n0x02\n0x03\n0x04\n0x05\n",
        ))
        .await
        .unwrap();
    let first = response_json(response).await;
    let first_id = first["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(multipart_request("second.csv", b"address\n0xAA\n"))
        .await
        .unwrap();
    let second = response_json(response).await;
    let second_id = second["session_id"].as_str().unwrap().to_string();

    // Second batch runs to completion; first ends cancelled or completed
    // (it may have finished before being superseded), but never both
    // deliver as the active batch.
    let second_session = wait_for_terminal(&app, &second_id).await;
    assert_eq!(second_session["state"], "COMPLETED");

    let first_session = wait_for_terminal(&app, &first_id).await;
    let state = first_session["state"].as_str().unwrap();
    assert!(state == "CANCELLED" || state == "COMPLETED");
    if state == "CANCELLED" {
        // A cancelled session delivers no records
        assert!(first_session["records"].as_array().unwrap().is_empty());
    }
}
