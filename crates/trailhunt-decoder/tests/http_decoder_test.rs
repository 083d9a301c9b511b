//! Integration tests for the HTTP image decoder against a local server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use trailhunt_core::error::DecodeError;
use trailhunt_core::ports::ImageDecoder;
use trailhunt_decoder::HttpImageDecoder;

async fn decode(Json(body): Json<Value>) -> Json<Value> {
    let text = match body["url"].as_str() {
        Some("https://chat.example/kitchen.jpg") => "QB{kitchen}",
        _ => "",
    };
    Json(json!({ "text": text }))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "decoder crashed")
}

async fn garbage() -> &'static str {
    "not json"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "text": "QB{late}" }))
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/decode", post(decode))
        .route("/broken", post(broken))
        .route("/garbage", post(garbage))
        .route("/slow", post(slow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn decoder(addr: SocketAddr, path: &str) -> HttpImageDecoder {
    HttpImageDecoder::new(&format!("http://{addr}{path}"), Duration::from_secs(5))
}

#[tokio::test]
async fn test_decodes_text_from_service() {
    // Arrange
    let addr = serve().await;
    let decoder = decoder(addr, "/decode");

    // Act
    let text = decoder
        .decode("https://chat.example/kitchen.jpg")
        .await
        .unwrap();

    // Assert
    assert_eq!(text, "QB{kitchen}");
    assert_eq!(decoder.endpoint(), format!("http://{addr}/decode"));
}

#[tokio::test]
async fn test_unreadable_image_decodes_to_empty_text() {
    let addr = serve().await;

    let text = decoder(addr, "/decode")
        .decode("https://chat.example/blurry.jpg")
        .await
        .unwrap();

    assert_eq!(text, "");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let addr = serve().await;

    let result = decoder(addr, "/broken")
        .decode("https://chat.example/kitchen.jpg")
        .await;

    match result {
        Err(DecodeError::Unavailable(message)) => assert!(message.contains("500")),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let addr = serve().await;

    let result = decoder(addr, "/garbage")
        .decode("https://chat.example/kitchen.jpg")
        .await;

    assert!(matches!(result, Err(DecodeError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_timeout_is_unavailable() {
    // Arrange
    let addr = serve().await;
    let decoder = HttpImageDecoder::new(
        &format!("http://{addr}/slow"),
        Duration::from_millis(100),
    );

    // Act
    let result = decoder.decode("https://chat.example/kitchen.jpg").await;

    // Assert
    assert!(matches!(result, Err(DecodeError::Unavailable(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    // Arrange
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    // Act
    let result = decoder(addr, "/decode")
        .decode("https://chat.example/kitchen.jpg")
        .await;

    // Assert
    assert!(matches!(result, Err(DecodeError::Unavailable(_))));
}
