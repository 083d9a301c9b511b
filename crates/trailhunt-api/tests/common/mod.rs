//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use trailhunt_core::ports::Messenger;
use trailhunt_game::application::course::Course;
use trailhunt_game::application::hunt::Hunt;
use trailhunt_game::domain::game::GamePorts;
use trailhunt_test_support::{FixedClock, StubDecoder};

use trailhunt_api::outbox::OutboxMessenger;
use trailhunt_api::state::AppState;

/// URL of a photo whose proof code the stub decoder can read.
pub const OFFICE_PHOTO: &str = "https://chat.example/photos/office.jpg";

const COURSE: &str = r"
locations:
  - name: the kitchen
    proof: kitchen
    task:
      kind: question
      description: How many chairs are there?
      answer: '6'
  - name: the office
    proof: office
    task:
      kind: sentence_length
      description: Describe the office in three words.
      minimum_words: 3
end_location:
  description: the garden
  messages:
    - Bring your score card.
teams:
  owls:
    name: Owls
    players: [Ann, Bo]
";

/// Build the full app router over a fresh hunt. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> Router {
    let course: Course = serde_yaml::from_str(COURSE).unwrap();
    let outbox = Arc::new(OutboxMessenger::new());
    let ports = GamePorts {
        messenger: Arc::clone(&outbox) as Arc<dyn Messenger>,
        decoder: Arc::new(StubDecoder::new().with_image(OFFICE_PHOTO, "QB{office}")),
        clock: Arc::new(FixedClock::default()),
    };
    let hunt = Arc::new(Hunt::new(course, ports).unwrap());
    trailhunt_api::app(AppState::new(hunt, outbox))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Post a text message from `channel` and return the reply texts.
pub async fn say(app: &Router, channel: &str, text: &str) -> Vec<String> {
    let (status, json) = post_json(
        app.clone(),
        "/api/v1/messages",
        &serde_json::json!({ "channel_id": channel, "text": text }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {json}");
    texts(&json["replies"])
}

/// Texts of a JSON array of outbound messages.
pub fn texts(messages: &serde_json::Value) -> Vec<String> {
    messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap().to_owned())
        .collect()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
