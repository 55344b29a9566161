//! Webhook boundary: signature verification, interaction types, replies.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use spotcraft::application::services::router::{UNAUTHORIZED_REPLY, UNKNOWN_COMMAND_REPLY};
use spotcraft::server::verify::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use spotcraft::server::{AppState, INVALID_SIGNATURE_BODY, router};
use spotcraft_common::{FleetState, InstanceState, JobStatus};
use tower::ServiceExt;

use crate::fakes::{ADMIN, FakeCloud, FixedProbe, config};

const TIMESTAMP: &str = "1700000000";

type State = Arc<AppState<FakeCloud, FixedProbe>>;

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[42u8; 32])
}

fn app(cloud: FakeCloud) -> (Router, State) {
    let state = Arc::new(AppState {
        provider: cloud,
        probe: FixedProbe::online(),
        config: config(),
        verifier: RequestVerifier::new(signing_key().verifying_key()),
    });
    (router(Arc::clone(&state)), state)
}

fn signed(body: &str) -> Request<Body> {
    let mut message = TIMESTAMP.as_bytes().to_vec();
    message.extend_from_slice(body.as_bytes());
    let signature = hex::encode(signing_key().sign(&message).to_bytes());

    Request::post("/interactions")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .header(TIMESTAMP_HEADER, TIMESTAMP)
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn command(name: &str, user: Option<&str>, argument: Option<&str>) -> String {
    let mut interaction = json!({"type": 2, "data": {"name": name}});
    if let Some(user) = user {
        interaction["member"] = json!({"user": {"id": user}});
    }
    if let Some(argument) = argument {
        interaction["data"]["options"] =
            json!([{"name": "command", "type": 3, "value": argument}]);
    }
    interaction.to_string()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn reply_content(app: Router, body: &str) -> String {
    let (status, body) = send(app, signed(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let value: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(value["type"], 4);
    value["data"]["content"]
        .as_str()
        .expect("content")
        .to_string()
}

// ── Verification ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_signature_headers_are_rejected() {
    let (app, state) = app(FakeCloud::with_fleet(FleetState::Active, 0));
    let request = Request::post("/interactions")
        .body(Body::from(command("start", None, None)))
        .expect("request");

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, INVALID_SIGNATURE_BODY);
    assert_eq!(state.provider.calls().describe_fleet, 0);
}

#[tokio::test]
async fn test_tampered_body_is_rejected_without_side_effects() {
    let (app, state) = app(FakeCloud::with_fleet(FleetState::Active, 0));
    let mut request = signed(&command("start", None, None));
    *request.body_mut() = Body::from(command("stop_fleet", Some(ADMIN), None));

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(state.provider.calls().mutations(), 0);
    assert_eq!(state.provider.calls().describe_fleet, 0);
}

#[tokio::test]
async fn test_non_hex_signature_is_rejected() {
    let (app, _) = app(FakeCloud::empty());
    let request = Request::post("/interactions")
        .header(SIGNATURE_HEADER, "not-hex")
        .header(TIMESTAMP_HEADER, TIMESTAMP)
        .body(Body::from(r#"{"type":1}"#))
        .expect("request");

    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Interaction types ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_is_acknowledged() {
    let (app, _) = app(FakeCloud::empty());

    let (status, body) = send(app, signed(r#"{"type":1}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).expect("json"), json!({"type": 1}));
}

#[tokio::test]
async fn test_unhandled_interaction_type_is_not_found() {
    let (app, _) = app(FakeCloud::empty());
    let (status, _) = send(app, signed(r#"{"type":3}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_garbage_is_bad_request() {
    let (app, _) = app(FakeCloud::empty());
    let (status, _) = send(app, signed("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_needs_no_signature() {
    let (app, _) = app(FakeCloud::empty());
    let request = Request::get("/health").body(Body::empty()).expect("request");
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_without_fleet_replies_offline() {
    let (app, _) = app(FakeCloud::empty());
    let content = reply_content(app, &command("status", Some("5"), None)).await;
    assert_eq!(content, "The server is currently offline. No active fleet ID found.");
}

#[tokio::test]
async fn test_unknown_command_name_replies_with_ok() {
    let (app, _) = app(FakeCloud::empty());
    let content = reply_content(app, &command("reboot", Some(ADMIN), None)).await;
    assert_eq!(content, UNKNOWN_COMMAND_REPLY);
}

#[tokio::test]
async fn test_restricted_command_from_guild_member_is_checked() {
    let (app, state) = app(FakeCloud::with_fleet(FleetState::Active, 1));
    let content = reply_content(app, &command("stop_fleet", Some("999"), None)).await;
    assert_eq!(content, UNAUTHORIZED_REPLY);
    assert!(state.provider.calls().deletes.is_empty());
}

#[tokio::test]
async fn test_direct_message_user_can_run_restricted_command() {
    let (app, state) = app(FakeCloud::with_fleet(FleetState::Active, 1));
    let body = json!({"type": 2, "data": {"name": "stop_fleet"}, "user": {"id": ADMIN}}).to_string();

    let content = reply_content(app, &body).await;

    assert!(content.starts_with("Successfully deleted fleet"), "{content}");
    assert_eq!(state.provider.calls().deletes.len(), 1);
}

#[tokio::test]
async fn test_long_console_output_is_truncated_to_message_limit() {
    let cloud = FakeCloud::with_fleet(FleetState::Active, 1)
        .with_instance(InstanceState::Running, Some("203.0.113.5"))
        .with_console_password()
        .with_job([JobStatus::Success], &"x".repeat(5000));
    let (app, _) = app(cloud);

    let content = reply_content(app, &command("command", Some(ADMIN), Some("list"))).await;

    assert!(content.chars().count() <= 2000, "{}", content.chars().count());
    assert!(content.ends_with("```"), "{content}");
}
