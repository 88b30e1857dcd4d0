use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use huddle_core::ServerMessage;
use huddle_server::{SignalingService, router};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

async fn call(service: &SignalingService, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router(service.clone())
        .oneshot(builder.body(body).expect("Request"))
        .await
        .expect("Infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

#[tokio::test]
async fn test_rooms_api() {
    init_tracing();

    let service = create_test_service();

    let (status, body) = call(&service, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "connections": 0, "rooms": 0}));

    let (status, body) = call(
        &service,
        Method::POST,
        "/api/rooms",
        Some(json!({"roomId": "standup", "secret": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"roomId": "standup", "hasSecret": true}));

    let (status, body) = call(&service, Method::POST, "/api/rooms", Some(json!({"roomId": "standup"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "room-exists");

    let (status, body) = call(&service, Method::POST, "/api/rooms", Some(json!({"roomId": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid-room-id");

    let (status, body) = call(
        &service,
        Method::POST,
        "/api/rooms/validate",
        Some(json!({"roomId": "standup", "secret": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": false, "error": "wrong-secret"}));

    let (_, body) = call(
        &service,
        Method::POST,
        "/api/rooms/validate",
        Some(json!({"roomId": "standup", "secret": "pw"})),
    )
    .await;
    assert_eq!(body, json!({"ok": true}));

    let mut member = TestClient::connect(&service);
    member.join_with_secret("standup", Some("pw")).await.expect("Join");
    member.drain();

    let (status, body) = call(&service, Method::GET, "/api/rooms/standup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], json!([member.peer_id]));
    assert_eq!(body["host"], json!(member.peer_id));
    assert_eq!(body["locked"], false);
    assert_eq!(body["hasSecret"], true);

    let (status, body) = call(&service, Method::GET, "/api/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = call(&service, Method::GET, "/api/rooms/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "room-not-found");

    let (status, _) = call(&service, Method::DELETE, "/api/rooms/standup", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(matches!(
        member.recv().await.expect("Room closed"),
        ServerMessage::RoomClosed { .. }
    ));

    let (_, body) = call(&service, Method::GET, "/api/rooms", None).await;
    assert_eq!(body, json!([]));
}
