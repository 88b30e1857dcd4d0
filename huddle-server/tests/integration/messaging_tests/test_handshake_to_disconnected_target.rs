use huddle_core::{ErrorCode, PeerId};
use serde_json::json;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_handshake_to_disconnected_target() {
    init_tracing();

    let service = create_test_service();
    let mut a = TestClient::connect(&service);
    let b = TestClient::connect(&service);

    a.join("r1").await.expect("A joins");
    b.join("r1").await.expect("B joins");
    a.drain();

    let b_id = b.disconnect().await;
    a.drain();

    a.offer(b_id, json!({"sdp": "late"}))
        .await
        .expect("Handshake to a departed peer is dropped, not failed");
    a.offer(PeerId::new(), json!({"sdp": "nobody"}))
        .await
        .expect("Unknown target is dropped too");
    a.expect_silence().await;

    let mut loner = TestClient::connect(&service);
    let err = loner
        .offer(a.peer_id, json!({"sdp": "x"}))
        .await
        .expect_err("Sender outside any room");
    assert_eq!(err.code, ErrorCode::NotInRoom);

    // Over the frame path the same failure comes back as an error frame.
    loner
        .send_raw(&json!({"op": "offer", "d": {"targetId": a.peer_id, "payload": {}}}).to_string())
        .await;
    assert!(matches!(
        loner.recv().await.expect("Error frame"),
        huddle_core::ServerMessage::Error {
            code: ErrorCode::NotInRoom,
            ..
        }
    ));
    a.expect_silence().await;
}
