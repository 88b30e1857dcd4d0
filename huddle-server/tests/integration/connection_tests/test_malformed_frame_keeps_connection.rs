use huddle_core::{ErrorCode, ServerMessage};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_malformed_frame_keeps_connection() {
    init_tracing();

    let service = create_test_service();
    let mut client = TestClient::connect(&service);

    client.send_raw("this is not json").await;
    assert!(matches!(
        client.recv().await.expect("Error frame"),
        ServerMessage::Error { code: ErrorCode::InvalidMessage, .. }
    ));

    client.send_raw(r#"{"op": "teleport", "d": {}}"#).await;
    assert!(matches!(
        client.recv().await.expect("Error frame"),
        ServerMessage::Error { code: ErrorCode::InvalidMessage, .. }
    ));

    // Answering before any room or offer exists is rejected locally.
    client
        .send_raw(&format!(
            r#"{{"op": "answer", "d": {{"targetId": "{}", "payload": {{}}}}}}"#,
            huddle_core::PeerId::new()
        ))
        .await;
    assert!(matches!(
        client.recv().await.expect("Error frame"),
        ServerMessage::Error { code: ErrorCode::NotInRoom, .. }
    ));

    client.send_raw(r#"{"op": "join-room", "d": {"roomId": "r1"}}"#).await;
    assert!(matches!(
        client.recv().await.expect("Snapshot"),
        ServerMessage::MembershipSnapshot { .. }
    ));
}
