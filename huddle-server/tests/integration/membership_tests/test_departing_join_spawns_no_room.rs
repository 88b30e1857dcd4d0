use huddle_core::{ErrorCode, RoomId};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

/// A join from a connection that is already closing must not leave behind a
/// room that nobody ever entered.
#[tokio::test]
async fn test_departing_join_spawns_no_room() {
    init_tracing();

    let service = create_test_service();
    let closing = TestClient::connect(&service);
    service.registry().mark_departing(&closing.peer_id);

    let err = closing
        .join_with_secret("ghost", Some("only-mine"))
        .await
        .expect_err("Closing connection cannot join");
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert!(!service.directory().contains(&RoomId::from("ghost")));

    // Someone else can still open the room with their own secret.
    let mut other = TestClient::connect(&service);
    other.join("ghost").await.expect("Fresh room");
    other.recv().await.expect("Snapshot");
    let info = service
        .directory()
        .info(&RoomId::from("ghost"))
        .await
        .expect("Room exists");
    assert!(!info.has_secret);
}
