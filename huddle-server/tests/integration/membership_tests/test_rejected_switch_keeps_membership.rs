use huddle_core::{ErrorCode, RoomId};
use huddle_server::HuddleConfig;

use crate::integration::{create_test_service_with, init_tracing};
use crate::utils::{TestClient, assert_membership_consistent};

#[tokio::test]
async fn test_rejected_switch_keeps_membership() {
    init_tracing();

    let service = create_test_service_with(HuddleConfig {
        auto_create_rooms: false,
        ..HuddleConfig::default()
    });
    let directory = service.directory();
    let first = RoomId::from("first");
    directory.create(&first, None).expect("first");
    directory
        .create(&RoomId::from("vault"), Some("s3cret".into()))
        .expect("vault");
    directory.create(&RoomId::from("closed"), None).expect("closed");
    directory.set_locked(&RoomId::from("closed"), true).await;

    let mut a = TestClient::connect(&service);
    let mut b = TestClient::connect(&service);
    a.join("first").await.expect("A joins first");
    b.join("first").await.expect("B joins first");
    a.drain();
    b.drain();

    let attempts = [
        ("vault", Some("wrong"), ErrorCode::WrongSecret),
        ("closed", None, ErrorCode::RoomLocked),
        ("nowhere", None, ErrorCode::RoomNotFound),
    ];
    for (room, secret, expected) in attempts {
        let err = a
            .join_with_secret(room, secret)
            .await
            .expect_err("Switch must be rejected");
        assert_eq!(err.code, expected, "joining {}", room);

        assert_eq!(service.registry().current_room(&a.peer_id), Some(first.clone()));
        a.expect_silence().await;
        b.expect_silence().await;
    }

    let info = directory.info(&first).await.expect("first exists");
    assert_eq!(info.members, vec![a.peer_id, b.peer_id]);
    assert_eq!(info.host, Some(a.peer_id), "host must not change");
    assert_membership_consistent(&service, &[a.peer_id, b.peer_id]).await;
}
