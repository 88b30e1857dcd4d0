use huddle_core::{LeaveReason, RoomId, ServerMessage};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{TestClient, assert_membership_consistent};

#[tokio::test]
async fn test_switching_rooms() {
    init_tracing();

    let service = create_test_service();
    let mut a = TestClient::connect(&service);
    let mut b = TestClient::connect(&service);

    a.join("first").await.expect("A joins first");
    b.join("first").await.expect("B joins first");
    a.drain();
    b.drain();

    a.join("second").await.expect("A moves");

    // Admitted to the new room first, then released from the old one.
    let frames = a.drain();
    assert_eq!(frames.len(), 2, "{:?}", frames);
    assert!(matches!(
        frames[0],
        ServerMessage::MembershipSnapshot { ref room_id, .. } if room_id.as_str() == "second"
    ));
    assert_eq!(
        frames[1],
        ServerMessage::RoomLeft {
            room_id: "first".into()
        }
    );
    assert_eq!(
        b.recv().await.expect("B sees A leave"),
        ServerMessage::MemberLeft {
            peer_id: a.peer_id,
            reason: LeaveReason::Left,
        }
    );
    assert_eq!(
        b.recv().await.expect("B becomes host"),
        ServerMessage::HostChanged { peer_id: b.peer_id }
    );

    assert_eq!(
        service.registry().current_room(&a.peer_id),
        Some(RoomId::from("second"))
    );
    assert_membership_consistent(&service, &[a.peer_id, b.peer_id]).await;
}
