use huddle_core::{LeaveReason, RoomId, ServerMessage};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_host_promotion() {
    init_tracing();

    let service = create_test_service();
    let a = TestClient::connect(&service);
    let mut b = TestClient::connect(&service);
    let mut c = TestClient::connect(&service);

    for client in [&a, &b, &c] {
        client.join("r1").await.expect("Join");
    }
    b.drain();
    c.drain();

    let a_id = a.disconnect().await;

    for client in [&mut b, &mut c] {
        assert_eq!(
            client.recv().await.expect("Leave notice"),
            ServerMessage::MemberLeft {
                peer_id: a_id,
                reason: LeaveReason::Disconnected,
            }
        );
    }
    let promoted = ServerMessage::HostChanged { peer_id: b.peer_id };
    assert_eq!(b.recv().await.expect("Host change"), promoted);
    assert_eq!(c.recv().await.expect("Host change"), promoted);

    let info = service
        .directory()
        .info(&RoomId::from("r1"))
        .await
        .expect("Room exists");
    assert_eq!(info.host, Some(b.peer_id));

    // The promoted host can now use host-only actions.
    b.toggle_lock("r1").await.expect("New host may lock");
    assert_eq!(b.recv().await.expect("Lock event"), ServerMessage::Locked);
    assert_eq!(c.recv().await.expect("Lock event"), ServerMessage::Locked);

    // Last members leaving drops the room.
    b.disconnect().await;
    c.disconnect().await;
    let gone = crate::utils::wait_until(2000, || !service.directory().contains(&RoomId::from("r1"))).await;
    assert!(gone, "Empty room should be dropped");
}
