use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;

use huddle_core::{PeerId, ServerMessage};
use huddle_server::SignalingService;

/// Timeout for a single expected frame (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// How long a client must stay quiet to count as "received nothing" (ms).
pub const SILENCE_MS: u64 = 150;

/// Wait for the next frame on a raw outbound queue.
pub async fn recv_signal(
    rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
    timeout_ms: u64,
) -> Result<ServerMessage> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv()).await {
        Ok(Some(msg)) => Ok(msg),
        Ok(None) => anyhow::bail!("Outbound queue closed"),
        Err(_) => anyhow::bail!("Timeout waiting for server message"),
    }
}

/// Poll until `check` holds or the timeout elapses.
pub async fn wait_until<F>(timeout_ms: u64, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if check() {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Every room's member list must match the set of connections whose state
/// says they are in that room, and vice versa. `peers` are the connections
/// the test knows about.
pub async fn assert_membership_consistent(service: &SignalingService, peers: &[PeerId]) {
    let rooms = service.directory().list().await;

    for room in &rooms {
        for member in &room.members {
            let conn = service
                .registry()
                .lookup(member)
                .unwrap_or_else(|| panic!("member {} of {} is not registered", member, room.room_id));
            assert!(conn.alive, "member {} of {} is not alive", member, room.room_id);
            assert_eq!(
                conn.current_room(),
                Some(&room.room_id),
                "member {} disagrees about its room",
                member
            );
        }
        if let Some(host) = room.host {
            assert!(room.members.contains(&host), "host of {} is not a member", room.room_id);
        }
    }

    for peer in peers {
        let Some(room_id) = service.registry().current_room(peer) else {
            continue;
        };
        let room = rooms
            .iter()
            .find(|r| r.room_id == room_id)
            .unwrap_or_else(|| panic!("{} claims room {} which does not exist", peer, room_id));
        assert!(
            room.members.contains(peer),
            "{} claims room {} but is not listed",
            peer,
            room_id
        );
    }
}
