use dashmap::DashMap;
use huddle_core::{PeerId, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Ordered outbound queue of one connection. The WebSocket writer task drains it.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipState {
    Unjoined,
    Joining(RoomId),
    Member(RoomId),
}

impl MembershipState {
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::Unjoined => None,
            Self::Joining(room) | Self::Member(room) => Some(room),
        }
    }
}

/// Point-in-time view of a registered connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub peer_id: PeerId,
    pub state: MembershipState,
    pub alive: bool,
}

impl Connection {
    pub fn current_room(&self) -> Option<&RoomId> {
        match &self.state {
            MembershipState::Member(room) => Some(room),
            _ => None,
        }
    }
}

struct ConnectionEntry {
    tx: Outbound,
    state: MembershipState,
    alive: bool,
}

/// Live connections keyed by identity.
///
/// Each entry is mutated under its own shard lock, so a join commit and a
/// disconnect on the same connection can never interleave.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<PeerId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the identity is already registered.
    pub fn register(&self, peer_id: PeerId, tx: Outbound) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.connections.entry(peer_id) {
            Entry::Occupied(_) => {
                warn!("Connection {} is already registered", peer_id);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(ConnectionEntry {
                    tx,
                    state: MembershipState::Unjoined,
                    alive: true,
                });
                true
            }
        }
    }

    /// Drops the entry and its outbound queue. Idempotent.
    pub fn unregister(&self, peer_id: &PeerId) -> Option<Connection> {
        self.connections
            .remove(peer_id)
            .map(|(peer_id, entry)| Connection {
                peer_id,
                state: entry.state,
                alive: false,
            })
    }

    pub fn lookup(&self, peer_id: &PeerId) -> Option<Connection> {
        self.connections.get(peer_id).map(|entry| Connection {
            peer_id: *peer_id,
            state: entry.state.clone(),
            alive: entry.alive,
        })
    }

    pub fn current_room(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.lookup(peer_id)
            .and_then(|conn| conn.current_room().cloned())
    }

    pub fn is_alive(&self, peer_id: &PeerId) -> bool {
        self.connections
            .get(peer_id)
            .is_some_and(|entry| entry.alive)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queues a frame for one connection. Unknown or closed targets are
    /// dropped and reported as `false`; that is never an error for the caller.
    pub fn send(&self, peer_id: &PeerId, msg: ServerMessage) -> bool {
        let Some(entry) = self.connections.get(peer_id) else {
            debug!("Dropping frame for unknown connection {}", peer_id);
            return false;
        };

        if entry.tx.send(msg).is_err() {
            debug!("Outbound queue of {} is closed, frame dropped", peer_id);
            return false;
        }
        true
    }

    pub fn broadcast<'a>(&self, peers: impl IntoIterator<Item = &'a PeerId>, msg: &ServerMessage) {
        for peer_id in peers {
            self.send(peer_id, msg.clone());
        }
    }

    /// `Unjoined -> Joining(room)`. Fails if the connection is gone, closing,
    /// or already in some room.
    pub fn begin_join(&self, peer_id: &PeerId, room_id: &RoomId) -> bool {
        let Some(mut entry) = self.connections.get_mut(peer_id) else {
            return false;
        };
        if !entry.alive || entry.state != MembershipState::Unjoined {
            return false;
        }
        entry.state = MembershipState::Joining(room_id.clone());
        true
    }

    /// `Joining(room) -> Member(room)`. Called by the room itself while it
    /// admits the connection; fails once a disconnect has started.
    pub fn commit_join(&self, peer_id: &PeerId, room_id: &RoomId) -> bool {
        let Some(mut entry) = self.connections.get_mut(peer_id) else {
            return false;
        };
        match &entry.state {
            MembershipState::Joining(pending) if entry.alive && pending == room_id => {
                entry.state = MembershipState::Member(room_id.clone());
                true
            }
            _ => false,
        }
    }

    /// `Member(from) -> Member(to)` in one step, so a switching connection is
    /// never without a room. Fails once a disconnect has started.
    pub fn commit_switch(&self, peer_id: &PeerId, from: &RoomId, to: &RoomId) -> bool {
        let Some(mut entry) = self.connections.get_mut(peer_id) else {
            return false;
        };
        match &entry.state {
            MembershipState::Member(current) if entry.alive && current == from => {
                entry.state = MembershipState::Member(to.clone());
                true
            }
            _ => false,
        }
    }

    /// `Joining(room) -> Unjoined` after a rejected join.
    pub fn abort_join(&self, peer_id: &PeerId, room_id: &RoomId) {
        if let Some(mut entry) = self.connections.get_mut(peer_id) {
            if entry.state == MembershipState::Joining(room_id.clone()) {
                entry.state = MembershipState::Unjoined;
            }
        }
    }

    /// `Member(room) -> Unjoined`, only if the connection is still in `room`.
    pub fn clear_room(&self, peer_id: &PeerId, room_id: &RoomId) -> bool {
        let Some(mut entry) = self.connections.get_mut(peer_id) else {
            return false;
        };
        if entry.state.room() != Some(room_id) {
            return false;
        }
        entry.state = MembershipState::Unjoined;
        true
    }

    /// First half of a disconnect: flags the entry dead so no pending join can
    /// commit, and reports where it was. The entry stays until `unregister`.
    pub fn mark_departing(&self, peer_id: &PeerId) -> Option<MembershipState> {
        let mut entry = self.connections.get_mut(peer_id)?;
        entry.alive = false;
        Some(entry.state.clone())
    }
}
