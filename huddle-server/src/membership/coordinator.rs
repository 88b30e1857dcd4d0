use crate::registry::{ConnectionRegistry, MembershipState, Outbound};
use crate::room::{Handoff, JoinOutcome, RoomDirectory, RoomHandle};
use huddle_core::{ErrorCode, LeaveReason, PeerId, RoomId, SignalError};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// A room that keeps shutting down under a joiner is given up on after this
/// many fresh attempts.
const JOIN_ATTEMPTS: usize = 3;

/// Drives join, leave, kick and disconnect sequences, keeping the connection
/// registry and the room actors in agreement.
#[derive(Clone)]
pub struct MembershipCoordinator {
    registry: ConnectionRegistry,
    directory: RoomDirectory,
    auto_create_rooms: bool,
    max_room_id_len: usize,
}

impl MembershipCoordinator {
    pub fn new(
        registry: ConnectionRegistry,
        directory: RoomDirectory,
        auto_create_rooms: bool,
        max_room_id_len: usize,
    ) -> Self {
        Self {
            registry,
            directory,
            auto_create_rooms,
            max_room_id_len,
        }
    }

    pub fn parse_room_id(&self, raw: &str) -> Result<RoomId, SignalError> {
        RoomId::parse(raw, self.max_room_id_len)
            .map_err(|e| SignalError::new(ErrorCode::InvalidRoomId, e.to_string()))
    }

    /// Registers a fresh connection under a new identity.
    pub fn connect(&self, tx: Outbound) -> PeerId {
        loop {
            let peer_id = PeerId::new();
            if self.registry.register(peer_id, tx.clone()) {
                info!("Connection {} registered", peer_id);
                return peer_id;
            }
        }
    }

    /// Joins `raw_room_id`. A connection already in another room stays there
    /// until the new room has admitted it; a rejected switch changes nothing.
    pub async fn join(
        &self,
        peer_id: PeerId,
        raw_room_id: &str,
        secret: Option<String>,
    ) -> Result<RoomId, SignalError> {
        let room_id = self.parse_room_id(raw_room_id)?;
        let conn = self
            .registry
            .lookup(&peer_id)
            .ok_or_else(|| SignalError::from(ErrorCode::InvalidRequest))?;

        let (rejoin, previous) = match conn.state {
            MembershipState::Member(current) if current == room_id => (true, None),
            MembershipState::Member(current) => (false, self.previous_room(peer_id, &current)),
            MembershipState::Joining(_) => return Err(ErrorCode::InvalidRequest.into()),
            MembershipState::Unjoined => (false, None),
        };

        for _ in 0..JOIN_ATTEMPTS {
            // Claim the join before a room can be spawned for it.
            let fresh = !rejoin && previous.is_none();
            if fresh && !self.registry.begin_join(&peer_id, &room_id) {
                return Err(SignalError::new(ErrorCode::InvalidRequest, "connection is closing"));
            }

            let handle = if self.auto_create_rooms {
                self.directory.create_or_get(&room_id, secret.clone())
            } else {
                match self.directory.get(&room_id) {
                    Some(handle) => handle,
                    None => {
                        self.registry.abort_join(&peer_id, &room_id);
                        return Err(ErrorCode::RoomNotFound.into());
                    }
                }
            };

            let (handoff, left) = match &previous {
                Some(from) => {
                    let (tx, rx) = oneshot::channel();
                    let handoff = Handoff {
                        from: from.clone(),
                        left: tx,
                    };
                    (Some(handoff), Some(rx))
                }
                None => (None, None),
            };

            match handle.join(peer_id, secret.clone(), handoff).await {
                JoinOutcome::Joined | JoinOutcome::AlreadyMember => {
                    if let Some(left) = left {
                        let _ = left.await;
                    }
                    return Ok(room_id);
                }
                JoinOutcome::Rejected(code) => {
                    self.registry.abort_join(&peer_id, &room_id);
                    return Err(code.into());
                }
                JoinOutcome::Cancelled => {
                    self.registry.abort_join(&peer_id, &room_id);
                    return Err(SignalError::new(
                        ErrorCode::InvalidRequest,
                        "connection is closing",
                    ));
                }
                JoinOutcome::Retry => {
                    self.registry.abort_join(&peer_id, &room_id);
                    debug!(room = %room_id, "Room shut down under join of {}, retrying", peer_id);
                }
            }
        }

        warn!(room = %room_id, "Giving up joining {} after {} attempts", peer_id, JOIN_ATTEMPTS);
        Err(ErrorCode::RoomUnavailable.into())
    }

    /// Handle of the room a switching connection is leaving. A room missing
    /// from the directory is forgotten, and the join proceeds as a fresh one.
    fn previous_room(&self, peer_id: PeerId, room_id: &RoomId) -> Option<RoomHandle> {
        let handle = self.directory.get(room_id);
        if handle.is_none() {
            warn!(room = %room_id, "{} was in a room missing from the directory", peer_id);
            self.registry.clear_room(&peer_id, room_id);
        }
        handle
    }

    /// Leaves the current room, if any. Returns the room that was left.
    pub async fn leave(&self, peer_id: PeerId, reason: LeaveReason) -> Option<RoomId> {
        let room_id = self.registry.current_room(&peer_id)?;

        match self.directory.get(&room_id) {
            Some(handle) => {
                handle.leave(peer_id, reason).await;
            }
            None => {
                warn!(room = %room_id, "{} was in a room missing from the directory", peer_id);
                self.registry.clear_room(&peer_id, &room_id);
            }
        }
        Some(room_id)
    }

    /// Transport closed. Blocks new admissions for the connection, leaves its
    /// room with `disconnected`, then forgets it.
    pub async fn disconnect(&self, peer_id: PeerId) {
        let Some(state) = self.registry.mark_departing(&peer_id) else {
            return;
        };

        if let Some(room_id) = state.room() {
            if let Some(handle) = self.directory.get(room_id) {
                handle.leave(peer_id, LeaveReason::Disconnected).await;
            }
        }

        self.registry.unregister(&peer_id);
        info!("Connection {} unregistered", peer_id);
    }

    pub async fn kick(
        &self,
        peer_id: PeerId,
        raw_room_id: &str,
        target_id: PeerId,
    ) -> Result<(), SignalError> {
        let room_id = self.member_room(peer_id, raw_room_id)?;
        let handle = self
            .directory
            .get(&room_id)
            .ok_or_else(|| SignalError::from(ErrorCode::RoomNotFound))?;

        handle.kick(peer_id, target_id).await.map_err(Into::into)
    }

    pub async fn toggle_lock(&self, peer_id: PeerId, raw_room_id: &str) -> Result<bool, SignalError> {
        let room_id = self.member_room(peer_id, raw_room_id)?;
        let handle = self
            .directory
            .get(&room_id)
            .ok_or_else(|| SignalError::from(ErrorCode::RoomNotFound))?;

        handle.toggle_lock(peer_id).await.map_err(Into::into)
    }

    pub async fn chat(&self, peer_id: PeerId, raw_room_id: &str, text: String) -> Result<(), SignalError> {
        let room_id = self.member_room(peer_id, raw_room_id)?;
        let handle = self
            .directory
            .get(&room_id)
            .ok_or_else(|| SignalError::from(ErrorCode::NotInRoom))?;

        handle.chat(peer_id, text).await.map_err(Into::into)
    }

    /// Checks existence and secret without joining.
    pub async fn validate(&self, room_id: &RoomId, secret: Option<String>) -> Result<(), ErrorCode> {
        let handle = self.directory.get(room_id).ok_or(ErrorCode::RoomNotFound)?;
        handle.validate(secret).await
    }

    /// The room named in a request, provided the requester is currently in it.
    fn member_room(&self, peer_id: PeerId, raw_room_id: &str) -> Result<RoomId, SignalError> {
        let room_id = self.parse_room_id(raw_room_id)?;
        match self.registry.current_room(&peer_id) {
            Some(current) if current == room_id => Ok(room_id),
            _ => Err(ErrorCode::NotInRoom.into()),
        }
    }
}
