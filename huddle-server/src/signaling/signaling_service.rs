use crate::config::HuddleConfig;
use crate::membership::MembershipCoordinator;
use crate::registry::{ConnectionRegistry, Outbound};
use crate::room::{RoomDirectory, RoomSettings};
use huddle_core::{
    ClientMessage, ErrorCode, IceServerConfig, LeaveReason, PeerId, ServerMessage, SignalError,
};
use std::sync::Arc;
use tracing::{debug, warn};

struct SignalingInner {
    registry: ConnectionRegistry,
    directory: RoomDirectory,
    coordinator: MembershipCoordinator,
    ice_servers: Vec<IceServerConfig>,
    max_chat_len: usize,
    max_frame_bytes: usize,
}

/// Entry point for everything a client sends. Handshake frames are relayed
/// here directly; membership and room policy go through the coordinator.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: &HuddleConfig) -> Self {
        let registry = ConnectionRegistry::new();
        let directory = RoomDirectory::new(
            registry.clone(),
            RoomSettings {
                echo_chat: config.echo_chat,
                queue_capacity: config.room_queue_capacity,
            },
        );
        let coordinator = MembershipCoordinator::new(
            registry.clone(),
            directory.clone(),
            config.auto_create_rooms,
            config.max_room_id_len,
        );

        Self {
            inner: Arc::new(SignalingInner {
                registry,
                directory,
                coordinator,
                ice_servers: config.ice_servers.clone(),
                max_chat_len: config.max_chat_len,
                max_frame_bytes: config.max_frame_bytes,
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.inner.directory
    }

    pub fn coordinator(&self) -> &MembershipCoordinator {
        &self.inner.coordinator
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.inner.max_frame_bytes
    }

    /// Registers a connection and greets it with its identity.
    pub fn connect(&self, tx: Outbound) -> PeerId {
        let peer_id = self.inner.coordinator.connect(tx);
        self.inner.registry.send(
            &peer_id,
            ServerMessage::Welcome {
                peer_id,
                ice_servers: self.get_ice_servers(),
            },
        );
        peer_id
    }

    pub async fn disconnect(&self, peer_id: PeerId) {
        self.inner.coordinator.disconnect(peer_id).await;
    }

    /// Parses and dispatches one text frame. Failures are answered with an
    /// `error` frame to the sender only; the connection stays usable.
    pub async fn handle_frame(&self, from: PeerId, text: &str) {
        let res = match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.dispatch(from, msg).await,
            Err(e) => {
                warn!("Invalid ClientMessage from {}: {}", from, e);
                Err(SignalError::new(ErrorCode::InvalidMessage, e.to_string()))
            }
        };

        if let Err(err) = res {
            debug!("Request from {} failed: {}", from, err);
            self.inner.registry.send(&from, err.into());
        }
    }

    pub async fn dispatch(&self, from: PeerId, msg: ClientMessage) -> Result<(), SignalError> {
        debug!("{} -> {}", from, msg.kind());
        let coordinator = &self.inner.coordinator;

        match msg {
            ClientMessage::JoinRoom { room_id, secret } => {
                coordinator.join(from, &room_id, secret).await?;
            }

            ClientMessage::LeaveRoom => {
                if coordinator.leave(from, LeaveReason::Left).await.is_none() {
                    return Err(ErrorCode::NotInRoom.into());
                }
            }

            ClientMessage::ValidateRoom { room_id, secret } => {
                let room_id = coordinator.parse_room_id(&room_id)?;
                let error = coordinator.validate(&room_id, secret).await.err();
                self.inner.registry.send(
                    &from,
                    ServerMessage::RoomValidated {
                        room_id,
                        ok: error.is_none(),
                        error,
                    },
                );
            }

            ClientMessage::Offer { target_id, payload } => {
                self.relay(from, target_id, ServerMessage::OfferReceived {
                    from_id: from,
                    payload,
                })?;
            }

            ClientMessage::Answer { target_id, payload } => {
                self.relay(from, target_id, ServerMessage::AnswerReceived {
                    from_id: from,
                    payload,
                })?;
            }

            ClientMessage::Candidate { target_id, payload } => {
                self.relay(from, target_id, ServerMessage::CandidateReceived {
                    from_id: from,
                    payload,
                })?;
            }

            ClientMessage::ChatMessage { room_id, text } => {
                if text.chars().count() > self.inner.max_chat_len {
                    return Err(ErrorCode::MessageTooLarge.into());
                }
                coordinator.chat(from, &room_id, text).await?;
            }

            ClientMessage::ToggleLock { room_id } => {
                coordinator.toggle_lock(from, &room_id).await?;
            }

            ClientMessage::KickUser { room_id, target_id } => {
                coordinator.kick(from, &room_id, target_id).await?;
            }
        }

        Ok(())
    }

    /// Forwards a handshake frame to `target` if it is live and shares the
    /// sender's room. Anything else is dropped silently: handshakes routinely
    /// race with disconnects.
    fn relay(&self, from: PeerId, target: PeerId, msg: ServerMessage) -> Result<(), SignalError> {
        let registry = &self.inner.registry;

        let Some(room_id) = registry.current_room(&from) else {
            return Err(ErrorCode::NotInRoom.into());
        };

        if registry.current_room(&target).as_ref() != Some(&room_id) {
            debug!(room = %room_id, "Dropping handshake from {} to unreachable {}", from, target);
            return Ok(());
        }

        if !registry.send(&target, msg) {
            debug!(room = %room_id, "Handshake from {} to {} dropped", from, target);
        }
        Ok(())
    }
}
