use crate::registry::ConnectionRegistry;
use crate::room::room_directory::RoomTable;
use crate::room::{Handoff, JoinOutcome, RoomCommand, RoomState};
use huddle_core::{ErrorCode, LeaveReason, PeerId, ServerMessage};
use std::sync::Weak;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    pub echo_chat: bool,
    pub queue_capacity: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            echo_chat: false,
            queue_capacity: 100,
        }
    }
}

/// Single writer for one room. Every join, leave, lock change and broadcast
/// for the room happens inside `run`, so all members observe one linear
/// history of membership events.
pub struct Room {
    state: RoomState,
    generation: u64,
    command_rx: mpsc::Receiver<RoomCommand>,
    registry: ConnectionRegistry,
    table: Weak<RoomTable>,
    settings: RoomSettings,
    retired: bool,
}

impl Room {
    pub(crate) fn new(
        state: RoomState,
        generation: u64,
        command_rx: mpsc::Receiver<RoomCommand>,
        registry: ConnectionRegistry,
        table: Weak<RoomTable>,
        settings: RoomSettings,
    ) -> Self {
        Self {
            state,
            generation,
            command_rx,
            registry,
            table,
            settings,
            retired: false,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.state.id(), "Room event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            if !self.handle_command(cmd) {
                break;
            }
            if !self.retired && self.state.should_retire() {
                self.retire();
            }
        }

        info!(room = %self.state.id(), "Room event loop finished");
    }

    /// Returns false when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                peer_id,
                secret,
                handoff,
                reply,
            } => {
                let outcome = self.join(peer_id, secret.as_deref(), handoff);
                let _ = reply.send(outcome);
            }

            RoomCommand::Leave {
                peer_id,
                reason,
                reply,
            } => {
                let was_member = self.leave(&peer_id, reason);
                let _ = reply.send(was_member);
            }

            RoomCommand::Chat {
                peer_id,
                text,
                reply,
            } => {
                let _ = reply.send(self.chat(peer_id, text));
            }

            RoomCommand::ToggleLock { peer_id, reply } => {
                let res = self.state.authorize_host(&peer_id).map(|()| {
                    let locked = self.state.toggle_lock();
                    info!(room = %self.state.id(), locked, "Host {} toggled lock", peer_id);
                    self.broadcast_all(&self.state.lock_event());
                    locked
                });
                let _ = reply.send(res);
            }

            RoomCommand::SetLocked { locked } => {
                if self.state.set_locked(locked) {
                    self.broadcast_all(&self.state.lock_event());
                }
            }

            RoomCommand::Kick {
                peer_id,
                target_id,
                reply,
            } => {
                let _ = reply.send(self.kick(peer_id, target_id));
            }

            RoomCommand::Validate { secret, reply } => {
                let res = if self.retired {
                    Err(ErrorCode::RoomNotFound)
                } else {
                    self.state.check_secret(secret.as_deref())
                };
                let _ = reply.send(res);
            }

            RoomCommand::Info { reply } => {
                let info = (!self.retired).then(|| self.state.info());
                let _ = reply.send(info);
            }

            RoomCommand::Close { reply } => {
                self.close();
                let _ = reply.send(());
                return false;
            }
        }

        true
    }

    fn join(&mut self, peer_id: PeerId, secret: Option<&str>, handoff: Option<Handoff>) -> JoinOutcome {
        let room_id = self.state.id().clone();

        if self.state.is_member(&peer_id) {
            debug!(room = %room_id, "{} re-joined, resending snapshot", peer_id);
            self.registry.send(&peer_id, self.state.snapshot_for(&peer_id));
            return JoinOutcome::AlreadyMember;
        }

        if self.retired {
            return JoinOutcome::Retry;
        }

        if let Err(code) = self.state.check_admission(secret) {
            info!(room = %room_id, "Join by {} rejected: {}", peer_id, code);
            return JoinOutcome::Rejected(code);
        }

        let committed = match &handoff {
            Some(handoff) => self
                .registry
                .commit_switch(&peer_id, handoff.from.room_id(), &room_id),
            None => self.registry.commit_join(&peer_id, &room_id),
        };
        if !committed {
            debug!(room = %room_id, "{} went away before admission", peer_id);
            return JoinOutcome::Cancelled;
        }

        self.state.push_member(peer_id);
        info!(
            room = %room_id,
            members = self.state.members().len(),
            "{} joined",
            peer_id
        );

        self.registry
            .send(&peer_id, self.state.snapshot_for(&peer_id));
        self.registry.broadcast(
            self.state.others(&peer_id),
            &ServerMessage::MemberJoined { peer_id },
        );

        if let Some(Handoff { from, left }) = handoff {
            debug!(room = %room_id, "{} switched in from {}", peer_id, from.room_id());
            from.queue_leave(peer_id, LeaveReason::Left, left);
        }

        JoinOutcome::Joined
    }

    fn leave(&mut self, peer_id: &PeerId, reason: LeaveReason) -> bool {
        let room_id = self.state.id().clone();
        let Some(departure) = self.state.remove_member(peer_id) else {
            return false;
        };

        self.registry.clear_room(peer_id, &room_id);
        if reason == LeaveReason::Left {
            self.registry.send(peer_id, ServerMessage::RoomLeft { room_id: room_id.clone() });
        }

        info!(room = %room_id, ?reason, "{} left", peer_id);
        self.announce_departure(*peer_id, reason, departure.new_host);
        true
    }

    fn kick(&mut self, peer_id: PeerId, target_id: PeerId) -> Result<(), ErrorCode> {
        self.state.authorize_host(&peer_id)?;
        if target_id == peer_id {
            return Err(ErrorCode::InvalidRequest);
        }
        if !self.state.is_member(&target_id) {
            return Err(ErrorCode::TargetNotInRoom);
        }

        let room_id = self.state.id().clone();
        self.registry.send(
            &target_id,
            ServerMessage::Kicked {
                room_id: room_id.clone(),
            },
        );

        let departure = self.state.remove_member(&target_id);
        self.registry.clear_room(&target_id, &room_id);

        info!(room = %room_id, "{} was kicked by {}", target_id, peer_id);
        self.announce_departure(
            target_id,
            LeaveReason::Kicked,
            departure.and_then(|d| d.new_host),
        );
        Ok(())
    }

    fn chat(&self, peer_id: PeerId, text: String) -> Result<(), ErrorCode> {
        if !self.state.is_member(&peer_id) {
            return Err(ErrorCode::NotInRoom);
        }

        let msg = ServerMessage::ChatMessage {
            sender_id: peer_id,
            text,
        };
        if self.settings.echo_chat {
            self.broadcast_all(&msg);
        } else {
            self.registry.broadcast(self.state.others(&peer_id), &msg);
        }
        Ok(())
    }

    fn announce_departure(&self, peer_id: PeerId, reason: LeaveReason, new_host: Option<PeerId>) {
        self.broadcast_all(&ServerMessage::MemberLeft { peer_id, reason });
        if let Some(host) = new_host {
            info!(room = %self.state.id(), "{} is now host", host);
            self.broadcast_all(&ServerMessage::HostChanged { peer_id: host });
        }
    }

    fn broadcast_all(&self, msg: &ServerMessage) {
        self.registry.broadcast(self.state.members(), msg);
    }

    fn close(&mut self) {
        let room_id = self.state.id().clone();
        let members: Vec<PeerId> = self.state.members().to_vec();

        for peer_id in &members {
            self.state.remove_member(peer_id);
            self.registry.clear_room(peer_id, &room_id);
            self.registry.send(
                peer_id,
                ServerMessage::RoomClosed {
                    room_id: room_id.clone(),
                },
            );
        }

        info!(room = %room_id, released = members.len(), "Room closed");
        self.retire();
    }

    /// Removes this actor from the directory, unless a newer room with the same
    /// id has already replaced it. Joins still queued afterwards get `Retry`.
    fn retire(&mut self) {
        self.retired = true;

        let Some(table) = self.table.upgrade() else {
            return;
        };
        let generation = self.generation;
        let removed = table
            .remove_if(self.state.id(), |_, handle| handle.generation() == generation)
            .is_some();

        if removed {
            debug!(room = %self.state.id(), "Room retired from directory");
        } else {
            warn!(room = %self.state.id(), "Retiring room was no longer in the directory");
        }
    }
}
