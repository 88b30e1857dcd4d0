use crate::room::{Handoff, JoinOutcome, RoomCommand, RoomInfo};
use huddle_core::{ErrorCode, LeaveReason, PeerId, RoomId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

/// Cloneable address of a running room actor.
///
/// A send failing, or the reply being dropped, means the actor has shut down;
/// each method maps that to the answer a vanished room would give.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    generation: u64,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(room_id: RoomId, generation: u64, tx: mpsc::Sender<RoomCommand>) -> Self {
        Self {
            room_id,
            generation,
            tx,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Option<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.ok()?;
        rx.await.ok()
    }

    pub async fn join(
        &self,
        peer_id: PeerId,
        secret: Option<String>,
        handoff: Option<Handoff>,
    ) -> JoinOutcome {
        self.request(|reply| RoomCommand::Join {
            peer_id,
            secret,
            handoff,
            reply,
        })
        .await
        .unwrap_or(JoinOutcome::Retry)
    }

    pub async fn leave(&self, peer_id: PeerId, reason: LeaveReason) -> bool {
        self.request(|reply| RoomCommand::Leave {
            peer_id,
            reason,
            reply,
        })
        .await
        .unwrap_or(false)
    }

    /// Queues a leave without waiting. Called from inside another room's actor,
    /// which must not block on this room's queue.
    pub(crate) fn queue_leave(&self, peer_id: PeerId, reason: LeaveReason, reply: oneshot::Sender<bool>) {
        let cmd = RoomCommand::Leave {
            peer_id,
            reason,
            reply,
        };
        if let Err(TrySendError::Full(cmd)) = self.tx.try_send(cmd) {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(cmd).await;
            });
        }
    }

    pub async fn chat(&self, peer_id: PeerId, text: String) -> Result<(), ErrorCode> {
        self.request(|reply| RoomCommand::Chat {
            peer_id,
            text,
            reply,
        })
        .await
        .unwrap_or(Err(ErrorCode::NotInRoom))
    }

    pub async fn toggle_lock(&self, peer_id: PeerId) -> Result<bool, ErrorCode> {
        self.request(|reply| RoomCommand::ToggleLock { peer_id, reply })
            .await
            .unwrap_or(Err(ErrorCode::NotInRoom))
    }

    pub async fn set_locked(&self, locked: bool) {
        let _ = self.tx.send(RoomCommand::SetLocked { locked }).await;
    }

    pub async fn kick(&self, peer_id: PeerId, target_id: PeerId) -> Result<(), ErrorCode> {
        self.request(|reply| RoomCommand::Kick {
            peer_id,
            target_id,
            reply,
        })
        .await
        .unwrap_or(Err(ErrorCode::NotInRoom))
    }

    pub async fn validate(&self, secret: Option<String>) -> Result<(), ErrorCode> {
        self.request(|reply| RoomCommand::Validate { secret, reply })
            .await
            .unwrap_or(Err(ErrorCode::RoomNotFound))
    }

    pub async fn info(&self) -> Option<RoomInfo> {
        self.request(|reply| RoomCommand::Info { reply })
            .await
            .flatten()
    }

    pub async fn close(&self) {
        let _ = self.request(|reply| RoomCommand::Close { reply }).await;
    }
}
