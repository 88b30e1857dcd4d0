use crate::room::{RoomHandle, RoomInfo};
use huddle_core::{ErrorCode, LeaveReason, PeerId};
use tokio::sync::oneshot;

/// How a room answered a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// The connection was already a member; it got a fresh snapshot.
    AlreadyMember,
    Rejected(ErrorCode),
    /// The connection started disconnecting before it could be admitted.
    Cancelled,
    /// The room emptied and shut down while the request was queued.
    Retry,
}

/// The room a switching connection is still a member of. The new room queues
/// the departure itself once admission commits, so the connection is never
/// left without a room on a rejected switch.
#[derive(Debug)]
pub struct Handoff {
    pub from: RoomHandle,
    /// Answered by the previous room once the departure is processed.
    pub left: oneshot::Sender<bool>,
}

/// Requests handled, one at a time, by a room's actor.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        peer_id: PeerId,
        secret: Option<String>,
        handoff: Option<Handoff>,
        reply: oneshot::Sender<JoinOutcome>,
    },

    /// Also used for disconnects. Replies whether the peer was a member.
    Leave {
        peer_id: PeerId,
        reason: LeaveReason,
        reply: oneshot::Sender<bool>,
    },

    Chat {
        peer_id: PeerId,
        text: String,
        reply: oneshot::Sender<Result<(), ErrorCode>>,
    },

    /// Host only. Replies with the new lock state.
    ToggleLock {
        peer_id: PeerId,
        reply: oneshot::Sender<Result<bool, ErrorCode>>,
    },

    /// Administrative lock change, no host check.
    SetLocked { locked: bool },

    Kick {
        peer_id: PeerId,
        target_id: PeerId,
        reply: oneshot::Sender<Result<(), ErrorCode>>,
    },

    Validate {
        secret: Option<String>,
        reply: oneshot::Sender<Result<(), ErrorCode>>,
    },

    Info {
        reply: oneshot::Sender<Option<RoomInfo>>,
    },

    /// Releases every member and stops the actor.
    Close { reply: oneshot::Sender<()> },
}
