use crate::model::error::{ErrorCode, SignalError};
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Frames a browser sends to the server.
///
/// Wire form is `{"op": "join-room", "d": {"roomId": "r1"}}`. Handshake
/// payloads are carried as arbitrary JSON and never inspected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    JoinRoom {
        room_id: String,
        #[serde(default)]
        secret: Option<String>,
    },
    LeaveRoom,
    ValidateRoom {
        room_id: String,
        #[serde(default)]
        secret: Option<String>,
    },
    Offer {
        target_id: PeerId,
        payload: Value,
    },
    Answer {
        target_id: PeerId,
        payload: Value,
    },
    Candidate {
        target_id: PeerId,
        payload: Value,
    },
    ChatMessage {
        room_id: String,
        text: String,
    },
    ToggleLock {
        room_id: String,
    },
    KickUser {
        room_id: String,
        target_id: PeerId,
    },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom => "leave-room",
            Self::ValidateRoom { .. } => "validate-room",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
            Self::ChatMessage { .. } => "chat-message",
            Self::ToggleLock { .. } => "toggle-lock",
            Self::KickUser { .. } => "kick-user",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LeaveReason {
    Left,
    Disconnected,
    Kicked,
}

/// Frames the server sends to a browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        peer_id: PeerId,
        ice_servers: Vec<IceServerConfig>,
    },
    RoomValidated {
        room_id: RoomId,
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorCode>,
    },
    /// Sent once to a connection that has just joined. `peers` excludes the
    /// receiver and is in join order.
    MembershipSnapshot {
        room_id: RoomId,
        peers: Vec<PeerId>,
        host: PeerId,
        locked: bool,
    },
    MemberJoined {
        peer_id: PeerId,
    },
    MemberLeft {
        peer_id: PeerId,
        reason: LeaveReason,
    },
    HostChanged {
        peer_id: PeerId,
    },
    OfferReceived {
        from_id: PeerId,
        payload: Value,
    },
    AnswerReceived {
        from_id: PeerId,
        payload: Value,
    },
    CandidateReceived {
        from_id: PeerId,
        payload: Value,
    },
    ChatMessage {
        sender_id: PeerId,
        text: String,
    },
    Locked,
    Unlocked,
    Kicked {
        room_id: RoomId,
    },
    RoomLeft {
        room_id: RoomId,
    },
    RoomClosed {
        room_id: RoomId,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl From<SignalError> for ServerMessage {
    fn from(err: SignalError) -> Self {
        Self::Error {
            code: err.code,
            message: err.message,
        }
    }
}
