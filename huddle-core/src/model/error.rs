use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable reason attached to every `error` frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RoomNotFound,
    WrongSecret,
    RoomLocked,
    NotAuthorized,
    NotInRoom,
    TargetNotInRoom,
    InvalidRoomId,
    InvalidMessage,
    InvalidRequest,
    MessageTooLarge,
    RoomUnavailable,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomNotFound => "room-not-found",
            Self::WrongSecret => "wrong-secret",
            Self::RoomLocked => "room-locked",
            Self::NotAuthorized => "not-authorized",
            Self::NotInRoom => "not-in-room",
            Self::TargetNotInRoom => "target-not-in-room",
            Self::InvalidRoomId => "invalid-room-id",
            Self::InvalidMessage => "invalid-message",
            Self::InvalidRequest => "invalid-request",
            Self::MessageTooLarge => "message-too-large",
            Self::RoomUnavailable => "room-unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request rejected for one connection. Never affects other participants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct SignalError {
    pub code: ErrorCode,
    pub message: String,
}

impl SignalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for SignalError {
    fn from(code: ErrorCode) -> Self {
        let message = match code {
            ErrorCode::RoomNotFound => "no such room",
            ErrorCode::WrongSecret => "wrong room secret",
            ErrorCode::RoomLocked => "room is locked",
            ErrorCode::NotAuthorized => "only the room host may do that",
            ErrorCode::NotInRoom => "not a member of that room",
            ErrorCode::TargetNotInRoom => "target is not a member of the room",
            ErrorCode::InvalidRoomId => "invalid room id",
            ErrorCode::InvalidMessage => "malformed message",
            ErrorCode::InvalidRequest => "request not allowed in this state",
            ErrorCode::MessageTooLarge => "message too large",
            ErrorCode::RoomUnavailable => "room is shutting down, try again",
        };
        Self::new(code, message)
    }
}
