use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Caller-supplied room name. Rooms are addressed by this string, not by a
/// server-generated id.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRoomId {
    #[error("room id is empty")]
    Empty,
    #[error("room id is longer than {max} characters")]
    TooLong { max: usize },
    #[error("room id contains control characters")]
    ControlCharacters,
}

impl RoomId {
    /// Validates and wraps a room name. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, InvalidRoomId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidRoomId::Empty);
        }
        if trimmed.chars().count() > max_len {
            return Err(InvalidRoomId::TooLong { max: max_len });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidRoomId::ControlCharacters);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RoomId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
