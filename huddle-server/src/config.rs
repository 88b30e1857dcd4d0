use huddle_core::IceServerConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Runtime settings for the signaling server.
///
/// Every field has a default, so an empty TOML file (or none at all) yields a
/// working server on port 3000.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HuddleConfig {
    pub bind: SocketAddr,
    /// Handed to every client in its `welcome` frame.
    pub ice_servers: Vec<IceServerConfig>,
    /// When false, rooms must be created over HTTP before anyone can join.
    pub auto_create_rooms: bool,
    /// Deliver chat messages back to their sender as well.
    pub echo_chat: bool,
    pub room_queue_capacity: usize,
    pub max_room_id_len: usize,
    pub max_chat_len: usize,
    pub max_frame_bytes: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
    #[error("ice server entry {0} has no urls")]
    EmptyIceServer(usize),
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            auto_create_rooms: true,
            echo_chat: false,
            room_queue_capacity: 100,
            max_room_id_len: 64,
            max_chat_len: 4096,
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl HuddleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("room_queue_capacity", self.room_queue_capacity),
            ("max_room_id_len", self.max_room_id_len),
            ("max_chat_len", self.max_chat_len),
            ("max_frame_bytes", self.max_frame_bytes),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        if let Some(idx) = self.ice_servers.iter().position(|s| s.urls.is_empty()) {
            return Err(ConfigError::EmptyIceServer(idx));
        }

        Ok(())
    }
}
