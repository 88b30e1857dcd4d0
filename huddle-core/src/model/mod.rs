mod error;
mod peer;
mod room;
mod signaling;

pub use error::{ErrorCode, SignalError};
pub use peer::{ParsePeerIdError, PeerId};
pub use room::{InvalidRoomId, RoomId};
pub use signaling::{ClientMessage, IceServerConfig, LeaveReason, ServerMessage};
