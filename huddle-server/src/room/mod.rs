mod room;
mod room_command;
mod room_directory;
mod room_handle;
mod room_state;

pub use room::*;
pub use room_command::*;
pub use room_directory::{RoomDirectory, RoomError};
pub use room_handle::*;
pub use room_state::*;
