//! Room registry and room actors for the Ludo server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's [`Room`](ludo_engine::Room) and processes one command at a
//! time, broadcasts included, before taking the next. That is the whole
//! of the per-room serialization: nothing else ever touches the room.
//!
//! # Key types
//!
//! - [`RoomManager`]: room codes, the participant → room map,
//!   create / join / leave
//! - [`RoomHandle`]: sends actions to a running room actor
//! - [`RoomAction`]: the in-room operations a player can request
//! - [`PlayerSender`]: where a room delivers a participant's messages

mod error;
mod manager;
mod room;

pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomAction, RoomHandle};
