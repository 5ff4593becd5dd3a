//! Wire protocol for the Ludo room server.
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the tagged
//!   JSON objects that travel over the socket.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, messages out.
//! - **Errors** ([`ProtocolError`]): what can go wrong in between.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer. It doesn't know about connections or rooms, only how a message
//! is spelled on the wire.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Rooms (game rules)
//! ```

mod codec;
mod error;
mod message;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{INVALID_MESSAGE_FORMAT, ProtocolError};
pub use message::{ClientMessage, ServerMessage};
