//! Unified error type for the Ludo server.

use ludo_protocol::ProtocolError;
use ludo_room::RoomError;
use ludo_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` lift layer errors into it.
#[derive(Debug, thiserror::Error)]
pub enum LudoError {
    /// Binding, accepting, or talking to a socket.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding or decoding a message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry or room operation was rejected.
    #[error(transparent)]
    Room(#[from] RoomError),
}
