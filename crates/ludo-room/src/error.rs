//! Error types for the room layer.

use ludo_engine::{GameError, RoomCode};

/// Errors that can occur during registry or room operations.
///
/// Like [`GameError`], the `Display` text is what the offending
/// participant is shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room answers to this code. Carries the code as typed.
    #[error("Room not found")]
    NotFound(String),

    /// A room-scoped action from a participant with no seat.
    #[error("Not in a room")]
    NotInRoom,

    /// Create or join from a participant who already has a seat.
    #[error("Already in a room")]
    AlreadyInRoom,

    /// The room's rules rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The room's actor stopped between lookup and delivery.
    #[error("Room {0} is no longer available")]
    Unavailable(RoomCode),
}
