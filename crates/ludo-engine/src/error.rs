//! Error types for the rules layer.

/// A rule violation raised by a room's lobby or turn operations.
///
/// The `Display` text is what the offending participant sees, so it is
/// written for players rather than for logs. None of these are fatal:
/// the room is left exactly as it was before the rejected operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The room already holds as many players as its mode allows.
    #[error("Room is full")]
    RoomFull,

    /// Joining, recolouring or starting after the game has begun.
    #[error("Game already started")]
    GameAlreadyStarted,

    /// The colour does not exist in this room's game mode
    /// (two-player rooms only offer red and yellow).
    #[error("Color not available in this game mode")]
    ColorUnavailable,

    /// Another player in the room already holds this colour.
    #[error("Color already taken")]
    ColorTaken,

    /// Start was requested before every seated player picked a colour
    /// and marked ready, or with too few players.
    #[error("Not all players are ready")]
    NotAllReady,

    /// Roll or move before the game was started.
    #[error("Game has not started")]
    GameNotStarted,

    /// Roll or move after a winner was recorded.
    #[error("Game is over")]
    GameOver,

    #[error("Not your turn")]
    NotYourTurn,

    /// A roll is already waiting to be spent on a move.
    #[error("Already rolled")]
    AlreadyRolled,

    #[error("Must roll first")]
    MustRollFirst,

    /// Unknown piece id, or a piece of another colour.
    #[error("Invalid piece")]
    InvalidPiece,

    /// The piece exists but cannot move with the current roll.
    #[error("Invalid move")]
    InvalidMove,

    #[error("Player name must be 1-20 characters")]
    InvalidPlayerName,

    /// The participant is not seated in this room.
    #[error("Player is not in this room")]
    UnknownPlayer,
}
