//! Rules engine for Ludo rooms.
//!
//! Everything here is synchronous and free of I/O: a [`Room`] is plain
//! data, and the operations on it either succeed or return a
//! [`GameError`] without touching the room. The networking and
//! concurrency layers drive it from above.
//!
//! - [`model`]: rooms, players, colours, pieces, game state
//! - [`dice`]: the weighted die and its bias rules
//! - [`movement`]: legality, captures, finishing
//! - [`lobby`]: seating, colour claims, readiness, starting
//! - [`turn`]: roll / move / pass-the-turn state machine

pub mod dice;
mod error;
pub mod lobby;
pub mod model;
pub mod movement;
pub mod turn;

pub use dice::{DieWeights, RollContext, roll_weighted_die};
pub use error::GameError;
pub use model::{
    Color, GameMode, GamePiece, GameState, ParticipantId, PieceId, Player,
    Room, RoomCode, TurnPhase,
};
pub use movement::MoveOutcome;
pub use turn::RollOutcome;
