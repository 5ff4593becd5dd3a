//! # Ludo
//!
//! Authoritative WebSocket server for multiplayer Ludo.
//!
//! Players create or join rooms by a six-character code, pick colours,
//! ready up and play on one server-side board per room. Every client
//! message is checked against the rules in [`ludo_engine`], and every
//! accepted change is broadcast to the whole room as a full snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ludo::prelude::*;
//!
//! # async fn start() -> Result<(), LudoError> {
//! let server = LudoServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::LudoError;
pub use server::{DEFAULT_BIND_ADDR, LudoServer, LudoServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{LudoError, LudoServer, LudoServerBuilder};

    pub use ludo_engine::{
        Color, GameError, GameMode, GamePiece, GameState, ParticipantId,
        PieceId, Player, Room, RoomCode, TurnPhase,
    };
    pub use ludo_protocol::{
        ClientMessage, Codec, INVALID_MESSAGE_FORMAT, JsonCodec,
        ProtocolError, ServerMessage,
    };
    pub use ludo_room::RoomError;
    pub use ludo_transport::TransportError;
}
