//! Messages that travel between browser clients and the server.
//!
//! Both directions use internally tagged JSON objects: a snake_case
//! `type` tag next to camelCase fields, e.g.
//!
//! ```text
//! {"type": "join", "roomCode": "AB12CD", "playerName": "Ann"}
//! {"type": "room_updated", "room": { ... }}
//! ```
//!
//! Each enum is a closed set, so the router matches exhaustively and an
//! unknown tag fails to decode instead of falling through.

use ludo_engine::{Color, GameMode, GamePiece, ParticipantId, PieceId, Room};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Open a new room with the sender as host.
    Create {
        player_name: String,
        game_mode: GameMode,
    },

    /// Take a seat in an existing room. The code is matched
    /// case-insensitively.
    Join {
        room_code: String,
        player_name: String,
    },

    ChooseColor { color: Color },

    /// Mark the sender ready (only takes effect once they hold a colour).
    Ready,

    StartGame,

    RollDice,

    MovePiece { piece_id: PieceId },

    /// Give up the seat. Closing the connection does the same.
    Leave,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server can tell a client.
///
/// Every variant but `Error` carries the full room snapshot, so a
/// client can always re-render from the latest message alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent only to the creator. `player_id` is their own identity.
    RoomCreated { room: Room, player_id: ParticipantId },

    /// Sent only to the player who just joined.
    RoomJoined { room: Room, player_id: ParticipantId },

    /// The room changed; sent to everyone in it.
    RoomUpdated { room: Room },

    GameStarted { room: Room },

    /// Follows the `RoomUpdated` of a move that sent a piece home.
    PieceCaptured { captured_piece: GamePiece, room: Room },

    /// The sender's last message was rejected. Only the sender sees it.
    Error { message: String },
}

impl ServerMessage {
    /// Builds an `Error` from anything printable.
    pub fn error(message: impl ToString) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    /// The room snapshot this message carries, if any.
    pub fn room(&self) -> Option<&Room> {
        match self {
            Self::RoomCreated { room, .. }
            | Self::RoomJoined { room, .. }
            | Self::RoomUpdated { room }
            | Self::GameStarted { room }
            | Self::PieceCaptured { room, .. } => Some(room),
            Self::Error { .. } => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these shapes directly, so the tests pin
    //! the JSON layout rather than round-tripping through Rust.

    use ludo_engine::{GameError, Player, RoomCode};
    use serde_json::json;

    use super::*;

    fn decode(value: serde_json::Value) -> Result<ClientMessage, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn sample_room() -> Room {
        let host = Player::new(ParticipantId::new("abc"), "Ann").unwrap();
        Room::new(RoomCode::parse("ZZ99AA").unwrap(), GameMode::FourPlayer, host)
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_client_create_decodes_camel_case_fields() {
        let msg = decode(json!({
            "type": "create",
            "playerName": "Ann",
            "gameMode": "4-player"
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Create {
                player_name: "Ann".into(),
                game_mode: GameMode::FourPlayer,
            }
        );
    }

    #[test]
    fn test_client_join_decodes() {
        let msg = decode(json!({
            "type": "join",
            "roomCode": "ab12cd",
            "playerName": "Bo"
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                room_code: "ab12cd".into(),
                player_name: "Bo".into(),
            }
        );
    }

    #[test]
    fn test_client_choose_color_decodes_lowercase() {
        let msg = decode(json!({"type": "choose_color", "color": "yellow"}))
            .unwrap();
        assert_eq!(msg, ClientMessage::ChooseColor { color: Color::Yellow });
    }

    #[test]
    fn test_client_unit_messages_decode_from_tag_only() {
        assert_eq!(decode(json!({"type": "ready"})).unwrap(), ClientMessage::Ready);
        assert_eq!(
            decode(json!({"type": "start_game"})).unwrap(),
            ClientMessage::StartGame
        );
        assert_eq!(
            decode(json!({"type": "roll_dice"})).unwrap(),
            ClientMessage::RollDice
        );
        assert_eq!(decode(json!({"type": "leave"})).unwrap(), ClientMessage::Leave);
    }

    #[test]
    fn test_client_move_piece_decodes() {
        let msg =
            decode(json!({"type": "move_piece", "pieceId": "red-2"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MovePiece {
                piece_id: PieceId::from("red-2")
            }
        );
    }

    #[test]
    fn test_client_unknown_color_fails() {
        assert!(decode(json!({"type": "choose_color", "color": "purple"})).is_err());
    }

    #[test]
    fn test_client_unknown_mode_fails() {
        assert!(
            decode(json!({"type": "create", "playerName": "A", "gameMode": "3-player"}))
                .is_err()
        );
    }

    #[test]
    fn test_client_missing_field_fails() {
        assert!(decode(json!({"type": "join", "roomCode": "AB12CD"})).is_err());
    }

    #[test]
    fn test_client_missing_tag_fails() {
        assert!(decode(json!({"playerName": "A"})).is_err());
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_server_room_created_json_format() {
        let msg = ServerMessage::RoomCreated {
            room: sample_room(),
            player_id: ParticipantId::new("abc"),
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "room_created");
        assert_eq!(json["playerId"], "abc");
        assert_eq!(json["room"]["code"], "ZZ99AA");
        assert_eq!(json["room"]["gameMode"], "4-player");
    }

    #[test]
    fn test_server_piece_captured_json_format() {
        let msg = ServerMessage::PieceCaptured {
            captured_piece: GamePiece::in_base(Color::Blue, 0),
            room: sample_room(),
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "piece_captured");
        assert_eq!(json["capturedPiece"]["id"], "blue-0");
        assert!(json["room"].is_object());
    }

    #[test]
    fn test_server_error_json_format() {
        let json =
            serde_json::to_value(ServerMessage::error(GameError::NotYourTurn))
                .unwrap();
        assert_eq!(json, json!({"type": "error", "message": "Not your turn"}));
    }

    #[test]
    fn test_server_room_accessor() {
        let msg = ServerMessage::GameStarted { room: sample_room() };
        assert_eq!(msg.room().unwrap().code().as_str(), "ZZ99AA");
        assert!(ServerMessage::error("x").room().is_none());
    }

    #[test]
    fn test_server_message_decodes_back() {
        let msg = ServerMessage::RoomUpdated { room: sample_room() };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }
}
