//! The data that makes up one room: players, colours, pieces and the
//! per-game turn bookkeeping.
//!
//! Everything here serializes straight onto the wire as the room
//! snapshot clients render from, so field names follow the camelCase
//! shape the browser client expects.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::movement::BASE;
use crate::GameError;

/// Length of a room code.
pub const CODE_LEN: usize = 6;

/// Characters a generated room code is drawn from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Longest display name a player may use, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Pieces each claimed colour gets when a game starts.
pub const PIECES_PER_COLOR: usize = 4;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Stable identity of one connected participant.
///
/// Opaque to the rules: it is issued once per connection and only ever
/// compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Draws a fresh 20-character lowercase hex id.
    pub fn random(rng: &mut impl Rng) -> Self {
        let bytes: [u8; 10] = rng.random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six-character code players share to find a room.
///
/// Always uppercase ASCII alphanumerics. Client input goes through
/// [`RoomCode::parse`], which normalizes case before validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Draws a random code. Uniqueness is the registry's job.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| {
                CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]
                    as char
            })
            .collect();
        Self(code)
    }

    /// Normalizes user input into a code, or `None` if it can't be one.
    pub fn parse(input: &str) -> Option<Self> {
        let code = input.trim().to_ascii_uppercase();
        let valid = code.len() == CODE_LEN
            && code.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then_some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Colours and modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] =
        [Color::Red, Color::Green, Color::Yellow, Color::Blue];

    /// Absolute track cell this colour enters the board on.
    pub fn track_offset(self) -> i32 {
        match self {
            Self::Red => 0,
            Self::Green => 13,
            Self::Yellow => 26,
            Self::Blue => 39,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "2-player")]
    TwoPlayer,
    #[serde(rename = "4-player")]
    FourPlayer,
}

impl GameMode {
    /// Maximum number of seated players.
    pub fn capacity(self) -> usize {
        match self {
            Self::TwoPlayer => 2,
            Self::FourPlayer => 4,
        }
    }

    /// Colours a player may claim in this mode. Two-player games use
    /// opposite corners.
    pub fn colors(self) -> &'static [Color] {
        match self {
            Self::TwoPlayer => &[Color::Red, Color::Yellow],
            Self::FourPlayer => &Color::ALL,
        }
    }

    pub fn allows(self, color: Color) -> bool {
        self.colors().contains(&color)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoPlayer => f.write_str("2-player"),
            Self::FourPlayer => f.write_str("4-player"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pieces
// ---------------------------------------------------------------------------

/// `<color>-<index>`, e.g. `red-0` .. `red-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    pub fn new(color: Color, index: usize) -> Self {
        Self(format!("{color}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PieceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of a colour's four tokens.
///
/// `position` is relative to the colour's own start cell; see
/// [`crate::movement`] for the ranges and what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePiece {
    pub(crate) id: PieceId,
    pub(crate) color: Color,
    pub(crate) position: i32,
    pub(crate) is_safe: bool,
}

impl GamePiece {
    /// A piece sitting in its colour's base.
    pub fn in_base(color: Color, index: usize) -> Self {
        Self {
            id: PieceId::new(color, index),
            color,
            position: BASE,
            is_safe: true,
        }
    }

    pub fn id(&self) -> &PieceId {
        &self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn is_safe(&self) -> bool {
        self.is_safe
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub(crate) id: ParticipantId,
    pub(crate) name: String,
    pub(crate) color: Option<Color>,
    pub(crate) is_ready: bool,
}

impl Player {
    /// A freshly seated player: no colour, not ready.
    ///
    /// The name is trimmed and must then be 1-20 characters long.
    pub fn new(id: ParticipantId, name: &str) -> Result<Self, GameError> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(GameError::InvalidPlayerName);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            color: None,
            is_ready: false,
        })
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Where a room is in its turn cycle.
///
/// ```text
/// Lobby → AwaitingRoll ⇄ AwaitingMove
///               ↓              ↓
///            GameOver ←────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Not started; players are choosing colours.
    Lobby,
    /// The active player must roll.
    AwaitingRoll,
    /// A roll is recorded and the active player owes a move.
    AwaitingMove,
    /// A colour has brought all four pieces home.
    GameOver,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::AwaitingRoll => write!(f, "AwaitingRoll"),
            Self::AwaitingMove => write!(f, "AwaitingMove"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

/// Per-room game bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) pieces: Vec<GamePiece>,
    pub(crate) current_turn_index: usize,
    /// Value rolled this turn that has not been spent yet.
    pub(crate) current_roll: Option<u8>,
    /// Final roll of the previous turn, fed to the dice bias.
    pub(crate) last_roll_of_previous_player: Option<u8>,
    pub(crate) is_first_roll_this_turn: bool,
    /// A roll happened and the active player owes a move.
    pub(crate) move_pending: bool,
    pub(crate) winner: Option<Color>,
    pub(crate) game_started: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            current_turn_index: 0,
            current_roll: None,
            last_roll_of_previous_player: None,
            is_first_roll_this_turn: true,
            move_pending: false,
            winner: None,
            game_started: false,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        if !self.game_started {
            TurnPhase::Lobby
        } else if self.winner.is_some() {
            TurnPhase::GameOver
        } else if self.move_pending {
            TurnPhase::AwaitingMove
        } else {
            TurnPhase::AwaitingRoll
        }
    }

    pub fn pieces(&self) -> &[GamePiece] {
        &self.pieces
    }

    pub fn piece(&self, id: &PieceId) -> Option<&GamePiece> {
        self.pieces.iter().find(|p| &p.id == id)
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn current_roll(&self) -> Option<u8> {
        self.current_roll
    }

    pub fn last_roll_of_previous_player(&self) -> Option<u8> {
        self.last_roll_of_previous_player
    }

    pub fn is_first_roll_this_turn(&self) -> bool {
        self.is_first_roll_this_turn
    }

    pub fn move_pending(&self) -> bool {
        self.move_pending
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One game session.
///
/// Player order is join order, which is also turn order; the first
/// player is the host. Mutation goes through the lobby operations in
/// [`crate::lobby`] and the turn operations in [`crate::turn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) players: Vec<Player>,
    pub(crate) game_mode: GameMode,
    pub(crate) game_state: GameState,
    pub(crate) created_at: DateTime<Utc>,
}

impl Room {
    /// Opens a room with `host` as its only player.
    pub fn new(code: RoomCode, game_mode: GameMode, host: Player) -> Self {
        Self {
            code,
            players: vec![host],
            game_mode,
            game_state: GameState::new(),
            created_at: Utc::now(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn player(&self, id: &ParticipantId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The player whose turn it is, once the game has started.
    pub fn active_player(&self) -> Option<&Player> {
        if !self.game_state.game_started {
            return None;
        }
        self.players.get(self.game_state.current_turn_index)
    }

    pub fn active_color(&self) -> Option<Color> {
        self.active_player().and_then(Player::color)
    }

    pub(crate) fn player_mut(
        &mut self,
        id: &ParticipantId,
    ) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }
}
