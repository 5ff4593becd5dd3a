//! Room manager: creates rooms, tracks who sits where, and routes
//! participants to their room's actor.

use std::collections::HashMap;

use ludo_engine::{GameMode, ParticipantId, Player, Room, RoomCode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomError, RoomHandle};

/// Command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// The room registry.
///
/// A participant sits in at most one room at a time, and every code in
/// `participant_rooms` names a room in `rooms`. The registry lock is
/// never held while waiting on a room actor, so a busy room cannot hold
/// up create, join or leave anywhere else.
pub struct RoomManager {
    registry: Mutex<Registry>,
}

struct Registry {
    rooms: HashMap<RoomCode, RoomHandle>,
    participant_rooms: HashMap<ParticipantId, RoomCode>,
    /// Draws room codes and seeds each room's dice.
    rng: StdRng,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// A manager whose codes and dice are reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            registry: Mutex::new(Registry {
                rooms: HashMap::new(),
                participant_rooms: HashMap::new(),
                rng,
            }),
        }
    }

    /// Opens a room with `participant` as host and sole player.
    ///
    /// The host receives `room_created` on `sender`.
    pub async fn create_room(
        &self,
        participant: ParticipantId,
        name: &str,
        mode: GameMode,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        let mut registry = self.registry.lock().await;
        if registry.participant_rooms.contains_key(&participant) {
            return Err(RoomError::AlreadyInRoom);
        }
        let host = Player::new(participant.clone(), name)?;

        let code = registry.generate_unique_code();
        let room = Room::new(code.clone(), mode, host);
        let room_rng = StdRng::from_rng(&mut registry.rng);
        let handle = spawn_room(room, sender, room_rng, DEFAULT_CHANNEL_SIZE);

        registry.rooms.insert(code.clone(), handle);
        registry
            .participant_rooms
            .insert(participant.clone(), code.clone());
        tracing::info!(room = %code, %participant, %mode, "room created");
        Ok(code)
    }

    /// Seats `participant` in the room named by `code_input`.
    ///
    /// The code is matched case-insensitively and with surrounding
    /// whitespace ignored. The joiner receives `room_joined`, everyone
    /// else `room_updated`.
    pub async fn join_room(
        &self,
        code_input: &str,
        participant: ParticipantId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        let (handle, player) = {
            let mut registry = self.registry.lock().await;
            if registry.participant_rooms.contains_key(&participant) {
                return Err(RoomError::AlreadyInRoom);
            }

            let handle = RoomCode::parse(code_input)
                .and_then(|code| registry.rooms.get(&code))
                .cloned()
                .ok_or_else(|| RoomError::NotFound(code_input.trim().to_string()))?;
            let player = Player::new(participant.clone(), name)?;

            // Reserve the seat so a second create or join for the same
            // participant fails while the room is deciding.
            registry
                .participant_rooms
                .insert(participant.clone(), handle.code().clone());
            (handle, player)
        };

        let code = handle.code().clone();
        if let Err(e) = handle.join(player, sender).await {
            let mut registry = self.registry.lock().await;
            if registry.participant_rooms.get(&participant) == Some(&code) {
                registry.participant_rooms.remove(&participant);
            }
            return Err(e);
        }
        Ok(code)
    }

    /// Removes `participant` from their room, destroying the room if
    /// they were the last one in it.
    ///
    /// Returns the room they left, or `None` if they had no seat.
    pub async fn leave_room(&self, participant: &ParticipantId) -> Option<RoomCode> {
        let (code, handle) = {
            let mut registry = self.registry.lock().await;
            let code = registry.participant_rooms.remove(participant)?;
            let handle = registry.rooms.get(&code)?.clone();
            (code, handle)
        };

        // An actor that is already gone has no players left either. An
        // emptied actor stops, so nobody can join it after this point.
        let remaining = handle.leave(participant.clone()).await.unwrap_or(0);
        if remaining == 0 {
            self.registry.lock().await.rooms.remove(&code);
            tracing::info!(room = %code, "room destroyed");
        }
        Some(code)
    }

    /// The handle of the room `participant` is seated in.
    ///
    /// Callers act on the handle after the registry lock is released.
    pub async fn handle_for(
        &self,
        participant: &ParticipantId,
    ) -> Result<RoomHandle, RoomError> {
        let registry = self.registry.lock().await;
        registry
            .participant_rooms
            .get(participant)
            .and_then(|code| registry.rooms.get(code))
            .cloned()
            .ok_or(RoomError::NotInRoom)
    }

    /// A copy of the room with this code.
    pub async fn snapshot(&self, code: &RoomCode) -> Result<Room, RoomError> {
        let handle = self
            .registry
            .lock()
            .await
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;
        handle.snapshot().await
    }

    pub async fn player_room(&self, participant: &ParticipantId) -> Option<RoomCode> {
        self.registry
            .lock()
            .await
            .participant_rooms
            .get(participant)
            .cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    fn generate_unique_code(&mut self) -> RoomCode {
        loop {
            let code = RoomCode::generate(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
            tracing::debug!(%code, "room code already in use, regenerating");
        }
    }
}
