//! Seating rules: who may join, colour claims, readiness and starting.

use tracing::info;

use crate::model::{GamePiece, GameState, PIECES_PER_COLOR, ParticipantId, Player, Room};
use crate::{Color, GameError};

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;

impl Room {
    /// Seats a new player at the end of the turn order.
    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.players.len() >= self.game_mode.capacity() {
            return Err(GameError::RoomFull);
        }
        if self.game_state.game_started {
            return Err(GameError::GameAlreadyStarted);
        }
        self.players.push(player);
        Ok(())
    }

    /// Removes a player, keeping the turn pointer on a live seat.
    ///
    /// Pieces of a player who leaves mid-game stay where they are. If the
    /// active player leaves, the turn passes to whoever now holds that
    /// seat with a clean slate (no pending roll, first roll of the turn).
    pub fn remove_player(&mut self, id: &ParticipantId) -> Option<Player> {
        let index = self.players.iter().position(|p| &p.id == id)?;
        let player = self.players.remove(index);

        let state = &mut self.game_state;
        if self.players.is_empty() {
            state.current_turn_index = 0;
        } else if index < state.current_turn_index {
            state.current_turn_index -= 1;
        } else if index == state.current_turn_index {
            state.current_turn_index %= self.players.len();
            state.current_roll = None;
            state.move_pending = false;
            state.is_first_roll_this_turn = true;
        }

        Some(player)
    }

    /// Claims `color` for a player, replacing any colour they held.
    pub fn choose_color(
        &mut self,
        id: &ParticipantId,
        color: Color,
    ) -> Result<(), GameError> {
        if self.game_state.game_started {
            return Err(GameError::GameAlreadyStarted);
        }
        if !self.game_mode.allows(color) {
            return Err(GameError::ColorUnavailable);
        }
        let taken = self
            .players
            .iter()
            .any(|p| &p.id != id && p.color == Some(color));
        if taken {
            return Err(GameError::ColorTaken);
        }

        let player = self.player_mut(id).ok_or(GameError::UnknownPlayer)?;
        player.color = Some(color);
        Ok(())
    }

    /// Marks a player ready. Without a colour this quietly does nothing.
    ///
    /// Returns whether the player is now ready.
    pub fn set_ready(&mut self, id: &ParticipantId) -> Result<bool, GameError> {
        let player = self.player_mut(id).ok_or(GameError::UnknownPlayer)?;
        if player.color.is_some() {
            player.is_ready = true;
        }
        Ok(player.is_ready)
    }

    /// Enough players are seated, and every one has a colour and is ready.
    pub fn can_start(&self) -> bool {
        let seated = self.players.len();
        (MIN_PLAYERS..=self.game_mode.capacity()).contains(&seated)
            && self
                .players
                .iter()
                .all(|p| p.color.is_some() && p.is_ready)
    }

    /// Deals four pieces per claimed colour into base and hands the first
    /// turn to the host.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.game_state.game_started {
            return Err(GameError::GameAlreadyStarted);
        }
        if !self.can_start() {
            return Err(GameError::NotAllReady);
        }

        let pieces = self
            .players
            .iter()
            .filter_map(|p| p.color)
            .flat_map(|color| {
                (0..PIECES_PER_COLOR).map(move |i| GamePiece::in_base(color, i))
            })
            .collect();

        self.game_state = GameState {
            pieces,
            game_started: true,
            ..GameState::new()
        };

        info!(
            room = %self.code,
            players = self.players.len(),
            "game started"
        );
        Ok(())
    }
}
