//! The per-turn flow: roll, maybe move, pass the turn.
//!
//! A turn passes only when the player neither rolled a six nor captured.
//! The two bonuses do not stack: a six that also captures still earns a
//! single extra roll. Once a winner is recorded the room is frozen and
//! every roll or move is rejected with [`GameError::GameOver`].

use rand::Rng;
use tracing::{debug, info};

use crate::dice::{RollContext, roll_weighted_die};
use crate::model::{Color, ParticipantId, PieceId, Room};
use crate::movement::{self, BASE, MoveOutcome, SIX};
use crate::GameError;

/// Result of a successful roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    pub value: u8,
    /// No piece could use the roll, so it was spent immediately. The
    /// turn passed unless the value was a six.
    pub forfeited: bool,
}

impl Room {
    /// Rolls the weighted die for the active player.
    pub fn roll(
        &mut self,
        participant: &ParticipantId,
        rng: &mut impl Rng,
    ) -> Result<RollOutcome, GameError> {
        self.roll_with(participant, |ctx| roll_weighted_die(ctx, rng))
    }

    /// Rolls using `die` to pick the face.
    ///
    /// Validation and bookkeeping are identical to [`Room::roll`]; only
    /// the source of the value differs.
    pub fn roll_with(
        &mut self,
        participant: &ParticipantId,
        die: impl FnOnce(&RollContext) -> u8,
    ) -> Result<RollOutcome, GameError> {
        let color = self.acting_color(participant)?;
        let state = &mut self.game_state;
        if state.move_pending {
            return Err(GameError::AlreadyRolled);
        }

        let ctx = RollContext {
            all_in_base: state
                .pieces
                .iter()
                .filter(|p| p.color == color)
                .all(|p| p.position == BASE),
            previous_final_roll: state.last_roll_of_previous_player,
            first_roll_this_turn: state.is_first_roll_this_turn,
        };
        let value = die(&ctx).clamp(1, 6);

        state.current_roll = Some(value);
        state.is_first_roll_this_turn = false;
        state.move_pending = true;

        if movement::has_legal_move(&state.pieces, color, value) {
            debug!(
                room = %self.code,
                %participant,
                %color,
                value,
                phase = %self.game_state.phase(),
                "rolled"
            );
            return Ok(RollOutcome {
                value,
                forfeited: false,
            });
        }

        state.last_roll_of_previous_player = Some(value);
        state.current_roll = None;
        state.move_pending = false;
        state.is_first_roll_this_turn = true;
        if value != SIX {
            self.advance_turn();
        }

        debug!(
            room = %self.code,
            %participant,
            %color,
            value,
            phase = %self.game_state.phase(),
            "rolled with no legal move"
        );
        Ok(RollOutcome {
            value,
            forfeited: true,
        })
    }

    /// Spends the pending roll on one of the active player's pieces.
    pub fn move_piece(
        &mut self,
        participant: &ParticipantId,
        piece_id: &PieceId,
    ) -> Result<MoveOutcome, GameError> {
        let color = self.acting_color(participant)?;
        let state = &mut self.game_state;

        let roll = match (state.move_pending, state.current_roll) {
            (true, Some(roll)) => roll,
            _ => return Err(GameError::MustRollFirst),
        };
        let index = state
            .pieces
            .iter()
            .position(|p| &p.id == piece_id && p.color == color)
            .ok_or(GameError::InvalidPiece)?;
        if !movement::can_move(&state.pieces[index], color, Some(roll)) {
            return Err(GameError::InvalidMove);
        }

        let outcome = movement::apply_move(&mut state.pieces, index, roll);
        state.current_roll = None;
        state.move_pending = false;

        if let Some(captured) = &outcome.captured {
            debug!(
                room = %self.code,
                piece = %piece_id,
                captured = %captured.id,
                "piece captured"
            );
        }

        if let Some(winner) = outcome.winner {
            state.winner = Some(winner);
            info!(room = %self.code, %winner, "game won");
            return Ok(outcome);
        }

        if roll != SIX && outcome.captured.is_none() {
            state.last_roll_of_previous_player = Some(roll);
            state.is_first_roll_this_turn = true;
            self.advance_turn();
        }

        debug!(
            room = %self.code,
            piece = %piece_id,
            position = outcome.piece.position,
            phase = %self.game_state.phase(),
            "piece moved"
        );
        Ok(outcome)
    }

    /// The colour `participant` plays, if they may act right now.
    fn acting_color(
        &self,
        participant: &ParticipantId,
    ) -> Result<Color, GameError> {
        if !self.game_state.game_started {
            return Err(GameError::GameNotStarted);
        }
        if self.game_state.winner.is_some() {
            return Err(GameError::GameOver);
        }
        match self.active_player() {
            Some(player) if &player.id == participant => {
                player.color.ok_or(GameError::NotYourTurn)
            }
            _ => Err(GameError::NotYourTurn),
        }
    }

    fn advance_turn(&mut self) {
        if !self.players.is_empty() {
            self.game_state.current_turn_index =
                (self.game_state.current_turn_index + 1) % self.players.len();
        }
    }
}
