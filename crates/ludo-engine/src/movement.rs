//! Piece movement: legality, advancing, safety, captures and finishing.
//!
//! Positions are relative to the moving colour's own start cell:
//!
//! | position | meaning |
//! |---|---|
//! | `-1` | in base (safe) |
//! | `0..=50` | shared track, absolute cell `(position + offset) % 52` |
//! | `51..=56` | private home stretch (safe) |
//! | `99` | finished (safe) |
//!
//! `57` only exists for the instant between advancing and normalizing
//! to `99`.

use crate::model::{Color, GamePiece};

pub const BASE: i32 = -1;
pub const TRACK_LEN: i32 = 52;
pub const LAST_TRACK_POSITION: i32 = 50;
pub const HOME_STRETCH_START: i32 = 51;
pub const HOME_STRETCH_END: i32 = 56;
/// One step past the end of the home stretch.
pub const FINISH_STEP: i32 = 57;
pub const FINISHED: i32 = 99;

/// Absolute cells nobody can be captured on: each colour's start cell
/// plus the four star cells.
pub const SAFE_CELLS: [i32; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

/// The roll that lets a piece leave base and earns another roll.
pub const SIX: u8 = 6;

/// What happened when a piece moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The moved piece after the move.
    pub piece: GamePiece,
    /// The opposing piece sent back to base, if any.
    pub captured: Option<GamePiece>,
    /// The mover's colour now has all four pieces home.
    pub winner: Option<Color>,
}

/// Absolute track cell of a piece, or `None` if it isn't on the track.
pub fn absolute_cell(piece: &GamePiece) -> Option<i32> {
    (0..=LAST_TRACK_POSITION)
        .contains(&piece.position)
        .then(|| (piece.position + piece.color.track_offset()) % TRACK_LEN)
}

pub fn is_safe_cell(cell: i32) -> bool {
    SAFE_CELLS.contains(&cell)
}

pub fn is_safe(piece: &GamePiece) -> bool {
    if piece.position == BASE || piece.position >= HOME_STRETCH_START {
        return true;
    }
    absolute_cell(piece).is_some_and(is_safe_cell)
}

/// Whether `piece` may move by `roll` on `active`'s turn.
///
/// `roll` is the pending roll; `None` means nothing has been rolled.
pub fn can_move(piece: &GamePiece, active: Color, roll: Option<u8>) -> bool {
    let Some(roll) = roll else {
        return false;
    };
    if piece.color != active || piece.position == FINISHED {
        return false;
    }
    if piece.position == BASE {
        return roll == SIX;
    }
    piece.position + i32::from(roll) <= FINISH_STEP
}

/// Whether any piece of `color` can use `roll`.
pub fn has_legal_move(pieces: &[GamePiece], color: Color, roll: u8) -> bool {
    pieces.iter().any(|p| can_move(p, color, Some(roll)))
}

/// Whether every piece of `color` is home. False if it has no pieces.
pub fn all_finished(pieces: &[GamePiece], color: Color) -> bool {
    let mut own = pieces.iter().filter(|p| p.color == color).peekable();
    own.peek().is_some() && own.all(|p| p.position == FINISHED)
}

/// Moves `pieces[index]` by `roll` and resolves the consequences.
///
/// The caller checks [`can_move`] first. At most one opposing piece is
/// captured per move; if the one-colour-per-cell invariant were ever
/// broken, the first match in piece order is the one sent home.
pub fn apply_move(
    pieces: &mut [GamePiece],
    index: usize,
    roll: u8,
) -> MoveOutcome {
    let mover = &mut pieces[index];
    mover.position = if mover.position == BASE {
        0
    } else {
        mover.position + i32::from(roll)
    };
    mover.is_safe = is_safe(mover);

    let color = mover.color;
    let landing = absolute_cell(mover).filter(|cell| !is_safe_cell(*cell));

    if mover.position == FINISH_STEP {
        mover.position = FINISHED;
        mover.is_safe = true;
    }
    let piece = mover.clone();

    let captured = landing.and_then(|cell| {
        let victim = pieces.iter_mut().find(|other| {
            other.color != color && absolute_cell(other) == Some(cell)
        })?;
        victim.position = BASE;
        victim.is_safe = true;
        Some(victim.clone())
    });

    let winner = all_finished(pieces, color).then_some(color);

    MoveOutcome {
        piece,
        captured,
        winner,
    }
}
