//! Weighted six-sided die.
//!
//! The die is deliberately unfair. A six is always favoured, a player
//! whose pieces are all in base gets a much better shot at the six they
//! need to get out, and the opening roll of a turn is steered away from
//! whatever the previous player finished on so back-to-back repeats are
//! rare.
//!
//! Weights are kept in percent-equivalent units and always normalized to
//! [`WEIGHT_TOTAL`] before sampling. Sampling walks the faces 1 → 6
//! subtracting weights from a uniform draw in `[0, 100)`; the first face
//! that brings the remainder to zero or below wins.

use rand::Rng;

/// Weights when nothing special applies.
pub const BASELINE_WEIGHTS: [f64; 6] = [15.0, 15.0, 15.0, 15.0, 15.0, 25.0];

/// Weights when all of the roller's pieces are in base.
pub const ESCAPE_WEIGHTS: [f64; 6] = [10.0, 10.0, 10.0, 10.0, 10.0, 50.0];

/// Sum every weight vector is normalized to.
pub const WEIGHT_TOTAL: f64 = 100.0;

/// Weight left on the face the previous player finished on.
const REPEAT_FLOOR: f64 = 2.0;

/// Share of the removed weight given to face 6, relative to an even split.
const SIX_SHARE: f64 = 1.5;

/// Share of the removed weight given to each remaining face.
const OTHER_SHARE: f64 = 0.875;

const SIX_INDEX: usize = 5;

/// What the die needs to know about the roller and the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RollContext {
    /// Every piece of the roller's colour is in base.
    pub all_in_base: bool,
    /// The previous player's final roll, if a turn has completed yet.
    pub previous_final_roll: Option<u8>,
    /// This is the roller's first roll of their turn.
    pub first_roll_this_turn: bool,
}

/// A normalized weight per face, index 0 being face 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DieWeights([f64; 6]);

impl DieWeights {
    /// Builds the weight vector for a roll.
    ///
    /// The all-in-base override wins over repeat avoidance.
    pub fn for_context(ctx: &RollContext) -> Self {
        if ctx.all_in_base {
            return Self(ESCAPE_WEIGHTS).normalized();
        }

        let mut weights = BASELINE_WEIGHTS;
        let repeated = ctx
            .previous_final_roll
            .filter(|face| (1..=6).contains(face))
            .filter(|_| ctx.first_roll_this_turn);

        if let Some(face) = repeated {
            let index = usize::from(face - 1);
            let removed = weights[index] - REPEAT_FLOOR;
            weights[index] = REPEAT_FLOOR;

            let even_share = removed / 5.0;
            for (i, weight) in weights.iter_mut().enumerate() {
                if i == index {
                    continue;
                }
                let factor = if i == SIX_INDEX { SIX_SHARE } else { OTHER_SHARE };
                *weight += even_share * factor;
            }
        }

        Self(weights).normalized()
    }

    fn normalized(self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self(BASELINE_WEIGHTS);
        }
        Self(self.0.map(|w| w * WEIGHT_TOTAL / total))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Weight of `face` (1-6).
    pub fn weight(&self, face: u8) -> f64 {
        self.0[usize::from(face.clamp(1, 6) - 1)]
    }

    pub fn as_array(&self) -> [f64; 6] {
        self.0
    }

    /// Maps a draw in `[0, WEIGHT_TOTAL)` to a face.
    ///
    /// Deterministic, so a fixed draw always gives the same face.
    pub fn sample(&self, draw: f64) -> u8 {
        let mut remainder = draw;
        for (face, weight) in (1u8..=6).zip(self.0) {
            remainder -= weight;
            if remainder <= 0.0 {
                return face;
            }
        }
        // Only reachable through float rounding at the very top of the range.
        6
    }
}

/// Rolls the die for `ctx` using `rng` as the uniform source.
pub fn roll_weighted_die(ctx: &RollContext, rng: &mut impl Rng) -> u8 {
    let weights = DieWeights::for_context(ctx);
    weights.sample(rng.random_range(0.0..WEIGHT_TOTAL))
}
