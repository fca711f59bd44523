use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod armor;
pub mod atr;
pub mod attack;
pub mod attributes;
pub mod checks;
pub mod combatant;
pub mod content;
pub mod defense;
pub mod encounter;
pub mod error;
pub mod initiative;
pub mod life;
pub mod logging;
pub mod weapon;

pub use armor::{ArmorPiece, ArmorSlot, ArmorWear, Degradation};
pub use atr::{WeaponSkill, WeaponSkills};
pub use attack::{
    AttackOutcome, AttackReport, AttackStep, DefenseChoice, DefenseDecision, PendingDefense,
};
pub use attributes::{Abilities, AbilityKind, AbilityScore, Attribute, Attributes};
pub use combatant::{CombatBlock, Combatant};
pub use defense::Defense;
pub use encounter::{AttackRequest, Encounter};
pub use error::CombatError;
pub use initiative::{InitiativeEntry, InitiativeRoll};
pub use life::{ClassData, Pool};
pub use weapon::{DamageFormula, DiceTerm, Weapon};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted {
        queue: VecDeque<u8>,
        fallback: ChaCha8Rng,
    },
}

/// Deterministic dice. Seeded for simulations, scripted for tests.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Dice that return `values` in order (clamped to the die size), then fall
    /// back to a fixed seed once the script runs out.
    pub fn from_scripted(values: Vec<u8>) -> Self {
        Self {
            source: Source::Scripted {
                queue: values.into(),
                fallback: ChaCha8Rng::seed_from_u64(0),
            },
        }
    }

    pub fn roll(&mut self, sides: u8) -> u8 {
        let sides = sides.max(1);
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(1..=sides),
            Source::Scripted { queue, fallback } => match queue.pop_front() {
                Some(v) => v.clamp(1, sides),
                None => fallback.gen_range(1..=sides),
            },
        }
    }

    pub fn d20(&mut self) -> u8 {
        self.roll(20)
    }

    pub fn d12(&mut self) -> u8 {
        self.roll(12)
    }
}

/// Half of `sum`, rounded towards positive infinity.
pub fn ceil_half(sum: i32) -> i32 {
    (sum + 1).div_euclid(2)
}

/// Signed modifier as printed in roll logs: `+3`, `-1`, `+0`.
pub fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.abs())
    }
}
