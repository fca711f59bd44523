use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    pub natural: u8,
    pub bonus: i32,
    pub total: i32,
}

/// Advantage roll: 1d20 + advantage bonus.
pub fn roll_initiative(dice: &mut Dice, advantage_bonus: i32) -> InitiativeRoll {
    let natural = dice.d20();
    InitiativeRoll {
        natural,
        bonus: advantage_bonus,
        total: natural as i32 + advantage_bonus,
    }
}

/// One row of the turn order. `initiative` is `None` until rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub id: String,
    pub name: String,
    pub initiative: Option<i32>,
    pub agility: i32,
}

/// Highest initiative first, then highest agility, then id. Unrolled entries
/// go last.
pub fn compare(a: &InitiativeEntry, b: &InitiativeEntry) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then_with(|| b.agility.cmp(&a.agility))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_turn_order(entries: &mut [InitiativeEntry]) {
    entries.sort_by(compare);
}
