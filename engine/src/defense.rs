use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::armor::{ArmorSet, ArmorSlot};

pub const DEFAULT_NATURAL_DEFENSE: i32 = 4;

/// Derived defense totals for one combatant.
///
/// aDEF is "best piece wins" per slot while PEN stacks across every equipped
/// piece, including pieces that lose their slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defense {
    #[serde(rename = "aDEFByAP")]
    pub by_slot: IndexMap<ArmorSlot, i32>,
    #[serde(rename = "aDEFTotal")]
    pub armor_total: i32,
    #[serde(rename = "nDEF")]
    pub natural: i32,
    #[serde(rename = "tDEF")]
    pub total: i32,
    pub armor_penalty_total: i32,
}

impl Default for Defense {
    fn default() -> Self {
        recompute(&ArmorSet::new(), DEFAULT_NATURAL_DEFENSE)
    }
}

/// Rebuild the aggregate from scratch. Idempotent for unchanged armor.
pub fn recompute(armor: &ArmorSet, natural: i32) -> Defense {
    let equipped: Vec<_> = armor.values().filter(|p| p.equipped).collect();

    let by_slot: IndexMap<ArmorSlot, i32> = ArmorSlot::ALL
        .iter()
        .map(|&slot| {
            let best = equipped
                .iter()
                .filter(|p| p.slot == slot)
                .map(|p| p.effective_adef())
                .max()
                .unwrap_or(0);
            (slot, best)
        })
        .collect();

    let armor_total = by_slot.values().sum();
    let armor_penalty_total = equipped.iter().map(|p| p.effective_pen()).sum();

    Defense {
        by_slot,
        armor_total,
        natural,
        total: natural + armor_total,
        armor_penalty_total,
    }
}
