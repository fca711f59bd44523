use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body slot ("AP") an armor piece covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorSlot {
    Head,
    Chest,
    Arms,
    Legs,
    Back,
    Feet,
}

impl ArmorSlot {
    pub const ALL: [ArmorSlot; 6] = [
        ArmorSlot::Head,
        ArmorSlot::Chest,
        ArmorSlot::Arms,
        ArmorSlot::Legs,
        ArmorSlot::Back,
        ArmorSlot::Feet,
    ];
}

impl fmt::Display for ArmorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArmorSlot::Head => "head",
            ArmorSlot::Chest => "chest",
            ArmorSlot::Arms => "arms",
            ArmorSlot::Legs => "legs",
            ArmorSlot::Back => "back",
            ArmorSlot::Feet => "feet",
        };
        f.write_str(s)
    }
}

/// Degraded values. Absent until the first hit that reaches CAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmorWear {
    pub adef: i32,
    pub pen: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPiece", into = "StoredPiece")]
pub struct ArmorPiece {
    pub name: String,
    pub slot: ArmorSlot,
    pub adef: i32,
    pub pen: i32,
    pub cap: i32,
    pub equipped: bool,
    pub wear: Option<ArmorWear>,
}

/// Persisted shape. Each `current*` key is optional on its own; a missing one
/// falls back to the base value as long as the other is present.
#[derive(Serialize, Deserialize)]
struct StoredPiece {
    name: String,
    ap: ArmorSlot,
    #[serde(rename = "aDEF", default)]
    adef: i32,
    #[serde(rename = "PEN", default)]
    pen: i32,
    #[serde(rename = "CAP", default)]
    cap: i32,
    #[serde(default)]
    equipped: bool,
    #[serde(rename = "currentADEF", default, skip_serializing_if = "Option::is_none")]
    current_adef: Option<i32>,
    #[serde(rename = "currentPEN", default, skip_serializing_if = "Option::is_none")]
    current_pen: Option<i32>,
}

impl From<StoredPiece> for ArmorPiece {
    fn from(s: StoredPiece) -> Self {
        let wear = match (s.current_adef, s.current_pen) {
            (None, None) => None,
            (adef, pen) => Some(ArmorWear {
                adef: adef.unwrap_or(s.adef),
                pen: pen.unwrap_or(s.pen),
            }),
        };
        Self {
            name: s.name,
            slot: s.ap,
            adef: s.adef,
            pen: s.pen,
            cap: s.cap,
            equipped: s.equipped,
            wear,
        }
    }
}

impl From<ArmorPiece> for StoredPiece {
    fn from(p: ArmorPiece) -> Self {
        Self {
            name: p.name,
            ap: p.slot,
            adef: p.adef,
            pen: p.pen,
            cap: p.cap,
            equipped: p.equipped,
            current_adef: p.wear.map(|w| w.adef),
            current_pen: p.wear.map(|w| w.pen),
        }
    }
}

impl ArmorPiece {
    /// An equipped, unworn piece.
    pub fn new(name: impl Into<String>, slot: ArmorSlot, adef: i32, pen: i32, cap: i32) -> Self {
        Self {
            name: name.into(),
            slot,
            adef,
            pen,
            cap,
            equipped: true,
            wear: None,
        }
    }

    pub fn effective_adef(&self) -> i32 {
        self.wear.map_or(self.adef, |w| w.adef)
    }

    pub fn effective_pen(&self) -> i32 {
        self.wear.map_or(self.pen, |w| w.pen)
    }

    /// Wear the piece down by `damage`. Each full CAP of damage removes one
    /// point of aDEF, then one point of PEN once aDEF is gone.
    pub fn degrade(&mut self, damage: i32) -> Degradation {
        if self.cap <= 0 || damage < self.cap {
            return Degradation::BelowCapacity {
                piece: self.name.clone(),
                cap: self.cap,
            };
        }

        let steps = (damage / self.cap) as u32;
        let adef_before = self.effective_adef();
        let pen_before = self.effective_pen();
        let (mut adef, mut pen) = (adef_before, pen_before);
        for _ in 0..steps {
            if adef > 0 {
                adef -= 1;
            } else if pen > 0 {
                pen -= 1;
            } else {
                break;
            }
        }
        self.wear = Some(ArmorWear { adef, pen });

        Degradation::Degraded {
            piece: self.name.clone(),
            steps,
            adef_before,
            adef_after: adef,
            pen_before,
            pen_after: pen,
        }
    }
}

/// Armor pieces keyed by item id, in inventory order.
pub type ArmorSet = IndexMap<String, ArmorPiece>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    NoArmor,
    BelowCapacity {
        piece: String,
        cap: i32,
    },
    Degraded {
        piece: String,
        steps: u32,
        adef_before: i32,
        adef_after: i32,
        pen_before: i32,
        pen_after: i32,
    },
}

impl Degradation {
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Degradation::Degraded { adef_before, adef_after, pen_before, pen_after, .. }
                if adef_before != adef_after || pen_before != pen_after
        )
    }
}

/// Degrade the active piece at `slot`: the equipped piece whose aDEF counts
/// for that slot in the defense aggregate (first one on ties).
/// Callers must recompute the defense aggregate afterwards.
pub fn apply_hit(armor: &mut ArmorSet, slot: ArmorSlot, damage: i32) -> Degradation {
    let active = armor
        .values()
        .enumerate()
        .filter(|(_, p)| p.equipped && p.slot == slot)
        .reduce(|best, cur| {
            if cur.1.effective_adef() > best.1.effective_adef() {
                cur
            } else {
                best
            }
        })
        .map(|(idx, _)| idx);

    match active.and_then(|idx| armor.get_index_mut(idx)) {
        Some((_, piece)) => piece.degrade(damage),
        None => Degradation::NoArmor,
    }
}
