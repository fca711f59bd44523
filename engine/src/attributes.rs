use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ceil_half;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Int,
    Wis,
    Pat,
    Will,
    Str,
    Agi,
    Spd,
    Cha,
    Vir,
}

/// Base attribute scores. Fixed for the duration of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(rename = "int")]
    pub int_: i32,
    pub wis: i32,
    pub pat: i32,
    pub will: i32,
    #[serde(rename = "str")]
    pub str_: i32,
    pub agi: i32,
    pub spd: i32,
    pub cha: i32,
    pub vir: i32,
}

impl Attributes {
    pub fn get(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Int => self.int_,
            Attribute::Wis => self.wis,
            Attribute::Pat => self.pat,
            Attribute::Will => self.will,
            Attribute::Str => self.str_,
            Attribute::Agi => self.agi,
            Attribute::Spd => self.spd,
            Attribute::Cha => self.cha,
            Attribute::Vir => self.vir,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    Perception,
    Search,
    Climb,
    Jump,
    Balance,
    Hide,
    Appeal,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 7] = [
        AbilityKind::Perception,
        AbilityKind::Search,
        AbilityKind::Climb,
        AbilityKind::Jump,
        AbilityKind::Balance,
        AbilityKind::Hide,
        AbilityKind::Appeal,
    ];

    /// The two attributes an ability is averaged from.
    pub fn pair(self) -> (Attribute, Attribute) {
        use Attribute::*;
        match self {
            AbilityKind::Perception => (Int, Wis),
            AbilityKind::Search => (Int, Pat),
            AbilityKind::Climb => (Will, Str),
            AbilityKind::Jump => (Will, Agi),
            AbilityKind::Balance => (Pat, Agi),
            AbilityKind::Hide => (Wis, Spd),
            AbilityKind::Appeal => (Cha, Vir),
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbilityKind::Perception => "Perception",
            AbilityKind::Search => "Search",
            AbilityKind::Climb => "Climb",
            AbilityKind::Jump => "Jump",
            AbilityKind::Balance => "Balance",
            AbilityKind::Hide => "Hide",
            AbilityKind::Appeal => "Appeal",
        };
        f.write_str(label)
    }
}

/// Flat bonuses per ability; missing entries count as 0.
pub type AbilityBonuses = IndexMap<AbilityKind, i32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbilityScore {
    pub value: i32,
    pub bonus: i32,
    #[serde(rename = "mod")]
    pub modifier: i32,
}

impl AbilityScore {
    pub fn derive(a: i32, b: i32, bonus: i32) -> Self {
        let value = ceil_half(a + b);
        Self {
            value,
            bonus,
            modifier: value + bonus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Abilities(IndexMap<AbilityKind, AbilityScore>);

impl Abilities {
    pub fn get(&self, kind: AbilityKind) -> AbilityScore {
        // Every kind is inserted by `derive_abilities`.
        self.0.get(&kind).copied().unwrap_or(AbilityScore {
            value: 0,
            bonus: 0,
            modifier: 0,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (AbilityKind, AbilityScore)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Ability = ceil((attrA + attrB) / 2), mod = value + bonus.
pub fn derive_abilities(attrs: &Attributes, bonuses: &AbilityBonuses) -> Abilities {
    let scores = AbilityKind::ALL
        .iter()
        .map(|&kind| {
            let (a, b) = kind.pair();
            let bonus = bonuses.get(&kind).copied().unwrap_or(0);
            (kind, AbilityScore::derive(attrs.get(a), attrs.get(b), bonus))
        })
        .collect();
    Abilities(scores)
}
