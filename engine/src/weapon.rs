use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Dice;

/// Skill used when a weapon does not name one.
pub const DEFAULT_WEAPON_SKILL: &str = "lightArms";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid damage formula '{0}' (expected dice terms like 1d8+1d6-1)")]
pub struct FormulaError(String);

/// One `NdS` group inside a damage formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceTerm {
    pub count: u8,
    pub sides: u8,
}

/// Damage dice such as `1d8`, `2d6+1`, `1d8+1d6-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DamageFormula {
    pub terms: Vec<DiceTerm>,
    pub modifier: i32,
}

impl DamageFormula {
    /// A single `NdS+K` formula.
    pub fn new(count: u8, sides: u8, modifier: i32) -> Self {
        Self {
            terms: vec![DiceTerm { count, sides }],
            modifier,
        }
    }

    /// Roll every term. The total never drops below 0.
    pub fn roll(&self, dice: &mut Dice) -> DamageRoll {
        let faces: Vec<u8> = self
            .terms
            .iter()
            .flat_map(|t| std::iter::repeat_n(t.sides, t.count as usize))
            .map(|sides| dice.roll(sides))
            .collect();
        let sum: i32 = faces.iter().map(|&f| f as i32).sum();
        DamageRoll {
            faces,
            total: (sum + self.modifier).max(0),
        }
    }
}

impl Default for DamageFormula {
    fn default() -> Self {
        Self::new(1, 4, 0)
    }
}

impl fmt::Display for DamageFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}d{}", t.count, t.sides)?;
        }
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

impl FromStr for DamageFormula {
    type Err = FormulaError;

    /// Terms are `NdS` (added) or flat numbers (added or subtracted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FormulaError(s.to_string());
        let lowered = s.trim().to_lowercase().replace(' ', "");
        if lowered.is_empty() {
            return Err(bad());
        }

        let mut terms = Vec::new();
        let mut modifier = 0i32;
        let mut rest = lowered.as_str();
        let mut negative = false;
        loop {
            let end = rest.find(['+', '-']).unwrap_or(rest.len());
            let token = &rest[..end];
            match token.split_once('d') {
                Some((count, sides)) => {
                    if negative {
                        return Err(bad());
                    }
                    let count: u8 = if count.is_empty() {
                        1
                    } else {
                        count.parse().map_err(|_| bad())?
                    };
                    let sides: u8 = sides.parse().map_err(|_| bad())?;
                    if count == 0 || sides < 2 {
                        return Err(bad());
                    }
                    terms.push(DiceTerm { count, sides });
                }
                None => {
                    let flat: i32 = token.parse().map_err(|_| bad())?;
                    modifier += if negative { -flat } else { flat };
                }
            }
            if end == rest.len() {
                break;
            }
            negative = rest[end..].starts_with('-');
            rest = &rest[end + 1..];
        }

        if terms.is_empty() {
            return Err(bad());
        }
        Ok(Self { terms, modifier })
    }
}

impl TryFrom<String> for DamageFormula {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DamageFormula> for String {
    fn from(value: DamageFormula) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageRoll {
    pub faces: Vec<u8>,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    #[serde(rename = "weaponSkill", default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub damage: DamageFormula,
}

impl Weapon {
    pub fn new(name: impl Into<String>, skill: &str, damage: DamageFormula) -> Self {
        Self {
            name: name.into(),
            skill: Some(skill.to_string()),
            damage,
        }
    }

    pub fn unarmed() -> Self {
        Self {
            name: "Unarmed".to_string(),
            skill: None,
            damage: DamageFormula::default(),
        }
    }

    pub fn skill_key(&self) -> &str {
        self.skill.as_deref().unwrap_or(DEFAULT_WEAPON_SKILL)
    }
}
