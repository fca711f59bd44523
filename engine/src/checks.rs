use serde::{Deserialize, Serialize};

use crate::attributes::{AbilityKind, Attribute};
use crate::combatant::Combatant;
use crate::error::CombatError;
use crate::Dice;

/// Default difficulty for ability checks when the caller names none.
pub const DEFAULT_DF: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Critical {
    Success,
    Failure,
}

/// A trained skill: a flat modifier added to d20 checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub label: String,
    #[serde(rename = "mod")]
    pub modifier: i32,
}

/// A saving throw. `df` is the difficulty used when the caller passes none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveEntry {
    pub label: String,
    pub value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<i32>,
}

/// d12 roll-under check against a raw attribute value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttributeCheck {
    pub roll: i32,
    pub target: i32,
    pub passed: bool,
    pub critical: Option<Critical>,
}

/// d20 + modifier against a difficulty.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckResult {
    pub roll: i32,
    pub total: i32,
    pub df: i32,
    pub passed: bool,
    pub critical: Option<Critical>,
}

/// Roll 1d12; success when the roll does not exceed the attribute.
/// A natural 1 always succeeds and a natural 12 always fails.
pub fn attribute_check(dice: &mut Dice, value: i32) -> AttributeCheck {
    let roll = dice.d12() as i32;
    let critical = match roll {
        1 => Some(Critical::Success),
        12 => Some(Critical::Failure),
        _ => None,
    };
    AttributeCheck {
        roll,
        target: value,
        passed: match critical {
            Some(Critical::Success) => true,
            Some(Critical::Failure) => false,
            None => roll <= value,
        },
        critical,
    }
}

/// Roll 1d20, add modifier, compare against DF (meets-or-beats).
pub fn check(dice: &mut Dice, modifier: i32, df: i32) -> CheckResult {
    let roll = dice.d20() as i32;
    let total = roll + modifier;
    let critical = match roll {
        20 => Some(Critical::Success),
        1 => Some(Critical::Failure),
        _ => None,
    };
    CheckResult {
        roll,
        total,
        df,
        passed: total >= df,
        critical,
    }
}

impl Combatant {
    pub fn attribute_check(&self, dice: &mut Dice, attr: Attribute) -> AttributeCheck {
        attribute_check(dice, self.attributes.get(attr))
    }

    pub fn ability_check(&self, dice: &mut Dice, kind: AbilityKind, df: i32) -> CheckResult {
        check(dice, self.abilities().get(kind).modifier, df)
    }

    /// d20 + skill modifier against `df`.
    pub fn skill_check(
        &self,
        dice: &mut Dice,
        key: &str,
        df: i32,
    ) -> Result<CheckResult, CombatError> {
        let skill = self.skills.get(key).ok_or_else(|| {
            CombatError::invalid(format!("{} has no skill '{}'", self.name, key))
        })?;
        Ok(check(dice, skill.modifier, df))
    }

    /// d20 + save value. DF falls back to the save's own, then [`DEFAULT_DF`].
    pub fn save_check(
        &self,
        dice: &mut Dice,
        key: &str,
        df: Option<i32>,
    ) -> Result<CheckResult, CombatError> {
        let save = self.saves.get(key).ok_or_else(|| {
            CombatError::invalid(format!("{} has no save '{}'", self.name, key))
        })?;
        Ok(check(dice, save.value, df.or(save.df).unwrap_or(DEFAULT_DF)))
    }
}
