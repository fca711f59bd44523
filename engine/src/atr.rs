//! Attacks-per-Round bookkeeping.
//!
//! Each weapon skill carries its own AtR counter. Counters are refilled once
//! at the start of every round and drained by attacks and by taking hits.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSkill {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(rename = "atRMax", default = "default_atr_max")]
    pub atr_max: u32,
    #[serde(rename = "atRCurrent", default)]
    pub atr_current: u32,
}

fn default_atr_max() -> u32 {
    1
}

impl WeaponSkill {
    /// A skill with a full AtR counter.
    pub fn new(label: impl Into<String>, attack_bonus: i32, atr_max: u32) -> Self {
        Self {
            label: label.into(),
            attack_bonus,
            atr_max,
            atr_current: atr_max,
        }
    }
}

/// Weapon skills by key, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponSkills(IndexMap<String, WeaponSkill>);

impl WeaponSkills {
    pub fn insert(&mut self, key: impl Into<String>, skill: WeaponSkill) {
        self.0.insert(key.into(), skill);
    }

    pub fn get(&self, key: &str) -> Option<&WeaponSkill> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WeaponSkill)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn remaining(&self, key: &str) -> Option<u32> {
        self.0.get(key).map(|s| s.atr_current)
    }

    /// Refill every counter. Called once per round before any attack.
    pub fn reset(&mut self) {
        for skill in self.0.values_mut() {
            skill.atr_current = skill.atr_max;
        }
    }

    /// Pull any out-of-range counter back under its max.
    pub fn clamp(&mut self) {
        for skill in self.0.values_mut() {
            skill.atr_current = skill.atr_current.min(skill.atr_max);
        }
    }

    /// Spend `amount` AtR from `key`. Fails without change when the skill is
    /// unknown or short.
    pub fn consume(&mut self, key: &str, amount: u32) -> bool {
        match self.0.get_mut(key) {
            Some(skill) if skill.atr_current >= amount => {
                skill.atr_current -= amount;
                true
            }
            _ => false,
        }
    }

    /// Stagger cost for taking or absorbing a hit: one AtR from the first
    /// skill that still has any. Returns the key that paid.
    pub fn consume_on_hit_taken(&mut self) -> Option<String> {
        let (key, skill) = self.0.iter_mut().find(|(_, s)| s.atr_current > 0)?;
        skill.atr_current -= 1;
        Some(key.clone())
    }
}

impl FromIterator<(String, WeaponSkill)> for WeaponSkills {
    fn from_iter<I: IntoIterator<Item = (String, WeaponSkill)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
