use serde::{Deserialize, Serialize};

use crate::ceil_half;
use crate::error::CombatError;

/// A current/max pair such as life or faith. `value` never exceeds `max`
/// once [`Pool::set_max`] has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pool {
    pub value: i32,
    pub max: i32,
}

impl Pool {
    pub fn full(max: i32) -> Self {
        Self { value: max, max }
    }

    pub fn set_max(&mut self, max: i32) {
        self.max = max;
        if self.value > self.max {
            self.value = self.max;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassData {
    pub base_life: i32,
    /// Hit die size; each level past the first adds its average, rounded up.
    pub life_per_level: i32,
    pub base_faith: i32,
    pub faith_per_level: i32,
}

impl Default for ClassData {
    fn default() -> Self {
        Self {
            base_life: 10,
            life_per_level: 6,
            base_faith: 5,
            faith_per_level: 4,
        }
    }
}

impl ClassData {
    pub fn max_life(&self, level: u32) -> i32 {
        pool_max(self.base_life, self.life_per_level, level)
    }

    pub fn max_faith(&self, level: u32) -> i32 {
        pool_max(self.base_faith, self.faith_per_level, level)
    }
}

/// base + ceil(die / 2) * (level - 1), with level 0 treated as 1.
pub fn pool_max(base: i32, per_level: i32, level: u32) -> i32 {
    let extra_levels = level.max(1) as i32 - 1;
    base + ceil_half(per_level) * extra_levels
}

/// Apply damage, flooring life at 0. Returns true if life dropped to 0 on this call.
pub fn apply_damage(name: &str, life: &mut Pool, dmg: i32, mut log: impl FnMut(String)) -> bool {
    let before = life.value;
    life.value = (life.value - dmg.max(0)).max(0);
    log(format!("[HP][{}] {} → {} (−{})", name, before, life.value, dmg));
    if before > 0 && life.value == 0 {
        log(format!("[STATE][{}] drops to 0 life", name));
        return true;
    }
    false
}

/// Healing never raises life above max.
pub fn heal(name: &str, life: &mut Pool, amount: i32, mut log: impl FnMut(String)) {
    if amount <= 0 {
        return;
    }
    let before = life.value;
    life.value = (life.value + amount).min(life.max);
    log(format!(
        "[HEAL][{}] +{} life ({} → {})",
        name, amount, before, life.value
    ));
}

/// Deduct a faith cost, or fail without touching the pool.
pub fn spend_faith(
    name: &str,
    faith: &mut Pool,
    cost: i32,
    mut log: impl FnMut(String),
) -> Result<(), CombatError> {
    if faith.value < cost {
        return Err(CombatError::InsufficientFaith {
            combatant: name.to_string(),
            needed: cost,
            available: faith.value,
        });
    }
    let before = faith.value;
    faith.value -= cost.max(0);
    log(format!("[FAITH][{}] {} → {}", name, before, faith.value));
    Ok(())
}
