use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::armor::{self, ArmorPiece, ArmorSet, ArmorSlot, Degradation};
use crate::atr::{WeaponSkill, WeaponSkills};
use crate::attributes::{derive_abilities, Abilities, AbilityBonuses, Attributes};
use crate::checks::{SaveEntry, SkillEntry};
use crate::defense::{self, Defense};
use crate::life::{ClassData, Pool};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatBlock {
    pub advantage_bonus: i32,
    pub dodge_bonus: i32,
    pub defend_bonus: i32,
    pub damage_bonus: i32,
    /// Set by a natural-1 attack; halves the next defense roll.
    half_defense_flag: bool,
}

impl CombatBlock {
    pub fn has_half_defense(&self) -> bool {
        self.half_defense_flag
    }

    pub fn set_half_defense(&mut self) {
        self.half_defense_flag = true;
    }

    /// Read and clear the half-defense debuff in one step.
    pub fn take_half_defense(&mut self) -> bool {
        std::mem::take(&mut self.half_defense_flag)
    }
}

/// Everything the rules engine tracks for one participant.
///
/// Derived fields (`life.max`, `faith.max`, `defense`) are refreshed by
/// [`Combatant::prepare`] and, for defense, after every armor change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub class_data: ClassData,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub ability_bonuses: AbilityBonuses,
    #[serde(default)]
    pub life: Pool,
    #[serde(default)]
    pub faith: Pool,
    #[serde(default)]
    pub weapon_skills: WeaponSkills,
    #[serde(default)]
    pub combat: CombatBlock,
    #[serde(default)]
    pub armor: ArmorSet,
    #[serde(default)]
    pub defense: Defense,
    #[serde(default)]
    pub skills: IndexMap<String, SkillEntry>,
    #[serde(default)]
    pub saves: IndexMap<String, SaveEntry>,
}

fn default_level() -> u32 {
    1
}

impl Combatant {
    /// A level-1 combatant with full pools and no gear.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let class_data = ClassData::default();
        let level = default_level();
        Self {
            id: id.into(),
            name: name.into(),
            player_controlled: false,
            level,
            life: Pool::full(class_data.max_life(level)),
            faith: Pool::full(class_data.max_faith(level)),
            class_data,
            attributes: Attributes::default(),
            ability_bonuses: AbilityBonuses::new(),
            weapon_skills: WeaponSkills::default(),
            combat: CombatBlock::default(),
            armor: ArmorSet::new(),
            defense: Defense::default(),
            skills: IndexMap::new(),
            saves: IndexMap::new(),
        }
    }

    /// Set the class base life so a level-1 combatant starts at `max`.
    pub fn with_life(mut self, max: i32) -> Self {
        self.class_data.base_life = max;
        self.level = 1;
        self.life = Pool::full(max);
        self
    }

    pub fn with_skill(mut self, key: &str, skill: WeaponSkill) -> Self {
        self.weapon_skills.insert(key, skill);
        self
    }

    pub fn with_armor(mut self, item: &str, piece: ArmorPiece) -> Self {
        self.armor.insert(item.to_string(), piece);
        self.recompute_defense();
        self
    }

    pub fn as_player(mut self) -> Self {
        self.player_controlled = true;
        self
    }

    /// Refresh every derived value after the underlying data changed.
    pub fn prepare(&mut self) {
        self.life.set_max(self.class_data.max_life(self.level));
        self.faith.set_max(self.class_data.max_faith(self.level));
        self.weapon_skills.clamp();
        self.recompute_defense();
    }

    pub fn abilities(&self) -> Abilities {
        derive_abilities(&self.attributes, &self.ability_bonuses)
    }

    pub fn recompute_defense(&mut self) -> &Defense {
        self.defense = defense::recompute(&self.armor, self.defense.natural);
        &self.defense
    }

    /// Degrade armor at `slot` and keep the defense aggregate current.
    pub fn apply_armor_hit(&mut self, slot: ArmorSlot, damage: i32) -> Degradation {
        let outcome = armor::apply_hit(&mut self.armor, slot, damage);
        if matches!(outcome, Degradation::Degraded { .. }) {
            self.recompute_defense();
        }
        outcome
    }

    pub fn reset_atr(&mut self) {
        self.weapon_skills.reset();
    }

    pub fn is_down(&self) -> bool {
        self.life.value <= 0
    }
}
