//! A roster of combatants sharing one fight.
//!
//! Each combatant sits behind its own mutex. Attack resolution only needs
//! `&self`, so attacks can run from several threads; the two participants are
//! locked in id order for each pipeline phase, which serializes every life,
//! AtR and armor write per combatant. Round-boundary operations take
//! `&mut self`, so no attack can be in flight while AtR is refilled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::info;

use crate::armor::ArmorSlot;
use crate::attack::{self, AttackReport, AttackStep, DefenseDecision, PendingDefense};
use crate::combatant::Combatant;
use crate::defense::Defense;
use crate::error::CombatError;
use crate::initiative::{self, InitiativeEntry, InitiativeRoll};
use crate::weapon::Weapon;
use crate::Dice;

/// Inbound request to start an attack.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRequest {
    pub attacker: String,
    pub weapon: Weapon,
    #[serde(default)]
    pub defender: Option<String>,
    #[serde(default)]
    pub location: Option<ArmorSlot>,
}

#[derive(Debug, Default)]
pub struct Encounter {
    round: u32,
    combatants: IndexMap<String, Mutex<Combatant>>,
    initiative: IndexMap<String, Option<i32>>,
}

type Guard<'a> = MutexGuard<'a, Combatant>;

impl Encounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_combatants(
        combatants: impl IntoIterator<Item = Combatant>,
    ) -> Result<Self, CombatError> {
        let mut encounter = Self::new();
        for c in combatants {
            encounter.add(c)?;
        }
        Ok(encounter)
    }

    /// Add a combatant, refreshing its derived data. Ids must be unique.
    pub fn add(&mut self, mut combatant: Combatant) -> Result<(), CombatError> {
        if self.combatants.contains_key(&combatant.id) {
            return Err(CombatError::invalid(format!(
                "duplicate combatant id '{}'",
                combatant.id
            )));
        }
        combatant.prepare();
        self.initiative.insert(combatant.id.clone(), None);
        self.combatants
            .insert(combatant.id.clone(), Mutex::new(combatant));
        Ok(())
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.combatants.keys().map(String::as_str)
    }

    /// A copy of a combatant's current state.
    pub fn snapshot(&self, id: &str) -> Result<Combatant, CombatError> {
        Ok(self.lock(id)?.clone())
    }

    pub fn into_combatants(self) -> Vec<Combatant> {
        self.combatants
            .into_values()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    /// Run `f` with exclusive access to one combatant.
    pub fn with_combatant<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Combatant) -> R,
    ) -> Result<R, CombatError> {
        let mut guard = self.lock(id)?;
        Ok(f(&mut guard))
    }

    pub fn consume_atr(&self, id: &str, skill: &str, amount: u32) -> Result<bool, CombatError> {
        self.with_combatant(id, |c| c.weapon_skills.consume(skill, amount))
    }

    pub fn reset_atr(&self, id: &str) -> Result<(), CombatError> {
        self.with_combatant(id, Combatant::reset_atr)
    }

    pub fn recompute_defense(&self, id: &str) -> Result<Defense, CombatError> {
        self.with_combatant(id, |c| c.recompute_defense().clone())
    }

    /// Advance to the next round, refilling everyone's AtR first.
    pub fn next_round(&mut self) -> u32 {
        for cell in self.combatants.values_mut() {
            cell.get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .reset_atr();
        }
        self.round += 1;
        info!(round = self.round, "round started");
        self.round
    }

    /// Clear initiative and refill AtR for the whole roster.
    pub fn reset_all(&mut self) {
        for value in self.initiative.values_mut() {
            *value = None;
        }
        for cell in self.combatants.values_mut() {
            cell.get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .reset_atr();
        }
        info!("initiative and AtR reset");
    }

    pub fn roll_initiative(
        &mut self,
        dice: &mut Dice,
        ids: &[&str],
    ) -> Result<Vec<(String, InitiativeRoll)>, CombatError> {
        // Resolve every id before touching any initiative slot.
        let bonuses = ids
            .iter()
            .map(|&id| -> Result<(&str, i32), CombatError> {
                Ok((id, self.lock(id)?.combat.advantage_bonus))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut rolls = Vec::with_capacity(ids.len());
        for (id, bonus) in bonuses {
            let roll = initiative::roll_initiative(dice, bonus);
            self.initiative.insert(id.to_string(), Some(roll.total));
            rolls.push((id.to_string(), roll));
        }
        Ok(rolls)
    }

    pub fn roll_initiative_all(
        &mut self,
        dice: &mut Dice,
    ) -> Result<Vec<(String, InitiativeRoll)>, CombatError> {
        let ids: Vec<String> = self.combatants.keys().cloned().collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.roll_initiative(dice, &refs)
    }

    pub fn turn_order(&self) -> Vec<InitiativeEntry> {
        let mut entries: Vec<InitiativeEntry> = self
            .combatants
            .iter()
            .map(|(id, cell)| {
                let c = cell.lock().unwrap_or_else(PoisonError::into_inner);
                InitiativeEntry {
                    id: id.clone(),
                    name: c.name.clone(),
                    initiative: self.initiative.get(id).copied().flatten(),
                    agility: c.attributes.agi,
                }
            })
            .collect();
        initiative::sort_turn_order(&mut entries);
        entries
    }

    pub fn begin_attack(
        &self,
        dice: &mut Dice,
        request: &AttackRequest,
    ) -> Result<AttackStep, CombatError> {
        match &request.defender {
            None => {
                let mut attacker = self.lock(&request.attacker)?;
                attack::begin_attack(dice, &mut attacker, &request.weapon, None, request.location)
            }
            Some(defender_id) => {
                let (mut attacker, mut defender) = self.lock_pair(&request.attacker, defender_id)?;
                attack::begin_attack(
                    dice,
                    &mut attacker,
                    &request.weapon,
                    Some(&mut *defender),
                    request.location,
                )
            }
        }
    }

    pub fn resume_attack(
        &self,
        dice: &mut Dice,
        pending: PendingDefense,
        decision: DefenseDecision,
    ) -> Result<AttackReport, CombatError> {
        let (mut attacker, mut defender) =
            self.lock_pair(&pending.attacker_id, &pending.defender_id)?;
        attack::resume_attack(dice, pending, decision, &mut attacker, &mut defender)
    }

    /// Run an attack to completion; a pending defense choice defaults to defend.
    pub fn resolve_attack(
        &self,
        dice: &mut Dice,
        request: &AttackRequest,
    ) -> Result<AttackReport, CombatError> {
        match self.begin_attack(dice, request)? {
            AttackStep::Resolved(report) => Ok(report),
            AttackStep::AwaitingDefense(pending) => {
                self.resume_attack(dice, pending, DefenseDecision::Defend)
            }
        }
    }

    fn lock(&self, id: &str) -> Result<Guard<'_>, CombatError> {
        let cell = self
            .combatants
            .get(id)
            .ok_or_else(|| CombatError::invalid(format!("unknown combatant '{}'", id)))?;
        Ok(cell.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Lock two distinct combatants, always in id order so concurrent callers
    /// cannot deadlock.
    fn lock_pair(&self, a: &str, b: &str) -> Result<(Guard<'_>, Guard<'_>), CombatError> {
        if a == b {
            return Err(CombatError::invalid(format!(
                "combatant '{}' cannot attack itself",
                a
            )));
        }
        if a < b {
            let ga = self.lock(a)?;
            let gb = self.lock(b)?;
            Ok((ga, gb))
        } else {
            let gb = self.lock(b)?;
            let ga = self.lock(a)?;
            Ok((ga, gb))
        }
    }
}
