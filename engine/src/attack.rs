//! Melee attack resolution.
//!
//! An attack is a small state machine. [`begin_attack`] checks the attacker's
//! AtR, rolls the attack and tests it against the defender's total defense
//! (gate A). A player-controlled defender then has to pick dodge or defend, so
//! the pipeline stops with [`AttackStep::AwaitingDefense`]; [`resume_attack`]
//! takes the decision and finishes the defense roll and damage. Defenders run
//! by the engine always defend.
//!
//! Every terminal outcome spends exactly one AtR from the attacker's skill.
//! The two error exits differ: running out of AtR spends nothing, cancelling
//! the defense choice still spends the attacker's AtR.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::armor::{ArmorSlot, Degradation};
use crate::combatant::Combatant;
use crate::error::CombatError;
use crate::life;
use crate::weapon::Weapon;
use crate::{format_modifier, Dice};

pub const DEFAULT_HIT_LOCATION: ArmorSlot = ArmorSlot::Chest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseChoice {
    Dodge,
    Defend,
}

impl fmt::Display for DefenseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefenseChoice::Dodge => f.write_str("Dodge"),
            DefenseChoice::Defend => f.write_str("Defend"),
        }
    }
}

/// The defender's answer to a pending attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseDecision {
    Dodge,
    Defend,
    Cancel,
}

impl DefenseDecision {
    pub fn choice(self) -> Option<DefenseChoice> {
        match self {
            DefenseDecision::Dodge => Some(DefenseChoice::Dodge),
            DefenseDecision::Defend => Some(DefenseChoice::Defend),
            DefenseDecision::Cancel => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    /// Natural 1 on the attack; the attacker's next defense is halved.
    AutoFail,
    /// Attack rolled without a defender.
    NoTarget,
    /// Attack total did not beat the defender's tDEF.
    BlockedByArmor,
    /// Defense roll met or beat the attack.
    Blocked,
    /// Natural 20 on the defense; a counter-attack is granted.
    AutoBlock,
    Hit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub natural: u8,
    pub bonus: i32,
    pub total: i32,
}

impl AttackRoll {
    pub fn new(natural: u8, bonus: i32) -> Self {
        Self {
            natural,
            bonus,
            total: natural as i32 + bonus,
        }
    }

    pub fn is_nat20(&self) -> bool {
        self.natural == 20
    }

    pub fn is_nat1(&self) -> bool {
        self.natural == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DefenseRoll {
    pub choice: DefenseChoice,
    pub natural: u8,
    pub bonus: i32,
    /// Roll plus bonus, before the half-defense debuff.
    pub total: i32,
    /// The value actually compared against the attack.
    pub final_total: i32,
    pub halved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageReport {
    pub formula: String,
    pub faces: Vec<u8>,
    pub rolled: i32,
    pub doubled: bool,
    pub one_and_half: bool,
    pub bonus: i32,
    pub amount: i32,
    pub location: ArmorSlot,
    pub armor: Degradation,
    pub life_before: i32,
    pub life_after: i32,
}

/// Everything the presentation layer needs to narrate one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    pub outcome: AttackOutcome,
    pub attacker: String,
    pub defender: Option<String>,
    pub weapon: String,
    pub skill: String,
    pub attack: AttackRoll,
    /// Defender's tDEF at gate A.
    pub tdef: Option<i32>,
    pub defense: Option<DefenseRoll>,
    pub damage: Option<DamageReport>,
    pub counter_attack_granted: bool,
    pub attacker_atr_remaining: u32,
    pub defender_life: Option<i32>,
    pub summary: String,
    pub log: Vec<String>,
}

impl AttackReport {
    fn new(attacker: &Combatant, weapon: &Weapon, skill: &str, attack: AttackRoll) -> Self {
        Self {
            outcome: AttackOutcome::NoTarget,
            attacker: attacker.name.clone(),
            defender: None,
            weapon: weapon.name.clone(),
            skill: skill.to_string(),
            attack,
            tdef: None,
            defense: None,
            damage: None,
            counter_attack_granted: false,
            attacker_atr_remaining: 0,
            defender_life: None,
            summary: String::new(),
            log: Vec::new(),
        }
    }

    fn close(
        mut self,
        outcome: AttackOutcome,
        attacker: &Combatant,
        defender: Option<&Combatant>,
    ) -> Self {
        self.outcome = outcome;
        self.attacker_atr_remaining = attacker.weapon_skills.remaining(&self.skill).unwrap_or(0);
        self.defender_life = defender.map(|d| d.life.value);
        info!(attacker = %self.attacker, ?outcome, "{}", self.summary);
        self
    }
}

/// An attack that passed gate A and waits for the defender's decision.
/// Resumed at most once: [`resume_attack`] consumes it.
#[derive(Debug, Serialize)]
pub struct PendingDefense {
    pub attacker_id: String,
    pub defender_id: String,
    pub weapon: Weapon,
    pub skill: String,
    pub attack: AttackRoll,
    pub location: ArmorSlot,
    report: AttackReport,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttackStep {
    Resolved(AttackReport),
    AwaitingDefense(PendingDefense),
}

/// Gate A: the raw attack must beat total defense outright.
pub fn passes_gate(attack_total: i32, tdef: i32) -> bool {
    attack_total > tdef
}

/// Attack vs defense roll; ties go to the defender.
pub fn attack_lands(attack_total: i32, defense_total: i32) -> bool {
    defense_total < attack_total
}

/// Multipliers scale the dice (×2 then ×1.5, floored); the flat bonus comes after.
pub fn scale_damage(rolled: i32, doubled: bool, one_and_half: bool, bonus: i32) -> i32 {
    let mut amount = rolled;
    if doubled {
        amount *= 2;
    }
    if one_and_half {
        amount = (amount * 3).div_euclid(2);
    }
    (amount + bonus).max(0)
}

/// Start an attack. Stops early with [`AttackStep::AwaitingDefense`] when a
/// player-controlled defender has to choose a defense.
pub fn begin_attack(
    dice: &mut Dice,
    attacker: &mut Combatant,
    weapon: &Weapon,
    defender: Option<&mut Combatant>,
    location: Option<ArmorSlot>,
) -> Result<AttackStep, CombatError> {
    let skill = weapon.skill_key().to_string();
    let attack_bonus = match attacker.weapon_skills.get(&skill) {
        None => {
            warn!(attacker = %attacker.name, %skill, "weapon skill not found");
            return Err(CombatError::invalid(format!(
                "weapon skill '{}' not found on {}",
                skill, attacker.name
            )));
        }
        Some(ws) if ws.atr_current < 1 => {
            warn!(attacker = %attacker.name, %skill, "no AtR remaining");
            return Err(CombatError::InsufficientResource {
                combatant: attacker.name.clone(),
                skill,
            });
        }
        Some(ws) => ws.attack_bonus,
    };

    let attack = AttackRoll::new(dice.d20(), attack_bonus);
    debug!(attacker = %attacker.name, natural = attack.natural, total = attack.total, "attack rolled");
    let mut report = AttackReport::new(attacker, weapon, &skill, attack);
    report.log.push(format!(
        "[ATTACK][{}] {} d20={} {} = {}",
        attacker.name,
        weapon.name,
        attack.natural,
        format_modifier(attack.bonus),
        attack.total
    ));

    if attack.is_nat1() {
        attacker.combat.set_half_defense();
        spend_attack(attacker, &skill, &mut report.log);
        report.log.push(format!(
            "[COMBAT][{}] natural 1: next defense is halved",
            attacker.name
        ));
        report.summary = format!(
            "{} attacks with {}: natural 1, automatic failure",
            attacker.name, weapon.name
        );
        return Ok(AttackStep::Resolved(report.close(
            AttackOutcome::AutoFail,
            attacker,
            None,
        )));
    }

    let Some(defender) = defender else {
        spend_attack(attacker, &skill, &mut report.log);
        report.summary = format!(
            "{} attacks with {}: {}{}",
            attacker.name,
            weapon.name,
            attack.total,
            if attack.is_nat20() { " (natural 20!)" } else { "" }
        );
        return Ok(AttackStep::Resolved(report.close(
            AttackOutcome::NoTarget,
            attacker,
            None,
        )));
    };

    let tdef = defender.defense.total;
    report.defender = Some(defender.name.clone());
    report.tdef = Some(tdef);

    if !passes_gate(attack.total, tdef) {
        spend_attack(attacker, &skill, &mut report.log);
        report.log.push(format!(
            "[DEF][{}] tDEF {} holds against {}",
            defender.name, tdef, attack.total
        ));
        report.summary = format!(
            "{} attacks {} with {}: {} vs tDEF {}, attack failed",
            attacker.name, defender.name, weapon.name, attack.total, tdef
        );
        return Ok(AttackStep::Resolved(report.close(
            AttackOutcome::BlockedByArmor,
            attacker,
            Some(&*defender),
        )));
    }
    debug!(defender = %defender.name, tdef, "gate A passed");

    let pending = PendingDefense {
        attacker_id: attacker.id.clone(),
        defender_id: defender.id.clone(),
        weapon: weapon.clone(),
        skill,
        attack,
        location: location.unwrap_or(DEFAULT_HIT_LOCATION),
        report,
    };

    if defender.player_controlled {
        info!(defender = %defender.name, "awaiting defense choice");
        return Ok(AttackStep::AwaitingDefense(pending));
    }

    Ok(AttackStep::Resolved(finish_defense(
        dice,
        pending,
        DefenseChoice::Defend,
        attacker,
        defender,
    )))
}

/// Finish a pending attack with the defender's decision.
pub fn resume_attack(
    dice: &mut Dice,
    pending: PendingDefense,
    decision: DefenseDecision,
    attacker: &mut Combatant,
    defender: &mut Combatant,
) -> Result<AttackReport, CombatError> {
    if attacker.id != pending.attacker_id || defender.id != pending.defender_id {
        return Err(CombatError::invalid(format!(
            "pending attack is {} → {}, not {} → {}",
            pending.attacker_id, pending.defender_id, attacker.id, defender.id
        )));
    }

    // AtR may have been drained by another attack while the choice was pending.
    if attacker.weapon_skills.remaining(&pending.skill).unwrap_or(0) < 1 {
        warn!(attacker = %attacker.name, skill = %pending.skill, "no AtR left to resume attack");
        return Err(CombatError::InsufficientResource {
            combatant: attacker.name.clone(),
            skill: pending.skill,
        });
    }

    match decision.choice() {
        Some(choice) => Ok(finish_defense(dice, pending, choice, attacker, defender)),
        None => {
            let mut log = pending.report.log;
            spend_attack(attacker, &pending.skill, &mut log);
            info!(defender = %defender.name, "defense choice cancelled");
            Err(CombatError::UserCancelled {
                defender: defender.name.clone(),
            })
        }
    }
}

/// Run an attack to completion, defending automatically when a choice is due.
pub fn resolve_attack(
    dice: &mut Dice,
    attacker: &mut Combatant,
    weapon: &Weapon,
    defender: Option<&mut Combatant>,
    location: Option<ArmorSlot>,
) -> Result<AttackReport, CombatError> {
    match defender {
        None => match begin_attack(dice, attacker, weapon, None, location)? {
            AttackStep::Resolved(report) => Ok(report),
            AttackStep::AwaitingDefense(pending) => Err(CombatError::invalid(format!(
                "attack on {} awaits a defender that was not supplied",
                pending.defender_id
            ))),
        },
        Some(defender) => match begin_attack(dice, attacker, weapon, Some(&mut *defender), location)? {
            AttackStep::Resolved(report) => Ok(report),
            AttackStep::AwaitingDefense(pending) => resume_attack(
                dice,
                pending,
                DefenseDecision::Defend,
                attacker,
                defender,
            ),
        },
    }
}

fn finish_defense(
    dice: &mut Dice,
    pending: PendingDefense,
    choice: DefenseChoice,
    attacker: &mut Combatant,
    defender: &mut Combatant,
) -> AttackReport {
    let PendingDefense {
        weapon,
        skill,
        attack,
        location,
        mut report,
        ..
    } = pending;

    let bonus = match choice {
        DefenseChoice::Dodge => defender.combat.dodge_bonus,
        DefenseChoice::Defend => defender.combat.defend_bonus,
    };
    let natural = dice.d20();
    let total = natural as i32 + bonus;
    let halved = defender.combat.take_half_defense();
    let final_total = if halved { total.div_euclid(2) } else { total };
    report.defense = Some(DefenseRoll {
        choice,
        natural,
        bonus,
        total,
        final_total,
        halved,
    });
    report.log.push(format!(
        "[DEF][{}] {} d20={} {} = {}{}",
        defender.name,
        choice,
        natural,
        format_modifier(bonus),
        total,
        if halved {
            format!(" halved → {}", final_total)
        } else {
            String::new()
        }
    ));
    debug!(defender = %defender.name, natural, final_total, halved, "defense rolled");

    if natural == 20 {
        spend_attack(attacker, &skill, &mut report.log);
        report.counter_attack_granted = true;
        report.summary = format!(
            "{} rolls a natural 20 defense: attack blocked, free counter-attack granted",
            defender.name
        );
        return report.close(AttackOutcome::AutoBlock, attacker, Some(&*defender));
    }

    if natural == 1 {
        spend_attack(attacker, &skill, &mut report.log);
        report.log.push(format!(
            "[DEF][{}] natural 1: automatic failure, damage ×1.5",
            defender.name
        ));
        resolve_damage(
            dice,
            &mut report,
            attacker,
            defender,
            &weapon,
            location,
            attack.is_nat20(),
            true,
        );
        return report.close(AttackOutcome::Hit, attacker, Some(&*defender));
    }

    let lands = attack_lands(attack.total, final_total);
    spend_attack(attacker, &skill, &mut report.log);

    if lands {
        resolve_damage(
            dice,
            &mut report,
            attacker,
            defender,
            &weapon,
            location,
            attack.is_nat20(),
            false,
        );
        return report.close(AttackOutcome::Hit, attacker, Some(&*defender));
    }

    // A successful defense still costs the defender, as long as the attacker
    // could keep pressing with this skill.
    if attacker.weapon_skills.remaining(&skill).unwrap_or(0) > 0 {
        if let Some(key) = defender.weapon_skills.consume_on_hit_taken() {
            report.log.push(format!(
                "[ATR][{}] {} spent holding off the attack",
                defender.name, key
            ));
        }
    }
    report.summary = format!(
        "{} attacks {} with {}: {} vs {} {}, defended",
        attacker.name, defender.name, weapon.name, attack.total, choice, final_total
    );
    report.close(AttackOutcome::Blocked, attacker, Some(&*defender))
}

#[allow(clippy::too_many_arguments)]
fn resolve_damage(
    dice: &mut Dice,
    report: &mut AttackReport,
    attacker: &Combatant,
    defender: &mut Combatant,
    weapon: &Weapon,
    location: ArmorSlot,
    doubled: bool,
    one_and_half: bool,
) {
    let roll = weapon.damage.roll(dice);
    let bonus = attacker.combat.damage_bonus;
    let amount = scale_damage(roll.total, doubled, one_and_half, bonus);

    let mut breakdown = roll.total.to_string();
    if doubled {
        breakdown.push_str(" ×2");
    }
    if one_and_half {
        breakdown.push_str(" ×1.5");
    }
    if bonus != 0 {
        breakdown.push(' ');
        breakdown.push_str(&format_modifier(bonus));
    }
    report.log.push(format!(
        "[DMG][{}] {} rolled {} = {}",
        attacker.name, weapon.damage, breakdown, amount
    ));

    let armor = defender.apply_armor_hit(location, amount);
    if let Degradation::Degraded {
        piece,
        adef_before,
        adef_after,
        pen_before,
        pen_after,
        ..
    } = &armor
    {
        report.log.push(format!(
            "[ARMOR][{}] {} aDEF {} → {}, PEN {} → {} (tDEF {})",
            defender.name, piece, adef_before, adef_after, pen_before, pen_after, defender.defense.total
        ));
    }

    let life_before = defender.life.value;
    life::apply_damage(&defender.name, &mut defender.life, amount, |msg| {
        report.log.push(msg)
    });
    if let Some(key) = defender.weapon_skills.consume_on_hit_taken() {
        report
            .log
            .push(format!("[ATR][{}] {} spent taking the hit", defender.name, key));
    }

    report.summary = format!(
        "{} hits {} with {} for {} damage ({})",
        attacker.name, defender.name, weapon.name, amount, breakdown
    );
    report.damage = Some(DamageReport {
        formula: weapon.damage.to_string(),
        faces: roll.faces,
        rolled: roll.total,
        doubled,
        one_and_half,
        bonus,
        amount,
        location,
        armor,
        life_before,
        life_after: defender.life.value,
    });
}

fn spend_attack(attacker: &mut Combatant, skill: &str, log: &mut Vec<String>) {
    if attacker.weapon_skills.consume(skill, 1) {
        let left = attacker.weapon_skills.remaining(skill).unwrap_or(0);
        log.push(format!("[ATR][{}] {} → {} left", attacker.name, skill, left));
    } else {
        warn!(attacker = %attacker.name, skill, "no AtR left to spend");
    }
}
