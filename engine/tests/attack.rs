use engine::attack::{begin_attack, passes_gate, resolve_attack, resume_attack, scale_damage};
use engine::{
    ArmorPiece, ArmorSlot, AttackOutcome, AttackStep, CombatError, Combatant, DefenseDecision,
    Degradation, Dice, Weapon, WeaponSkill,
};

fn knight() -> Combatant {
    Combatant::new("knight", "Rodrigo")
        .with_life(20)
        .with_skill("lightArms", WeaponSkill::new("Light Arms", 3, 2))
}

fn saracen() -> Combatant {
    Combatant::new("saracen", "Saracen")
        .with_life(12)
        .with_skill("lightArms", WeaponSkill::new("Light Arms", 2, 1))
}

fn sword() -> Weapon {
    Weapon::new("Arming Sword", "lightArms", "1d6".parse().unwrap())
}

fn atr(c: &Combatant) -> u32 {
    c.weapon_skills.remaining("lightArms").unwrap()
}

#[test]
fn clean_hit_deals_damage_and_staggers_defender() {
    let (mut a, mut d) = (knight(), saracen());
    let mut dice = Dice::from_scripted(vec![15, 10, 4]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::Hit);
    assert_eq!(r.attack.total, 18);
    assert_eq!(r.tdef, Some(4));
    let dmg = r.damage.as_ref().unwrap();
    assert_eq!(dmg.amount, 4);
    assert_eq!(dmg.location, ArmorSlot::Chest);
    assert_eq!(dmg.armor, Degradation::NoArmor);
    assert_eq!(d.life.value, 8);
    assert_eq!(r.defender_life, Some(8));
    assert_eq!(atr(&a), 1);
    assert_eq!(r.attacker_atr_remaining, 1);
    assert_eq!(atr(&d), 0);
    insta::assert_snapshot!(r.summary, @"Rodrigo hits Saracen with Arming Sword for 4 damage (4)");
}

#[test]
fn attack_equal_to_tdef_fails_at_gate() {
    let mut a = knight();
    let mut d = saracen().with_armor("plate", ArmorPiece::new("Plate", ArmorSlot::Chest, 6, 0, 5));
    let mut dice = Dice::from_scripted(vec![7]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::BlockedByArmor);
    assert!(r.defense.is_none());
    assert_eq!(atr(&a), 1);
    assert_eq!(atr(&d), 1);
    assert_eq!(d.life.value, 12);
    insta::assert_snapshot!(r.summary, @"Rodrigo attacks Saracen with Arming Sword: 10 vs tDEF 10, attack failed");
}

#[test]
fn ties_go_to_the_defender() {
    let (mut a, mut d) = (knight(), saracen());
    let mut dice = Dice::from_scripted(vec![12, 15]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::Blocked);
    assert_eq!(r.defense.unwrap().final_total, 15);
    assert_eq!(d.life.value, 12);
    // attacker still has AtR left, so holding off the attack costs the defender
    assert_eq!(atr(&d), 0);
    insta::assert_snapshot!(r.summary, @"Rodrigo attacks Saracen with Arming Sword: 15 vs Defend 15, defended");
}

#[test]
fn blocking_a_spent_attacker_is_free() {
    let mut a = Combatant::new("knight", "Rodrigo")
        .with_skill("lightArms", WeaponSkill::new("Light Arms", 3, 1));
    let mut d = saracen();
    let mut dice = Dice::from_scripted(vec![12, 16]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();
    assert_eq!(r.outcome, AttackOutcome::Blocked);
    assert_eq!(atr(&a), 0);
    assert_eq!(atr(&d), 1);
}

#[test]
fn natural_one_halves_the_attackers_next_defense() {
    let (mut a, mut d) = (knight(), saracen());
    let mut dice = Dice::from_scripted(vec![1]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::AutoFail);
    assert!(r.defense.is_none());
    assert!(a.combat.has_half_defense());
    assert_eq!(atr(&a), 1);
    insta::assert_snapshot!(r.summary, @"Rodrigo attacks with Arming Sword: natural 1, automatic failure");

    // Saracen answers: 18 + 2 = 20 against a halved 16
    let mut dice = Dice::from_scripted(vec![18, 16, 3]);
    let back = resolve_attack(&mut dice, &mut d, &sword(), Some(&mut a), None).unwrap();
    let def = back.defense.unwrap();
    assert!(def.halved);
    assert_eq!(def.total, 16);
    assert_eq!(def.final_total, 8);
    assert_eq!(back.outcome, AttackOutcome::Hit);
    assert!(!a.combat.has_half_defense());
    assert_eq!(a.life.value, 17);
}

#[test]
fn natural_twenty_defense_blocks_and_grants_counter() {
    let (mut a, mut d) = (knight(), saracen());
    let mut dice = Dice::from_scripted(vec![19, 20]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::AutoBlock);
    assert!(r.counter_attack_granted);
    assert!(r.damage.is_none());
    assert_eq!(atr(&a), 1);
    assert_eq!(atr(&d), 1);
    insta::assert_snapshot!(r.summary, @"Saracen rolls a natural 20 defense: attack blocked, free counter-attack granted");
}

#[test]
fn natural_one_defense_takes_half_again() {
    let (mut a, mut d) = (knight(), saracen());
    let mut dice = Dice::from_scripted(vec![15, 1, 5]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    assert_eq!(r.outcome, AttackOutcome::Hit);
    let dmg = r.damage.unwrap();
    assert!(dmg.one_and_half);
    assert!(!dmg.doubled);
    assert_eq!(dmg.amount, 7);
    assert_eq!(d.life.value, 5);
}

#[test]
fn multipliers_stack_before_bonus_and_life_floors_at_zero() {
    let mut a = knight();
    a.combat.damage_bonus = 2;
    let mut d = saracen();
    let mut dice = Dice::from_scripted(vec![20, 1, 4]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();

    let dmg = r.damage.as_ref().unwrap();
    assert!(dmg.doubled && dmg.one_and_half);
    assert_eq!(dmg.amount, 14);
    assert_eq!(dmg.life_before, 12);
    assert_eq!(d.life.value, 0);
    assert!(d.is_down());
    insta::assert_snapshot!(r.summary, @"Rodrigo hits Saracen with Arming Sword for 14 damage (4 ×2 ×1.5 +2)");
}

#[test]
fn scale_damage_floors_and_clamps() {
    assert_eq!(scale_damage(5, false, true, 0), 7);
    assert_eq!(scale_damage(3, true, true, 0), 9);
    assert_eq!(scale_damage(1, false, false, -3), 0);
}

#[test]
fn hit_wears_armor_at_location() {
    let mut a = knight();
    let mut d = saracen().with_armor(
        "jerkin",
        ArmorPiece::new("Leather Jerkin", ArmorSlot::Chest, 2, 1, 3),
    );
    assert_eq!(d.defense.total, 6);
    let mut dice = Dice::from_scripted(vec![15, 10, 6]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), Some(ArmorSlot::Chest)).unwrap();

    let dmg = r.damage.unwrap();
    assert!(dmg.armor.changed());
    assert_eq!(d.armor["jerkin"].effective_adef(), 0);
    assert_eq!(d.armor["jerkin"].effective_pen(), 1);
    assert_eq!(d.defense.total, 4);
    assert_eq!(d.life.value, 6);
}

#[test]
fn player_defender_chooses_dodge() {
    let mut a = knight();
    let mut d = saracen().as_player();
    d.combat.dodge_bonus = 5;
    let mut dice = Dice::from_scripted(vec![15, 13]);

    let pending = match begin_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap() {
        AttackStep::AwaitingDefense(p) => p,
        AttackStep::Resolved(r) => panic!("expected a pending defense, got {:?}", r.outcome),
    };
    // nothing spent while waiting
    assert_eq!(atr(&a), 2);

    let r = resume_attack(&mut dice, pending, DefenseDecision::Dodge, &mut a, &mut d).unwrap();
    assert_eq!(r.outcome, AttackOutcome::Blocked);
    insta::assert_snapshot!(r.summary, @"Rodrigo attacks Saracen with Arming Sword: 18 vs Dodge 18, defended");
}

#[test]
fn cancelling_the_choice_still_spends_attacker_atr() {
    let mut a = knight();
    let mut d = saracen().as_player();
    let mut dice = Dice::from_scripted(vec![15]);
    let AttackStep::AwaitingDefense(pending) =
        begin_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap()
    else {
        panic!("expected a pending defense");
    };

    let err = resume_attack(&mut dice, pending, DefenseDecision::Cancel, &mut a, &mut d).unwrap_err();
    assert!(matches!(err, CombatError::UserCancelled { .. }));
    assert_eq!(atr(&a), 1);
    assert_eq!(atr(&d), 1);
    assert_eq!(d.life.value, 12);
}

#[test]
fn resume_after_atr_drained_is_refused() {
    let mut a = knight();
    let mut d = saracen().as_player();
    let mut dice = Dice::from_scripted(vec![15, 3, 4]);
    let AttackStep::AwaitingDefense(pending) =
        begin_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap()
    else {
        panic!("expected a pending defense");
    };

    // another attack spends the attacker's AtR while the choice is open
    assert!(a.weapon_skills.consume("lightArms", 2));

    let err = resume_attack(&mut dice, pending, DefenseDecision::Defend, &mut a, &mut d).unwrap_err();
    assert!(matches!(err, CombatError::InsufficientResource { ref skill, .. } if skill == "lightArms"));
    assert_eq!(atr(&a), 0);
    assert_eq!(atr(&d), 1);
    assert_eq!(d.life.value, 12);
}

#[test]
fn out_of_atr_is_an_error_and_changes_nothing() {
    let mut a = Combatant::new("knight", "Rodrigo")
        .with_skill("lightArms", WeaponSkill::new("Light Arms", 3, 1));
    let mut d = saracen();
    let mut dice = Dice::from_scripted(vec![1]);
    resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap();
    assert_eq!(atr(&a), 0);

    let before = d.clone();
    let err = resolve_attack(&mut dice, &mut a, &sword(), Some(&mut d), None).unwrap_err();
    assert!(matches!(err, CombatError::InsufficientResource { ref skill, .. } if skill == "lightArms"));
    assert_eq!(d, before);
}

#[test]
fn unknown_skill_is_invalid() {
    let (mut a, mut d) = (knight(), saracen());
    let pike = Weapon::new("Pike", "polearms", "1d8".parse().unwrap());
    let mut dice = Dice::from_scripted(vec![15]);
    let err = resolve_attack(&mut dice, &mut a, &pike, Some(&mut d), None).unwrap_err();
    assert!(matches!(err, CombatError::InvalidReference { .. }));
    assert_eq!(atr(&a), 2);
}

#[test]
fn attack_without_target_just_rolls() {
    let mut a = knight();
    let mut dice = Dice::from_scripted(vec![20]);
    let r = resolve_attack(&mut dice, &mut a, &sword(), None, None).unwrap();
    assert_eq!(r.outcome, AttackOutcome::NoTarget);
    assert_eq!(atr(&a), 1);
    insta::assert_snapshot!(r.summary, @"Rodrigo attacks with Arming Sword: 23 (natural 20!)");
}

#[test]
fn gate_needs_strictly_more_than_tdef() {
    assert!(passes_gate(11, 10));
    assert!(!passes_gate(10, 10));
    assert!(!passes_gate(9, 10));
}
