use engine::attributes::{derive_abilities, AbilityBonuses};
use engine::{AbilityKind, Attributes, Combatant};
use proptest::prelude::*;

fn attrs() -> Attributes {
    Attributes {
        int_: 5,
        wis: 6,
        pat: 4,
        will: 7,
        str_: 8,
        agi: 5,
        spd: 3,
        cha: 2,
        vir: 2,
    }
}

#[test]
fn odd_sums_round_up() {
    let a = derive_abilities(&attrs(), &AbilityBonuses::new());
    // (5 + 6) / 2 = 5.5
    assert_eq!(a.get(AbilityKind::Perception).value, 6);
    // (7 + 8) / 2 = 7.5
    assert_eq!(a.get(AbilityKind::Climb).value, 8);
    // (2 + 2) / 2
    assert_eq!(a.get(AbilityKind::Appeal).value, 2);
}

#[test]
fn bonus_feeds_modifier_only() {
    let mut bonuses = AbilityBonuses::new();
    bonuses.insert(AbilityKind::Hide, 2);
    let a = derive_abilities(&attrs(), &bonuses);
    let hide = a.get(AbilityKind::Hide);
    // wis 6 + spd 3
    assert_eq!(hide.value, 5);
    assert_eq!(hide.bonus, 2);
    assert_eq!(hide.modifier, 7);
    assert_eq!(a.get(AbilityKind::Search).bonus, 0);
}

#[test]
fn every_kind_is_derived_in_order() {
    let a = derive_abilities(&attrs(), &AbilityBonuses::new());
    let kinds: Vec<AbilityKind> = a.iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, AbilityKind::ALL.to_vec());
}

#[test]
fn combatant_uses_its_bonuses() {
    let mut c = Combatant::new("scout", "Scout");
    c.attributes = attrs();
    c.ability_bonuses.insert(AbilityKind::Jump, -1);
    let jump = c.abilities().get(AbilityKind::Jump);
    // will 7 + agi 5
    assert_eq!(jump.value, 6);
    assert_eq!(jump.modifier, 5);
}

#[test]
fn serializes_mod_key() {
    let a = derive_abilities(&attrs(), &AbilityBonuses::new());
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["perception"]["mod"], 6);
    assert_eq!(v["perception"]["value"], 6);
}

proptest! {
    #[test]
    fn value_is_ceiling_of_average(a in 0i32..30, b in 0i32..30, bonus in -5i32..5) {
        let mut x = Attributes::default();
        x.int_ = a;
        x.wis = b;
        let mut bonuses = AbilityBonuses::new();
        bonuses.insert(AbilityKind::Perception, bonus);
        let p = derive_abilities(&x, &bonuses).get(AbilityKind::Perception);
        let expected = ((a + b) as f64 / 2.0).ceil() as i32;
        prop_assert_eq!(p.value, expected);
        prop_assert_eq!(p.modifier, expected + bonus);
    }
}
