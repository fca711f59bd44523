use engine::armor::{apply_hit, ArmorSet};
use engine::defense::recompute;
use engine::{ArmorPiece, ArmorSlot, ArmorWear, Combatant, Degradation};

fn set(pieces: Vec<(&str, ArmorPiece)>) -> ArmorSet {
    pieces
        .into_iter()
        .map(|(k, p)| (k.to_string(), p))
        .collect()
}

#[test]
fn each_full_cap_removes_one_adef() {
    let mut p = ArmorPiece::new("Mail", ArmorSlot::Chest, 3, 2, 5);
    let out = p.degrade(12);
    assert_eq!(
        out,
        Degradation::Degraded {
            piece: "Mail".into(),
            steps: 2,
            adef_before: 3,
            adef_after: 1,
            pen_before: 2,
            pen_after: 2,
        }
    );
    assert_eq!(p.effective_adef(), 1);
    assert_eq!(p.effective_pen(), 2);
    // base values are kept for repair
    assert_eq!(p.adef, 3);
}

#[test]
fn pen_wears_once_adef_is_gone() {
    let mut p = ArmorPiece::new("Gambeson", ArmorSlot::Chest, 1, 2, 5);
    p.degrade(12);
    assert_eq!(p.effective_adef(), 0);
    assert_eq!(p.effective_pen(), 1);

    p.degrade(50);
    assert_eq!(p.effective_adef(), 0);
    assert_eq!(p.effective_pen(), 0);
}

#[test]
fn below_cap_and_zero_cap_leave_piece_alone() {
    let mut p = ArmorPiece::new("Mail", ArmorSlot::Chest, 3, 2, 5);
    assert!(matches!(p.degrade(4), Degradation::BelowCapacity { cap: 5, .. }));
    assert_eq!(p.wear, None);

    let mut cloth = ArmorPiece::new("Robe", ArmorSlot::Chest, 1, 0, 0);
    assert!(!cloth.degrade(100).changed());
    assert_eq!(cloth.effective_adef(), 1);
}

#[test]
fn hit_picks_best_equipped_piece_in_slot() {
    let mut spare = ArmorPiece::new("Spare Helm", ArmorSlot::Head, 5, 0, 2);
    spare.equipped = false;
    let mut armor = set(vec![
        ("cap", ArmorPiece::new("Cap", ArmorSlot::Head, 1, 0, 2)),
        ("helm", ArmorPiece::new("Helm", ArmorSlot::Head, 3, 1, 2)),
        ("spare", spare),
    ]);
    let out = apply_hit(&mut armor, ArmorSlot::Head, 2);
    assert!(matches!(out, Degradation::Degraded { ref piece, .. } if piece == "Helm"));
    assert_eq!(armor["helm"].effective_adef(), 2);
    assert_eq!(armor["cap"].effective_adef(), 1);
    assert_eq!(armor["spare"].effective_adef(), 5);

    assert_eq!(apply_hit(&mut armor, ArmorSlot::Legs, 9), Degradation::NoArmor);
}

#[test]
fn best_adef_per_slot_and_pen_stacks() {
    let armor = set(vec![
        ("helm", ArmorPiece::new("Helm", ArmorSlot::Head, 3, 1, 4)),
        ("great-helm", ArmorPiece::new("Great Helm", ArmorSlot::Head, 5, 2, 4)),
        ("mail", ArmorPiece::new("Mail", ArmorSlot::Chest, 2, 0, 4)),
    ]);
    let d = recompute(&armor, 4);
    assert_eq!(d.by_slot[&ArmorSlot::Head], 5);
    assert_eq!(d.by_slot[&ArmorSlot::Chest], 2);
    assert_eq!(d.by_slot[&ArmorSlot::Feet], 0);
    assert_eq!(d.armor_total, 7);
    assert_eq!(d.total, 11);
    assert_eq!(d.armor_penalty_total, 3);

    assert_eq!(recompute(&armor, 4), d);
}

#[test]
fn unequipped_pieces_do_not_count() {
    let mut shield = ArmorPiece::new("Kite", ArmorSlot::Arms, 2, 3, 4);
    shield.equipped = false;
    let d = recompute(&set(vec![("kite", shield)]), 4);
    assert_eq!(d.armor_total, 0);
    assert_eq!(d.armor_penalty_total, 0);
    assert_eq!(d.total, 4);
}

#[test]
fn combatant_defense_follows_wear() {
    let mut c = Combatant::new("t", "Templar")
        .with_armor("mail", ArmorPiece::new("Mail", ArmorSlot::Chest, 3, 2, 5));
    assert_eq!(c.defense.total, 7);
    c.apply_armor_hit(ArmorSlot::Chest, 10);
    assert_eq!(c.defense.by_slot[&ArmorSlot::Chest], 1);
    assert_eq!(c.defense.total, 5);
}

#[test]
fn wear_round_trips_through_flat_keys() {
    let mut p = ArmorPiece::new("Mail", ArmorSlot::Chest, 3, 2, 5);
    let fresh = serde_json::to_value(&p).unwrap();
    assert_eq!(fresh["aDEF"], 3);
    assert_eq!(fresh["ap"], "chest");
    assert!(fresh.get("currentADEF").is_none());

    p.degrade(5);
    let worn = serde_json::to_value(&p).unwrap();
    assert_eq!(worn["currentADEF"], 2);
    assert_eq!(worn["currentPEN"], 2);
    let back: ArmorPiece = serde_json::from_value(worn).unwrap();
    assert_eq!(back, p);
}

#[test]
fn one_wear_key_is_enough_to_load_wear() {
    let p: ArmorPiece = serde_json::from_str(
        r#"{"name":"Mail","ap":"chest","aDEF":3,"PEN":2,"CAP":5,"equipped":true,"currentADEF":0}"#,
    )
    .unwrap();
    assert_eq!(p.wear, Some(ArmorWear { adef: 0, pen: 2 }));
    assert_eq!(p.effective_adef(), 0);

    let back = serde_json::to_value(&p).unwrap();
    assert_eq!(back["currentADEF"], 0);
    assert_eq!(back["currentPEN"], 2);
}
