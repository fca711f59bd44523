use engine::api::{run_duel, simulate_duel, simulate_duel_many, DuelConfig};
use engine::content::{
    builtin_encounter, builtin_encounters, load_encounter, parse_encounter, Format,
};
use engine::ArmorSlot;

#[test]
fn builtins_parse_and_prepare() {
    for id in builtin_encounters().keys() {
        let file = builtin_encounter(id).expect("builtin parses");
        let enc = file.build().expect("builtin builds");
        assert!(enc.ids().count() >= 2, "{id} needs two combatants");
    }
}

#[test]
fn temple_skirmish_derived_values() {
    let enc = builtin_encounter("temple_skirmish").unwrap().build().unwrap();

    let templar = enc.snapshot("templar").unwrap();
    assert_eq!(templar.life.max, 22);
    assert_eq!(templar.skills["scripture"].modifier, 3);
    assert_eq!(templar.saves["fear"].df, Some(14));
    assert_eq!(templar.faith.max, 10);
    assert_eq!(templar.defense.total, 10);
    assert_eq!(templar.defense.armor_penalty_total, 3);

    // the unequipped spare jerkin neither counts for aDEF nor PEN
    let raider = enc.snapshot("raider").unwrap();
    assert_eq!(raider.defense.by_slot[&ArmorSlot::Chest], 2);
    assert_eq!(raider.defense.total, 6);
    assert_eq!(raider.defense.armor_penalty_total, 1);
    assert_eq!(raider.life.value, 15);
}

#[test]
fn unknown_builtin_is_an_error() {
    assert!(builtin_encounter("jerusalem").is_err());
}

#[test]
fn json_content_with_bad_formula_is_rejected() {
    let json = r#"{
        "name": "broken",
        "combatants": [],
        "loadout": { "x": { "name": "Club", "damage": "d" } }
    }"#;
    assert!(parse_encounter(json, Format::Json).is_err());
}

#[test]
fn duel_is_deterministic_per_seed() {
    let cfg = || DuelConfig {
        encounter_id: Some("temple_skirmish".into()),
        seed: 2025,
        ..Default::default()
    };
    let first = simulate_duel(cfg()).expect("duel ran");
    let second = simulate_duel(cfg()).expect("duel ran");
    assert!(first.rounds > 0);
    assert!(matches!(first.winner.as_str(), "templar" | "raider" | "draw"));
    assert_eq!(first.log, second.log);
    assert!(first.log[0].starts_with("[START]"));
}

#[test]
fn duel_ends_when_someone_drops() {
    let file = builtin_encounter("desert_ambush").unwrap();
    let res = run_duel(&file, 7, 200).unwrap();
    if res.winner != "draw" {
        let loser = if res.winner == "pilgrim" { "bandit" } else { "pilgrim" };
        assert_eq!(res.life_end[loser], 0);
        assert!(res.life_end[&res.winner] > 0);
    }
}

#[test]
fn many_duels_account_for_every_sample() {
    let stats = simulate_duel_many(
        DuelConfig {
            encounter_id: Some("desert_ambush".into()),
            seed: 1,
            max_rounds: Some(10),
            ..Default::default()
        },
        25,
    )
    .unwrap();
    let wins: u32 = stats.wins.values().sum();
    assert_eq!(wins + stats.draws, 25);
    assert_eq!(stats.samples, 25);
}

#[test]
fn encounter_file_with_utf8_bom_loads() {
    let yaml = include_str!("../content/encounters/desert_ambush.yaml");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(yaml.as_bytes());
    let path = std::env::temp_dir().join(format!("holy-bom-{}.yaml", std::process::id()));
    std::fs::write(&path, &bytes).unwrap();

    let loaded = load_encounter(&path);
    std::fs::remove_file(&path).ok();

    let file = loaded.expect("BOM-prefixed YAML loads");
    assert_eq!(file.name, "Desert ambush");
    assert_eq!(file.combatants.len(), 2);
}
