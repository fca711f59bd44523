use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{builtin_encounter, load_encounter, EncounterFile};
use crate::encounter::{AttackRequest, Encounter};
use crate::error::CombatError;
use crate::{format_modifier, Dice};

const MAX_ROUNDS: u32 = 30;
const DEFAULT_ENCOUNTER: &str = "temple_skirmish";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelConfig {
    /// JSON or YAML encounter file; takes precedence over `encounter_id`.
    #[serde(default)]
    pub encounter_path: Option<String>,
    #[serde(default)]
    pub encounter_id: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelResult {
    /// Winning combatant id, or `draw`.
    pub winner: String,
    pub rounds: u32,
    pub life_end: IndexMap<String, i32>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelStats {
    pub samples: u32,
    pub wins: IndexMap<String, u32>,
    pub draws: u32,
}

pub fn simulate_duel(cfg: DuelConfig) -> Result<DuelResult> {
    let file = load(&cfg)?;
    run_duel(&file, cfg.seed, cfg.max_rounds.unwrap_or(MAX_ROUNDS))
}

/// Run `samples` duels; sample `i` uses seed `cfg.seed + i`.
pub fn simulate_duel_many(cfg: DuelConfig, samples: u32) -> Result<DuelStats> {
    let file = load(&cfg)?;
    run_duel_many(&file, cfg.seed, samples, cfg.max_rounds.unwrap_or(MAX_ROUNDS))
}

pub fn run_duel_many(
    file: &EncounterFile,
    seed: u64,
    samples: u32,
    max_rounds: u32,
) -> Result<DuelStats> {
    let mut stats = DuelStats {
        samples,
        wins: file
            .combatants
            .iter()
            .take(2)
            .map(|c| (c.id.clone(), 0))
            .collect(),
        draws: 0,
    };
    for i in 0..samples {
        let res = run_duel(file, seed.wrapping_add(i as u64), max_rounds)?;
        match stats.wins.get_mut(&res.winner) {
            Some(count) => *count += 1,
            None => stats.draws += 1,
        }
    }
    Ok(stats)
}

/// Fight the first two combatants of `file` until one drops or the round cap
/// is reached. Each round refills AtR, rolls initiative, then lets both sides
/// attack in turn order until neither has AtR left for their weapon.
pub fn run_duel(file: &EncounterFile, seed: u64, max_rounds: u32) -> Result<DuelResult> {
    if file.combatants.len() < 2 {
        bail!("encounter '{}' needs two combatants for a duel", file.name);
    }
    let first = file.combatants[0].clone();
    let second = file.combatants[1].clone();
    let (a_id, b_id) = (first.id.clone(), second.id.clone());

    let mut encounter = Encounter::from_combatants([first, second])?;
    let mut dice = Dice::from_seed(seed);
    let mut logs = Vec::new();

    {
        let a = encounter.snapshot(&a_id)?;
        let b = encounter.snapshot(&b_id)?;
        logs.push(format!(
            "[START] {} (life {}, tDEF {}) vs {} (life {}, tDEF {})",
            a.name, a.life.value, a.defense.total, b.name, b.life.value, b.defense.total
        ));
    }

    let mut rounds = 0u32;
    while rounds < max_rounds && !any_down(&encounter, &[a_id.as_str(), b_id.as_str()])? {
        rounds = encounter.next_round();
        for (id, roll) in encounter.roll_initiative_all(&mut dice)? {
            logs.push(format!(
                "[INIT][{}] d20={} {} = {}",
                id,
                roll.natural,
                format_modifier(roll.bonus),
                roll.total
            ));
        }
        let order: Vec<String> = encounter.turn_order().into_iter().map(|e| e.id).collect();
        logs.push(format!("[ROUND] {} → {}", rounds, order.join(", ")));

        'round: loop {
            let mut acted = false;
            for id in &order {
                if any_down(&encounter, &[a_id.as_str(), b_id.as_str()])? {
                    break 'round;
                }
                let opponent = if *id == a_id { &b_id } else { &a_id };
                let request = AttackRequest {
                    attacker: id.clone(),
                    weapon: file.weapon_for(id),
                    defender: Some(opponent.clone()),
                    location: None,
                };
                match encounter.resolve_attack(&mut dice, &request) {
                    Ok(report) => {
                        acted = true;
                        logs.extend(report.log);
                        if report.counter_attack_granted {
                            logs.push(format!(
                                "[COUNTER][{}] earns a free counter-attack",
                                opponent
                            ));
                        }
                    }
                    Err(CombatError::InsufficientResource { .. }) => {
                        debug!(attacker = %id, "out of AtR this round");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            if !acted {
                break;
            }
        }
    }

    let a_down = is_down(&encounter, &a_id)?;
    let b_down = is_down(&encounter, &b_id)?;
    let winner = match (a_down, b_down) {
        (false, true) => a_id.clone(),
        (true, false) => b_id.clone(),
        _ => "draw".to_string(),
    };

    let mut life_end = IndexMap::new();
    for id in [&a_id, &b_id] {
        life_end.insert(id.clone(), encounter.snapshot(id)?.life.value);
    }

    logs.push(format!(
        "[END] winner={} {}={} {}={} rounds={}",
        winner, a_id, life_end[&a_id], b_id, life_end[&b_id], rounds
    ));

    Ok(DuelResult {
        winner,
        rounds,
        life_end,
        log: logs,
    })
}

fn load(cfg: &DuelConfig) -> Result<EncounterFile> {
    match &cfg.encounter_path {
        Some(path) => load_encounter(path),
        None => builtin_encounter(cfg.encounter_id.as_deref().unwrap_or(DEFAULT_ENCOUNTER)),
    }
}

fn is_down(encounter: &Encounter, id: &str) -> Result<bool> {
    Ok(encounter.with_combatant(id, |c| c.is_down())?)
}

fn any_down(encounter: &Encounter, ids: &[&str]) -> Result<bool> {
    for id in ids {
        if is_down(encounter, id)? {
            return Ok(true);
        }
    }
    Ok(false)
}
