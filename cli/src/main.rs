use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::api::{run_duel, run_duel_many};
use engine::content::{builtin_encounter, load_encounter, EncounterFile};
use engine::{ArmorSlot, AttackRequest, AttackStep, CombatError, DefenseDecision, Dice};

#[derive(Copy, Clone, ValueEnum)]
enum Choice {
    Dodge,
    Defend,
    Cancel,
}

impl From<Choice> for DefenseDecision {
    fn from(c: Choice) -> Self {
        match c {
            Choice::Dodge => DefenseDecision::Dodge,
            Choice::Defend => DefenseDecision::Defend,
            Choice::Cancel => DefenseDecision::Cancel,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum Slot {
    Head,
    Chest,
    Arms,
    Legs,
    Back,
    Feet,
}

impl From<Slot> for ArmorSlot {
    fn from(s: Slot) -> Self {
        match s {
            Slot::Head => ArmorSlot::Head,
            Slot::Chest => ArmorSlot::Chest,
            Slot::Arms => ArmorSlot::Arms,
            Slot::Legs => ArmorSlot::Legs,
            Slot::Back => ArmorSlot::Back,
            Slot::Feet => ArmorSlot::Feet,
        }
    }
}

#[derive(Args)]
struct Source {
    /// Encounter file (JSON or YAML, BOM-aware)
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    /// Built-in encounter id, used when --file is absent
    #[arg(long, global = true, default_value = "temple_skirmish")]
    builtin: String,
}

#[derive(Subcommand)]
enum Cmd {
    /// Roll a die a few times
    Roll {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        sides: u8,
        #[arg(long, default_value_t = 5)]
        rolls: u32,
    },
    /// Print a combatant's derived abilities
    Abilities {
        #[arg(long)]
        combatant: String,
    },
    /// Print a combatant's defense aggregate
    Defense {
        #[arg(long)]
        combatant: String,
    },
    /// Resolve one attack between two combatants
    Attack {
        #[arg(long)]
        attacker: String,
        /// Omit to roll an attack without a target
        #[arg(long)]
        defender: Option<String>,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Scripted d20/damage rolls, comma-separated; overrides --seed
        #[arg(long, value_delimiter = ',')]
        dice: Vec<u8>,
        /// Defense choice; makes the defender choose instead of auto-defending
        #[arg(long, value_enum)]
        choice: Option<Choice>,
        #[arg(long, value_enum)]
        location: Option<Slot>,
        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Roll initiative for everyone and print the turn order
    Initiative {
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Duel the first two combatants of the encounter
    Duel {
        #[arg(long, default_value_t = 2025)]
        seed: u64,
        #[arg(long, default_value_t = 30)]
        max_rounds: u32,
        /// Run this many duels (seed+i) and print win counts instead of a log
        #[arg(long)]
        samples: Option<u32>,
    },
}

#[derive(Parser)]
#[command(name = "holy-cli")]
#[command(about = "Holy Lands combat rules harness")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(flatten)]
    source: Source,
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    engine::logging::init(cli.verbose);

    match cli.cmd {
        Cmd::Roll { seed, sides, rolls } => {
            let mut dice = Dice::from_seed(seed);
            for _ in 0..rolls {
                println!("{}", dice.roll(sides));
            }
        }
        Cmd::Abilities { combatant } => {
            let file = load(&cli.source)?;
            let encounter = file.build()?;
            let c = encounter.snapshot(&combatant)?;
            println!("{} (level {})", c.name, c.level);
            for (kind, score) in c.abilities().iter() {
                println!(
                    "  {:<10} value={} bonus={} mod={}",
                    kind.to_string(),
                    score.value,
                    score.bonus,
                    engine::format_modifier(score.modifier)
                );
            }
        }
        Cmd::Defense { combatant } => {
            let file = load(&cli.source)?;
            let encounter = file.build()?;
            let d = encounter.recompute_defense(&combatant)?;
            for (slot, adef) in &d.by_slot {
                println!("  {:<6} aDEF {}", slot.to_string(), adef);
            }
            println!(
                "aDEF {} + nDEF {} = tDEF {} (PEN {})",
                d.armor_total, d.natural, d.total, d.armor_penalty_total
            );
        }
        Cmd::Attack {
            attacker,
            defender,
            seed,
            dice,
            choice,
            location,
            json,
        } => {
            let file = load(&cli.source)?;
            let encounter = file.build()?;
            let mut dice = if dice.is_empty() {
                Dice::from_seed(seed)
            } else {
                Dice::from_scripted(dice)
            };
            if let (Some(_), Some(id)) = (choice, &defender) {
                encounter.with_combatant(id, |c| c.player_controlled = true)?;
            }
            let request = AttackRequest {
                weapon: file.weapon_for(&attacker),
                attacker,
                defender,
                location: location.map(ArmorSlot::from),
            };
            let report = match encounter.begin_attack(&mut dice, &request)? {
                AttackStep::Resolved(report) => report,
                AttackStep::AwaitingDefense(pending) => {
                    let decision = choice.map_or(DefenseDecision::Defend, DefenseDecision::from);
                    match encounter.resume_attack(&mut dice, pending, decision) {
                        Ok(report) => report,
                        Err(e @ CombatError::UserCancelled { .. }) => {
                            println!("{}", e);
                            return Ok(());
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in &report.log {
                    println!("{}", line);
                }
                println!("{}", report.summary);
            }
        }
        Cmd::Initiative { seed } => {
            let file = load(&cli.source)?;
            let mut encounter = file.build()?;
            let mut dice = Dice::from_seed(seed);
            for (id, roll) in encounter.roll_initiative_all(&mut dice)? {
                println!(
                    "[INIT][{}] d20={} {} = {}",
                    id,
                    roll.natural,
                    engine::format_modifier(roll.bonus),
                    roll.total
                );
            }
            for (pos, entry) in encounter.turn_order().iter().enumerate() {
                println!(
                    "{}. {} (agi {})",
                    pos + 1,
                    entry.name,
                    entry.agility
                );
            }
        }
        Cmd::Duel {
            seed,
            max_rounds,
            samples,
        } => {
            let file = load(&cli.source)?;
            match samples {
                Some(n) => {
                    let stats = run_duel_many(&file, seed, n, max_rounds)?;
                    for (id, wins) in &stats.wins {
                        println!("{}: {} wins", id, wins);
                    }
                    println!("draws: {}", stats.draws);
                }
                None => {
                    let res = run_duel(&file, seed, max_rounds)?;
                    for line in &res.log {
                        println!("{}", line);
                    }
                    println!("winner={} rounds={}", res.winner, res.rounds);
                }
            }
        }
    }
    Ok(())
}

fn load(source: &Source) -> anyhow::Result<EncounterFile> {
    match &source.file {
        Some(path) => load_encounter(path),
        None => builtin_encounter(&source.builtin),
    }
}
