use std::path::PathBuf;

use clap::Parser;
use engine::api::run_duel_many;
use engine::content::{builtin_encounter, load_encounter};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "simulate-vs")]
#[command(about = "Monte Carlo sim: many duels between the first two combatants")]
struct Args {
    /// Encounter file (JSON or YAML). Falls back to --builtin.
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, default_value = "temple_skirmish")]
    builtin: String,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Safety cap on rounds per trial
    #[arg(long, default_value_t = 30)]
    max_rounds: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Emit a JSON summary instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Summary {
    encounter: String,
    trials: u32,
    seed: u64,
    win_rates: Vec<(String, f64)>,
    draw_rate: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    engine::logging::init(args.verbose);

    let file = match &args.file {
        Some(path) => load_encounter(path)?,
        None => builtin_encounter(&args.builtin)?,
    };
    info!(encounter = %file.name, trials = args.trials, "simulating");

    let stats = run_duel_many(&file, args.seed, args.trials, args.max_rounds)?;
    let rate = |n: u32| {
        if stats.samples == 0 {
            0.0
        } else {
            n as f64 / stats.samples as f64
        }
    };
    let summary = Summary {
        encounter: file.name.clone(),
        trials: stats.samples,
        seed: args.seed,
        win_rates: stats
            .wins
            .iter()
            .map(|(id, &wins)| (id.clone(), rate(wins)))
            .collect(),
        draw_rate: rate(stats.draws),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{}: {} trials (seed {})",
        summary.encounter, summary.trials, summary.seed
    );
    for (id, r) in &summary.win_rates {
        println!("  {:<12} {:>6.2}%", id, r * 100.0);
    }
    println!("  {:<12} {:>6.2}%", "draw", summary.draw_rate * 100.0);
    Ok(())
}
