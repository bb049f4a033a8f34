//! Self-play driver
//! Loads a scenario, lets the AI play every empire and prints how it went

use std::path::PathBuf;

use clap::Parser;
use hex_empires::game::Scenario;
use hex_empires::turn::play_round;
use hex_empires::{EventLog, GameEvent, GameState};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "selfplay")]
#[command(about = "Run an all-AI game from a TOML scenario")]
struct Args {
    /// Scenario file (ASCII map plus empires)
    #[arg(default_value = "scenarios/duel.toml")]
    scenario: PathBuf,

    /// Rounds to play
    #[arg(long, default_value_t = 100)]
    rounds: u32,

    /// Override the scenario's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full event log as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write the final game state here
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hex_empires=info")))
        .init();

    let args = Args::parse();
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    let mut log = EventLog::new();
    let mut game = scenario.build(&mut log)?;

    for _ in 0..args.rounds {
        if game.living_empires().len() <= 1 {
            break;
        }
        log.set_turn(game.turn);
        play_round(&mut game, &mut log);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        print_summary(&game, &log);
    }

    if let Some(path) = args.save {
        std::fs::write(&path, game.to_json()?)?;
        println!("saved to {}", path.display());
    }
    Ok(())
}

fn print_summary(game: &GameState, log: &EventLog) {
    println!("After {} turns ({} events):\n", game.turn, log.len());
    println!(
        "{:<12} {:<11} {:>6} {:>4} {:>6} {:>6} {:>8} {:>6}",
        "empire", "personality", "cities", "pop", "techs", "units", "gold", "score"
    );
    for empire in game.empires.values() {
        let name = if empire.eliminated {
            format!("{} (x)", empire.name)
        } else {
            empire.name.clone()
        };
        println!(
            "{:<12} {:<11} {:>6} {:>4} {:>6} {:>6} {:>8.0} {:>6}",
            name,
            format!("{:?}", empire.personality),
            empire.settlements.len(),
            empire.total_population(),
            empire.research.unlocked.len(),
            empire.units.len(),
            empire.gold,
            empire.score,
        );
    }

    let count = |f: fn(&GameEvent) -> bool| log.iter().filter(|e| f(e)).count();
    println!();
    println!("settlements founded: {}", count(|e| matches!(e, GameEvent::SettlementFounded { .. })));
    println!("settlements captured: {}", count(|e| matches!(e, GameEvent::SettlementCaptured { .. })));
    println!("units killed: {}", count(|e| matches!(e, GameEvent::UnitKilled { .. })));
    println!("wars declared: {}", count(|e| matches!(e, GameEvent::WarDeclared { .. })));
    println!("peace treaties: {}", count(|e| matches!(e, GameEvent::PeaceSigned { .. })));
    println!("wonders built: {}", game.wonders_built.len());
}
