//! # Delver Chase Runner
//!
//! Loads a chase scenario, lets the orc pursue the player turn by turn, and
//! prints the map after every move.

use clap::Parser;
use delver::{DelverResult, MoveOutcome, Scenario, ScenarioWorld};
use std::io::Write;
use std::path::PathBuf;

/// Command line arguments for the chase runner.
#[derive(Parser, Debug)]
#[command(name = "delver")]
#[command(about = "Watch a monster path toward its quarry on a dungeon grid")]
#[command(version)]
struct Args {
    /// Scenario JSON file; the built-in two-room corridor otherwise
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's turn limit
    #[arg(short, long)]
    turns: Option<u32>,

    /// Override the seed used to scatter random blockers
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of random blockers
    #[arg(long)]
    random_blockers: Option<usize>,

    /// Only print the final map
    #[arg(short, long)]
    quiet: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelverResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    log::info!("Starting delver v{}", delver::VERSION);

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::corridor(),
    };
    if let Some(turns) = args.turns {
        scenario.turns = turns;
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(count) = args.random_blockers {
        scenario.random_blockers = count;
    }

    let mut world = scenario.build()?;
    let stdout = std::io::stdout();
    let turn = run_chase(&mut world, args.quiet, &mut stdout.lock())?;

    if world.mover_adjacent()? {
        log::info!("Orc reached the player after {} turns", turn);
    } else {
        log::warn!("Orc did not reach the player within {} turns", turn);
    }

    Ok(())
}

/// Steps the chase until the orc is adjacent or out of turns, writing a frame
/// per turn (or only the last one when `quiet`). Returns the turns taken.
fn run_chase<W: Write>(world: &mut ScenarioWorld, quiet: bool, out: &mut W) -> DelverResult<u32> {
    if !quiet {
        write_frame(out, 0, None, &world.render())?;
    }

    let mut turn = 0;
    while turn < world.turns && !world.mover_adjacent()? {
        turn += 1;
        let outcome = world.step()?;
        if !quiet {
            write_frame(out, turn, Some(outcome), &world.render())?;
        }
    }

    if quiet {
        write_frame(out, turn, None, &world.render())?;
    }
    Ok(turn)
}

/// Initializes `env_logger` with the requested filter.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .format_target(false)
        .init();
}

fn write_frame<W: Write>(
    out: &mut W,
    turn: u32,
    outcome: Option<MoveOutcome>,
    rows: &[String],
) -> DelverResult<()> {
    match outcome {
        Some(outcome) => writeln!(out, "Turn {}: {}", turn, describe(outcome))?,
        None => writeln!(out, "Turn {}", turn)?,
    }
    for row in rows {
        writeln!(out, "{}", row)?;
    }
    writeln!(out)?;
    Ok(())
}

fn describe(outcome: MoveOutcome) -> String {
    match outcome {
        MoveOutcome::PathStep { to, path_len } => {
            format!("followed a {} step path to {}", path_len, to)
        }
        MoveOutcome::Steered { to } => format!("no usable path, steered to {}", to),
        MoveOutcome::Blocked { attempted } => format!("no usable path, {} is blocked", attempted),
        MoveOutcome::Stationary => "stayed put".to_string(),
    }
}
