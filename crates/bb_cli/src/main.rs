//! Headless match runner: loads block programs, simulates a full match and
//! prints the result.

use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, thread};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bb_core::{CompiledProgram, CompiledPrograms, EngineEvent, Field, MatchEngine};

const DEFAULT_OWN: &str = include_str!("../strategies/own.json");
const DEFAULT_OPP: &str = include_str!("../strategies/opp.json");
const DEFAULT_ENTERING: &str = include_str!("../strategies/entering.json");

/// Ticks allowed for the pre-match walk-on before giving up.
const ENTRY_TICK_LIMIT: u32 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "bb_cli", about = "Run a block-coded football match headlessly")]
struct Args {
    /// Path to the own team's program (JSON); built-in strategy when omitted
    #[arg(long)]
    own: Option<PathBuf>,
    /// Path to the opponent team's program (JSON)
    #[arg(long)]
    opp: Option<PathBuf>,
    /// Path to the walk-on program (JSON)
    #[arg(long)]
    entering: Option<PathBuf>,
    /// Simulation seed; a fixed seed replays the same match
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Pace ticks at frame rate instead of running flat out
    #[arg(long)]
    realtime: bool,
    /// Use the fast frame rate when pacing
    #[arg(long)]
    accelerated: bool,
    /// Print the final state snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn load_program(path: Option<&PathBuf>, fallback: &str) -> Result<Arc<CompiledProgram>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading program {}", path.display()))?;
            CompiledProgram::from_json(&json)
                .with_context(|| format!("compiling program {}", path.display()))
        }
        None => CompiledProgram::from_json(fallback).context("compiling built-in program"),
    }
}

fn pace(engine: &MatchEngine, realtime: bool) {
    if realtime {
        thread::sleep(engine.frame_duration());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let programs = CompiledPrograms {
        own: load_program(args.own.as_ref(), DEFAULT_OWN)?,
        opp: load_program(args.opp.as_ref(), DEFAULT_OPP)?,
        entering: load_program(args.entering.as_ref(), DEFAULT_ENTERING)?,
    };
    let mut engine = MatchEngine::new(Field::new(), programs, args.seed);
    engine.set_accelerated(args.accelerated);
    tracing::info!(seed = args.seed, realtime = args.realtime, "match configured");

    engine.start_entry();
    let mut entry_ticks = 0u32;
    while !engine.entry_finished() {
        engine.tick();
        entry_ticks += 1;
        if entry_ticks > ENTRY_TICK_LIMIT {
            bail!("walk-on program never brought the players to their marks");
        }
        pace(&engine, args.realtime);
    }

    engine.kick_off();
    let (own_score, opp_score) = 'game: loop {
        if !engine.tick() {
            bail!("match stopped before finishing");
        }
        for event in engine.drain_events() {
            match event {
                EngineEvent::KickOffReady { .. } => engine.kick_off(),
                EngineEvent::GoalScored { own_team, scorer } => {
                    let side = if own_team { "own team" } else { "opponents" };
                    match scorer {
                        Some(id) => println!("Goal for the {side}! (player {id})"),
                        None => println!("Goal for the {side}!"),
                    }
                }
                EngineEvent::MatchFinished { own_score, opp_score } => {
                    break 'game (own_score, opp_score);
                }
            }
        }
        pace(&engine, args.realtime);
    };

    println!("Final score: {own_score} - {opp_score}");
    if args.snapshot {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    }
    Ok(())
}
