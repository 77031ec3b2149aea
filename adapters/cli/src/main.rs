#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Mission Control console.

mod input;
mod session;

use std::io;

use anyhow::Result;
use clap::Parser;
use log::info;
use mission_control_system_pathfinding::{Config, Pathfinder, DEFAULT_MAX_EXPANSIONS};
use mission_control_world::{World, DEFAULT_QUICKSAND_SEED};

use crate::session::Session;

/// Plans safe movement across a map of guards, fences and surveillance.
#[derive(Debug, Parser)]
#[command(name = "mission-control", version)]
struct Args {
    /// Seed driving the random quicksand footprints.
    #[arg(long, default_value_t = DEFAULT_QUICKSAND_SEED)]
    seed: u64,
    /// Cells the pathfinder may expand before abandoning a search.
    #[arg(long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    max_expansions: usize,
    /// Enables debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Mission Control command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    info!(
        "starting session with seed {} and expansion budget {}",
        args.seed, args.max_expansions
    );

    let world = World::with_seed(args.seed);
    let pathfinder = Pathfinder::new(Config {
        max_expansions: args.max_expansions,
    });

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock(), world, pathfinder).run()
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
