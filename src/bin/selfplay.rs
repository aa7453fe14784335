//! Self-play CLI: run many random-move games in parallel and report statistics.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --games 1000 --players 3
//!   cargo run --release --bin selfplay -- --games 10 --seed 7 --json

use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use meeple_board_engine::engine::config::load_default_config;
use meeple_board_engine::engine::session::{MAX_PLAYERS, MIN_PLAYERS};
use meeple_board_engine::engine::simulator::{play_random_game, GameSummary};

#[derive(Parser)]
#[command(name = "selfplay", about = "Run random-move self-play games in parallel")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Players per game
    #[arg(long, default_value = "2")]
    players: usize,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, env = "MEEPLE_ENGINE_SEED")]
    seed: Option<u64>,

    /// Print one JSON summary per game instead of aggregate statistics
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&cli.players) {
        return Err(format!("players must be {MIN_PLAYERS}..={MAX_PLAYERS}, got {}", cli.players).into());
    }
    let base_seed = cli
        .seed
        .or(load_default_config().random_seed)
        .unwrap_or(42);

    eprintln!("Self-play: {} games, {} players, seed={}", cli.games, cli.players, base_seed);

    let summaries: Vec<GameSummary> = (0..cli.games)
        .into_par_iter()
        .map(|i| play_random_game(cli.players, base_seed.wrapping_add(i as u64)))
        .collect();

    if cli.json {
        for summary in &summaries {
            println!("{}", serde_json::to_string(summary)?);
        }
        return Ok(());
    }

    print_statistics(cli.players, &summaries);
    Ok(())
}

fn print_statistics(players: usize, summaries: &[GameSummary]) {
    let games = summaries.len().max(1) as f64;
    let mut wins = vec![0usize; players];
    let mut totals = vec![0u64; players];
    let mut best = 0u32;
    let mut discarded = 0usize;
    let mut meeples = 0usize;

    for summary in summaries {
        for &w in &summary.winners {
            wins[w] += 1;
        }
        for (seat, &score) in summary.scores.iter().enumerate() {
            totals[seat] += u64::from(score);
            best = best.max(score);
        }
        discarded += summary.tiles_discarded;
        meeples += summary.meeples_placed;
    }

    println!("games played:          {}", summaries.len());
    for seat in 0..players {
        println!(
            "  seat {}: wins {:>5}  avg score {:>6.1}",
            seat,
            wins[seat],
            totals[seat] as f64 / games
        );
    }
    println!("best score:            {}", best);
    println!("avg tiles discarded:   {:.2}", discarded as f64 / games);
    println!("avg meeples placed:    {:.1}", meeples as f64 / games);
}
