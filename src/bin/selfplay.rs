//! Self-play game generation CLI.
//!
//! Plays games with random legal orders and writes one JSON record per
//! game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --variant NAME  Variant to play (default: Classical)
//!   --games N       Number of games to play (default: 10)
//!   --max-year Y    Maximum game year (default: 1920)
//!   --stalemate N   Quiet years that end a game, 0 = never (default: 3)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --summary-only  Drop per-phase records from the output
//!   --output FILE   Output file path (default: stdout)

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use tracing::{error, info};

use dipjudge::selfplay::{self, SelfPlayConfig, SelfPlayError};
use dipjudge::variant::Variant;
use dipjudge::variants;

struct Args {
    variant: String,
    config: SelfPlayConfig,
    output: Option<String>,
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args.get(i).ok_or_else(|| format!("missing value for {flag}"))?;
    raw.parse().map_err(|_| format!("invalid {flag} value: {raw}"))
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args {
        variant: variants::classical::NAME.to_string(),
        config: SelfPlayConfig::default(),
        output: None,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--variant" => {
                i += 1;
                parsed.variant = value(args, i, "--variant")?;
            }
            "--games" => {
                i += 1;
                parsed.config.num_games = value(args, i, "--games")?;
            }
            "--max-year" => {
                i += 1;
                parsed.config.max_year = value(args, i, "--max-year")?;
            }
            "--stalemate" => {
                i += 1;
                parsed.config.stalemate_years = value(args, i, "--stalemate")?;
            }
            "--threads" => {
                i += 1;
                parsed.config.threads = value(args, i, "--threads")?;
            }
            "--seed" => {
                i += 1;
                parsed.config.seed = value(args, i, "--seed")?;
            }
            "--output" => {
                i += 1;
                parsed.output = Some(value(args, i, "--output")?);
            }
            "--summary-only" => parsed.config.record_phases = false,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Some(parsed))
}

fn run(variant: &Variant, args: Args) -> Result<(), SelfPlayError> {
    let config = args.config;
    info!(
        "self-play: {} games of {}, max year {}, {} threads",
        config.num_games, variant.name, config.max_year, config.threads
    );

    let mut out: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let started = Instant::now();
    let mut games = Vec::with_capacity(config.num_games);
    selfplay::run_self_play_with_callback(variant, &config, |game| {
        selfplay::write_game_json(&game, &mut out)?;
        games.push(game);
        Ok(())
    })?;
    out.flush()?;

    let elapsed = started.elapsed().as_secs_f64();
    let summary = selfplay::summarize(&games);
    info!(
        "completed {} games in {:.1}s ({:.1} games/hour)",
        summary.games,
        elapsed,
        summary.games as f64 / elapsed.max(1e-9) * 3600.0
    );
    info!(
        "avg phases/game {:.1}, avg final year {:.1}, draws {}, stalemates {}",
        summary.avg_phases, summary.avg_final_year, summary.draws, summary.stalemates
    );
    for (nation, wins) in &summary.wins {
        info!("  {nation}: {wins} wins");
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --variant NAME   Variant to play (default: Classical)");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --max-year Y     Maximum game year (default: 1920)");
    eprintln!("  --stalemate N    Quiet years that end a game, 0 = never (default: 3)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --summary-only   Drop per-phase records from the output");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --help           Show this help");
}

fn main() -> ExitCode {
    dipjudge::logging::init();
    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    let Some(variant) = variants::get(&parsed.variant) else {
        error!("unknown variant {}, expected one of {:?}", parsed.variant, variants::NAMES);
        return ExitCode::FAILURE;
    };
    match run(&variant, parsed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("self-play failed: {e}");
            ExitCode::FAILURE
        }
    }
}
