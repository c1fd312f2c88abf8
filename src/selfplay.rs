//! Self-play game generation.
//!
//! Plays whole games of a variant with random legal orders for every
//! nation, until a solo winner, a stalemate, or the year limit. Games are
//! independent; they share the variant (and its map graph) read-only and
//! run concurrently on a rayon pool. Records are written as JSON lines.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{Nation, Phase, Province, State, StateError};
use crate::movegen::random_orders;
use crate::resolve::AdjudicationError;
use crate::variant::Variant;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad position: {0}")]
    State(#[from] StateError),

    #[error("game {game}: {source}")]
    Adjudication {
        game: usize,
        #[source]
        source: AdjudicationError,
    },

    #[error("self-play worker panicked")]
    WorkerPanicked,
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Games stop once this year is over.
    pub max_year: i32,
    /// Consecutive years without a center changing hands that end a game
    /// as a stalemate (0 disables the check).
    pub stalemate_years: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy). Game `i` plays with `seed + i`.
    pub seed: u64,
    /// Keep every phase's orders and resolutions in the record.
    pub record_phases: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            max_year: 1920,
            stalemate_years: 3,
            threads: 4,
            seed: 0,
            record_phases: true,
        }
    }
}

/// One adjudicated phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    #[serde(flatten)]
    pub phase: Phase,
    /// Orders each nation submitted, as order text.
    pub orders: BTreeMap<Nation, Vec<String>>,
    /// `"OK"` or the failure token, per ordered province.
    pub resolutions: BTreeMap<Province, String>,
    /// Center counts after the phase.
    pub sc_counts: BTreeMap<Nation, usize>,
}

/// A complete self-play game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub variant: String,
    pub winner: Option<Nation>,
    pub stalemate: bool,
    pub final_year: i32,
    pub final_sc_counts: BTreeMap<Nation, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<PhaseRecord>,
}

fn sc_counts(state: &State) -> BTreeMap<Nation, usize> {
    let mut counts = BTreeMap::new();
    for nation in state.supply_centers().values() {
        *counts.entry(nation.clone()).or_insert(0) += 1;
    }
    counts
}

fn game_rng(config: &SelfPlayConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays a single game from the variant's opening position.
pub fn play_game(
    variant: &Variant,
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameRecord, SelfPlayError> {
    let mut state = variant.start()?;
    let mut phases = Vec::new();
    let mut winner = None;
    let mut stalemate = false;
    let mut last_year_counts = sc_counts(&state);
    let mut quiet_years = 0u32;

    loop {
        let phase = state.phase();
        if phase.year > config.max_year {
            break;
        }
        if let Some(w) = variant.solo_winner(&state) {
            winner = Some(w);
            break;
        }

        let mut submitted = BTreeMap::new();
        for nation in &variant.nations {
            let orders = random_orders(&state, nation, rng);
            if orders.is_empty() {
                continue;
            }
            let text: Vec<String> = orders.iter().map(ToString::to_string).collect();
            state.set_orders(nation, orders)?;
            submitted.insert(nation.clone(), text);
        }

        state
            .advance()
            .map_err(|source| SelfPlayError::Adjudication { game: game_id, source })?;

        if config.record_phases {
            phases.push(PhaseRecord {
                phase,
                orders: submitted,
                resolutions: state.dump().resolutions,
                sc_counts: sc_counts(&state),
            });
        }

        if state.phase().year > phase.year {
            let counts = sc_counts(&state);
            if counts == last_year_counts {
                quiet_years += 1;
            } else {
                quiet_years = 0;
            }
            last_year_counts = counts;
            if config.stalemate_years > 0 && quiet_years >= config.stalemate_years {
                stalemate = true;
                break;
            }
        }
    }

    debug!(game_id, year = state.phase().year, ?winner, stalemate, "game finished");
    Ok(GameRecord {
        game_id,
        variant: variant.name.to_string(),
        winner,
        stalemate,
        final_year: state.phase().year,
        final_sc_counts: sc_counts(&state),
        phases,
    })
}

/// Runs self-play generation, returning the records in game order.
pub fn run_self_play(variant: &Variant, config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(variant, config, |game| {
        games.push(game);
        Ok(())
    })?;
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` with each completed game.
///
/// With more than one thread, games arrive in completion order. The first
/// error (from a game or from `on_game`) stops the run and is returned.
pub fn run_self_play_with_callback<F>(
    variant: &Variant,
    config: &SelfPlayConfig,
    on_game: F,
) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError> + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(variant, config, on_game)
    } else {
        run_self_play_sequential(variant, config, on_game)
    }
}

fn log_game(game: &GameRecord, n: usize, total: usize, started: Instant) {
    let outcome = match &game.winner {
        Some(w) => format!("{w} wins"),
        None if game.stalemate => "stalemate".to_string(),
        None => "draw".to_string(),
    };
    info!(
        "game {}/{}: {} in {} ({:.1}s)",
        n,
        total,
        outcome,
        game.final_year,
        started.elapsed().as_secs_f64()
    );
}

fn run_self_play_sequential<F>(variant: &Variant, config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError>,
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let game = play_game(variant, config, i, &mut game_rng(config, i))?;
        log_game(&game, i + 1, config.num_games, started);
        on_game(game)?;
    }
    Ok(())
}

/// Plays games on a rayon pool and hands them to `on_game` on this thread
/// through a channel.
fn run_self_play_parallel<F>(variant: &Variant, config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(GameRecord) -> Result<(), SelfPlayError> + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let (tx, rx) = mpsc::channel::<Result<GameRecord, SelfPlayError>>();

    let variant = variant.clone();
    let config = config.clone();
    let handle = std::thread::spawn(move || {
        let completed = AtomicUsize::new(0);
        pool.install(|| {
            (0..config.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let started = Instant::now();
                    let game = play_game(&variant, &config, i, &mut game_rng(&config, i));
                    if let Ok(game) = &game {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(game, n, config.num_games, started);
                    }
                    // The receiver hangs up after the first error.
                    let _ = tx.send(game);
                });
        });
    });

    let mut result = Ok(());
    for game in rx {
        if let Err(e) = game.and_then(&mut on_game) {
            result = Err(e);
            break;
        }
    }
    handle.join().map_err(|_| SelfPlayError::WorkerPanicked)?;
    result
}

/// Writes game records as JSON lines.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> Result<(), SelfPlayError> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes one game record as a single JSON line.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> Result<(), SelfPlayError> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)?;
    Ok(())
}

/// Aggregate statistics over a batch of games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub wins: BTreeMap<Nation, usize>,
    pub draws: usize,
    pub stalemates: usize,
    pub avg_phases: f64,
    pub avg_final_year: f64,
}

pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    let mut phases = 0usize;
    let mut years = 0i64;
    for game in games {
        phases += game.phases.len();
        years += i64::from(game.final_year);
        match &game.winner {
            Some(w) => *summary.wins.entry(w.clone()).or_insert(0) += 1,
            None => summary.draws += 1,
        }
        if game.stalemate {
            summary.stalemates += 1;
        }
    }
    let n = games.len().max(1) as f64;
    summary.avg_phases = phases as f64 / n;
    summary.avg_final_year = years as f64 / n;
    summary
}
