//! dipjudge -- a Diplomacy adjudicator speaking JSON lines.
//!
//! Each line on stdin is one request:
//!
//! ```text
//! {"variant": "Classical", "snapshot": {...}, "orders": {"France": {"par": ["Move", "bur"]}}}
//! ```
//!
//! The snapshot is optional (the variant's opening position is used when it
//! is missing), as are the orders. The phase is adjudicated and one line is
//! written to stdout: `{"snapshot", "winner", "dominance", "inconsistencies",
//! "messages"}` on success or `{"error"}` on failure. Inconsistencies check
//! the submitted orders; messages describe the returned position. Set
//! `"advance": false` to get the position back without adjudicating it.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use dipjudge::board::{Nation, Province, StateError};
use dipjudge::movegen::Inconsistency;
use dipjudge::protocol::{ParseError, Snapshot, Submission};
use dipjudge::resolve::AdjudicationError;
use dipjudge::variants;

#[derive(Debug, Error)]
enum RequestError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),
    #[error("bad orders: {0}")]
    Parse(#[from] ParseError),
    #[error("bad state: {0}")]
    State(#[from] StateError),
    #[error("adjudication failed: {0}")]
    Adjudication(#[from] AdjudicationError),
}

fn advance_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Request {
    variant: String,
    #[serde(default)]
    snapshot: Option<Snapshot>,
    #[serde(default)]
    orders: Submission,
    #[serde(default = "advance_by_default")]
    advance: bool,
}

/// One inconsistency as written on the wire.
#[derive(Debug, Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    province: Option<Province>,
    problem: String,
}

impl From<Inconsistency> for Report {
    fn from(i: Inconsistency) -> Self {
        Report {
            province: i.province,
            problem: i.problem.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response {
    Adjudicated {
        snapshot: Snapshot,
        winner: Option<Nation>,
        dominance: BTreeMap<Province, Nation>,
        inconsistencies: BTreeMap<Nation, Vec<Report>>,
        messages: BTreeMap<Nation, Vec<String>>,
    },
    Failed {
        error: String,
    },
}

fn handle(line: &str) -> Result<Response, RequestError> {
    let request: Request = serde_json::from_str(line)?;
    let variant = variants::get(&request.variant)
        .ok_or_else(|| RequestError::UnknownVariant(request.variant.clone()))?;
    let mut state = match &request.snapshot {
        Some(snapshot) => variant.load(snapshot)?,
        None => variant.start()?,
    };
    for (nation, orders) in variant.parse_orders(&request.orders)? {
        state.set_orders(&nation, orders)?;
    }
    let inconsistencies = per_nation(&variant.nations, |n| {
        state.corroborate(n).into_iter().map(Report::from).collect()
    });
    if request.advance {
        let phase = state.phase();
        state.advance()?;
        debug!("{} {}: adjudicated {}", variant.name, phase, state.resolutions().len());
    }
    Ok(Response::Adjudicated {
        winner: variant.solo_winner(&state),
        dominance: variant.dominance(&state),
        messages: per_nation(&variant.nations, |n| state.messages(n)),
        inconsistencies,
        snapshot: state.dump(),
    })
}

/// Collects `f` for each nation, leaving out nations with nothing to say.
fn per_nation<T>(nations: &[Nation], mut f: impl FnMut(&Nation) -> Vec<T>) -> BTreeMap<Nation, Vec<T>> {
    nations
        .iter()
        .map(|n| (n.clone(), f(n)))
        .filter(|(_, v)| !v.is_empty())
        .collect()
}

fn main() -> io::Result<()> {
    dipjudge::logging::init();
    info!("dipjudge ready, variants: {:?}", variants::NAMES);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle(&line).unwrap_or_else(|e| {
            error!("{e}");
            Response::Failed {
                error: e.to_string(),
            }
        });
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
        out.flush()?;
    }
    Ok(())
}
