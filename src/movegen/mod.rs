//! Legal move generation.
//!
//! Generates the set of legal orders for a given nation in the current
//! game state, covering movement, retreat, and adjustment phases, and
//! checks an order sheet against those options.

pub mod build;
pub mod movement;
pub mod retreat;
pub mod status;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Nation, Order, PhaseType, Province, State};
use crate::resolve::build::allowed_build_balance;

pub use status::{corroborate, messages, Inconsistency, Problem};

/// Every legal order `nation` could submit this phase.
pub fn options(state: &State, nation: &Nation) -> Vec<Order> {
    match state.phase().kind {
        PhaseType::Movement => state
            .units_of(nation)
            .iter()
            .flat_map(|at| movement::unit_orders(state, at))
            .collect(),
        PhaseType::Retreat => dislodged_of(state, nation)
            .iter()
            .flat_map(|at| retreat::unit_orders(state, at))
            .collect(),
        PhaseType::Adjustment => {
            let mut orders = build::build_orders(state, nation);
            orders.extend(build::disband_orders(state, nation));
            orders
        }
    }
}

fn dislodged_of(state: &State, nation: &Nation) -> Vec<Province> {
    state
        .dislodgeds()
        .iter()
        .filter(|(_, u)| &u.nation == nation)
        .map(|(p, _)| p.clone())
        .collect()
}

/// Generates one random legal order set for `nation`.
///
/// Movement and retreat pick one order per unit. Adjustment picks as many
/// builds (in distinct centers) or disbands as the balance calls for.
pub fn random_orders(state: &State, nation: &Nation, rng: &mut impl Rng) -> Vec<Order> {
    match state.phase().kind {
        PhaseType::Movement => state
            .units_of(nation)
            .iter()
            .filter_map(|at| movement::unit_orders(state, at).choose(rng).cloned())
            .collect(),
        PhaseType::Retreat => dislodged_of(state, nation)
            .iter()
            .filter_map(|at| retreat::unit_orders(state, at).choose(rng).cloned())
            .collect(),
        PhaseType::Adjustment => random_adjustments(state, nation, rng),
    }
}

fn random_adjustments(state: &State, nation: &Nation, rng: &mut impl Rng) -> Vec<Order> {
    let balance = allowed_build_balance(state, nation);
    if balance < 0 {
        let mut disbands = build::disband_orders(state, nation);
        disbands.shuffle(rng);
        disbands.truncate(balance.unsigned_abs() as usize);
        return disbands;
    }

    let mut builds = build::build_orders(state, nation);
    builds.shuffle(rng);
    let mut chosen: Vec<Order> = Vec::new();
    for order in builds {
        if chosen.len() >= balance as usize {
            break;
        }
        if chosen.iter().all(|c| !c.source().same_super(order.source())) {
            chosen.push(order);
        }
    }
    chosen
}
