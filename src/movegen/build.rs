//! Adjustment-phase move generation.
//!
//! A nation with surplus centers may build in its free eligible centers; a
//! nation with a deficit may disband any of its units.

use crate::board::{Nation, Order, State, UnitType};
use crate::resolve::build::{allowed_build_balance, buildable_centers};

/// Every unit type that can stand in `at`, armies first.
fn fitting_types(state: &State, at: &crate::board::Province) -> Vec<UnitType> {
    let flags = state.graph().flags(at);
    [UnitType::Army, UnitType::Fleet]
        .into_iter()
        .filter(|t| flags.contains(t.terrain()))
        .collect()
}

/// Build orders `nation` may give, one per center, coast and unit type.
pub fn build_orders(state: &State, nation: &Nation) -> Vec<Order> {
    if allowed_build_balance(state, nation) <= 0 {
        return Vec::new();
    }
    let graph = state.graph();
    let mut orders = Vec::new();
    for center in buildable_centers(state, nation) {
        for at in graph.coasts(&center) {
            for unit_type in fitting_types(state, &at) {
                orders.push(Order::Build {
                    at: at.clone(),
                    unit_type,
                });
            }
        }
    }
    orders
}

/// Disband orders `nation` may give when it owes units.
pub fn disband_orders(state: &State, nation: &Nation) -> Vec<Order> {
    if state.adjustment_balance(nation) >= 0 {
        return Vec::new();
    }
    state
        .units_of(nation)
        .into_iter()
        .map(|at| Order::Disband { at })
        .collect()
}
