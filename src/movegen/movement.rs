//! Movement-phase move generation.
//!
//! Enumerates legal hold, move, support, and convoy orders for one unit.
//! Candidates are cheap to produce from the graph; each one is then run
//! through order validation so only legal, normalized orders come back.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::{Order, Province, State, UnitType};
use crate::resolve::convoy::{convoy_destinations, has_edge};
use crate::resolve::validate::validate;
use crate::resolve::{Lookahead, OrderMap};

/// Super-provinces the unit at `at` can step into directly.
fn neighbours(state: &State, at: &Province, unit_type: UnitType) -> BTreeSet<Province> {
    let graph = state.graph();
    graph
        .edges(at)
        .filter(|(dst, _)| has_edge(graph, unit_type, at, dst))
        .map(|(dst, _)| dst.super_province())
        .collect()
}

/// Keeps `candidate`, normalized, if it validates and is new.
fn push(candidate: Order, orders: &mut Vec<Order>, judge: &mut Lookahead<'_>) {
    if let Ok((_, order)) = validate(judge, &candidate) {
        if !orders.contains(&order) {
            orders.push(order);
        }
    }
}

/// Every legal movement-phase order for the unit at `at`.
///
/// Returns an empty vec if no unit stands there.
pub fn unit_orders(state: &State, at: &Province) -> Vec<Order> {
    let Some((at, unit)) = state.unit(at) else {
        return Vec::new();
    };
    let none = OrderMap::new();
    let mut judge = Lookahead::new(state, &none);
    let mut orders = Vec::new();

    push(Order::Hold { at: at.clone() }, &mut orders, &mut judge);

    // Moves: direct neighbours, then convoy landings.
    let graph = state.graph();
    let mut targets: Vec<Province> = graph
        .edges(at)
        .filter(|(dst, _)| has_edge(graph, unit.unit_type, at, dst))
        .map(|(dst, _)| dst.clone())
        .collect();
    if unit.unit_type == UnitType::Army {
        targets.extend(convoy_destinations(&judge, at, None));
    }
    for to in targets {
        let candidate = Order::Move {
            from: at.clone(),
            to,
            via_convoy: false,
        };
        push(candidate, &mut orders, &mut judge);
    }

    // Supports into every province this unit could reach itself.
    let reach = neighbours(state, at, unit.unit_type);
    let mut convoy_reach: BTreeMap<&Province, BTreeSet<Province>> = BTreeMap::new();
    for (other_at, other) in state.units() {
        if other_at.same_super(at) {
            continue;
        }
        if reach.contains(&other_at.super_province()) {
            let candidate = Order::SupportHold {
                at: at.clone(),
                target: other_at.clone(),
            };
            push(candidate, &mut orders, &mut judge);
        }
        let direct = neighbours(state, other_at, other.unit_type);
        for to in &reach {
            if to.same_super(other_at) {
                continue;
            }
            let by_convoy = other.unit_type == UnitType::Army
                && convoy_reach
                    .entry(other_at)
                    .or_insert_with(|| convoy_destinations(&judge, other_at, Some(at)))
                    .contains(to);
            if direct.contains(to) || by_convoy {
                let candidate = Order::SupportMove {
                    at: at.clone(),
                    from: other_at.clone(),
                    to: to.clone(),
                };
                push(candidate, &mut orders, &mut judge);
            }
        }
    }

    // Convoys for every army some fleet chain through here could carry.
    let at_flags = graph.all_flags(at);
    if unit.unit_type == UnitType::Fleet && !at_flags.land() {
        for (army_at, army) in state.units() {
            if army.unit_type != UnitType::Army {
                continue;
            }
            for to in convoy_destinations(&judge, army_at, None) {
                let candidate = Order::Convoy {
                    at: at.clone(),
                    from: army_at.clone(),
                    to,
                };
                push(candidate, &mut orders, &mut judge);
            }
        }
    }

    orders
}
