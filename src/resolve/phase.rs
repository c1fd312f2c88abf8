//! Phase adjudication and post-processing.
//!
//! `advance` runs one phase end to end: validate the submitted orders, fill
//! in defaults, resolve, apply the outcome, post-process, and step to the
//! next phase.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::board::{
    Nation, Order, OrderError, PhaseType, Province, Resolution, State, Unit,
};

use super::build::disorder_order;
use super::convoy::must_convoy;
use super::retreat::has_retreat;
use super::validate::validate;
use super::{AdjudicationError, Lookahead, OrderMap, Resolver};

/// A successful move, lifted off the board before being dropped again.
struct Movement {
    from: Province,
    to: Province,
    convoyed: bool,
}

/// Adjudicates the current phase of `state` in place.
///
/// On error `state` may be half-updated; `State::advance` works on a copy.
pub fn advance(state: &mut State) -> Result<(), AdjudicationError> {
    let phase = state.phase();
    state.clear_force_disbands();
    if phase.kind == PhaseType::Movement {
        state.clear_bounces();
        state.clear_dislodgers();
    }

    let submitted = state.take_orders();
    let mut resolutions: BTreeMap<Province, Resolution> = BTreeMap::new();
    let mut orders = OrderMap::new();
    {
        let none = OrderMap::new();
        let mut lookahead = Lookahead::new(state, &none);
        for (key, (nation, order)) in &submitted {
            match validate(&mut lookahead, order) {
                Ok((_, normalized)) => {
                    orders.insert(key.clone(), normalized);
                }
                Err(err) => {
                    debug!(%nation, %order, error = %err, "invalid order");
                    resolutions.insert(key.clone(), Err(err));
                }
            }
        }
    }
    for p in state.units().keys() {
        let key = p.super_province();
        if orders.contains_key(&key) {
            continue;
        }
        if let Some(order) = phase.default_order(p) {
            orders.insert(key, order);
        }
    }

    let mut moves = Vec::new();
    let mut standoffs = Vec::new();
    {
        let mut resolver = Resolver::new(state, &orders);
        resolver.resolve_all()?;
        for (key, order) in &orders {
            let Order::Move { from, to, .. } = order else {
                continue;
            };
            match resolver.resolution(key).cloned() {
                Some(Ok(())) => {
                    let convoyed =
                        phase.kind == PhaseType::Movement && must_convoy(&mut resolver, from);
                    moves.push(Movement {
                        from: from.clone(),
                        to: to.clone(),
                        convoyed,
                    });
                }
                Some(Err(OrderError::Bounce(against))) if !against.same_super(to) => {
                    standoffs.push((from.clone(), to.clone()));
                }
                _ => {}
            }
        }
        for (key, resolution) in resolver.into_resolutions() {
            resolutions.entry(key).or_insert(resolution);
        }
    }

    match phase.kind {
        PhaseType::Movement => {
            for (from, to) in &standoffs {
                state.add_bounce(from, to);
            }
            execute_moves(state, moves)?;
        }
        PhaseType::Retreat => execute_retreats(state, &orders, &resolutions, moves)?,
        PhaseType::Adjustment => execute_adjustments(state, &orders, &resolutions)?,
    }

    let ordered = orders.len();
    state.set_resolutions(resolutions);
    post_process(state)?;
    let next = state.rules().next_phase(&phase);
    state.set_phase(next);
    info!(%phase, %next, orders = ordered, "phase adjudicated");
    Ok(())
}

/// Lifts every successful mover, then drops each into its destination,
/// dislodging whoever stayed there.
fn execute_moves(state: &mut State, moves: Vec<Movement>) -> Result<(), AdjudicationError> {
    let mut lifted = Vec::with_capacity(moves.len());
    for m in moves {
        if let Some(unit) = state.remove_unit(&m.from) {
            lifted.push((m, unit));
        }
    }
    for (m, unit) in lifted {
        if let Some((at, _)) = state.unit(&m.to) {
            let at = at.clone();
            if let Some(victim) = state.remove_unit(&at) {
                debug!(province = %at, unit = %victim, attacker = %m.from, "dislodged");
                state.set_dislodged(at.clone(), victim)?;
                if !m.convoyed {
                    state.set_dislodger(&m.from, &at);
                }
            }
        }
        state.set_unit(m.to, unit)?;
    }
    Ok(())
}

fn succeeded(resolutions: &BTreeMap<Province, Resolution>, key: &Province) -> bool {
    matches!(resolutions.get(key), Some(Ok(())))
}

fn execute_retreats(
    state: &mut State,
    orders: &OrderMap,
    resolutions: &BTreeMap<Province, Resolution>,
    moves: Vec<Movement>,
) -> Result<(), AdjudicationError> {
    for m in moves {
        if let Some(unit) = state.remove_dislodged(&m.from) {
            debug!(from = %m.from, to = %m.to, "retreated");
            state.set_unit(m.to, unit)?;
        }
    }
    for (key, order) in orders {
        if let Order::Disband { at } = order {
            if succeeded(resolutions, key) {
                state.remove_dislodged(at);
            }
        }
    }
    Ok(())
}

fn execute_adjustments(
    state: &mut State,
    orders: &OrderMap,
    resolutions: &BTreeMap<Province, Resolution>,
) -> Result<(), AdjudicationError> {
    for (key, order) in orders {
        if !succeeded(resolutions, key) {
            continue;
        }
        match order {
            Order::Build { at, unit_type } | Order::BuildAnywhere { at, unit_type } => {
                let Some(nation) = state.supply_center(at).cloned() else {
                    continue;
                };
                debug!(province = %at, %nation, unit_type = %unit_type, "built");
                state.set_unit(at.clone(), Unit::new(*unit_type, nation))?;
            }
            Order::Disband { at } => {
                state.remove_unit(at);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Bookkeeping after the orders of the current phase took effect.
///
/// Movement drops dislodged units with nowhere to go. Retreat destroys the
/// dislodged units that did not get away, forgets standoffs and dislodgers,
/// and hands supply centers to their occupiers when the rules say so.
/// Adjustment removes units a nation still owes, furthest from home first.
pub fn post_process(state: &mut State) -> Result<(), AdjudicationError> {
    let phase = state.phase();
    match phase.kind {
        PhaseType::Movement => {
            let stranded: Vec<Province> = state
                .dislodgeds()
                .iter()
                .filter(|(p, unit)| !has_retreat(state, p, unit))
                .map(|(p, _)| p.clone())
                .collect();
            for p in stranded {
                debug!(province = %p, "no retreat, disbanded");
                state.remove_dislodged(&p);
                state.force_disband(&p);
            }
        }
        PhaseType::Retreat => {
            let remaining: Vec<Province> = state.dislodgeds().keys().cloned().collect();
            for p in remaining {
                debug!(province = %p, "did not retreat, disbanded");
                state.remove_dislodged(&p);
                state.force_disband(&p);
            }
            state.clear_dislodgers();
            state.clear_bounces();
            if state.rules().captures_after(&phase) {
                capture_centers(state)?;
            }
        }
        PhaseType::Adjustment => {
            let nations: BTreeSet<Nation> = state
                .units()
                .values()
                .map(|u| u.nation.clone())
                .chain(state.supply_centers().values().cloned())
                .collect();
            for nation in nations {
                let balance = state.adjustment_balance(&nation);
                if balance >= 0 {
                    continue;
                }
                let doomed: Vec<Province> = disorder_order(state, &nation)
                    .into_iter()
                    .take(balance.unsigned_abs() as usize)
                    .collect();
                for p in doomed {
                    debug!(province = %p, %nation, "civil disorder, disbanded");
                    state.remove_unit(&p);
                    state.force_disband(&p);
                }
            }
        }
    }
    Ok(())
}

fn capture_centers(state: &mut State) -> Result<(), AdjudicationError> {
    let captures: Vec<(Province, Nation)> = state
        .units()
        .iter()
        .filter(|(p, u)| {
            state.graph().supply_center(p).is_some() && state.supply_center(p) != Some(&u.nation)
        })
        .map(|(p, u)| (p.super_province(), u.nation.clone()))
        .collect();
    for (p, nation) in captures {
        debug!(province = %p, %nation, "supply center captured");
        state.set_supply_center(p, nation)?;
    }
    Ok(())
}
