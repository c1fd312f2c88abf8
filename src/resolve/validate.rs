//! Per-order legality checks, made before adjudication.
//!
//! A valid order comes back normalized: sources point at the exact coast the
//! unit occupies, and move destinations are resolved to a reachable coast.

use crate::board::{BuildRule, Nation, Order, OrderError, PhaseType, Province, UnitType};

use super::build::eligible_for_build;
use super::convoy::{any_convoy_path, has_edge, must_convoy};
use super::Judge;

/// Checks that a unit of `unit_type` could move from `src` to `dst`.
pub fn move_possible<'a, J: Judge<'a>>(
    judge: &mut J,
    unit_type: UnitType,
    src: &Province,
    dst: &Province,
    allow_convoy: bool,
    resolving: bool,
) -> Result<(), OrderError> {
    let graph = judge.state().graph();
    if !graph.has(src) {
        return Err(OrderError::InvalidSource);
    }
    if !graph.has(dst) {
        return Err(OrderError::InvalidDestination);
    }
    match unit_type {
        UnitType::Army => {
            if !graph.flags(dst).land() {
                return Err(OrderError::IllegalDestination);
            }
            if !allow_convoy {
                return match graph.edge(src, dst) {
                    None => Err(OrderError::IllegalMove),
                    Some(flags) if !flags.land() => Err(OrderError::IllegalDestination),
                    Some(_) => Ok(()),
                };
            }
            if resolving && must_convoy(judge, src) {
                return match any_convoy_path(judge, src, dst, true, None) {
                    Some(_) => Ok(()),
                    None => Err(OrderError::MissingConvoyPath),
                };
            }
            if !has_edge(graph, unit_type, src, dst)
                && any_convoy_path(judge, src, dst, false, None).is_none()
            {
                return Err(OrderError::MissingConvoyPath);
            }
            Ok(())
        }
        UnitType::Fleet => {
            if !graph.flags(dst).sea() {
                return Err(OrderError::IllegalDestination);
            }
            if !has_edge(graph, unit_type, src, dst) {
                return Err(OrderError::IllegalMove);
            }
            Ok(())
        }
    }
}

/// Like [`move_possible`], but tries the coasts of `dst` when the plain move
/// fails, returning the destination that works.
///
/// A lax search (armies) takes the first working coast; otherwise a coast is
/// only picked when `dst` named no coast and exactly one works.
pub fn any_move_possible<'a, J: Judge<'a>>(
    judge: &mut J,
    unit_type: UnitType,
    src: &Province,
    dst: &Province,
    lax: bool,
    allow_convoy: bool,
    resolving: bool,
) -> Result<Province, OrderError> {
    let err = match move_possible(judge, unit_type, src, dst, allow_convoy, resolving) {
        Ok(()) => return Ok(dst.clone()),
        Err(e) => e,
    };
    if lax || dst.is_super() {
        let graph = judge.state().graph();
        let mut options = Vec::new();
        for coast in graph.coasts(dst) {
            if &coast != dst
                && move_possible(judge, unit_type, src, &coast, allow_convoy, resolving).is_ok()
            {
                options.push(coast);
            }
        }
        if !options.is_empty() && (lax || options.len() == 1) {
            return Ok(options.swap_remove(0));
        }
    }
    Err(err)
}

/// Checks that a unit at `src` could move to `dst` or one of its coasts
/// without a convoy, as a supporter must.
pub fn any_support_possible<'a, J: Judge<'a>>(
    judge: &mut J,
    unit_type: UnitType,
    src: &Province,
    dst: &Province,
) -> Result<(), OrderError> {
    let first = move_possible(judge, unit_type, src, dst, false, false);
    if first.is_ok() {
        return first;
    }
    let graph = judge.state().graph();
    let mut last = first;
    for coast in graph.coasts(dst) {
        last = move_possible(judge, unit_type, src, &coast, false, false);
        if last.is_ok() {
            break;
        }
    }
    last
}

/// Validates one order for the current phase.
///
/// Returns the nation owning the ordered unit and the normalized order.
pub fn validate<'a, J: Judge<'a>>(judge: &mut J, order: &Order) -> Result<(Nation, Order), OrderError> {
    let state = judge.state();
    let graph = state.graph();
    let kind = state.phase().kind;
    match order {
        Order::Hold { at } => {
            if kind != PhaseType::Movement {
                return Err(OrderError::InvalidPhase);
            }
            if !graph.has(at) {
                return Err(OrderError::InvalidTarget);
            }
            let (at, unit) = state.unit(at).ok_or(OrderError::MissingUnit)?;
            Ok((unit.nation.clone(), Order::Hold { at: at.clone() }))
        }

        Order::Move {
            from,
            to,
            via_convoy,
        } => {
            if !graph.has(from) {
                return Err(OrderError::InvalidSource);
            }
            if !graph.has(to) {
                return Err(OrderError::InvalidDestination);
            }
            if from == to {
                return Err(OrderError::IllegalMove);
            }
            match kind {
                PhaseType::Movement => {
                    let (from, unit) = state.unit(from).ok_or(OrderError::MissingUnit)?;
                    let lax = unit.unit_type == UnitType::Army;
                    let to = any_move_possible(judge, unit.unit_type, from, to, lax, true, false)?;
                    Ok((
                        unit.nation.clone(),
                        Order::Move {
                            from: from.clone(),
                            to,
                            via_convoy: *via_convoy,
                        },
                    ))
                }
                PhaseType::Retreat => {
                    let (from, unit) = state.dislodged(from).ok_or(OrderError::MissingUnit)?;
                    let lax = unit.unit_type == UnitType::Army;
                    let to = any_move_possible(judge, unit.unit_type, from, to, lax, false, false)
                        .map_err(|_| OrderError::IllegalMove)?;
                    if state.unit(&to).is_some() || state.bounce(from, &to) {
                        return Err(OrderError::IllegalRetreat);
                    }
                    Ok((
                        unit.nation.clone(),
                        Order::Move {
                            from: from.clone(),
                            to,
                            via_convoy: false,
                        },
                    ))
                }
                PhaseType::Adjustment => Err(OrderError::InvalidPhase),
            }
        }

        Order::SupportHold { at, target } => {
            if kind != PhaseType::Movement {
                return Err(OrderError::InvalidPhase);
            }
            if !graph.has(at) {
                return Err(OrderError::InvalidSource);
            }
            if !graph.has(target) {
                return Err(OrderError::InvalidTarget);
            }
            let (at, unit) = state.unit(at).ok_or(OrderError::MissingUnit)?;
            let (target, _) = state.unit(target).ok_or(OrderError::MissingSupportUnit)?;
            any_support_possible(judge, unit.unit_type, at, target)
                .map_err(|_| OrderError::IllegalSupportPosition)?;
            Ok((
                unit.nation.clone(),
                Order::SupportHold {
                    at: at.clone(),
                    target: target.clone(),
                },
            ))
        }

        Order::SupportMove { at, from, to } => {
            if kind != PhaseType::Movement {
                return Err(OrderError::InvalidPhase);
            }
            if !graph.has(at) {
                return Err(OrderError::InvalidSource);
            }
            if !graph.has(from) || !graph.has(to) {
                return Err(OrderError::InvalidTarget);
            }
            let (at, unit) = state.unit(at).ok_or(OrderError::MissingUnit)?;
            let (from, supported) = state.unit(from).ok_or(OrderError::MissingSupportUnit)?;
            any_support_possible(judge, unit.unit_type, at, to)
                .map_err(|_| OrderError::IllegalSupportDestination)?;
            any_move_possible(judge, supported.unit_type, from, to, true, true, false)
                .map_err(|_| OrderError::IllegalSupportMove)?;
            Ok((
                unit.nation.clone(),
                Order::SupportMove {
                    at: at.clone(),
                    from: from.clone(),
                    to: to.clone(),
                },
            ))
        }

        Order::Convoy { at, from, to } => {
            if kind != PhaseType::Movement {
                return Err(OrderError::InvalidPhase);
            }
            if !graph.has(at) {
                return Err(OrderError::InvalidSource);
            }
            if !graph.has(from) || !graph.has(to) {
                return Err(OrderError::InvalidTarget);
            }
            let coastal = graph.coasts(at).iter().any(|c| {
                let flags = graph.flags(c);
                flags.land() && !flags.convoyable()
            });
            if coastal {
                return Err(OrderError::IllegalConvoyPath);
            }
            let (at, convoyer) = state.unit(at).ok_or(OrderError::MissingUnit)?;
            if convoyer.unit_type != UnitType::Fleet {
                return Err(OrderError::IllegalConvoyer);
            }
            let (from, convoyee) = state.unit(from).ok_or(OrderError::MissingConvoyee)?;
            if convoyee.unit_type != UnitType::Army {
                return Err(OrderError::IllegalConvoyee);
            }
            if any_convoy_path(judge, from, to, false, None).is_none() {
                return Err(OrderError::IllegalConvoyMove);
            }
            Ok((
                convoyer.nation.clone(),
                Order::Convoy {
                    at: at.clone(),
                    from: from.clone(),
                    to: to.clone(),
                },
            ))
        }

        Order::Build { at, unit_type } | Order::BuildAnywhere { at, unit_type } => {
            if kind != PhaseType::Adjustment {
                return Err(OrderError::InvalidPhase);
            }
            if !graph.has(at) {
                return Err(OrderError::InvalidTarget);
            }
            let me = state.supply_center(at).ok_or(OrderError::MissingSupplyCenter)?;
            let rule = state.rules().build_rule;
            if matches!(order, Order::BuildAnywhere { .. }) && rule != BuildRule::Anywhere {
                return Err(OrderError::IllegalBuild);
            }
            if !eligible_for_build(state, rule, at, me) {
                return Err(OrderError::HostileSupplyCenter);
            }
            if state.unit(at).is_some() {
                return Err(OrderError::OccupiedSupplyCenter);
            }
            if state.adjustment_balance(me) < 1 {
                return Err(OrderError::MissingSurplus);
            }
            if !graph.flags(at).contains(unit_type.terrain()) {
                return Err(OrderError::IllegalUnitType);
            }
            Ok((me.clone(), order.clone()))
        }

        Order::Disband { at } => {
            if !graph.has(at) {
                return Err(OrderError::InvalidTarget);
            }
            match kind {
                PhaseType::Retreat => {
                    let (at, unit) = state.dislodged(at).ok_or(OrderError::MissingUnit)?;
                    Ok((unit.nation.clone(), Order::Disband { at: at.clone() }))
                }
                PhaseType::Adjustment => {
                    let (at, unit) = state.unit(at).ok_or(OrderError::MissingUnit)?;
                    if state.adjustment_balance(&unit.nation) > -1 {
                        return Err(OrderError::MissingDeficit);
                    }
                    Ok((unit.nation.clone(), Order::Disband { at: at.clone() }))
                }
                PhaseType::Movement => Err(OrderError::InvalidPhase),
            }
        }
    }
}
