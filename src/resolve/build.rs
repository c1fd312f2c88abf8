//! Adjustment-phase resolution.
//!
//! Each nation builds or disbands toward its supply-center count. Orders
//! beyond the balance fail in province order; a nation that disbands too
//! few units has the rest chosen for it (civil disorder), furthest from
//! home first.

use std::cmp::Reverse;

use crate::board::{
    BuildRule, Nation, Order, OrderError, Province, Resolution, State, UnitType,
};

use super::Judge;

/// True if `nation` may place units in the supply center at `p` under `rule`,
/// ignoring ownership and occupancy.
pub fn eligible_for_build(state: &State, rule: BuildRule, p: &Province, nation: &Nation) -> bool {
    let home = state.graph().supply_center(p).and_then(|c| c.nation());
    match rule {
        BuildRule::Anywhere => true,
        BuildRule::AnyHomeCenter => home.is_some(),
        BuildRule::HomeCenters => home == Some(nation),
    }
}

/// Owned, eligible, unoccupied centers where `nation` could build now.
pub fn buildable_centers(state: &State, nation: &Nation) -> Vec<Province> {
    let rule = state.rules().build_rule;
    state
        .supply_centers_of(nation)
        .into_iter()
        .filter(|p| eligible_for_build(state, rule, p, nation) && state.unit(p).is_none())
        .collect()
}

/// Builds `nation` may actually make, or the negative number of disbands it
/// owes.
pub fn allowed_build_balance(state: &State, nation: &Nation) -> i32 {
    let balance = state.adjustment_balance(nation);
    if balance <= 0 {
        return balance;
    }
    balance.min(buildable_centers(state, nation).len() as i32)
}

/// The build or disband orders of `nation` that fit its balance, in
/// province order.
fn accepted<'a, J: Judge<'a>>(judge: &J, nation: &Nation, builds: bool) -> Vec<&'a Province> {
    let state = judge.state();
    let balance = state.adjustment_balance(nation);
    let mut accepted: Vec<&'a Province> = judge
        .orders()
        .iter()
        .filter(|(_, order)| match order {
            Order::Build { at, .. } | Order::BuildAnywhere { at, .. } => {
                builds && state.supply_center(at) == Some(nation)
            }
            Order::Disband { at } => {
                !builds && state.unit(at).is_some_and(|(_, u)| &u.nation == nation)
            }
            _ => false,
        })
        .map(|(p, _)| p)
        .collect();
    accepted.truncate(balance.unsigned_abs() as usize);
    accepted
}

pub fn adjudicate_build<'a, J: Judge<'a>>(judge: &mut J, at: &Province) -> Resolution {
    let Some(nation) = judge.state().supply_center(at) else {
        return Err(OrderError::MissingSupplyCenter);
    };
    if accepted(judge, nation, true).iter().any(|p| p.same_super(at)) {
        Ok(())
    } else {
        Err(OrderError::IllegalBuild)
    }
}

pub fn adjudicate_disband<'a, J: Judge<'a>>(judge: &mut J, at: &Province) -> Resolution {
    let Some((_, unit)) = judge.state().unit(at) else {
        return Err(OrderError::MissingUnit);
    };
    if accepted(judge, &unit.nation, false).iter().any(|p| p.same_super(at)) {
        Ok(())
    } else {
        Err(OrderError::IllegalDisband)
    }
}

/// Steps from `at` to the nearest home center of `nation`, through any
/// province; `usize::MAX` when no home center can be reached at all.
///
/// Fleets are not held to sea routes: a fleet one land step from home is
/// as close as an army there.
pub fn home_distance(state: &State, at: &Province, nation: &Nation) -> usize {
    let graph = state.graph();
    graph
        .supply_centers(nation)
        .into_iter()
        .flat_map(|home| graph.coasts(&home))
        .filter_map(|target| graph.path(at, &target, |_| true))
        .map(|path| path.len())
        .min()
        .unwrap_or(usize::MAX)
}

/// A nation's units in civil-disorder order: furthest from home first, then
/// armies before fleets, then by province name.
pub fn disorder_order(state: &State, nation: &Nation) -> Vec<Province> {
    let mut units: Vec<(Reverse<usize>, bool, Province)> = state
        .units()
        .iter()
        .filter(|(_, u)| &u.nation == nation)
        .map(|(p, u)| {
            (
                Reverse(home_distance(state, p, nation)),
                u.unit_type == UnitType::Fleet,
                p.clone(),
            )
        })
        .collect();
    units.sort();
    units.into_iter().map(|(_, _, p)| p).collect()
}
