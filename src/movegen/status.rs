//! Order-sheet checks and adjustment status.
//!
//! Neither feeds adjudication. They tell a nation what its submitted orders
//! leave out or contradict, and how many units each nation may build or
//! must remove, before the phase is advanced.

use thiserror::Error;

use crate::board::{Nation, Order, OrderError, OrderKind, PhaseType, Province, State};
use crate::resolve::validate::validate;
use crate::resolve::{submitted_orders, Judge, Lookahead};

use super::dislodged_of;

/// Something wrong with a nation's submitted orders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    /// A unit that has to be ordered this phase has no order.
    #[error("InconsistencyMissingOrder")]
    MissingOrder,
    /// Supports an own unit that was ordered to do something else.
    #[error("InconsistencyMismatchedSupporter:{0}")]
    MismatchedSupporter(Province),
    /// Convoys an own army that was not ordered along the convoyed route.
    #[error("InconsistencyMismatchedConvoyer:{0}")]
    MismatchedConvoyer(Province),
    #[error("InconsistencyOrderTypeCount:{}:Found:{found}:Want:{want}", .kind.name())]
    OrderTypeCount {
        kind: OrderKind,
        found: usize,
        want: usize,
    },
    /// The order would fail validation when the phase is advanced.
    #[error(transparent)]
    Invalid(#[from] OrderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// Unset for nation-wide problems such as a wrong build count.
    pub province: Option<Province>,
    pub problem: Problem,
}

impl Inconsistency {
    fn at(p: &Province, problem: Problem) -> Self {
        Inconsistency {
            province: Some(p.super_province()),
            problem,
        }
    }
}

/// Checks the orders `nation` has submitted so far.
///
/// Reports units left without orders (movement and retreat), a build or
/// disband count that differs from the allowed balance (adjustment), orders
/// that fail validation, and own supports or convoys that do not match what
/// the assisted unit was ordered to do.
pub fn corroborate(state: &State, nation: &Nation) -> Vec<Inconsistency> {
    let orders = submitted_orders(state);
    let mut judge = Lookahead::new(state, &orders);
    let mut found = Vec::new();

    let must_order = match state.phase().kind {
        PhaseType::Movement => state.units_of(nation),
        PhaseType::Retreat => dislodged_of(state, nation),
        PhaseType::Adjustment => {
            found.extend(order_counts(&mut judge, nation));
            Vec::new()
        }
    };
    found.extend(
        must_order
            .iter()
            .filter(|p| judge.order(p).is_none())
            .map(|p| Inconsistency::at(p, Problem::MissingOrder)),
    );

    for (p, (owner, order)) in state.orders() {
        if owner != nation {
            continue;
        }
        let problem = match validate(&mut judge, order) {
            Err(e) => Some(Problem::Invalid(e)),
            Ok((_, order)) => mismatch(&judge, nation, &order),
        };
        if let Some(problem) = problem {
            found.push(Inconsistency::at(p, problem));
        }
    }
    found
}

fn order_counts(judge: &mut Lookahead<'_>, nation: &Nation) -> Vec<Inconsistency> {
    let state = judge.state();
    let (mut builds, mut disbands) = (0, 0);
    for (owner, order) in state.orders().values() {
        if owner != nation {
            continue;
        }
        match validate(judge, order) {
            Ok((_, Order::Build { .. } | Order::BuildAnywhere { .. })) => builds += 1,
            Ok((_, Order::Disband { .. })) => disbands += 1,
            _ => {}
        }
    }
    let balance = state.build_balance(nation);
    let want_builds = balance.max(0).unsigned_abs() as usize;
    let want_disbands = balance.min(0).unsigned_abs() as usize;
    [
        (OrderKind::Build, builds, want_builds),
        (OrderKind::Disband, disbands, want_disbands),
    ]
    .into_iter()
    .filter(|(_, found, want)| found != want)
    .map(|(kind, found, want)| Inconsistency {
        province: None,
        problem: Problem::OrderTypeCount { kind, found, want },
    })
    .collect()
}

/// A support or convoy of an own unit that the unit's order contradicts.
fn mismatch(judge: &Lookahead<'_>, nation: &Nation, order: &Order) -> Option<Problem> {
    let state = judge.state();
    let own = |p: &Province| state.unit(p).is_some_and(|(_, u)| &u.nation == nation);
    match order {
        Order::SupportHold { target, .. } if own(target) => judge
            .order(target)
            .filter(|o| o.is_move())
            .map(|_| Problem::MismatchedSupporter(target.super_province())),
        Order::SupportMove { from, to, .. } if own(from) => match judge.order(from) {
            Some(Order::Move { to: moved, .. }) if moved.same_super(to) => None,
            _ => Some(Problem::MismatchedSupporter(from.super_province())),
        },
        Order::Convoy { from, to, .. } if own(from) => match judge.order(from) {
            Some(Order::Move {
                from: start,
                to: moved,
                ..
            }) if start.same_super(from) && moved.same_super(to) => None,
            _ => Some(Problem::MismatchedConvoyer(from.super_province())),
        },
        _ => None,
    }
}

/// Adjustment status lines as seen by `nation`.
///
/// `MayBuild:N` or `MustDisband:N` for the nation itself, and
/// `OtherMayBuild:<nation>:N` or `OtherMustDisband:<nation>:N` for every
/// other nation. Empty outside adjustment phases.
pub fn messages(state: &State, nation: &Nation) -> Vec<String> {
    if state.phase().kind != PhaseType::Adjustment {
        return Vec::new();
    }
    state
        .graph()
        .nations()
        .iter()
        .map(|other| {
            let balance = state.build_balance(other);
            let verb = if balance < 0 { "MustDisband" } else { "MayBuild" };
            let n = balance.unsigned_abs();
            if other == nation {
                format!("{verb}:{n}")
            } else {
                format!("Other{verb}:{other}:{n}")
            }
        })
        .collect()
}
