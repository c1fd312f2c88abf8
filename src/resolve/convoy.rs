//! Convoy chain search.
//!
//! A convoy route is a graph path from the army's province to its
//! destination whose intermediate steps are all sea (or convoyable) provinces
//! holding fleets. When resolving, each of those fleets must also carry a
//! matching convoy order that itself succeeds.

use std::collections::BTreeSet;

use crate::board::{Graph, Nation, Order, Province, Step, UnitType};

use super::Judge;

/// True if `unit_type` can step directly from `src` to `dst`.
pub fn has_edge(graph: &Graph, unit_type: UnitType, src: &Province, dst: &Province) -> bool {
    let terrain = unit_type.terrain();
    graph.flags(dst).contains(terrain) && graph.edge(src, dst).is_some_and(|f| f.contains(terrain))
}

/// True if the order at `p` convoys an army from `src` to `dst`.
fn convoys<'a, J: Judge<'a>>(judge: &J, p: &Province, src: &Province, dst: &Province) -> bool {
    matches!(
        judge.order(p),
        Some(Order::Convoy { from, to, .. }) if from.contains(src) && to.contains(dst)
    )
}

/// Path filter admitting one leg of a convoy from `src` to `dst`.
fn convoy_leg<'a, J: Judge<'a>>(
    judge: &mut J,
    step: &Step<'_>,
    src: &Province,
    dst: &Province,
    resolving: bool,
    dst_ok: bool,
) -> bool {
    let state = judge.state();
    let flags = state.graph().all_flags(step.province);
    if dst_ok && step.province.same_super(dst) && flags.land() {
        return true;
    }
    if (flags.land() || !flags.sea()) && !flags.convoyable() {
        return false;
    }
    match state.unit(step.province) {
        Some((_, unit)) if unit.unit_type == UnitType::Fleet => {
            if !resolving {
                return true;
            }
            convoys(judge, step.province, src, dst) && judge.resolve(step.province)
        }
        _ => false,
    }
}

/// A convoy route from `src` to `dst` passing through the fleet at `via`.
pub fn convoy_path_possible<'a, J: Judge<'a>>(
    judge: &mut J,
    via: &Province,
    src: &Province,
    dst: &Province,
    resolving: bool,
) -> Option<Vec<Province>> {
    let graph = judge.state().graph();
    let mut path = graph.path(src, via, |s| convoy_leg(judge, s, src, dst, resolving, false))?;
    // Sea provinces touch split coasts, not the land province behind them.
    let mut targets = vec![dst.clone()];
    targets.extend(graph.coasts(dst).into_iter().filter(|c| c != dst));
    let rest = targets.iter().find_map(|target| {
        graph.path(via, target, |s| convoy_leg(judge, s, src, dst, resolving, true))
    })?;
    path.extend(rest);
    Some(path)
}

fn convoy_path<'a, J: Judge<'a>>(
    judge: &mut J,
    src: &Province,
    dst: &Province,
    resolving: bool,
    via_nation: Option<&Nation>,
) -> Option<Vec<Province>> {
    if src == dst {
        return None;
    }
    let state = judge.state();
    let graph = state.graph();
    let mut waypoints = Vec::new();
    for (p, unit) in state.units() {
        let flags = graph.all_flags(p);
        if (flags.land() && !flags.convoyable())
            || unit.unit_type != UnitType::Fleet
            || via_nation.is_some_and(|n| &unit.nation != n)
            || p.same_super(src)
            || p.same_super(dst)
        {
            continue;
        }
        let ordered = convoys(judge, p, src, dst);
        let usable = if resolving {
            ordered && judge.resolve(p)
        } else {
            via_nation.is_none() || ordered
        };
        if usable {
            waypoints.push(p);
        }
    }
    waypoints
        .into_iter()
        .find_map(|w| convoy_path_possible(judge, w, src, dst, resolving))
}

/// Any convoy route between the provinces or their coasts.
///
/// With `resolving`, every fleet on the route must have a successful matching
/// convoy order. With `via_nation`, the route must use at least one fleet of
/// that nation which was ordered to convoy.
pub fn any_convoy_path<'a, J: Judge<'a>>(
    judge: &mut J,
    src: &Province,
    dst: &Province,
    resolving: bool,
    via_nation: Option<&Nation>,
) -> Option<Vec<Province>> {
    let graph = judge.state().graph();
    if !graph.all_flags(src).sea() || !graph.all_flags(dst).sea() {
        return None;
    }
    if let Some(path) = convoy_path(judge, src, dst, resolving, via_nation) {
        return Some(path);
    }
    for src_coast in graph.coasts(src) {
        for dst_coast in graph.coasts(dst) {
            if &src_coast == src && &dst_coast == dst {
                continue;
            }
            if let Some(path) = convoy_path(judge, &src_coast, &dst_coast, resolving, via_nation) {
                return Some(path);
            }
        }
    }
    None
}

/// True if the unit at `src` is an army whose move travels by convoy.
///
/// That is the case when there is no direct land route, when it asked to go
/// by convoy and a convoy succeeds, or when its own nation ordered a convoy
/// for it.
pub fn must_convoy<'a, J: Judge<'a>>(judge: &mut J, src: &Province) -> bool {
    let state = judge.state();
    let Some((_, unit)) = state.unit(src) else {
        return false;
    };
    if unit.unit_type != UnitType::Army {
        return false;
    }
    let Some(Order::Move {
        from,
        to,
        via_convoy,
    }) = judge.order(src)
    else {
        return false;
    };
    !has_edge(state.graph(), unit.unit_type, from, to)
        || (*via_convoy && any_convoy_path(judge, from, to, true, None).is_some())
        || any_convoy_path(judge, from, to, false, Some(&unit.nation)).is_some()
}

/// Coastal provinces an army at `src` could reach through the current fleets.
///
/// `skip` excludes one fleet (a supporter cannot convoy the move it supports).
pub fn convoy_destinations<'a, J: Judge<'a>>(
    judge: &J,
    src: &Province,
    skip: Option<&Province>,
) -> BTreeSet<Province> {
    let state = judge.state();
    let graph = state.graph();
    let mut found = BTreeSet::new();
    graph.reachable(src, |s| {
        if !s.edge.sea() {
            return false;
        }
        let flags = graph.all_flags(s.province);
        if flags.land() {
            if !s.trace.is_empty() && !s.province.same_super(src) {
                found.insert(s.province.super_province());
            }
            if !flags.convoyable() {
                return false;
            }
        }
        if skip.is_some_and(|p| p.same_super(s.province)) {
            return false;
        }
        matches!(state.unit(s.province), Some((_, u)) if u.unit_type == UnitType::Fleet)
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Flags, Phase, PhaseType, Rules, Season, State, Unit};
    use crate::resolve::{Lookahead, OrderMap};
    use std::sync::Arc;

    // Two coasts joined by a two-sea channel, plus a land bridge elsewhere.
    fn channel() -> State {
        let g = Graph::builder()
            .province("w")
            .flag(Flags::COAST)
            .connect_both("s1", Flags::SEA)
            .connect_both("l", Flags::LAND)
            .province("s1")
            .flag(Flags::SEA)
            .connect_both("s2", Flags::SEA)
            .province("s2")
            .flag(Flags::SEA)
            .connect_both("e", Flags::SEA)
            .province("e")
            .flag(Flags::COAST)
            .province("l")
            .flag(Flags::LAND)
            .build();
        State::new(
            Arc::new(g),
            Rules::default(),
            Phase::new(1901, Season::Spring, PhaseType::Movement),
        )
    }

    fn p(s: &str) -> Province {
        Province::new(s)
    }

    #[test]
    fn path_needs_fleets_in_every_sea() {
        let mut s = channel();
        s.set_unit("w", Unit::army("A")).unwrap();
        s.set_unit("s1", Unit::fleet("A")).unwrap();
        let orders = OrderMap::new();
        let mut j = Lookahead::new(&s, &orders);
        assert!(any_convoy_path(&mut j, &p("w"), &p("e"), false, None).is_none());

        s.set_unit("s2", Unit::fleet("B")).unwrap();
        let mut j = Lookahead::new(&s, &orders);
        assert_eq!(
            any_convoy_path(&mut j, &p("w"), &p("e"), false, None),
            Some(vec![p("s1"), p("s2"), p("e")])
        );
    }

    #[test]
    fn resolving_requires_matching_orders() {
        let mut s = channel();
        s.set_unit("w", Unit::army("A")).unwrap();
        s.set_unit("s1", Unit::fleet("A")).unwrap();
        s.set_unit("s2", Unit::fleet("A")).unwrap();
        let mut orders = OrderMap::new();
        orders.insert(p("w"), Order::move_to("w", "e"));
        orders.insert(p("s1"), Order::convoy("s1", "w", "e"));
        let mut j = Lookahead::new(&s, &orders);
        assert!(any_convoy_path(&mut j, &p("w"), &p("e"), true, None).is_none());

        orders.insert(p("s2"), Order::convoy("s2", "w", "e"));
        let mut j = Lookahead::new(&s, &orders);
        assert!(any_convoy_path(&mut j, &p("w"), &p("e"), true, None).is_some());
        assert!(must_convoy(&mut j, &p("w")));
    }

    #[test]
    fn land_route_is_not_a_convoy() {
        let mut s = channel();
        s.set_unit("w", Unit::army("A")).unwrap();
        let mut orders = OrderMap::new();
        orders.insert(p("w"), Order::move_to("w", "l"));
        let mut j = Lookahead::new(&s, &orders);
        assert!(!must_convoy(&mut j, &p("w")));
        assert!(has_edge(s.graph(), UnitType::Army, &p("w"), &p("l")));
        assert!(!has_edge(s.graph(), UnitType::Fleet, &p("w"), &p("l")));
    }

    #[test]
    fn destinations_follow_fleets() {
        let mut s = channel();
        s.set_unit("w", Unit::army("A")).unwrap();
        s.set_unit("s1", Unit::fleet("A")).unwrap();
        s.set_unit("s2", Unit::fleet("A")).unwrap();
        let orders = OrderMap::new();
        let j = Lookahead::new(&s, &orders);
        let d = convoy_destinations(&j, &p("w"), None);
        assert_eq!(d.into_iter().collect::<Vec<_>>(), vec![p("e")]);
        let d = convoy_destinations(&j, &p("w"), Some(&p("s2")));
        assert!(d.is_empty());
    }
}
