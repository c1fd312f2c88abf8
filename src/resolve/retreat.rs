//! Retreat-phase resolution.
//!
//! Dislodged units retreat to an adjacent empty province that saw no
//! standoff and was not the attacker's origin. Two retreats into the same
//! province both fail; disbands always succeed.

use crate::board::{Order, OrderError, Province, Resolution, State, Unit};

use super::convoy::has_edge;
use super::Judge;

/// Fails the retreat `from -> to` if any other unit retreats to the same place.
pub fn adjudicate_retreat<'a, J: Judge<'a>>(judge: &mut J, from: &Province, to: &Province) -> Resolution {
    for order in judge.orders().values() {
        if let Order::Move {
            from: other,
            to: dst,
            ..
        } = order
        {
            if !other.same_super(from) && dst.same_super(to) {
                return Err(OrderError::Bounce(other.clone()));
            }
        }
    }
    Ok(())
}

/// Provinces the dislodged `unit` at `at` may legally retreat to, sorted.
pub fn retreat_destinations(state: &State, at: &Province, unit: &Unit) -> Vec<Province> {
    let graph = state.graph();
    let mut found: Vec<Province> = graph
        .edges(at)
        .map(|(dst, _)| dst)
        .filter(|dst| {
            has_edge(graph, unit.unit_type, at, dst)
                && state.unit(dst).is_none()
                && !state.bounce(at, dst)
        })
        .cloned()
        .collect();
    found.sort();
    found.dedup();
    found
}

pub fn has_retreat(state: &State, at: &Province, unit: &Unit) -> bool {
    !retreat_destinations(state, at, unit).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Flags, Graph, Phase, PhaseType, Rules, Season};
    use crate::resolve::{Lookahead, OrderMap};
    use std::sync::Arc;

    fn line() -> State {
        // a - b - c - d, plus b - d.
        let g = Graph::builder()
            .province("a")
            .flag(Flags::LAND)
            .connect_both("b", Flags::LAND)
            .province("b")
            .flag(Flags::LAND)
            .connect_both("c", Flags::LAND)
            .connect_both("d", Flags::LAND)
            .province("c")
            .flag(Flags::LAND)
            .connect_both("d", Flags::LAND)
            .province("d")
            .flag(Flags::LAND)
            .build();
        State::new(
            Arc::new(g),
            Rules::default(),
            Phase::new(1901, Season::Spring, PhaseType::Retreat),
        )
    }

    fn p(s: &str) -> Province {
        Province::new(s)
    }

    #[test]
    fn two_retreats_to_one_province_both_fail() {
        let s = line();
        let mut orders = OrderMap::new();
        orders.insert(p("b"), Order::move_to("b", "d"));
        orders.insert(p("c"), Order::move_to("c", "d"));
        let mut j = Lookahead::new(&s, &orders);
        assert_eq!(
            adjudicate_retreat(&mut j, &p("b"), &p("d")),
            Err(OrderError::Bounce(p("c")))
        );
        assert_eq!(
            adjudicate_retreat(&mut j, &p("c"), &p("d")),
            Err(OrderError::Bounce(p("b")))
        );
    }

    #[test]
    fn destinations_skip_occupied_contested_and_attacker_origin() {
        let mut s = line();
        let unit = Unit::army("X");
        s.set_unit("b", Unit::army("Y")).unwrap();
        s.set_dislodger(&p("a"), &p("b"));
        assert_eq!(retreat_destinations(&s, &p("b"), &unit), vec![p("c"), p("d")]);

        s.add_bounce(&p("c"), &p("d"));
        s.set_unit("c", Unit::army("Z")).unwrap();
        assert!(!has_retreat(&s, &p("b"), &unit));
    }
}
