//! Retreat-phase move generation.
//!
//! A dislodged unit may always disband, or retreat to any adjacent empty
//! province that saw no standoff and is not where its attacker came from.

use crate::board::{Order, Province, State};
use crate::resolve::retreat::retreat_destinations;

/// Every legal retreat-phase order for the dislodged unit at `at`.
pub fn unit_orders(state: &State, at: &Province) -> Vec<Order> {
    let Some((at, unit)) = state.dislodged(at) else {
        return Vec::new();
    };
    let mut orders = vec![Order::Disband { at: at.clone() }];
    orders.extend(
        retreat_destinations(state, at, unit)
            .into_iter()
            .map(|to| Order::Move {
                from: at.clone(),
                to,
                via_convoy: false,
            }),
    );
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Flags, Graph, Phase, PhaseType, Rules, Season, Unit};
    use std::sync::Arc;

    fn state() -> State {
        let g = Graph::builder()
            .province("a")
            .flag(Flags::LAND)
            .connect_both("b", Flags::LAND)
            .connect_both("c", Flags::LAND)
            .province("b")
            .flag(Flags::LAND)
            .province("c")
            .flag(Flags::LAND)
            .build();
        State::new(
            Arc::new(g),
            Rules::default(),
            Phase::new(1901, Season::Spring, PhaseType::Retreat),
        )
    }

    #[test]
    fn disband_always_present() {
        let mut s = state();
        s.set_unit("a", Unit::army("Y")).unwrap();
        s.set_unit("b", Unit::army("Y")).unwrap();
        s.set_unit("c", Unit::army("Y")).unwrap();
        s.set_dislodged("a", Unit::army("X")).unwrap();
        assert_eq!(unit_orders(&s, &"a".into()), vec![Order::disband("a")]);
    }

    #[test]
    fn retreat_excludes_attacker_origin() {
        let mut s = state();
        s.set_unit("a", Unit::army("Y")).unwrap();
        s.set_dislodged("a", Unit::army("X")).unwrap();
        s.set_dislodger(&"b".into(), &"a".into());
        assert_eq!(
            unit_orders(&s, &"a".into()),
            vec![Order::disband("a"), Order::move_to("a", "c")]
        );
    }

    #[test]
    fn no_dislodged_unit_returns_empty() {
        assert!(unit_orders(&state(), &"a".into()).is_empty());
    }
}
