//! Pure: each nation is a single inland province, and every province
//! borders every other. Armies only, no convoys; four centers win.

use crate::board::{CenterOwner, Flags, Graph, Nation, OrderKind, State, StateError, Unit, UnitType};
use crate::protocol::OrderParser;
use crate::variant::Variant;

use super::classical;

pub const NAME: &str = "Pure";

pub const SOLO_SC_COUNT: usize = 4;

static HOMES: &[(&str, &str)] = &[
    ("ber", "Germany"),
    ("con", "Turkey"),
    ("lon", "England"),
    ("mos", "Russia"),
    ("par", "France"),
    ("rom", "Italy"),
    ("vie", "Austria"),
];

pub fn graph() -> Graph {
    let mut b = Graph::builder();
    for &(name, nation) in HOMES {
        b = b
            .province(name)
            .flag(Flags::LAND)
            .supply_center(CenterOwner::Home(Nation::new(nation)));
        for &(other, _) in HOMES.iter().filter(|(other, _)| *other != name) {
            b = b.connect(other, Flags::LAND);
        }
    }
    b.build()
}

fn start(variant: &Variant) -> Result<State, StateError> {
    let mut state = variant.blank(variant.phase(1901));
    for &(at, nation) in HOMES {
        state.set_unit(at, Unit::army(nation))?;
        state.set_supply_center(at, nation)?;
    }
    Ok(state)
}

pub fn variant() -> Variant {
    let unit_types = vec![UnitType::Army];
    let parser = OrderParser::new(
        &[
            OrderKind::Build,
            OrderKind::Disband,
            OrderKind::Hold,
            OrderKind::Move,
            OrderKind::Support,
        ],
        &unit_types,
    );
    Variant::new(NAME, graph(), classical::rules(), unit_types, SOLO_SC_COUNT, start)
        .with_parser(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Province;
    use crate::protocol::ParseError;

    #[test]
    fn everyone_borders_everyone() {
        let g = graph();
        assert_eq!(g.provinces().len(), 7);
        for p in g.provinces() {
            assert_eq!(g.edges(&p).count(), 6, "{p}");
        }
    }

    #[test]
    fn one_army_per_nation() {
        let v = variant();
        let s = v.start().unwrap();
        assert_eq!(s.units().len(), 7);
        assert_eq!(v.nations.len(), 7);
        assert!(s.units().values().all(|u| u.unit_type == UnitType::Army));
        assert_eq!(s.supply_center(&Province::new("vie")), Some(&Nation::new("Austria")));
    }

    #[test]
    fn no_convoys_or_fleets() {
        let v = variant();
        assert_eq!(
            v.parser.parse(v.graph(), "ber - lon via convoy"),
            Err(ParseError::UnsupportedKind(OrderKind::MoveViaConvoy))
        );
        assert_eq!(
            v.parser.parse(v.graph(), "ber Build Fleet"),
            Err(ParseError::UnsupportedUnitType(UnitType::Fleet))
        );
    }
}
