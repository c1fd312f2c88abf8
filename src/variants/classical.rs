//! The standard Diplomacy map: 75 provinces, 34 supply centers, seven
//! nations, with split coasts on Bulgaria, Spain and St. Petersburg.

use crate::board::{
    BuildRule, CaptureRule, CenterOwner, Flags, Graph, GraphBuilder, Nation, OrderKind, Rules,
    Season, State, StateError, Unit, UnitType,
};
use crate::protocol::OrderParser;
use crate::variant::Variant;

pub const NAME: &str = "Classical";

/// Supply centers needed for a solo victory.
pub const SOLO_SC_COUNT: usize = 18;

#[derive(Debug, Clone, Copy)]
enum Terrain {
    Sea,
    Coastal,
    Inland,
    /// Inland for armies, with one sea node per named coast.
    Split(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
enum Center {
    Plain,
    Neutral,
    Home(&'static str),
}

use Center::*;
use Terrain::*;

static PROVINCES: &[(&str, Terrain, Center)] = &[
    ("adr", Sea, Plain),
    ("aeg", Sea, Plain),
    ("alb", Coastal, Plain),
    ("ank", Coastal, Home("Turkey")),
    ("apu", Coastal, Plain),
    ("arm", Coastal, Plain),
    ("bal", Sea, Plain),
    ("bar", Sea, Plain),
    ("bel", Coastal, Neutral),
    ("ber", Coastal, Home("Germany")),
    ("bla", Sea, Plain),
    ("boh", Inland, Plain),
    ("bot", Sea, Plain),
    ("bre", Coastal, Home("France")),
    ("bud", Inland, Home("Austria")),
    ("bul", Split(&["ec", "sc"]), Neutral),
    ("bur", Inland, Plain),
    ("cly", Coastal, Plain),
    ("con", Coastal, Home("Turkey")),
    ("den", Coastal, Neutral),
    ("eas", Sea, Plain),
    ("edi", Coastal, Home("England")),
    ("eng", Sea, Plain),
    ("fin", Coastal, Plain),
    ("gal", Inland, Plain),
    ("gas", Coastal, Plain),
    ("gol", Sea, Plain),
    ("gre", Coastal, Neutral),
    ("hel", Sea, Plain),
    ("hol", Coastal, Neutral),
    ("ion", Sea, Plain),
    ("iri", Sea, Plain),
    ("kie", Coastal, Home("Germany")),
    ("lon", Coastal, Home("England")),
    ("lvn", Coastal, Plain),
    ("lvp", Coastal, Home("England")),
    ("mao", Sea, Plain),
    ("mar", Coastal, Home("France")),
    ("mos", Inland, Home("Russia")),
    ("mun", Inland, Home("Germany")),
    ("naf", Coastal, Plain),
    ("nao", Sea, Plain),
    ("nap", Coastal, Home("Italy")),
    ("nrg", Sea, Plain),
    ("nth", Sea, Plain),
    ("nwy", Coastal, Neutral),
    ("par", Inland, Home("France")),
    ("pic", Coastal, Plain),
    ("pie", Coastal, Plain),
    ("por", Coastal, Neutral),
    ("pru", Coastal, Plain),
    ("rom", Coastal, Home("Italy")),
    ("ruh", Inland, Plain),
    ("rum", Coastal, Neutral),
    ("ser", Inland, Neutral),
    ("sev", Coastal, Home("Russia")),
    ("sil", Inland, Plain),
    ("ska", Sea, Plain),
    ("smy", Coastal, Home("Turkey")),
    ("spa", Split(&["nc", "sc"]), Neutral),
    ("stp", Split(&["nc", "sc"]), Home("Russia")),
    ("swe", Coastal, Neutral),
    ("syr", Coastal, Plain),
    ("tri", Coastal, Home("Austria")),
    ("tun", Coastal, Neutral),
    ("tus", Coastal, Plain),
    ("tyr", Inland, Plain),
    ("tys", Sea, Plain),
    ("ukr", Inland, Plain),
    ("ven", Coastal, Home("Italy")),
    ("vie", Inland, Home("Austria")),
    ("wal", Coastal, Plain),
    ("war", Inland, Home("Russia")),
    ("wes", Sea, Plain),
    ("yor", Coastal, Plain),
];

/// Fleet-only adjacencies, coast-specific where a split coast is involved.
static FLEET_EDGES: &[(&str, &str)] = &[
    ("adr", "ion"), ("aeg", "eas"), ("aeg", "ion"), ("bal", "bot"), ("eng", "iri"),
    ("eng", "mao"), ("eng", "nth"), ("gol", "tys"), ("gol", "wes"), ("hel", "nth"),
    ("ion", "eas"), ("ion", "tys"), ("iri", "mao"), ("iri", "nao"), ("mao", "nao"),
    ("mao", "wes"), ("nao", "nrg"), ("nth", "nrg"), ("nth", "ska"), ("nrg", "bar"),
    ("tys", "wes"), ("adr", "alb"), ("adr", "apu"), ("adr", "tri"), ("adr", "ven"),
    ("aeg", "bul/sc"), ("aeg", "con"), ("aeg", "gre"), ("aeg", "smy"), ("bal", "ber"),
    ("bal", "den"), ("bal", "kie"), ("bal", "lvn"), ("bal", "pru"), ("bal", "swe"),
    ("bar", "nwy"), ("bar", "stp/nc"), ("bla", "ank"), ("bla", "arm"), ("bla", "bul/ec"),
    ("bla", "con"), ("bla", "rum"), ("bla", "sev"), ("bot", "fin"), ("bot", "lvn"),
    ("bot", "stp/sc"), ("bot", "swe"), ("eas", "smy"), ("eas", "syr"), ("eng", "bel"),
    ("eng", "bre"), ("eng", "lon"), ("eng", "pic"), ("eng", "wal"), ("gol", "mar"),
    ("gol", "pie"), ("gol", "spa/sc"), ("gol", "tus"), ("hel", "den"), ("hel", "hol"),
    ("hel", "kie"), ("ion", "alb"), ("ion", "apu"), ("ion", "gre"), ("ion", "nap"),
    ("ion", "tun"), ("iri", "lvp"), ("iri", "wal"), ("mao", "bre"), ("mao", "gas"),
    ("mao", "naf"), ("mao", "por"), ("mao", "spa/nc"), ("mao", "spa/sc"), ("nao", "cly"),
    ("nao", "lvp"), ("nth", "bel"), ("nth", "den"), ("nth", "edi"), ("nth", "hol"),
    ("nth", "lon"), ("nth", "nwy"), ("nth", "yor"), ("nrg", "cly"), ("nrg", "edi"),
    ("nrg", "nwy"), ("ska", "den"), ("ska", "nwy"), ("ska", "swe"), ("tys", "nap"),
    ("tys", "rom"), ("tys", "tun"), ("tys", "tus"), ("wes", "naf"), ("wes", "spa/sc"),
    ("wes", "tun"), ("con", "bul/ec"), ("con", "bul/sc"), ("gre", "bul/sc"), ("rum", "bul/ec"),
    ("gas", "spa/nc"), ("mar", "spa/sc"), ("por", "spa/nc"), ("por", "spa/sc"),
    ("fin", "stp/sc"), ("lvn", "stp/sc"), ("nwy", "stp/nc"),
];

/// Army-only adjacencies.
static ARMY_EDGES: &[(&str, &str)] = &[
    ("boh", "gal"), ("boh", "mun"), ("boh", "sil"), ("boh", "tyr"), ("boh", "vie"),
    ("bud", "gal"), ("bud", "vie"), ("bur", "mun"), ("bur", "par"), ("bur", "ruh"),
    ("gal", "sil"), ("gal", "ukr"), ("gal", "vie"), ("gal", "war"), ("mos", "ukr"),
    ("mos", "war"), ("mun", "ruh"), ("mun", "sil"), ("mun", "tyr"), ("sil", "war"),
    ("tyr", "vie"), ("ukr", "war"), ("bud", "rum"), ("bud", "ser"), ("bud", "tri"),
    ("bur", "bel"), ("bur", "gas"), ("bur", "mar"), ("bur", "pic"), ("gal", "rum"),
    ("gas", "mar"), ("mos", "lvn"), ("mos", "sev"), ("mos", "stp"), ("mun", "ber"),
    ("mun", "kie"), ("par", "bre"), ("par", "gas"), ("par", "pic"), ("ruh", "bel"),
    ("ruh", "hol"), ("ruh", "kie"), ("ser", "alb"), ("ser", "bul"), ("ser", "gre"),
    ("ser", "rum"), ("ser", "tri"), ("sil", "ber"), ("sil", "pru"), ("tyr", "pie"),
    ("tyr", "tri"), ("tyr", "ven"), ("ukr", "rum"), ("ukr", "sev"), ("vie", "tri"),
    ("war", "lvn"), ("war", "pru"), ("edi", "lvp"), ("fin", "nwy"), ("pie", "ven"),
    ("rom", "ven"), ("smy", "arm"), ("wal", "yor"), ("con", "bul"), ("gre", "bul"),
    ("rum", "bul"), ("gas", "spa"), ("mar", "spa"), ("por", "spa"), ("fin", "stp"),
    ("lvn", "stp"), ("nwy", "stp"), ("ank", "smy"), ("apu", "rom"), ("lvp", "yor"),
    ("tus", "ven"), ("arm", "syr"),
];

/// Coastal pairs sharing a sea border: both unit types may cross.
static SHARED_EDGES: &[(&str, &str)] = &[
    ("alb", "gre"), ("alb", "tri"), ("ank", "arm"), ("ank", "con"), ("apu", "nap"),
    ("apu", "ven"), ("bel", "hol"), ("bel", "pic"), ("ber", "kie"), ("ber", "pru"),
    ("bre", "gas"), ("bre", "pic"), ("cly", "edi"), ("cly", "lvp"), ("con", "smy"),
    ("hol", "kie"),
    ("den", "kie"), ("den", "swe"), ("edi", "yor"), ("fin", "swe"), ("lon", "wal"),
    ("lon", "yor"), ("lvp", "wal"), ("mar", "pie"), ("naf", "tun"), ("nwy", "swe"),
    ("pie", "tus"), ("pru", "lvn"), ("rom", "nap"), ("rom", "tus"), ("sev", "arm"),
    ("sev", "rum"), ("smy", "syr"), ("tri", "ven"),
];

/// Opening units, by nation.
static START_UNITS: &[(&str, &str, UnitType)] = &[
    ("vie", "Austria", UnitType::Army),
    ("bud", "Austria", UnitType::Army),
    ("tri", "Austria", UnitType::Fleet),
    ("lon", "England", UnitType::Fleet),
    ("edi", "England", UnitType::Fleet),
    ("lvp", "England", UnitType::Army),
    ("bre", "France", UnitType::Fleet),
    ("par", "France", UnitType::Army),
    ("mar", "France", UnitType::Army),
    ("kie", "Germany", UnitType::Fleet),
    ("ber", "Germany", UnitType::Army),
    ("mun", "Germany", UnitType::Army),
    ("nap", "Italy", UnitType::Fleet),
    ("rom", "Italy", UnitType::Army),
    ("ven", "Italy", UnitType::Army),
    ("stp/sc", "Russia", UnitType::Fleet),
    ("mos", "Russia", UnitType::Army),
    ("war", "Russia", UnitType::Army),
    ("sev", "Russia", UnitType::Fleet),
    ("ank", "Turkey", UnitType::Fleet),
    ("con", "Turkey", UnitType::Army),
    ("smy", "Turkey", UnitType::Army),
];

fn connect_all(mut b: GraphBuilder, edges: &[(&str, &str)], flags: Flags) -> GraphBuilder {
    for &(from, to) in edges {
        b = b.province(from).connect_both(to, flags);
    }
    b
}

pub fn graph() -> Graph {
    let mut b = Graph::builder();
    for &(name, terrain, center) in PROVINCES {
        b = b.province(name);
        b = match terrain {
            Sea => b.flag(Flags::SEA),
            Coastal => b.flag(Flags::COAST),
            Inland | Split(_) => b.flag(Flags::LAND),
        };
        b = match center {
            Plain => b,
            Neutral => b.supply_center(CenterOwner::Neutral),
            Home(nation) => b.supply_center(CenterOwner::Home(Nation::new(nation))),
        };
        if let Split(coasts) = terrain {
            for coast in coasts {
                b = b.province(&format!("{name}/{coast}")).flag(Flags::SEA);
            }
        }
    }
    b = connect_all(b, FLEET_EDGES, Flags::SEA);
    b = connect_all(b, ARMY_EDGES, Flags::LAND);
    b = connect_all(b, SHARED_EDGES, Flags::COAST);
    b.build()
}

pub fn rules() -> Rules {
    Rules {
        seasons: vec![Season::Spring, Season::Fall],
        build_rule: BuildRule::HomeCenters,
        capture: CaptureRule::FinalRetreat,
    }
}

/// Spring 1901: every nation on its home centers with its three (or, for
/// Russia, four) opening units.
fn start(variant: &Variant) -> Result<State, StateError> {
    let mut state = variant.blank(variant.phase(1901));
    for &(at, nation, unit_type) in START_UNITS {
        state.set_unit(at, Unit::new(unit_type, nation))?;
    }
    for nation in &variant.nations {
        for center in variant.graph().supply_centers(nation) {
            state.set_supply_center(center, nation.clone())?;
        }
    }
    Ok(state)
}

pub fn variant() -> Variant {
    let unit_types = vec![UnitType::Army, UnitType::Fleet];
    let parser = OrderParser::new(&OrderKind::ALL, &unit_types);
    Variant::new(NAME, graph(), rules(), unit_types, SOLO_SC_COUNT, start).with_parser(parser)
}
