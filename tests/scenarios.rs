//! Whole-engine scenarios and properties.
//!
//! Small hand-built positions check single behaviors end to end; seeded
//! random games check the invariants that must hold for any legal order set.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use dipjudge::board::{
    resolution_token, CenterOwner, Flags, Graph, Nation, Order, PhaseType, Phase, Province, Rules,
    Season, State, Unit,
};
use dipjudge::movegen::random_orders;
use dipjudge::selfplay::{self, SelfPlayConfig};
use dipjudge::variant::Variant;
use dipjudge::variants::{classical, pure};

fn p(name: &str) -> Province {
    Province::new(name)
}

fn token(state: &State, at: &str) -> String {
    state
        .resolutions()
        .get(&p(at))
        .map(resolution_token)
        .unwrap_or_else(|| panic!("no resolution at {at}"))
}

fn spring(variant: &Variant) -> State {
    variant.blank(Phase::new(1901, Season::Spring, PhaseType::Movement))
}

/// Submits one random legal order set per nation and adjudicates.
fn random_phase(variant: &Variant, state: &mut State, rng: &mut SmallRng) {
    for nation in &variant.nations {
        let orders = random_orders(state, nation, rng);
        state.set_orders(nation, orders).expect("generated orders are legal");
    }
    state.advance().expect("adjudication");
}

fn assert_single_occupancy(state: &State) {
    let supers: BTreeSet<Province> = state.units().keys().map(Province::super_province).collect();
    assert_eq!(supers.len(), state.units().len(), "two units share a province in {}", state.phase());
    let supers: BTreeSet<Province> = state.dislodgeds().keys().map(Province::super_province).collect();
    assert_eq!(supers.len(), state.dislodgeds().len());
}

/// Counts the submitted orders matching `pred` that resolved OK.
fn succeeded(before: &State, after: &State, pred: impl Fn(&Order) -> bool) -> usize {
    before
        .orders()
        .iter()
        .filter(|(_, (_, order))| pred(order))
        .filter(|(key, _)| matches!(after.resolutions().get(*key), Some(Ok(()))))
        .count()
}

// ---------------------------------------------------------------------------
// Properties over random games
// ---------------------------------------------------------------------------

#[test]
fn advance_is_deterministic() {
    let variant = classical::variant();
    let mut rng = SmallRng::seed_from_u64(7);
    let mut state = variant.start().unwrap();
    for _ in 0..12 {
        for nation in &variant.nations {
            let orders = random_orders(&state, nation, &mut rng);
            state.set_orders(nation, orders).unwrap();
        }
        let mut again = state.clone();
        state.advance().unwrap();
        again.advance().unwrap();
        assert_eq!(state.dump(), again.dump());
    }
}

#[test]
fn units_are_conserved_across_phases() {
    let variant = classical::variant();
    for seed in 1..=4u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state = variant.start().unwrap();
        while state.phase().year <= 1906 {
            let mut before = state.clone();
            for nation in &variant.nations {
                let orders = random_orders(&before, nation, &mut rng);
                before.set_orders(nation, orders).unwrap();
            }
            state = before.clone();
            state.advance().unwrap();

            let units_before = before.units().len();
            let units_after = state.units().len();
            let forced = state.force_disbands().len();
            match before.phase().kind {
                PhaseType::Movement => {
                    assert!(before.dislodgeds().is_empty());
                    assert_eq!(units_after + state.dislodgeds().len() + forced, units_before);
                }
                PhaseType::Retreat => {
                    let retreated = succeeded(&before, &state, Order::is_move);
                    assert!(state.dislodgeds().is_empty());
                    assert_eq!(units_after, units_before + retreated);
                }
                PhaseType::Adjustment => {
                    let built = succeeded(&before, &state, |o| {
                        matches!(o, Order::Build { .. } | Order::BuildAnywhere { .. })
                    });
                    let disbanded = succeeded(&before, &state, |o| matches!(o, Order::Disband { .. }));
                    assert_eq!(units_after + disbanded + forced, units_before + built);
                }
            }
            assert_single_occupancy(&state);
        }
    }
}

#[test]
fn every_unit_gets_a_resolution_in_movement() {
    let variant = classical::variant();
    let mut rng = SmallRng::seed_from_u64(11);
    let mut state = variant.start().unwrap();
    // Only some nations order; the rest hold by default.
    for nation in variant.nations.iter().take(3) {
        let orders = random_orders(&state, nation, &mut rng);
        state.set_orders(nation, orders).unwrap();
    }
    let units: Vec<Province> = state.units().keys().map(Province::super_province).collect();
    state.advance().unwrap();
    for at in units {
        assert!(state.resolutions().contains_key(&at), "{at} unresolved");
    }
}

#[test]
fn random_pure_games_stay_legal() {
    let variant = pure::variant();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut state = variant.start().unwrap();
    while state.phase().year <= 1910 && variant.solo_winner(&state).is_none() {
        random_phase(&variant, &mut state, &mut rng);
        assert_single_occupancy(&state);
        for (at, unit) in state.units() {
            assert!(state.graph().flags(at).contains(unit.unit_type.terrain()));
        }
    }
}

#[test]
fn seeded_self_play_repeats() {
    let variant = pure::variant();
    let config = SelfPlayConfig {
        num_games: 3,
        max_year: 1905,
        threads: 2,
        seed: 99,
        ..SelfPlayConfig::default()
    };
    let first = selfplay::run_self_play(&variant, &config).unwrap();
    let second = selfplay::run_self_play(&variant, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

// ---------------------------------------------------------------------------
// Movement scenarios
// ---------------------------------------------------------------------------

/// Three nations with two home centers each on a ring of six provinces.
fn three_powers() -> State {
    let ring = ["a1", "a2", "b1", "b2", "c1", "c2"];
    let mut b = Graph::builder();
    for (i, name) in ring.iter().enumerate() {
        let nation = &name[..1].to_uppercase();
        b = b
            .province(name)
            .flag(Flags::LAND)
            .supply_center(CenterOwner::Home(Nation::new(nation.as_str())))
            .connect_both(ring[(i + 1) % ring.len()], Flags::LAND);
    }
    let mut state = State::new(
        Arc::new(b.build()),
        Rules::default(),
        Phase::new(1901, Season::Spring, PhaseType::Movement),
    );
    for nation in ["A", "B", "C"] {
        let home = nation.to_lowercase();
        let (first, second) = (Province::new(format!("{home}1")), Province::new(format!("{home}2")));
        state.set_unit(first.clone(), Unit::army(nation)).unwrap();
        state.set_supply_centers([(first, nation), (second, nation)]).unwrap();
    }
    state
}

#[test]
fn unordered_units_hold_through_spring() {
    let mut state = three_powers();
    let units = state.units().clone();
    let centers = state.supply_centers().clone();

    state.advance().unwrap();
    assert_eq!(state.phase(), Phase::new(1901, Season::Spring, PhaseType::Retreat));
    for at in ["a1", "b1", "c1"] {
        assert_eq!(token(&state, at), "OK");
    }
    state.advance().unwrap();

    assert_eq!(state.phase(), Phase::new(1901, Season::Fall, PhaseType::Movement));
    assert_eq!(state.units(), &units);
    assert_eq!(state.supply_centers(), &centers);
}

#[test]
fn equal_moves_bounce_both_ways() {
    let variant = classical::variant();
    let mut state = spring(&variant);
    state.set_unit("vie", Unit::army("Austria")).unwrap();
    state.set_unit("ven", Unit::army("Italy")).unwrap();
    state.set_order("Austria", Order::move_to("vie", "tyr")).unwrap();
    state.set_order("Italy", Order::move_to("ven", "tyr")).unwrap();
    state.advance().unwrap();

    assert_eq!(token(&state, "vie"), "ErrBounce:ven");
    assert_eq!(token(&state, "ven"), "ErrBounce:vie");
    assert!(state.unit(&p("vie")).is_some());
    assert!(state.unit(&p("ven")).is_some());
    assert!(state.unit(&p("tyr")).is_none());
    let bounced: BTreeSet<Province> = [p("ven"), p("vie")].into();
    assert_eq!(state.bounces().get(&p("tyr")), Some(&bounced));
}

#[test]
fn unit_cannot_support_itself() {
    let variant = classical::variant();
    let mut state = spring(&variant);
    state.set_unit("par", Unit::army("France")).unwrap();
    state.set_order("France", Order::support_hold("par", "par")).unwrap();
    state.advance().unwrap();
    assert_eq!(token(&state, "par"), "ErrIllegalSupportPosition");
    assert!(state.unit(&p("par")).is_some());
}

#[test]
fn cut_support_does_not_help_its_own_move() {
    let variant = classical::variant();
    let mut state = spring(&variant);
    state.set_unit("mun", Unit::army("Germany")).unwrap();
    state.set_unit("ber", Unit::army("Germany")).unwrap();
    state.set_unit("boh", Unit::army("Austria")).unwrap();
    state.set_unit("sil", Unit::army("Austria")).unwrap();
    state.set_order("Germany", Order::support_hold("ber", "mun")).unwrap();
    state.set_order("Austria", Order::move_to("sil", "ber")).unwrap();
    state.set_order("Austria", Order::move_to("boh", "mun")).unwrap();
    state.advance().unwrap();

    assert_eq!(token(&state, "ber"), "ErrSupportBroken:sil");
    assert_eq!(token(&state, "sil"), "ErrBounce:ber");
    assert_eq!(token(&state, "boh"), "ErrBounce:mun");
    assert!(state.dislodgeds().is_empty());
}

#[test]
fn supported_attack_records_its_dislodger() {
    let variant = classical::variant();
    let mut state = spring(&variant);
    state.set_unit("par", Unit::army("France")).unwrap();
    state.set_supply_center("par", "France").unwrap();
    state.set_unit("bur", Unit::army("Germany")).unwrap();
    state.set_unit("pic", Unit::army("Germany")).unwrap();
    state.set_order("Germany", Order::move_to("bur", "par")).unwrap();
    state.set_order("Germany", Order::support_move("pic", "bur", "par")).unwrap();
    state.advance().unwrap();

    assert_eq!(token(&state, "bur"), "OK");
    assert_eq!(state.unit(&p("par")).map(|(_, u)| u.nation.as_str()), Some("Germany"));
    assert_eq!(state.dislodged(&p("par")).map(|(_, u)| u.nation.as_str()), Some("France"));
    assert_eq!(state.dislodgers().get(&p("bur")), Some(&p("par")));
    assert_eq!(state.dump().dislodgers.get(&p("bur")), Some(&p("par")));

    // The dislodged army may not retreat to where the attack came from, so
    // it is destroyed.
    state.set_order("France", Order::move_to("par", "bur")).unwrap();
    state.advance().unwrap();
    assert_eq!(token(&state, "par"), "ErrForcedDisband");
    assert!(state.dislodgeds().is_empty());
    assert!(state.dislodgers().is_empty());
    assert!(state.force_disbands().contains(&p("par")));
    // Spring capture does not happen.
    assert_eq!(state.supply_center(&p("par")).map(Nation::as_str), Some("France"));
}

/// England convoys A wal to bre; France dislodges the fleet in eng.
fn broken_chain() -> State {
    let variant = classical::variant();
    let mut state = spring(&variant);
    state.set_unit("wal", Unit::army("England")).unwrap();
    for at in ["eng", "iri", "mao"] {
        state.set_unit(at, Unit::fleet("England")).unwrap();
    }
    state.set_unit("bel", Unit::fleet("France")).unwrap();
    state.set_unit("pic", Unit::army("France")).unwrap();
    state.set_order("England", Order::move_to("wal", "bre")).unwrap();
    state.set_order("England", Order::convoy("eng", "wal", "bre")).unwrap();
    state.set_order("France", Order::move_to("bel", "eng")).unwrap();
    state.set_order("France", Order::support_move("pic", "bel", "eng")).unwrap();
    state
}

#[test]
fn dislodged_convoy_breaks_the_chain() {
    let mut state = broken_chain();
    state.advance().unwrap();
    assert_eq!(token(&state, "bel"), "OK");
    assert_eq!(token(&state, "eng"), "ErrConvoyDislodged:bel");
    assert_eq!(token(&state, "wal"), "ErrMissingConvoyPath");
    assert!(state.unit(&p("wal")).is_some());
    assert!(state.unit(&p("bre")).is_none());
}

#[test]
fn ordered_alternate_chain_still_delivers() {
    let mut state = broken_chain();
    state.set_order("England", Order::convoy("iri", "wal", "bre")).unwrap();
    state.set_order("England", Order::convoy("mao", "wal", "bre")).unwrap();
    state.advance().unwrap();
    assert_eq!(token(&state, "wal"), "OK");
    assert_eq!(state.unit(&p("bre")).map(|(_, u)| u.nation.as_str()), Some("England"));
    // Convoyed attackers are not recorded as dislodgers.
    assert!(state.dislodgers().get(&p("wal")).is_none());
}

// ---------------------------------------------------------------------------
// Graph and adjustment
// ---------------------------------------------------------------------------

#[test]
fn path_is_filtered_exactly() {
    let g = Graph::builder()
        .province("a")
        .flag(Flags::LAND)
        .connect_both("b", Flags::LAND)
        .province("b")
        .flag(Flags::LAND)
        .connect_both("c", Flags::LAND)
        .province("c")
        .flag(Flags::LAND)
        .build();
    assert_eq!(g.path(&p("a"), &p("a"), |_| false), Some(vec![]));
    assert_eq!(g.path(&p("a"), &p("c"), |_| true), Some(vec![p("b"), p("c")]));
    assert_eq!(g.path(&p("a"), &p("c"), |s| s.province != &p("b")), None);
    assert_eq!(g.path(&p("a"), &p("zz"), |_| true), None);
}

#[test]
fn civil_disorder_removes_the_surplus_furthest_first() {
    let variant = classical::variant();
    let mut state = variant.blank(Phase::new(1901, Season::Fall, PhaseType::Adjustment));
    state.set_supply_center("ber", "Germany").unwrap();
    for at in ["ber", "pru", "war"] {
        state.set_unit(at, Unit::army("Germany")).unwrap();
    }
    assert_eq!(state.adjustment_balance(&Nation::new("Germany")), -2);
    state.advance().unwrap();

    let left: Vec<&Province> = state.units().keys().collect();
    assert_eq!(left, vec![&p("ber")]);
    let forced: BTreeSet<Province> = [p("pru"), p("war")].into();
    assert_eq!(state.force_disbands(), &forced);
    assert_eq!(state.phase(), Phase::new(1902, Season::Spring, PhaseType::Movement));
}
