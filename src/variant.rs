//! The variant contract.
//!
//! A `Variant` bundles everything the engine needs to host one kind of
//! game: the shared map graph, rule switches, the nations and unit types in
//! play, an order parser, a starting-state factory and the victory and
//! dominance hooks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::board::{
    Graph, Nation, Order, Phase, PhaseType, Province, Rules, Season, State, StateError, UnitType,
};
use crate::protocol::{OrderParser, ParseError, Snapshot, Submission};

/// Predicate returning the nation that has won outright, if any.
pub type SoloWinner = Arc<dyn Fn(&State) -> Option<Nation> + Send + Sync>;

/// Builds the opening state of a variant.
pub type StartFn = fn(&Variant) -> Result<State, StateError>;

/// Overrides the computed controller of a non-center province.
///
/// The rule holds when every listed center is owned as stated (`None`
/// meaning unowned). Among matching rules for one province the highest
/// priority wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceRule {
    pub priority: i32,
    pub nation: Nation,
    pub dependencies: BTreeMap<Province, Option<Nation>>,
}

impl DominanceRule {
    fn holds(&self, state: &State) -> bool {
        self.dependencies
            .iter()
            .all(|(p, owner)| state.supply_center(p) == owner.as_ref())
    }
}

/// Solo winner by supply-center count: the single nation owning the most
/// centers wins once it owns at least `solo` of them. A tie for the lead
/// never wins.
pub fn sc_count_winner(solo: usize) -> SoloWinner {
    Arc::new(move |state: &State| {
        let mut counts: BTreeMap<&Nation, usize> = BTreeMap::new();
        for nation in state.supply_centers().values() {
            *counts.entry(nation).or_default() += 1;
        }
        let best = counts.values().copied().max()?;
        let mut leaders = counts.iter().filter(|(_, n)| **n == best);
        let (leader, _) = leaders.next()?;
        if leaders.next().is_some() || best < solo {
            return None;
        }
        Some((*leader).clone())
    })
}

#[derive(Clone)]
pub struct Variant {
    pub name: &'static str,
    pub nations: Vec<Nation>,
    pub unit_types: Vec<UnitType>,
    pub rules: Rules,
    pub solo_sc_count: usize,
    pub extra_dominance_rules: Vec<(Province, DominanceRule)>,
    pub parser: OrderParser,
    graph: Arc<Graph>,
    start: StartFn,
    solo_winner: SoloWinner,
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("nations", &self.nations)
            .field("unit_types", &self.unit_types)
            .field("rules", &self.rules)
            .field("solo_sc_count", &self.solo_sc_count)
            .finish_non_exhaustive()
    }
}

impl Variant {
    /// A variant over `graph` whose solo condition is `sc_count_winner(solo_sc_count)`.
    pub fn new(
        name: &'static str,
        graph: Graph,
        rules: Rules,
        unit_types: Vec<UnitType>,
        solo_sc_count: usize,
        start: StartFn,
    ) -> Self {
        let nations = graph.nations();
        Variant {
            name,
            nations,
            unit_types,
            rules,
            solo_sc_count,
            extra_dominance_rules: Vec::new(),
            parser: OrderParser::default(),
            graph: Arc::new(graph),
            start,
            solo_winner: sc_count_winner(solo_sc_count),
        }
    }

    pub fn with_parser(mut self, parser: OrderParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_solo_winner(mut self, solo_winner: SoloWinner) -> Self {
        self.solo_winner = solo_winner;
        self
    }

    pub fn with_dominance_rule(mut self, province: &str, rule: DominanceRule) -> Self {
        self.extra_dominance_rules.push((Province::new(province), rule));
        self
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// The first movement phase of the calendar in `year`.
    pub fn phase(&self, year: i32) -> Phase {
        let season = self.rules.seasons.first().copied().unwrap_or(Season::Spring);
        Phase::new(year, season, PhaseType::Movement)
    }

    /// An empty board at `phase`.
    pub fn blank(&self, phase: Phase) -> State {
        State::new(Arc::clone(&self.graph), self.rules.clone(), phase)
    }

    /// The opening position.
    pub fn start(&self) -> Result<State, StateError> {
        (self.start)(self)
    }

    /// Rebuilds a state of this variant from a snapshot.
    pub fn load(&self, snapshot: &Snapshot) -> Result<State, StateError> {
        State::load(Arc::clone(&self.graph), self.rules.clone(), snapshot)
    }

    pub fn solo_winner(&self, state: &State) -> Option<Nation> {
        (self.solo_winner)(state)
    }

    pub fn parse_orders(&self, submission: &Submission) -> Result<BTreeMap<Nation, Vec<Order>>, ParseError> {
        self.parser.parse_submission(&self.graph, submission)
    }

    /// The nation controlling each non-center province.
    ///
    /// An extra dominance rule decides where one matches; otherwise a
    /// province is controlled by the single nation owning every adjacent
    /// supply center. Provinces with no controller are left out.
    pub fn dominance(&self, state: &State) -> BTreeMap<Province, Nation> {
        let graph = &self.graph;
        let mut result = BTreeMap::new();
        for p in graph.provinces().into_iter().filter(Province::is_super) {
            if graph.supply_center(&p).is_some() {
                continue;
            }
            if let Some(nation) = self.extra_dominance(state, &p) {
                result.insert(p, nation);
                continue;
            }
            let adjacent: BTreeSet<Province> = graph
                .coasts(&p)
                .iter()
                .flat_map(|c| graph.edges(c).map(|(dst, _)| dst.super_province()))
                .filter(|n| graph.supply_center(n).is_some())
                .collect();
            let mut owners = adjacent.iter().map(|c| state.supply_center(c));
            let Some(Some(first)) = owners.next() else {
                continue;
            };
            if owners.all(|o| o == Some(first)) {
                result.insert(p, first.clone());
            }
        }
        result
    }

    fn extra_dominance(&self, state: &State, p: &Province) -> Option<Nation> {
        self.extra_dominance_rules
            .iter()
            .filter(|(at, rule)| at == p && rule.holds(state))
            .max_by_key(|(_, rule)| rule.priority)
            .map(|(_, rule)| rule.nation.clone())
    }
}
