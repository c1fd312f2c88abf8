//! Authoritative game state.
//!
//! A `State` owns everything that changes during a game: unit placement,
//! dislodged units, supply-center ownership, submitted orders, the
//! bounce/dislodger bookkeeping that constrains retreats, and the outcome of
//! the last adjudication. The map itself is shared read-only through an `Arc`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::graph::Graph;
use super::order::{Order, Resolution};
use super::phase::{Phase, PhaseType};
use super::province::{Nation, Province};
use super::rules::Rules;
use super::unit::Unit;
use crate::protocol::snapshot::Snapshot;
use crate::resolve::AdjudicationError;

/// Structural errors raised while loading or mutating a state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("unknown province: {0}")]
    UnknownProvince(Province),
    #[error("{unit} cannot stand in {province}")]
    IllegalPlacement { province: Province, unit: Unit },
    #[error("{0} is already occupied")]
    Occupied(Province),
    #[error("{0} already holds a dislodged unit")]
    AlreadyDislodged(Province),
    #[error("{0} is not a supply center")]
    NotSupplyCenter(Province),
    #[error("{nation} cannot order the unit in {province}")]
    ForeignOrder { nation: Nation, province: Province },
    #[error("{0} already has an order")]
    DuplicateOrder(Province),
    #[error("no unit in {0}")]
    MissingUnit(Province),
    #[error("retreat bookkeeping in a {0} phase")]
    RetreatDataOutOfPhase(PhaseType),
}

#[derive(Debug, Clone)]
pub struct State {
    graph: Arc<Graph>,
    rules: Rules,
    phase: Phase,
    units: BTreeMap<Province, Unit>,
    dislodgeds: BTreeMap<Province, Unit>,
    supply_centers: BTreeMap<Province, Nation>,
    /// Keyed by the super-province of the ordered unit.
    orders: BTreeMap<Province, (Nation, Order)>,
    /// Attacker origin -> province it dislodged a unit from.
    dislodgers: BTreeMap<Province, Province>,
    /// Destination -> origins of moves that stood off there.
    bounces: BTreeMap<Province, BTreeSet<Province>>,
    resolutions: BTreeMap<Province, Resolution>,
    force_disbands: BTreeSet<Province>,
}

impl State {
    /// A blank state: no units, no owned centers, no orders.
    pub fn new(graph: Arc<Graph>, rules: Rules, phase: Phase) -> Self {
        State {
            graph,
            rules,
            phase,
            units: BTreeMap::new(),
            dislodgeds: BTreeMap::new(),
            supply_centers: BTreeMap::new(),
            orders: BTreeMap::new(),
            dislodgers: BTreeMap::new(),
            bounces: BTreeMap::new(),
            resolutions: BTreeMap::new(),
            force_disbands: BTreeSet::new(),
        }
    }

    /// Rebuilds a state from a snapshot, checking placement invariants.
    ///
    /// Dislodged units, dislodgers and bounces only exist during a retreat
    /// phase. Resolutions and forced disbands are reports of the previous
    /// phase and are not restored.
    pub fn load(graph: Arc<Graph>, rules: Rules, snapshot: &Snapshot) -> Result<Self, StateError> {
        let phase = Phase::new(snapshot.year, snapshot.season, snapshot.phase_type);
        let retreat_data = !snapshot.dislodgeds.is_empty()
            || !snapshot.dislodgers.is_empty()
            || !snapshot.bounces.is_empty();
        if retreat_data && phase.kind != PhaseType::Retreat {
            return Err(StateError::RetreatDataOutOfPhase(phase.kind));
        }
        let mut state = State::new(graph, rules, phase);
        for (p, unit) in &snapshot.units {
            state.set_unit(p.clone(), unit.clone())?;
        }
        for (p, unit) in &snapshot.dislodgeds {
            state.set_dislodged(p.clone(), unit.clone())?;
        }
        for (p, nation) in &snapshot.supply_centers {
            state.set_supply_center(p.clone(), nation.clone())?;
        }
        for (attacker, victim) in &snapshot.dislodgers {
            state.check_known(attacker)?;
            state.check_known(victim)?;
            state.set_dislodger(attacker, victim);
        }
        for (dst, srcs) in &snapshot.bounces {
            state.check_known(dst)?;
            for src in srcs {
                state.check_known(src)?;
                state.add_bounce(src, dst);
            }
        }
        Ok(state)
    }

    /// Snapshot of everything needed to serialize this phase.
    pub fn dump(&self) -> Snapshot {
        Snapshot::from_state(self)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn check_known(&self, p: &Province) -> Result<(), StateError> {
        if self.graph.has(p) {
            Ok(())
        } else {
            Err(StateError::UnknownProvince(p.clone()))
        }
    }

    fn check_placement(&self, p: &Province, unit: &Unit) -> Result<(), StateError> {
        self.check_known(p)?;
        if !self.graph.flags(p).contains(unit.unit_type.terrain()) {
            return Err(StateError::IllegalPlacement {
                province: p.clone(),
                unit: unit.clone(),
            });
        }
        Ok(())
    }

    // Lookups that search every coast of a province.

    fn find<'s, T>(&self, map: &'s BTreeMap<Province, T>, p: &Province) -> Option<(&'s Province, &'s T)> {
        if let Some(found) = map.get_key_value(p) {
            return Some(found);
        }
        let sup = p.super_province();
        if let Some(found) = map.get_key_value(&sup) {
            return Some(found);
        }
        self.graph
            .coasts(&sup)
            .iter()
            .find_map(|c| map.get_key_value(c))
    }

    /// The unit standing in any coast of `p`, with its exact position.
    pub fn unit(&self, p: &Province) -> Option<(&Province, &Unit)> {
        self.find(&self.units, p)
    }

    /// The dislodged unit in any coast of `p`, with its exact position.
    pub fn dislodged(&self, p: &Province) -> Option<(&Province, &Unit)> {
        self.find(&self.dislodgeds, p)
    }

    /// Current owner of the supply center at `p`.
    pub fn supply_center(&self, p: &Province) -> Option<&Nation> {
        self.supply_centers.get(p.split().0)
    }

    /// The order submitted for the unit at `p`, with the submitting nation.
    pub fn order(&self, p: &Province) -> Option<&(Nation, Order)> {
        self.orders.get(p.split().0)
    }

    pub fn units(&self) -> &BTreeMap<Province, Unit> {
        &self.units
    }

    pub fn dislodgeds(&self) -> &BTreeMap<Province, Unit> {
        &self.dislodgeds
    }

    pub fn supply_centers(&self) -> &BTreeMap<Province, Nation> {
        &self.supply_centers
    }

    pub fn orders(&self) -> &BTreeMap<Province, (Nation, Order)> {
        &self.orders
    }

    pub fn dislodgers(&self) -> &BTreeMap<Province, Province> {
        &self.dislodgers
    }

    pub fn bounces(&self) -> &BTreeMap<Province, BTreeSet<Province>> {
        &self.bounces
    }

    /// Outcome of every order adjudicated in the last `advance`, by super-province.
    pub fn resolutions(&self) -> &BTreeMap<Province, Resolution> {
        &self.resolutions
    }

    pub fn force_disbands(&self) -> &BTreeSet<Province> {
        &self.force_disbands
    }

    /// Positions of a nation's units, sorted.
    pub fn units_of(&self, nation: &Nation) -> Vec<Province> {
        self.units
            .iter()
            .filter(|(_, u)| &u.nation == nation)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Supply centers currently owned by a nation, sorted.
    pub fn supply_centers_of(&self, nation: &Nation) -> Vec<Province> {
        self.supply_centers
            .iter()
            .filter(|(_, n)| *n == nation)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// True if a unit dislodged from `src` may not retreat to `dst`: either
    /// `dst` saw a standoff this turn, or the attacker came from `dst`.
    pub fn bounce(&self, src: &Province, dst: &Province) -> bool {
        let dst_sup = dst.super_province();
        let victim = self.dislodgers.get(&dst_sup);
        if victim == Some(&src.super_province()) {
            return true;
        }
        match self.bounces.get(&dst_sup) {
            // A "standoff" made only by the unit the mover from `dst` dislodged doesn't count.
            Some(sources) => !victim.is_some_and(|v| sources.len() == 1 && sources.contains(v)),
            None => false,
        }
    }

    // Mutators.

    pub fn set_unit(&mut self, p: impl Into<Province>, unit: Unit) -> Result<(), StateError> {
        let p = p.into();
        self.check_placement(&p, &unit)?;
        if self.unit(&p).is_some() {
            return Err(StateError::Occupied(p));
        }
        self.units.insert(p, unit);
        Ok(())
    }

    pub fn set_units<P: Into<Province>>(
        &mut self,
        units: impl IntoIterator<Item = (P, Unit)>,
    ) -> Result<(), StateError> {
        for (p, u) in units {
            self.set_unit(p, u)?;
        }
        Ok(())
    }

    pub fn set_dislodged(&mut self, p: impl Into<Province>, unit: Unit) -> Result<(), StateError> {
        let p = p.into();
        self.check_placement(&p, &unit)?;
        if self.dislodged(&p).is_some() {
            return Err(StateError::AlreadyDislodged(p));
        }
        self.dislodgeds.insert(p, unit);
        Ok(())
    }

    pub fn set_supply_center(&mut self, p: impl Into<Province>, nation: impl Into<Nation>) -> Result<(), StateError> {
        let p = p.into();
        self.check_known(&p)?;
        if self.graph.supply_center(&p).is_none() {
            return Err(StateError::NotSupplyCenter(p));
        }
        self.supply_centers.insert(p.super_province(), nation.into());
        Ok(())
    }

    pub fn set_supply_centers<P: Into<Province>, N: Into<Nation>>(
        &mut self,
        centers: impl IntoIterator<Item = (P, N)>,
    ) -> Result<(), StateError> {
        for (p, n) in centers {
            self.set_supply_center(p, n)?;
        }
        Ok(())
    }

    pub fn remove_unit(&mut self, p: &Province) -> Option<Unit> {
        let key = self.unit(p)?.0.clone();
        self.units.remove(&key)
    }

    pub fn remove_dislodged(&mut self, p: &Province) -> Option<Unit> {
        let key = self.dislodged(p)?.0.clone();
        self.dislodgeds.remove(&key)
    }

    pub fn remove_supply_center(&mut self, p: &Province) -> Option<Nation> {
        self.supply_centers.remove(p.split().0)
    }

    /// Submits an order on behalf of `nation`.
    ///
    /// Rejects orders for another nation's unit and a second order for the
    /// same unit. Rule legality is checked later, during `advance`.
    pub fn set_order(&mut self, nation: impl Into<Nation>, order: Order) -> Result<(), StateError> {
        let nation = nation.into();
        let at = order.source().clone();
        let key = at.super_province();
        if self.orders.contains_key(&key) {
            return Err(StateError::DuplicateOrder(key));
        }
        let owner = match (self.phase.kind, &order) {
            (PhaseType::Movement, _) => self.unit(&at).map(|(_, u)| &u.nation),
            (PhaseType::Retreat, _) => self.dislodged(&at).map(|(_, u)| &u.nation),
            (PhaseType::Adjustment, Order::Build { .. } | Order::BuildAnywhere { .. }) => {
                self.supply_center(&at)
            }
            (PhaseType::Adjustment, _) => self.unit(&at).map(|(_, u)| &u.nation),
        };
        if owner.is_some_and(|o| *o != nation) {
            return Err(StateError::ForeignOrder {
                nation,
                province: at,
            });
        }
        self.orders.insert(key, (nation, order));
        Ok(())
    }

    pub fn set_orders(
        &mut self,
        nation: &Nation,
        orders: impl IntoIterator<Item = Order>,
    ) -> Result<(), StateError> {
        for order in orders {
            self.set_order(nation.clone(), order)?;
        }
        Ok(())
    }

    pub fn clear_orders(&mut self) {
        self.orders.clear();
    }

    /// Adjudicates the current phase and moves to the next one.
    ///
    /// All-or-nothing: on error the state is left exactly as it was.
    pub fn advance(&mut self) -> Result<(), AdjudicationError> {
        let mut next = self.clone();
        crate::resolve::phase::advance(&mut next)?;
        *self = next;
        Ok(())
    }

    /// Supply centers owned minus units owned.
    pub fn adjustment_balance(&self, nation: &Nation) -> i32 {
        let centers = self.supply_centers.values().filter(|n| *n == nation).count();
        let units = self.units.values().filter(|u| &u.nation == nation).count();
        centers as i32 - units as i32
    }

    /// Builds a nation may actually make (capped by free eligible centers),
    /// or the negative number of disbands it owes.
    pub fn build_balance(&self, nation: &Nation) -> i32 {
        crate::resolve::build::allowed_build_balance(self, nation)
    }

    /// Every legal order `nation` could submit this phase.
    pub fn options(&self, nation: &Nation) -> Vec<Order> {
        crate::movegen::options(self, nation)
    }

    /// Problems with the orders `nation` has submitted so far.
    pub fn corroborate(&self, nation: &Nation) -> Vec<crate::movegen::Inconsistency> {
        crate::movegen::corroborate(self, nation)
    }

    /// Adjustment status lines (`MayBuild:N` and friends) for `nation`.
    pub fn messages(&self, nation: &Nation) -> Vec<String> {
        crate::movegen::messages(self, nation)
    }

    // Bookkeeping used by adjudication.

    pub(crate) fn take_orders(&mut self) -> BTreeMap<Province, (Nation, Order)> {
        std::mem::take(&mut self.orders)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_resolutions(&mut self, resolutions: BTreeMap<Province, Resolution>) {
        self.resolutions = resolutions;
    }

    pub(crate) fn set_dislodger(&mut self, attacker: &Province, victim: &Province) {
        self.dislodgers
            .insert(attacker.super_province(), victim.super_province());
    }

    pub(crate) fn add_bounce(&mut self, src: &Province, dst: &Province) {
        self.bounces
            .entry(dst.super_province())
            .or_default()
            .insert(src.super_province());
    }

    pub(crate) fn clear_bounces(&mut self) {
        self.bounces.clear();
    }

    pub(crate) fn clear_dislodgers(&mut self) {
        self.dislodgers.clear();
    }

    pub(crate) fn clear_force_disbands(&mut self) {
        self.force_disbands.clear();
    }

    /// Records a unit destroyed without an order of its own.
    pub(crate) fn force_disband(&mut self, p: &Province) {
        self.force_disbands.insert(p.clone());
        self.resolutions
            .insert(p.super_province(), Err(super::order::OrderError::ForcedDisband));
    }
}
