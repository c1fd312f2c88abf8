//! Kruijswijk guess-and-check resolution algorithm.
//!
//! Every order's outcome depends on the outcomes of others. `resolve` walks
//! those dependencies recursively; when it meets an order that is already
//! being resolved further up the stack it guesses that order fails, finishes
//! the computation, then retries with the opposite guess. If both guesses
//! are self-consistent the cycle is a genuine paradox and the backup rule
//! decides it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use crate::board::{
    Nation, Order, OrderError, PhaseType, Province, Resolution, State, StateError, UnitType,
};

use super::convoy::{any_convoy_path, must_convoy};
use super::validate::any_move_possible;
use super::{build, retreat, Judge, OrderMap};

/// Failures that abort a whole adjudication.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjudicationError {
    #[error("unresolvable circular dependency between {0:?}")]
    UnresolvedParadox(Vec<Province>),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Resolves the orders of one phase.
///
/// Create one per adjudication, call [`Resolver::resolve_all`], then take the
/// outcomes with [`Resolver::into_resolutions`].
pub struct Resolver<'a> {
    state: &'a State,
    orders: &'a OrderMap,
    resolutions: BTreeMap<Province, Resolution>,
    guesses: BTreeMap<Province, bool>,
    resolving: BTreeSet<Province>,
    deps: Vec<Province>,
    failure: Option<AdjudicationError>,
}

impl<'a> Judge<'a> for Resolver<'a> {
    fn state(&self) -> &'a State {
        self.state
    }

    fn orders(&self) -> &'a OrderMap {
        self.orders
    }

    fn resolve(&mut self, p: &Province) -> bool {
        self.resolve_key(&p.super_province())
    }
}

impl<'a> Resolver<'a> {
    /// `orders` must already be validated and keyed by super-province.
    pub fn new(state: &'a State, orders: &'a OrderMap) -> Self {
        Resolver {
            state,
            orders,
            resolutions: BTreeMap::new(),
            guesses: BTreeMap::new(),
            resolving: BTreeSet::new(),
            deps: Vec::new(),
            failure: None,
        }
    }

    /// Resolves every order.
    pub fn resolve_all(&mut self) -> Result<(), AdjudicationError> {
        let orders = self.orders;
        for key in orders.keys() {
            self.guesses.clear();
            self.resolving.clear();
            self.deps.clear();
            self.resolve_key(key);
            if let Some(err) = self.failure.take() {
                return Err(err);
            }
        }
        Ok(())
    }

    /// The settled outcome of the order at `p`, if resolution reached it.
    pub fn resolution(&self, p: &Province) -> Option<&Resolution> {
        self.resolutions.get(p.split().0)
    }

    pub fn into_resolutions(self) -> BTreeMap<Province, Resolution> {
        self.resolutions
    }

    fn resolve_key(&mut self, key: &Province) -> bool {
        if let Some(r) = self.resolutions.get(key) {
            return r.is_ok();
        }
        if let Some(&guess) = self.guesses.get(key) {
            return guess;
        }
        if self.failure.is_some() {
            return false;
        }
        if self.resolving.contains(key) {
            trace!(province = %key, "dependency cycle, guessing failure");
            self.guesses.insert(key.clone(), false);
            self.deps.push(key.clone());
            return false;
        }

        self.resolving.insert(key.clone());
        let n_guesses = self.guesses.len();
        let n_deps = self.deps.len();
        let first = self.adjudicate(key);
        self.resolving.remove(key);

        if self.guesses.contains_key(key) {
            self.guesses.insert(key.clone(), true);
            let second = self.adjudicate(key);
            self.guesses.remove(key);
            if first.is_ok() != second.is_ok() {
                // Everything pushed since `key` started belongs to its cycle.
                let deps = self.deps.split_off(n_deps);
                if let Err(err) = self.backup_rule(&deps) {
                    self.failure = Some(err);
                    return false;
                }
                return self.resolve_key(key);
            }
            if self.guesses.len() == n_guesses {
                // The cycle closed here; outer cycles keep their own entries.
                self.deps.truncate(n_deps);
            } else {
                self.deps.push(key.clone());
            }
        } else if self.guesses.len() != n_guesses {
            self.deps.push(key.clone());
        }

        let ok = first.is_ok();
        if self.guesses.is_empty() && self.failure.is_none() {
            trace!(province = %key, result = ?first, "resolved");
            self.resolutions.insert(key.clone(), first);
        }
        ok
    }

    /// Settles a cycle whose outcome depends on the guess made for it.
    ///
    /// A ring of moves all succeed; a cycle through convoys fails the convoys;
    /// anything else is reported. The rule must settle at least one order so
    /// that re-resolving makes progress.
    fn backup_rule(&mut self, deps: &[Province]) -> Result<(), AdjudicationError> {
        let all: &'a OrderMap = self.orders;
        let mut unique: Vec<Province> = deps.to_vec();
        unique.sort();
        unique.dedup();
        unique.retain(|p| !self.resolutions.contains_key(p));
        let orders: Vec<(&Province, &'a Order)> = unique
            .iter()
            .filter_map(|p| all.get(p).map(|o| (p, o)))
            .collect();

        if orders.is_empty() {
            return Err(AdjudicationError::UnresolvedParadox(unique));
        }

        if orders.iter().all(|(_, o)| o.is_move()) {
            warn!(provinces = ?unique, "circular movement, every move succeeds");
            for (p, _) in &orders {
                self.resolutions.insert((*p).clone(), Ok(()));
            }
            return Ok(());
        }

        let convoys: Vec<Province> = orders
            .iter()
            .filter(|(_, o)| matches!(o, Order::Convoy { .. }))
            .map(|(p, _)| (*p).clone())
            .collect();
        if !convoys.is_empty() {
            warn!(convoys = ?convoys, "convoy paradox, convoys fail");
            for p in convoys {
                self.resolutions.insert(p, Err(OrderError::ConvoyParadox));
            }
            return Ok(());
        }

        Err(AdjudicationError::UnresolvedParadox(unique))
    }

    fn adjudicate(&mut self, key: &Province) -> Resolution {
        let orders: &'a OrderMap = self.orders;
        let Some(order) = orders.get(key) else {
            return Ok(());
        };
        match (self.state.phase().kind, order) {
            (PhaseType::Movement, Order::Hold { .. }) => Ok(()),
            (PhaseType::Movement, Order::Move { from, to, .. }) => self.adjudicate_move(from, to),
            (PhaseType::Movement, Order::SupportHold { at, .. }) => self.adjudicate_support(at, None),
            (PhaseType::Movement, Order::SupportMove { at, to, .. }) => {
                self.adjudicate_support(at, Some(to))
            }
            (PhaseType::Movement, Order::Convoy { at, .. }) => self.adjudicate_convoy(at),
            (PhaseType::Retreat, Order::Move { from, to, .. }) => {
                retreat::adjudicate_retreat(self, from, to)
            }
            (PhaseType::Retreat, Order::Disband { .. }) => Ok(()),
            (PhaseType::Adjustment, Order::Build { at, .. } | Order::BuildAnywhere { at, .. }) => {
                build::adjudicate_build(self, at)
            }
            (PhaseType::Adjustment, Order::Disband { at }) => build::adjudicate_disband(self, at),
            _ => Err(OrderError::InvalidPhase),
        }
    }

    fn nation_at(&self, p: &Province) -> Option<&'a Nation> {
        let state: &'a State = self.state;
        state.unit(p).map(|(_, u)| &u.nation)
    }

    /// Successful supports for the move `src -> dst`, ignoring supporters of
    /// the `forbidden` nation.
    fn move_support(&mut self, src: &Province, dst: &Province, forbidden: Option<&Nation>) -> usize {
        let orders: &'a OrderMap = self.orders;
        let mut count = 0;
        for (p, order) in orders {
            let Order::SupportMove { at, from, to } = order else {
                continue;
            };
            if !from.same_super(src) || !to.same_super(dst) {
                continue;
            }
            if forbidden.is_some() && self.nation_at(at) == forbidden {
                continue;
            }
            if self.resolve_key(p) {
                count += 1;
            }
        }
        count
    }

    /// Successful supports for the unit holding in `prov`.
    fn hold_support(&mut self, prov: &Province) -> usize {
        let orders: &'a OrderMap = self.orders;
        let mut count = 0;
        for (p, order) in orders {
            let Order::SupportHold { at, target } = order else {
                continue;
            };
            if at.same_super(prov) || !target.same_super(prov) {
                continue;
            }
            if self.resolve_key(p) {
                count += 1;
            }
        }
        count
    }

    fn adjudicate_move(&mut self, from: &Province, to: &Province) -> Resolution {
        let Some(unit_nation) = self.nation_at(from) else {
            return Err(OrderError::MissingUnit);
        };
        let convoyed = must_convoy(self, from);
        if convoyed && any_convoy_path(self, from, to, true, None).is_none() {
            return Err(OrderError::MissingConvoyPath);
        }

        self.against_competition(from, to, None)?;

        let mut forbidden = None;
        let state: &'a State = self.state;
        if let Some((victim_at, victim)) = state.unit(to) {
            forbidden = Some(&victim.nation);
            let attack = self.move_support(from, to, forbidden) + 1;
            let same_nation = &victim.nation == unit_nation;
            match self.order(victim_at) {
                Some(Order::Move {
                    from: vfrom,
                    to: vto,
                    ..
                }) if vto.same_super(from) && !convoyed && !must_convoy(self, vfrom) => {
                    let defence = self.move_support(vfrom, vto, Some(unit_nation)) + 1;
                    if same_nation || defence >= attack {
                        return Err(OrderError::Bounce(victim_at.clone()));
                    }
                }
                Some(Order::Move { .. }) => {
                    if self.resolve_key(&victim_at.super_province()) {
                        forbidden = None;
                    } else if same_nation || 1 >= attack {
                        return Err(OrderError::Bounce(victim_at.clone()));
                    }
                }
                _ => {
                    if same_nation || self.hold_support(to) + 1 >= attack {
                        return Err(OrderError::Bounce(victim_at.clone()));
                    }
                }
            }
        }

        if forbidden.is_some() {
            self.against_competition(from, to, forbidden)?;
        }
        Ok(())
    }

    /// Fails the move `from -> to` if another move into the same province is
    /// at least as strong.
    fn against_competition(
        &mut self,
        from: &Province,
        to: &Province,
        forbidden: Option<&Nation>,
    ) -> Resolution {
        let attack = self.move_support(from, to, forbidden) + 1;
        let orders: &'a OrderMap = self.orders;
        for order in orders.values() {
            let Order::Move {
                from: cfrom,
                to: cto,
                ..
            } = order
            else {
                continue;
            };
            if cfrom.same_super(from) || !cto.same_super(to) {
                continue;
            }
            if self.move_support(cfrom, cto, None) + 1 < attack {
                continue;
            }
            if must_convoy(self, cfrom) {
                if any_convoy_path(self, cfrom, cto, true, None).is_some() {
                    return Err(OrderError::Bounce(cfrom.clone()));
                }
            } else if !self.lost_head_to_head(cfrom, cto) {
                return Err(OrderError::Bounce(cfrom.clone()));
            }
        }
        Ok(())
    }

    /// True if the mover from `cfrom` was dislodged by the unit it tried to
    /// swap places with, which leaves it no strength to prevent anything.
    fn lost_head_to_head(&mut self, cfrom: &Province, cto: &Province) -> bool {
        let state: &'a State = self.state;
        let Some((at, unit)) = state.unit(cto) else {
            return false;
        };
        let Some(Order::Move { from, to, .. }) = self.order(at) else {
            return false;
        };
        if !to.same_super(cfrom) || self.nation_at(cfrom) == Some(&unit.nation) {
            return false;
        }
        !must_convoy(self, from) && self.resolve_key(&from.super_province())
    }

    fn adjudicate_support(&mut self, at: &Province, supported_to: Option<&Province>) -> Resolution {
        let Some(nation) = self.nation_at(at) else {
            return Err(OrderError::MissingUnit);
        };
        let state: &'a State = self.state;
        let orders: &'a OrderMap = self.orders;

        for order in orders.values() {
            let Order::Move { from, to, .. } = order else {
                continue;
            };
            if !to.same_super(at) || supported_to.is_some_and(|t| t.same_super(from)) {
                continue;
            }
            let Some((_, attacker)) = state.unit(from) else {
                continue;
            };
            if &attacker.nation == nation {
                continue;
            }
            let lax = attacker.unit_type == UnitType::Army;
            if any_move_possible(self, attacker.unit_type, from, to, lax, true, true).is_ok() {
                debug!(supporter = %at, attacker = %from, "support cut");
                return Err(OrderError::SupportBroken(from.clone()));
            }
        }

        for (p, order) in orders {
            let Order::Move { from, to, .. } = order else {
                continue;
            };
            if !to.same_super(at) || self.nation_at(from) == Some(nation) {
                continue;
            }
            if self.resolve_key(p) {
                debug!(supporter = %at, attacker = %from, "supporter dislodged");
                return Err(OrderError::SupportBroken(from.clone()));
            }
        }
        Ok(())
    }

    fn adjudicate_convoy(&mut self, at: &Province) -> Resolution {
        let nation = self.nation_at(at);
        let orders: &'a OrderMap = self.orders;
        for (p, order) in orders {
            let Order::Move { from, to, .. } = order else {
                continue;
            };
            if !to.same_super(at) || self.nation_at(from) == nation {
                continue;
            }
            if self.resolve_key(p) {
                return Err(OrderError::ConvoyDislodged(from.clone()));
            }
        }
        Ok(())
    }
}
