//! Order resolution.
//!
//! Validates submitted orders, then resolves the survivors simultaneously
//! with the Kruijswijk guess-and-check algorithm and applies the outcome.

pub mod build;
pub mod convoy;
pub mod kruijswijk;
pub mod phase;
pub mod retreat;
pub mod validate;

use std::collections::BTreeMap;

use crate::board::{Order, Province, State};

pub use kruijswijk::{AdjudicationError, Resolver};
pub use phase::{advance, post_process};

/// Orders in force for one adjudication, keyed by super-province.
pub type OrderMap = BTreeMap<Province, Order>;

/// What the rule helpers can ask about the position being adjudicated.
///
/// Validation and option listing use [`Lookahead`], which never resolves
/// anything; adjudication uses the [`Resolver`], which answers `resolve` by
/// recursively adjudicating the order at that province.
pub trait Judge<'a> {
    fn state(&self) -> &'a State;

    fn orders(&self) -> &'a OrderMap;

    fn order(&self, p: &Province) -> Option<&'a Order> {
        self.orders().get(p.split().0)
    }

    /// True if the order at `p` succeeds.
    fn resolve(&mut self, p: &Province) -> bool;
}

/// A judge for questions asked before adjudication starts.
pub struct Lookahead<'a> {
    state: &'a State,
    orders: &'a OrderMap,
}

impl<'a> Lookahead<'a> {
    pub fn new(state: &'a State, orders: &'a OrderMap) -> Self {
        Lookahead { state, orders }
    }
}

impl<'a> Judge<'a> for Lookahead<'a> {
    fn state(&self) -> &'a State {
        self.state
    }

    fn orders(&self) -> &'a OrderMap {
        self.orders
    }

    fn resolve(&mut self, _p: &Province) -> bool {
        true
    }
}

/// The submitted orders of a state without their nations.
pub fn submitted_orders(state: &State) -> OrderMap {
    state
        .orders()
        .iter()
        .map(|(p, (_, o))| (p.clone(), o.clone()))
        .collect()
}
