//! Board representation and game-state types.
//!
//! Contains the map graph, provinces and nations, units, orders, phases,
//! rule switches, and the mutable game state.

pub mod graph;
pub mod order;
pub mod phase;
pub mod province;
pub mod rules;
pub mod state;
pub mod unit;

pub use graph::{Graph, GraphBuilder, Step, Trace};
pub use order::{resolution_token, Order, OrderError, OrderKind, Resolution};
pub use phase::{Phase, PhaseType, Season};
pub use province::{CenterOwner, Flags, Nation, Province};
pub use rules::{BuildRule, CaptureRule, Rules};
pub use state::{State, StateError};
pub use unit::{Unit, UnitType, UnknownUnitType};
