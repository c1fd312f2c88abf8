//! External boundary of the engine.
//!
//! Order text parsing for submissions and the serializable phase snapshot
//! exchanged between turns.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_order, tokenize, OrderParser, ParseError, Submission};
pub use snapshot::Snapshot;
