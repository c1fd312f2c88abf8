//! dipjudge: a Diplomacy adjudication engine.
//!
//! Exposes the board representation, the resolver, legal-move generation,
//! the parsing and snapshot boundary, and the built-in variants, for use by
//! the binaries, integration tests and benches.

pub mod board;
pub mod logging;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod selfplay;
pub mod variant;
pub mod variants;
