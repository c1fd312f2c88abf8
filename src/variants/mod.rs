//! Built-in variants and the registry that finds them by name.

pub mod classical;
pub mod pure;

use crate::variant::Variant;

/// Names of every built-in variant.
pub const NAMES: [&str; 2] = [classical::NAME, pure::NAME];

/// Looks up a built-in variant by name, ignoring case.
pub fn get(name: &str) -> Option<Variant> {
    if name.eq_ignore_ascii_case(classical::NAME) {
        Some(classical::variant())
    } else if name.eq_ignore_ascii_case(pure::NAME) {
        Some(pure::variant())
    } else {
        None
    }
}
