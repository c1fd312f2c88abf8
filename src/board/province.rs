//! Province names, nations and map capability flags.
//!
//! A province name is either a super-province (`"spa"`) or a coast of one
//! (`"spa/nc"`). Most adjudication keys on the super-province; fleets on split
//! coasts carry the full name.

use std::borrow::Borrow;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Separator between a super-province and its coast.
pub const COAST_SEPARATOR: char = '/';

/// A province or province-coast name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Province(String);

impl Province {
    pub fn new(name: impl Into<String>) -> Self {
        Province(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits into (super-province, coast). The coast is empty for a super-province.
    pub fn split(&self) -> (&str, &str) {
        match self.0.split_once(COAST_SEPARATOR) {
            Some((sup, coast)) => (sup, coast),
            None => (&self.0, ""),
        }
    }

    /// Joins a super-province name and a coast.
    pub fn join(sup: &str, coast: &str) -> Self {
        if coast.is_empty() {
            Province::new(sup)
        } else {
            Province(format!("{sup}{COAST_SEPARATOR}{coast}"))
        }
    }

    /// Returns the super-province, dropping any coast.
    pub fn super_province(&self) -> Province {
        Province::new(self.split().0)
    }

    pub fn coast(&self) -> &str {
        self.split().1
    }

    pub fn is_super(&self) -> bool {
        !self.0.contains(COAST_SEPARATOR)
    }

    /// True if both names refer to the same super-province.
    pub fn same_super(&self, other: &Province) -> bool {
        self.split().0 == other.split().0
    }

    /// True if `other` is this province, or this is a super-province and
    /// `other` is one of its coasts.
    pub fn contains(&self, other: &Province) -> bool {
        self == other || (self.is_super() && self.as_str() == other.split().0)
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Province {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Province {
    fn from(s: &str) -> Self {
        Province::new(s)
    }
}

/// A participating nation (power).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nation(String);

impl Nation {
    pub fn new(name: impl Into<String>) -> Self {
        Nation(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Nation {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Nation {
    fn from(s: &str) -> Self {
        Nation::new(s)
    }
}

bitflags! {
    /// Capability flags for graph nodes and edges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Flags: u8 {
        /// Armies may stand on / traverse this.
        const LAND = 1 << 0;
        /// Fleets may stand on / traverse this.
        const SEA = 1 << 1;
        /// A land node that still relays convoys (archipelagos).
        const CONVOYABLE = 1 << 2;
        /// Shorthand for a single-coast land province.
        const COAST = Self::LAND.bits() | Self::SEA.bits();
    }
}

impl Flags {
    pub const fn land(self) -> bool {
        self.contains(Self::LAND)
    }

    pub const fn sea(self) -> bool {
        self.contains(Self::SEA)
    }

    pub const fn convoyable(self) -> bool {
        self.contains(Self::CONVOYABLE)
    }
}

/// Owner of a supply center as authored in the map: a home nation or unclaimed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CenterOwner {
    Neutral,
    Home(Nation),
}

impl CenterOwner {
    /// The home nation, if any.
    pub fn nation(&self) -> Option<&Nation> {
        match self {
            CenterOwner::Neutral => None,
            CenterOwner::Home(n) => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_join() {
        let p = Province::new("spa/nc");
        assert_eq!(p.split(), ("spa", "nc"));
        assert_eq!(p.super_province(), Province::new("spa"));
        assert_eq!(p.coast(), "nc");
        assert!(!p.is_super());
        assert_eq!(Province::join("spa", "nc"), p);
        assert_eq!(Province::join("par", ""), Province::new("par"));
    }

    #[test]
    fn super_province_of_plain_name_is_itself() {
        let p = Province::new("par");
        assert_eq!(p.split(), ("par", ""));
        assert_eq!(p.super_province(), p);
        assert!(p.is_super());
    }

    #[test]
    fn contains_coasts_only_from_super() {
        let spa = Province::new("spa");
        let nc = Province::new("spa/nc");
        let sc = Province::new("spa/sc");
        assert!(spa.contains(&nc));
        assert!(spa.contains(&spa));
        assert!(!nc.contains(&spa));
        assert!(!nc.contains(&sc));
        assert!(nc.same_super(&sc));
    }

    #[test]
    fn flags_set_operations() {
        let f = Flags::LAND | Flags::SEA;
        assert_eq!(f, Flags::COAST);
        assert!(f.land() && f.sea());
        assert!(!f.convoyable());
        assert!(f.contains(Flags::SEA));
        assert!(!Flags::LAND.contains(Flags::COAST));
        assert!(Flags::empty().is_empty());
        assert_eq!(Flags::default(), Flags::empty());
    }

    #[test]
    fn province_serializes_as_plain_string() {
        let json = serde_json::to_string(&Province::new("stp/sc")).unwrap();
        assert_eq!(json, "\"stp/sc\"");
    }
}
