//! Unit types and ownership.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::province::{Flags, Nation};

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    Army,
    Fleet,
}

impl UnitType {
    /// Single-letter abbreviation used in order text.
    pub const fn short(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
        }
    }

    /// The flag a province or edge must carry for this unit to use it.
    pub const fn terrain(self) -> Flags {
        match self {
            UnitType::Army => Flags::LAND,
            UnitType::Fleet => Flags::SEA,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Army => f.write_str("Army"),
            UnitType::Fleet => f.write_str("Fleet"),
        }
    }
}

/// Error for unrecognized unit type text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit type: {0}")]
pub struct UnknownUnitType(pub String);

impl FromStr for UnitType {
    type Err = UnknownUnitType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "army" => Ok(UnitType::Army),
            "f" | "fleet" => Ok(UnitType::Fleet),
            _ => Err(UnknownUnitType(s.to_string())),
        }
    }
}

/// A unit: its type and owning nation. Position is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub nation: Nation,
}

impl Unit {
    pub fn new(unit_type: UnitType, nation: impl Into<Nation>) -> Self {
        Unit {
            unit_type,
            nation: nation.into(),
        }
    }

    pub fn army(nation: &str) -> Self {
        Unit::new(UnitType::Army, nation)
    }

    pub fn fleet(nation: &str) -> Self {
        Unit::new(UnitType::Fleet, nation)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.nation, self.unit_type)
    }
}
