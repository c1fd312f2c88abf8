//! Phase value: year, season and phase type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::Order;
use super::province::Province;

/// A season of the game year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        };
        f.write_str(s)
    }
}

/// The kind of orders a phase accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseType {
    Movement,
    Retreat,
    Adjustment,
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseType::Movement => "Movement",
            PhaseType::Retreat => "Retreat",
            PhaseType::Adjustment => "Adjustment",
        };
        f.write_str(s)
    }
}

/// An immutable point in the game calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phase {
    pub year: i32,
    pub season: Season,
    #[serde(rename = "type")]
    pub kind: PhaseType,
}

impl Phase {
    pub const fn new(year: i32, season: Season, kind: PhaseType) -> Self {
        Phase { year, season, kind }
    }

    /// The order a unit receives when its nation gave it none.
    ///
    /// Only movement phases have a default; an un-ordered dislodged unit is
    /// destroyed and an unused build is simply forfeited.
    pub fn default_order(&self, at: &Province) -> Option<Order> {
        match self.kind {
            PhaseType::Movement => Some(Order::Hold { at: at.clone() }),
            PhaseType::Retreat | PhaseType::Adjustment => None,
        }
    }

    /// The following phase for a calendar of `seasons` (first season opens the year).
    ///
    /// Movement is followed by its Retreat; a Retreat moves on to the next
    /// season's Movement, or to Adjustment after the last season; Adjustment
    /// opens the next year.
    pub fn next_in(&self, seasons: &[Season]) -> Phase {
        let first = seasons.first().copied().unwrap_or(Season::Spring);
        let last = seasons.last().copied().unwrap_or(Season::Fall);
        match self.kind {
            PhaseType::Movement => Phase::new(self.year, self.season, PhaseType::Retreat),
            PhaseType::Retreat => {
                let pos = seasons.iter().position(|s| *s == self.season);
                match pos.and_then(|i| seasons.get(i + 1)) {
                    Some(&season) if self.season != last => {
                        Phase::new(self.year, season, PhaseType::Movement)
                    }
                    _ => Phase::new(self.year, self.season, PhaseType::Adjustment),
                }
            }
            PhaseType::Adjustment => Phase::new(self.year + 1, first, PhaseType::Movement),
        }
    }

    /// The following phase in the classical Spring/Fall calendar.
    pub fn next(&self) -> Phase {
        self.next_in(&[Season::Spring, Season::Fall])
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.season, self.year, self.kind)
    }
}
