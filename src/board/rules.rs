//! Per-variant rule configuration.

use serde::{Deserialize, Serialize};

use super::phase::{Phase, Season};

/// Where a nation may place new units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildRule {
    /// Only in its own, owned, home centers.
    #[default]
    HomeCenters,
    /// In any owned center that is some nation's home center.
    AnyHomeCenter,
    /// In any owned center.
    Anywhere,
}

/// When occupying a center transfers its ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureRule {
    /// After the retreat phase of the last season in the year.
    #[default]
    FinalRetreat,
    /// After every retreat phase.
    EveryRetreat,
}

/// Rule switches a variant may override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub seasons: Vec<Season>,
    pub build_rule: BuildRule,
    pub capture: CaptureRule,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            seasons: vec![Season::Spring, Season::Fall],
            build_rule: BuildRule::HomeCenters,
            capture: CaptureRule::FinalRetreat,
        }
    }
}

impl Rules {
    pub fn next_phase(&self, phase: &Phase) -> Phase {
        phase.next_in(&self.seasons)
    }

    /// True if supply centers change hands after the given (retreat) phase.
    pub fn captures_after(&self, phase: &Phase) -> bool {
        match self.capture {
            CaptureRule::EveryRetreat => true,
            CaptureRule::FinalRetreat => self.seasons.last() == Some(&phase.season),
        }
    }
}
