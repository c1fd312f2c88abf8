//! Serializable phase snapshot.
//!
//! The unit of state exchanged between turns: where everything stands,
//! who owns what, the retreat bookkeeping, and how each order of the
//! previous phase resolved.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::{resolution_token, Nation, Phase, PhaseType, Province, Season, State, Unit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub year: i32,
    pub season: Season,
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    #[serde(default)]
    pub units: BTreeMap<Province, Unit>,
    #[serde(default)]
    pub supply_centers: BTreeMap<Province, Nation>,
    #[serde(default)]
    pub dislodgeds: BTreeMap<Province, Unit>,
    /// Attacker origin -> province it dislodged a unit from.
    #[serde(default)]
    pub dislodgers: BTreeMap<Province, Province>,
    /// Destination -> origins of moves that stood off there.
    #[serde(default)]
    pub bounces: BTreeMap<Province, BTreeSet<Province>>,
    /// `"OK"` or the failure token, per ordered province.
    #[serde(default)]
    pub resolutions: BTreeMap<Province, String>,
    #[serde(default)]
    pub force_disbanded: BTreeSet<Province>,
}

impl Snapshot {
    pub fn from_state(state: &State) -> Self {
        let phase = state.phase();
        Snapshot {
            year: phase.year,
            season: phase.season,
            phase_type: phase.kind,
            units: state.units().clone(),
            supply_centers: state.supply_centers().clone(),
            dislodgeds: state.dislodgeds().clone(),
            dislodgers: state.dislodgers().clone(),
            bounces: state.bounces().clone(),
            resolutions: state
                .resolutions()
                .iter()
                .map(|(p, r)| (p.clone(), resolution_token(r)))
                .collect(),
            force_disbanded: state.force_disbands().clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::new(self.year, self.season, self.phase_type)
    }
}
