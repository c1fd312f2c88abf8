//! Order types and the per-order failure taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::province::Province;
use super::unit::UnitType;

/// A single order as submitted by a nation.
///
/// Every variant carries the province it is keyed on; supports and convoys
/// additionally name the unit they assist and its destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Order {
    Hold {
        at: Province,
    },
    Move {
        from: Province,
        to: Province,
        #[serde(default)]
        via_convoy: bool,
    },
    SupportHold {
        at: Province,
        target: Province,
    },
    SupportMove {
        at: Province,
        from: Province,
        to: Province,
    },
    Convoy {
        at: Province,
        from: Province,
        to: Province,
    },
    Build {
        at: Province,
        unit_type: UnitType,
    },
    /// A build that ignores the home-center restriction, for variants that allow it.
    BuildAnywhere {
        at: Province,
        unit_type: UnitType,
    },
    Disband {
        at: Province,
    },
}

/// The order verbs a variant can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderKind {
    Hold,
    Move,
    MoveViaConvoy,
    Support,
    Convoy,
    Build,
    Disband,
}

impl OrderKind {
    pub const ALL: [OrderKind; 7] = [
        OrderKind::Hold,
        OrderKind::Move,
        OrderKind::MoveViaConvoy,
        OrderKind::Support,
        OrderKind::Convoy,
        OrderKind::Build,
        OrderKind::Disband,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            OrderKind::Hold => "Hold",
            OrderKind::Move => "Move",
            OrderKind::MoveViaConvoy => "MoveViaConvoy",
            OrderKind::Support => "Support",
            OrderKind::Convoy => "Convoy",
            OrderKind::Build => "Build",
            OrderKind::Disband => "Disband",
        }
    }
}

impl Order {
    pub fn hold(at: &str) -> Order {
        Order::Hold { at: at.into() }
    }

    pub fn move_to(from: &str, to: &str) -> Order {
        Order::Move {
            from: from.into(),
            to: to.into(),
            via_convoy: false,
        }
    }

    pub fn move_via_convoy(from: &str, to: &str) -> Order {
        Order::Move {
            from: from.into(),
            to: to.into(),
            via_convoy: true,
        }
    }

    pub fn support_hold(at: &str, target: &str) -> Order {
        Order::SupportHold {
            at: at.into(),
            target: target.into(),
        }
    }

    pub fn support_move(at: &str, from: &str, to: &str) -> Order {
        Order::SupportMove {
            at: at.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn convoy(at: &str, from: &str, to: &str) -> Order {
        Order::Convoy {
            at: at.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn build(at: &str, unit_type: UnitType) -> Order {
        Order::Build {
            at: at.into(),
            unit_type,
        }
    }

    pub fn disband(at: &str) -> Order {
        Order::Disband { at: at.into() }
    }

    /// The verb this order displays as.
    pub fn kind(&self) -> OrderKind {
        match self {
            Order::Hold { .. } => OrderKind::Hold,
            Order::Move {
                via_convoy: false, ..
            } => OrderKind::Move,
            Order::Move {
                via_convoy: true, ..
            } => OrderKind::MoveViaConvoy,
            Order::SupportHold { .. } | Order::SupportMove { .. } => OrderKind::Support,
            Order::Convoy { .. } => OrderKind::Convoy,
            Order::Build { .. } | Order::BuildAnywhere { .. } => OrderKind::Build,
            Order::Disband { .. } => OrderKind::Disband,
        }
    }

    /// The province holding the ordered unit (or the build site).
    pub fn source(&self) -> &Province {
        match self {
            Order::Hold { at }
            | Order::SupportHold { at, .. }
            | Order::SupportMove { at, .. }
            | Order::Convoy { at, .. }
            | Order::Build { at, .. }
            | Order::BuildAnywhere { at, .. }
            | Order::Disband { at } => at,
            Order::Move { from, .. } => from,
        }
    }

    /// Every province the order mentions, source first.
    pub fn provinces(&self) -> Vec<&Province> {
        match self {
            Order::Hold { at }
            | Order::Build { at, .. }
            | Order::BuildAnywhere { at, .. }
            | Order::Disband { at } => vec![at],
            Order::Move { from, to, .. } => vec![from, to],
            Order::SupportHold { at, target } => vec![at, target],
            Order::SupportMove { at, from, to } | Order::Convoy { at, from, to } => {
                vec![at, from, to]
            }
        }
    }

    /// Destination of a move, if this is one.
    pub fn move_target(&self) -> Option<&Province> {
        match self {
            Order::Move { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Order::Move { .. })
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Hold { at } => write!(f, "{at} Hold"),
            Order::Move {
                from,
                to,
                via_convoy: false,
            } => write!(f, "{from} Move {to}"),
            Order::Move {
                from,
                to,
                via_convoy: true,
            } => write!(f, "{from} MoveViaConvoy {to}"),
            Order::SupportHold { at, target } => write!(f, "{at} Support {target}"),
            Order::SupportMove { at, from, to } => write!(f, "{at} Support {from} {to}"),
            Order::Convoy { at, from, to } => write!(f, "{at} Convoy {from} {to}"),
            Order::Build { at, unit_type } | Order::BuildAnywhere { at, unit_type } => {
                write!(f, "{at} Build {unit_type}")
            }
            Order::Disband { at } => write!(f, "{at} Disband"),
        }
    }
}

/// Why an order failed, or was rejected before adjudication.
///
/// `Display` renders the token reported back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum OrderError {
    #[error("ErrInvalidSource")]
    InvalidSource,
    #[error("ErrInvalidDestination")]
    InvalidDestination,
    #[error("ErrInvalidTarget")]
    InvalidTarget,
    #[error("ErrInvalidPhase")]
    InvalidPhase,
    #[error("ErrMissingUnit")]
    MissingUnit,
    #[error("ErrIllegalDestination")]
    IllegalDestination,
    #[error("ErrMissingConvoyPath")]
    MissingConvoyPath,
    #[error("ErrIllegalMove")]
    IllegalMove,
    #[error("ErrConvoyParadox")]
    ConvoyParadox,
    #[error("ErrIllegalSupportPosition")]
    IllegalSupportPosition,
    #[error("ErrIllegalSupportDestination")]
    IllegalSupportDestination,
    #[error("ErrMissingSupportUnit")]
    MissingSupportUnit,
    #[error("ErrIllegalSupportMove")]
    IllegalSupportMove,
    #[error("ErrIllegalConvoyPath")]
    IllegalConvoyPath,
    #[error("ErrIllegalConvoyMove")]
    IllegalConvoyMove,
    #[error("ErrMissingConvoyee")]
    MissingConvoyee,
    #[error("ErrIllegalConvoyer")]
    IllegalConvoyer,
    #[error("ErrIllegalConvoyee")]
    IllegalConvoyee,
    #[error("ErrIllegalBuild")]
    IllegalBuild,
    #[error("ErrIllegalDisband")]
    IllegalDisband,
    #[error("ErrOccupiedSupplyCenter")]
    OccupiedSupplyCenter,
    #[error("ErrMissingSupplyCenter")]
    MissingSupplyCenter,
    #[error("ErrHostileSupplyCenter")]
    HostileSupplyCenter,
    #[error("ErrMissingSurplus")]
    MissingSurplus,
    #[error("ErrMissingDeficit")]
    MissingDeficit,
    #[error("ErrIllegalUnitType")]
    IllegalUnitType,
    #[error("ErrIllegalRetreat")]
    IllegalRetreat,
    #[error("ErrForcedDisband")]
    ForcedDisband,
    /// Lost a contest against the unit at (or moving from) the province.
    #[error("ErrBounce:{0}")]
    Bounce(Province),
    /// Support cut or dislodged by a unit moving from the province.
    #[error("ErrSupportBroken:{0}")]
    SupportBroken(Province),
    /// Convoying fleet dislodged by a unit moving from the province.
    #[error("ErrConvoyDislodged:{0}")]
    ConvoyDislodged(Province),
}

/// Outcome of one order: success, or the reason it failed.
pub type Resolution = Result<(), OrderError>;

/// Renders a resolution the way snapshots report it.
pub fn resolution_token(r: &Resolution) -> String {
    match r {
        Ok(()) => "OK".to_string(),
        Err(e) => e.to_string(),
    }
}
