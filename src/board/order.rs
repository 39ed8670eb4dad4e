//! Order types for the orders and retreats phases.
//!
//! Support and convoy orders carry a fully specified `SubOrder` naming the
//! unit they help and what that unit is expected to do. A support only counts
//! when its sub-order is exactly the canonical description of the supported
//! unit's own order, so the notation below is part of the game rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::area::AreaId;
use super::scenario::Scenario;
use super::unit::{UnitId, UnitType};

/// The one-letter code of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderCode {
    #[serde(rename = "H")]
    Hold,
    #[serde(rename = "B")]
    Besiege,
    #[serde(rename = "-")]
    Advance,
    #[serde(rename = "=")]
    Convert,
    #[serde(rename = "C")]
    Convoy,
    #[serde(rename = "S")]
    Support,
}

impl OrderCode {
    /// Returns the notation character.
    pub const fn symbol(self) -> char {
        match self {
            OrderCode::Hold => 'H',
            OrderCode::Besiege => 'B',
            OrderCode::Advance => '-',
            OrderCode::Convert => '=',
            OrderCode::Convoy => 'C',
            OrderCode::Support => 'S',
        }
    }

    /// Parses an order code from its notation character.
    pub fn from_symbol(c: char) -> Option<OrderCode> {
        match c {
            'H' => Some(OrderCode::Hold),
            'B' => Some(OrderCode::Besiege),
            '-' => Some(OrderCode::Advance),
            '=' => Some(OrderCode::Convert),
            'C' => Some(OrderCode::Convoy),
            'S' => Some(OrderCode::Support),
            _ => None,
        }
    }
}

/// What a supported or convoyed unit is expected to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubAction {
    Hold,
    Besiege,
    Advance(AreaId),
    Convert(UnitType),
}

/// The order another unit is claimed to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubOrder {
    pub unit_type: UnitType,
    pub origin: AreaId,
    pub action: SubAction,
}

impl SubOrder {
    /// Returns the canonical description, e.g. `A ROM - TUS` or `G MIL = A`.
    pub fn describe(&self, scenario: &Scenario) -> String {
        let head = format!("{} {}", self.unit_type.code(), scenario.code(self.origin));
        match self.action {
            SubAction::Hold => format!("{head} H"),
            SubAction::Besiege => format!("{head} B"),
            SubAction::Advance(dest) => format!("{head} - {}", scenario.code(dest)),
            SubAction::Convert(into) => format!("{head} = {}", into.code()),
        }
    }
}

/// The instruction carried by an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    /// `A VEN H`
    Hold,
    /// `A MIL B`
    Besiege,
    /// `A VEN - PAD`
    Advance { dest: AreaId },
    /// `G MIL = A`
    Convert { into: UnitType },
    /// `F TYR C A ROM - NAP`
    Convoy { target: SubOrder },
    /// `F NAP S A ROM - TUS`
    Support { target: SubOrder },
}

impl OrderKind {
    /// Returns the order's one-letter code.
    pub const fn code(&self) -> OrderCode {
        match self {
            OrderKind::Hold => OrderCode::Hold,
            OrderKind::Besiege => OrderCode::Besiege,
            OrderKind::Advance { .. } => OrderCode::Advance,
            OrderKind::Convert { .. } => OrderCode::Convert,
            OrderKind::Convoy { .. } => OrderCode::Convoy,
            OrderKind::Support { .. } => OrderCode::Support,
        }
    }

    /// Returns true for the orders that can start a conflict.
    pub const fn is_contesting(&self) -> bool {
        matches!(self, OrderKind::Advance { .. } | OrderKind::Convert { .. })
    }

    /// Returns the advance destination, if any.
    pub const fn destination(&self) -> Option<AreaId> {
        match self {
            OrderKind::Advance { dest } => Some(*dest),
            _ => None,
        }
    }
}

/// An order for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    pub unit: UnitId,
    pub kind: OrderKind,
}

impl Order {
    pub fn new(unit: UnitId, kind: OrderKind) -> Self {
        Order { unit, kind }
    }

    /// Formats the full order, e.g. `F NAP S A ROM - TUS`.
    pub fn notation(&self, unit_type: UnitType, origin: AreaId, scenario: &Scenario) -> String {
        let head = format!("{} {} {}", unit_type.code(), scenario.code(origin), self.kind.code());
        match self.kind {
            OrderKind::Hold | OrderKind::Besiege => head,
            OrderKind::Advance { dest } => format!("{head} {}", scenario.code(dest)),
            OrderKind::Convert { into } => format!("{head} {}", into.code()),
            OrderKind::Convoy { target } | OrderKind::Support { target } => {
                format!("{head} {}", target.describe(scenario))
            }
        }
    }
}

/// A retreat instruction; `area == None` disbands the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetreatOrder {
    pub unit: UnitId,
    pub area: Option<AreaId>,
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
