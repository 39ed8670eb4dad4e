//! Unit types and ownership.
//!
//! Represents armies, fleets and garrisons, their owning player, and the
//! per-unit adjudication markers (siege in progress, forced retreat).

use serde::{Deserialize, Serialize};

use super::area::AreaId;
use super::state::PlayerId;

/// Stable identity of a unit within one game.
///
/// Ids are handed out in creation order, so a higher id is always a newer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "A")]
    Army,
    #[serde(rename = "F")]
    Fleet,
    #[serde(rename = "G")]
    Garrison,
}

impl UnitType {
    /// Returns the single-character abbreviation used in order notation.
    pub const fn code(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
            UnitType::Garrison => 'G',
        }
    }

    /// Parses a unit type from its single-character abbreviation.
    pub fn from_code(c: char) -> Option<UnitType> {
        match c {
            'A' => Some(UnitType::Army),
            'F' => Some(UnitType::Fleet),
            'G' => Some(UnitType::Garrison),
            _ => None,
        }
    }

    /// Armies and fleets are mobile; garrisons never leave their city.
    pub const fn is_mobile(self) -> bool {
        !matches!(self, UnitType::Garrison)
    }
}

/// A unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub area: AreaId,
    pub player: PlayerId,
    /// Set after the first of the two consecutive Besiege orders.
    pub besieging: bool,
    /// Area the displacing attack came from, if the unit must retreat.
    pub must_retreat: Option<AreaId>,
}

impl Unit {
    /// Creates a unit with no siege or retreat markers.
    pub fn new(id: UnitId, unit_type: UnitType, area: AreaId, player: PlayerId) -> Self {
        Unit {
            id,
            unit_type,
            area,
            player,
            besieging: false,
            must_retreat: None,
        }
    }
}
