//! Game events.
//!
//! Every observable outcome of adjudication is recorded as one `Event`,
//! stamped with the calendar position it happened in. Events are appended to
//! an explicit list threaded through the resolution steps, in the order they
//! happen; the engine never reads them back.

use serde::Serialize;

use crate::board::{Phase, PlayerId, Season, UnitType};

/// A single event with its calendar stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub year: u16,
    pub season: Season,
    pub phase: Phase,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Final placement of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerScore {
    pub country: String,
    pub cities: u32,
    pub score: u32,
}

/// What happened. Areas are reported by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload")]
pub enum EventKind {
    NewUnit {
        country: Option<String>,
        unit_type: UnitType,
        area: String,
    },
    Disband {
        country: Option<String>,
        unit_type: UnitType,
        area: String,
    },
    /// Echo of an accepted order.
    Order {
        country: Option<String>,
        order: String,
    },
    Standoff {
        area: String,
    },
    Conversion {
        area: String,
        before: UnitType,
        after: UnitType,
    },
    Control {
        country: String,
        area: String,
    },
    Movement {
        unit_type: UnitType,
        origin: String,
        destination: String,
    },
    Retreat {
        unit_type: UnitType,
        origin: String,
        destination: String,
    },
    SupportBroken {
        unit_type: UnitType,
        area: String,
    },
    ForcedRetreat {
        unit_type: UnitType,
        area: String,
    },
    Surrender {
        unit_type: UnitType,
        area: String,
    },
    SiegeStarted {
        unit_type: UnitType,
        area: String,
    },
    /// A country was handed to a player.
    CountryEvent {
        country: String,
        player: PlayerId,
    },
    NewPhase {
        phase: Phase,
    },
    NewSeason {
        year: u16,
        season: Season,
    },
    ForcePhase,
    GameOver {
        scores: Vec<PlayerScore>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_flat_with_payload() {
        let event = Event {
            year: 1454,
            season: Season::Spring,
            phase: Phase::Orders,
            kind: EventKind::Standoff {
                area: "PAD".to_string(),
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["year"], 1454);
        assert_eq!(value["season"], "spring");
        assert_eq!(value["phase"], "orders");
        assert_eq!(value["kind"], "Standoff");
        assert_eq!(value["payload"]["area"], "PAD");
    }

    #[test]
    fn unit_variant_has_no_payload() {
        let event = Event {
            year: 1455,
            season: Season::Fall,
            phase: Phase::Retreats,
            kind: EventKind::ForcePhase,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "ForcePhase");
        assert!(value.get("payload").is_none());
    }
}
