//! Siege resolution.
//!
//! A fortified city falls after two consecutive Besiege orders from the same
//! unit: the first one starts the siege, the second one forces the garrison
//! to surrender.

use crate::board::{Game, OrderKind, UnitId};
use crate::event::{Event, EventKind};

/// Drops the siege marker of units that were given anything but Besiege.
pub fn interrupt_sieges(game: &mut Game) {
    for unit in game.units.values_mut() {
        if unit.besieging
            && !matches!(game.orders.get(&unit.id), Some(o) if o.kind == OrderKind::Besiege)
        {
            unit.besieging = false;
        }
    }
}

/// Resolves the Besiege orders left after conflict resolution.
pub fn resolve_sieges(game: &mut Game, events: &mut Vec<Event>) {
    let besiegers: Vec<UnitId> = game
        .orders
        .values()
        .filter(|o| o.kind == OrderKind::Besiege)
        .map(|o| o.unit)
        .collect();

    for id in besiegers {
        game.orders.remove(&id);
        let Some(unit) = game.unit(id).cloned() else {
            continue;
        };
        if unit.besieging {
            if let Some(u) = game.units.get_mut(&id) {
                u.besieging = false;
            }
            let Some(garrison) = game.garrison_in(unit.area).cloned() else {
                log::warn!("siege of {} without a garrison", game.scenario.code(unit.area));
                continue;
            };
            events.push(game.event(EventKind::Surrender {
                unit_type: garrison.unit_type,
                area: game.code(unit.area),
            }));
            game.disband(garrison.id, events);
        } else {
            if let Some(u) = game.units.get_mut(&id) {
                u.besieging = true;
            }
            events.push(game.event(EventKind::SiegeStarted {
                unit_type: unit.unit_type,
                area: game.code(unit.area),
            }));
        }
    }
}

/// Announces every unit that has to retreat.
pub fn announce_retreats(game: &Game, events: &mut Vec<Event>) {
    for unit in game.units.values().filter(|u| u.must_retreat.is_some()) {
        events.push(game.event(EventKind::ForcedRetreat {
            unit_type: unit.unit_type,
            area: game.code(unit.area),
        }));
    }
}
