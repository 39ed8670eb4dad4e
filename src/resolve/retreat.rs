//! Retreat-phase resolution.
//!
//! Resolves retreat orders: if two displaced units retreat to the same area,
//! both are disbanded. Displaced units with no order are disbanded (civil
//! disorder). A unit retreating in place into a fortified city becomes its
//! garrison.

use std::collections::BTreeMap;

use crate::board::{AreaId, Game, UnitId, UnitType};
use crate::event::{Event, EventKind};

/// Applies the submitted retreat orders and clears them.
pub fn process_retreats(game: &mut Game, events: &mut Vec<Event>) {
    let orders: Vec<_> = game.retreats.values().copied().collect();
    game.retreats.clear();

    let mut targets: BTreeMap<AreaId, Vec<UnitId>> = BTreeMap::new();
    for order in &orders {
        match order.area {
            None => game.disband(order.unit, events),
            Some(area) => targets.entry(area).or_default().push(order.unit),
        }
    }

    // Civil disorder: unordered displaced units.
    let unordered: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| u.must_retreat.is_some() && !orders.iter().any(|o| o.unit == u.id))
        .map(|u| u.id)
        .collect();
    for id in unordered {
        log::debug!("unit {:?} disbanded for lack of a retreat order", id);
        game.disband(id, events);
    }

    for (area, units) in targets {
        if units.len() > 1 {
            for id in units {
                game.disband(id, events);
            }
            continue;
        }
        let id = units[0];
        let Some(unit) = game.unit(id).cloned() else {
            continue;
        };
        let mut unit_type = unit.unit_type;
        if unit.area == area {
            if game.scenario.area(area).is_fortified {
                unit_type = UnitType::Garrison;
            } else {
                log::warn!(
                    "unit {:?} cannot retreat in place into unfortified {}",
                    id,
                    game.scenario.code(area)
                );
                game.disband(id, events);
                continue;
            }
        }
        events.push(game.event(EventKind::Retreat {
            unit_type,
            origin: game.code(unit.area),
            destination: game.code(area),
        }));
        if let Some(u) = game.units.get_mut(&id) {
            u.unit_type = unit_type;
            u.area = area;
            u.must_retreat = None;
        }
    }
}
