//! Support and convoy validation.
//!
//! Runs before conflict resolution and strips the orders that cannot take
//! effect this phase: supports cut by an attack, convoys disrupted by a
//! stronger attack on the convoying fleet, and advances that cannot reach
//! their destination.

use std::collections::{BTreeSet, HashSet};

use crate::board::{AreaId, Game, OrderKind, SubAction, SubOrder, Unit, UnitId, UnitType};
use crate::event::{Event, EventKind};

use super::strength::{current_action, strength};

/// Returns true if there is a chain of convoying fleets carrying `unit` to
/// `dest`.
///
/// Only sea areas whose unit holds a Convoy order for exactly this advance
/// take part in the chain.
pub fn find_convoy_line(game: &Game, unit: &Unit, dest: AreaId) -> bool {
    let carried = SubOrder {
        unit_type: unit.unit_type,
        origin: unit.area,
        action: SubAction::Advance(dest),
    };
    let convoy_areas: HashSet<AreaId> = game
        .orders
        .values()
        .filter(|o| matches!(o.kind, OrderKind::Convoy { target } if target == carried))
        .filter_map(|o| game.unit(o.unit))
        .map(|u| u.area)
        .filter(|a| game.scenario.area(*a).is_sea)
        .collect();
    if convoy_areas.is_empty() {
        return false;
    }

    let mut visited = HashSet::new();
    visited.insert(unit.area);
    let mut frontier = vec![unit.area];
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for area in frontier {
            for &b in game.scenario.area(area).borders() {
                if b == dest {
                    return true;
                }
                if convoy_areas.contains(&b) && visited.insert(b) {
                    next.push(b);
                }
            }
        }
        frontier = next;
    }
    false
}

/// Returns true if `unit` can get to `dest` this phase, directly or by convoy.
pub fn can_reach(game: &Game, unit: &Unit, dest: AreaId) -> bool {
    let fleet = unit.unit_type == UnitType::Fleet;
    if game.scenario.is_adjacent(unit.area, dest, fleet) {
        return true;
    }
    unit.unit_type == UnitType::Army && find_convoy_line(game, unit, dest)
}

/// Areas where a conflict may happen this phase.
///
/// These are the destinations of reachable advances and the areas of units
/// converting into an army or fleet.
pub fn conflict_areas(game: &Game) -> BTreeSet<AreaId> {
    let mut areas = BTreeSet::new();
    for order in game.orders.values() {
        let Some(unit) = game.unit(order.unit) else {
            continue;
        };
        match order.kind {
            OrderKind::Advance { dest } if can_reach(game, unit, dest) => {
                areas.insert(dest);
            }
            OrderKind::Convert { into } if into != UnitType::Garrison => {
                areas.insert(unit.area);
            }
            _ => {}
        }
    }
    areas
}

/// Units attacking an area: advances into it and garrisons converting in it.
fn attackers_of(game: &Game, area: AreaId) -> Vec<UnitId> {
    game.orders
        .values()
        .filter(|o| match o.kind {
            OrderKind::Advance { dest } => dest == area,
            OrderKind::Convert { .. } => game
                .unit(o.unit)
                .is_some_and(|u| u.area == area && u.unit_type == UnitType::Garrison),
            _ => false,
        })
        .map(|o| o.unit)
        .collect()
}

/// Cancels supports given from contested areas.
///
/// A support survives a single attack only when it backs the attacker's own
/// action, or an action against the attacker itself: an advance into the
/// attacker's area, or a conversion to army or fleet in that area. Any other
/// contest cuts it.
pub fn filter_supports(game: &mut Game, events: &mut Vec<Event>) {
    let contested = conflict_areas(game);
    let supports: Vec<(UnitId, SubOrder)> = game
        .orders
        .values()
        .filter_map(|o| match o.kind {
            OrderKind::Support { target } => Some((o.unit, target)),
            _ => None,
        })
        .collect();

    for (id, target) in supports {
        let Some(supporter) = game.unit(id).cloned() else {
            log::warn!("support order for unknown unit {:?}", id);
            game.orders.remove(&id);
            continue;
        };
        if !contested.contains(&supporter.area) {
            continue;
        }
        let attackers = attackers_of(game, supporter.area);
        if let [attacker] = attackers.as_slice() {
            if let Some(attacker) = game.unit(*attacker) {
                let against_attacker = target == current_action(game, attacker)
                    || match target.action {
                        SubAction::Advance(dest) => dest == attacker.area,
                        SubAction::Convert(into) => {
                            into != UnitType::Garrison && target.origin == attacker.area
                        }
                        _ => false,
                    };
                if against_attacker {
                    continue;
                }
            }
        }
        log::debug!(
            "support of {:?} in {} broken",
            id,
            game.scenario.code(supporter.area)
        );
        events.push(game.event(EventKind::SupportBroken {
            unit_type: supporter.unit_type,
            area: game.code(supporter.area),
        }));
        game.orders.remove(&id);
    }
}

/// Turns the Convoy order of a fleet into a Hold when it is attacked by a
/// stronger unit.
///
/// The attacker is an advance into a sea area, or a garrison converting
/// inside a land-controlled sea area where the fleet stands.
pub fn filter_convoys(game: &mut Game) {
    let attacks: Vec<(UnitId, UnitId)> = game
        .orders
        .values()
        .filter_map(|o| {
            let attacker = game.unit(o.unit)?;
            let defender = match o.kind {
                OrderKind::Advance { dest } if game.scenario.area(dest).is_sea => {
                    let mut units = game.units_in(dest);
                    match (units.next(), units.next()) {
                        (Some(u), None) => u,
                        _ => return None,
                    }
                }
                OrderKind::Convert { .. }
                    if attacker.unit_type == UnitType::Garrison
                        && game.scenario.area(attacker.area).is_sea =>
                {
                    game.units_in(attacker.area)
                        .find(|u| u.unit_type == UnitType::Fleet)?
                }
                _ => return None,
            };
            Some((attacker.id, defender.id))
        })
        .collect();

    for (attacker, defender) in attacks {
        if strength(game, attacker) <= strength(game, defender) {
            continue;
        }
        if let Some(order) = game.orders.get_mut(&defender) {
            if matches!(order.kind, OrderKind::Convoy { .. }) {
                log::debug!("convoy of {:?} disrupted by {:?}", defender, attacker);
                order.kind = OrderKind::Hold;
            }
        }
    }
}

/// Deletes advances that can reach neither directly nor through a convoy.
pub fn filter_unreachable_attacks(game: &mut Game) {
    let unreachable: Vec<UnitId> = game
        .orders
        .values()
        .filter_map(|o| {
            let dest = o.kind.destination()?;
            let unit = game.unit(o.unit)?;
            (!can_reach(game, unit, dest)).then_some(o.unit)
        })
        .collect();
    for id in unreachable {
        log::debug!("advance of {:?} cannot reach its destination", id);
        game.orders.remove(&id);
    }
}
