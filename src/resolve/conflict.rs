//! Conflict resolution.
//!
//! Units with Advance or Convert orders are processed strongest first. Each
//! one is compared with its enemies; a tie bounces everyone and marks the
//! contested area, a strict win moves or converts the unit and displaces any
//! other army or fleet already standing there.

use crate::board::{AreaId, Game, OrderKind, Unit, UnitId, UnitType};
use crate::event::{Event, EventKind};

use super::strength::{ranked_units, strength, Ranked};
use super::support::can_reach;

/// Converts, unopposed, every unit ordered to become a garrison where no
/// garrison stands yet. Those orders are consumed.
pub fn resolve_auto_garrisons(game: &mut Game, events: &mut Vec<Event>) {
    let converting: Vec<UnitId> = game
        .orders
        .values()
        .filter(|o| {
            matches!(o.kind, OrderKind::Convert { into: UnitType::Garrison })
        })
        .map(|o| o.unit)
        .collect();

    for id in converting {
        let Some(unit) = game.unit(id).cloned() else {
            continue;
        };
        if game.garrison_in(unit.area).is_some() {
            continue;
        }
        events.push(game.event(EventKind::Conversion {
            area: game.code(unit.area),
            before: unit.unit_type,
            after: UnitType::Garrison,
        }));
        if let Some(u) = game.units.get_mut(&id) {
            u.unit_type = UnitType::Garrison;
        }
        game.orders.remove(&id);
    }
}

/// Whether a unit's current order opposes an advance into `area`.
fn holds_against(kind: Option<OrderKind>, convert_counts: bool) -> bool {
    match kind {
        None => true,
        Some(OrderKind::Hold | OrderKind::Besiege | OrderKind::Support { .. } | OrderKind::Convoy { .. }) => true,
        Some(OrderKind::Convert { .. }) => convert_counts,
        Some(OrderKind::Advance { .. }) => false,
    }
}

/// Returns the units opposing `unit` in carrying out `kind`.
///
/// Against an advance: every other advance to the same area, a garrison in
/// that area trying to convert, and an army or fleet there that stays put.
/// Against a conversion: every advance into the converting unit's area and
/// an army or fleet there that stays put.
pub fn enemies(game: &Game, unit: &Unit, kind: &OrderKind) -> Vec<UnitId> {
    let order_of = |u: &Unit| game.orders.get(&u.id).map(|o| o.kind);
    game.units
        .values()
        .filter(|u| u.id != unit.id)
        .filter(|u| {
            let other = order_of(u);
            match *kind {
                OrderKind::Advance { dest } => {
                    other.and_then(|k| k.destination()) == Some(dest)
                        || (u.area == dest
                            && match u.unit_type {
                                UnitType::Garrison => {
                                    matches!(other, Some(OrderKind::Convert { .. }))
                                }
                                _ => holds_against(other, false),
                            })
                }
                OrderKind::Convert { .. } => {
                    other.and_then(|k| k.destination()) == Some(unit.area)
                        || (u.area == unit.area
                            && u.unit_type.is_mobile()
                            && holds_against(other, true))
                }
                _ => false,
            }
        })
        .map(|u| u.id)
        .collect()
}

/// Resolves every Advance and Convert order still standing.
pub fn resolve_conflicts(game: &mut Game, events: &mut Vec<Event>) {
    for Ranked { unit: id, strength: power } in ranked_units(game) {
        let Some(order) = game.orders.get(&id).copied() else {
            continue;
        };
        if !order.kind.is_contesting() {
            continue;
        }
        let Some(unit) = game.unit(id).cloned() else {
            log::warn!("order for unknown unit {:?}", id);
            game.orders.remove(&id);
            continue;
        };

        let opponents = enemies(game, &unit, &order.kind);
        let tie = opponents.iter().any(|e| strength(game, *e) == power);
        let mut invaded_from: Option<AreaId> = None;

        match order.kind {
            OrderKind::Advance { dest } if tie => standoff(game, dest, events),
            OrderKind::Convert { .. } if tie => standoff(game, unit.area, events),
            OrderKind::Advance { dest } => {
                if !game.area(dest).standoff && can_reach(game, &unit, dest) {
                    events.push(game.event(EventKind::Movement {
                        unit_type: unit.unit_type,
                        origin: game.code(unit.area),
                        destination: game.code(dest),
                    }));
                    if let Some(u) = game.units.get_mut(&id) {
                        u.area = dest;
                        u.must_retreat = None;
                    }
                    invaded_from = Some(unit.area);
                }
            }
            OrderKind::Convert { into } => {
                if !game.area(unit.area).standoff {
                    events.push(game.event(EventKind::Conversion {
                        area: game.code(unit.area),
                        before: unit.unit_type,
                        after: into,
                    }));
                    if let Some(u) = game.units.get_mut(&id) {
                        u.unit_type = into;
                    }
                    invaded_from = Some(unit.area);
                }
            }
            _ => {}
        }

        let here = game.unit(id).map_or(unit.area, |u| u.area);
        if let Some(from) = invaded_from {
            for other in game.units.values_mut() {
                if other.id != id && other.area == here && other.unit_type.is_mobile() {
                    other.must_retreat = Some(from);
                }
            }
        }

        game.orders.remove(&id);
        for enemy in opponents {
            let keeps = match game.orders.get(&enemy) {
                Some(o) => {
                    matches!(o.kind, OrderKind::Advance { .. })
                        && game.unit(enemy).is_some_and(|u| u.area == here)
                }
                None => continue,
            };
            if !keeps {
                game.orders.remove(&enemy);
            }
        }
    }
}

fn standoff(game: &mut Game, area: AreaId, events: &mut Vec<Event>) {
    log::debug!("standoff in {}", game.scenario.code(area));
    game.area_mut(area).standoff = true;
    events.push(game.event(EventKind::Standoff {
        area: game.code(area),
    }));
}
