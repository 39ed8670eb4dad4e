//! Reinforcement-phase bookkeeping.
//!
//! Each Spring a player may raise one unit per controlled city above its
//! current unit count, but only in free home cities it still controls. A
//! player with more units than cities must disband the surplus.

use crate::board::{AreaId, Game, PlayerId, UnitId, UnitType};
use crate::event::Event;

/// Home cities where the player may raise a unit right now.
///
/// A fortified city holds a garrison and one army or fleet, so it is full
/// with two units; any other city is full with one.
pub fn areas_for_new_units(game: &Game, player: PlayerId) -> Vec<AreaId> {
    let Some(country) = game.country(player) else {
        return Vec::new();
    };
    game.scenario
        .home_areas(&country)
        .filter(|&a| game.area(a).controller == Some(player))
        .filter(|&a| {
            let area = game.scenario.area(a);
            let limit = if area.is_fortified { 2 } else { 1 };
            area.has_city && game.units_in(a).count() < limit
        })
        .collect()
}

/// Units the player may place (positive) or must disband (negative).
pub fn units_to_place(game: &Game, player: PlayerId) -> i32 {
    let cities = game.cities_of(player) as i32;
    let units = game.units_of(player).count() as i32;
    let slots = areas_for_new_units(game, player).len() as i32;
    (cities - units).min(slots)
}

/// Unit types that can be raised in an area given what already stands there.
pub fn possible_reinforcements(game: &Game, area: AreaId) -> Vec<UnitType> {
    let def = game.scenario.area(area);
    let mut types = Vec::new();
    if def.accepts_type(UnitType::Garrison) && game.garrison_in(area).is_none() {
        types.push(UnitType::Garrison);
    }
    if game.mobile_unit_in(area).is_none() {
        for t in [UnitType::Fleet, UnitType::Army] {
            if def.accepts_type(t) {
                types.push(t);
            }
        }
    }
    types
}

/// Disbands the newest units of a player until it is back within its quota.
pub fn trim_excess_units(game: &mut Game, player: PlayerId, events: &mut Vec<Event>) {
    let excess = -units_to_place(game, player);
    if excess <= 0 {
        return;
    }
    let mut ids: Vec<UnitId> = game.units_of(player).map(|u| u.id).collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    for id in ids.into_iter().take(excess as usize) {
        log::debug!("disbanding surplus unit {:?} of {:?}", id, player);
        game.disband(id, events);
    }
}
