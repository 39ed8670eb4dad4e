//! Reinforcement-phase submissions.
//!
//! Placements and disbands are checked as a whole against the player's
//! quota before any unit is touched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{Game, Phase, PlayerId, UnitId, UnitType};
use crate::event::Event;
use crate::resolve::reinforce::{areas_for_new_units, possible_reinforcements, units_to_place};

use super::OrderError;

/// A new unit to raise, with its area given by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub area: String,
    pub unit_type: UnitType,
}

fn check_phase(game: &Game, player: PlayerId) -> Result<(), OrderError> {
    if game.phase != Phase::Reinforce {
        return Err(OrderError::WrongPhase(game.phase));
    }
    let p = game.player(player).ok_or(OrderError::UnknownPlayer(player))?;
    if p.done {
        return Err(OrderError::AlreadyDone);
    }
    Ok(())
}

/// Raises new units in free home cities.
pub fn place_reinforcements(
    game: &mut Game,
    player: PlayerId,
    placements: &[Placement],
    events: &mut Vec<Event>,
) -> Result<(), OrderError> {
    check_phase(game, player)?;
    let allowed = units_to_place(game, player);
    if placements.len() as i32 > allowed.max(0) {
        return Err(OrderError::TooManyPlacements {
            allowed,
            requested: placements.len(),
        });
    }

    let free = areas_for_new_units(game, player);
    let mut used = BTreeSet::new();
    let mut resolved = Vec::with_capacity(placements.len());
    for p in placements {
        let bad = || OrderError::BadPlacement {
            area: p.area.clone(),
            unit_type: p.unit_type,
        };
        let area = game
            .scenario
            .area_id(&p.area)
            .ok_or_else(|| OrderError::UnknownArea(p.area.clone()))?;
        if !free.contains(&area)
            || !used.insert(area)
            || !possible_reinforcements(game, area).contains(&p.unit_type)
        {
            return Err(bad());
        }
        resolved.push((area, p.unit_type));
    }

    for (area, unit_type) in resolved {
        game.place_unit(unit_type, area, player, events);
    }
    Ok(())
}

/// Disbands exactly the surplus number of the player's units.
pub fn disband_units(
    game: &mut Game,
    player: PlayerId,
    units: &[UnitId],
    events: &mut Vec<Event>,
) -> Result<(), OrderError> {
    check_phase(game, player)?;
    let expected = (-units_to_place(game, player)).max(0) as u32;
    let distinct: BTreeSet<UnitId> = units.iter().copied().collect();
    if distinct.len() != units.len() || units.len() as u32 != expected {
        return Err(OrderError::WrongDisbandCount {
            expected,
            got: distinct.len(),
        });
    }
    for &id in &distinct {
        let unit = game.unit(id).ok_or(OrderError::UnknownUnit(id))?;
        if unit.player != player {
            return Err(OrderError::NotOwner(id));
        }
    }
    for id in distinct {
        game.disband(id, events);
    }
    Ok(())
}
