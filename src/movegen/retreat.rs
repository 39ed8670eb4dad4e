//! Retreat-phase options and submission.
//!
//! A displaced unit may retreat to an adjacent area it can occupy that is
//! free of armies and fleets, did not see a standoff this season and is not
//! where the attack came from. If its own area is a fortified city without a
//! garrison, it may also withdraw into the city and become its garrison.

use crate::board::{AreaId, Game, Phase, PlayerId, RetreatOrder, Unit, UnitId, UnitType};

use super::OrderError;

/// Lists the areas a displaced unit may retreat to.
///
/// Returns an empty vec for units that do not have to retreat.
pub fn possible_retreats(game: &Game, unit: &Unit) -> Vec<AreaId> {
    let Some(attacker_from) = unit.must_retreat else {
        return Vec::new();
    };
    let fleet = unit.unit_type == UnitType::Fleet;
    let here = game.scenario.area(unit.area);

    let mut areas: Vec<AreaId> = here
        .borders()
        .iter()
        .copied()
        .filter(|&a| a != attacker_from)
        .filter(|&a| game.scenario.is_adjacent(unit.area, a, fleet))
        .filter(|&a| game.scenario.area(a).can_occupy(unit.unit_type))
        .filter(|&a| !game.area(a).standoff)
        .filter(|&a| game.mobile_unit_in(a).is_none())
        .collect();

    if here.is_fortified && game.garrison_in(unit.area).is_none() {
        areas.push(unit.area);
    }
    areas
}

/// Records a retreat for a displaced unit; `area == None` disbands it.
///
/// A later submission for the same unit replaces the earlier one.
pub fn submit_retreat(
    game: &mut Game,
    player: PlayerId,
    unit: UnitId,
    area: Option<&str>,
) -> Result<(), OrderError> {
    if game.phase != Phase::Retreats {
        return Err(OrderError::WrongPhase(game.phase));
    }
    let u = game.unit(unit).ok_or(OrderError::UnknownUnit(unit))?;
    if u.player != player {
        return Err(OrderError::NotOwner(unit));
    }
    if u.must_retreat.is_none() {
        return Err(OrderError::NotRetreating(unit));
    }
    let area = match area {
        None => None,
        Some(code) => {
            let id = game
                .scenario
                .area_id(code)
                .ok_or_else(|| OrderError::UnknownArea(code.to_string()))?;
            if !possible_retreats(game, u).contains(&id) {
                return Err(OrderError::BadRetreat {
                    unit,
                    area: code.to_string(),
                });
            }
            Some(id)
        }
    };
    game.retreats.insert(unit, RetreatOrder { unit, area });
    Ok(())
}
