//! Strength calculation.
//!
//! A unit's strength is the number of Support orders in the game whose
//! sub-order is exactly the canonical description of what the unit is doing
//! this phase. Holding, supporting and convoying units are all described as
//! holding, so a "support hold" backs any of them.

use crate::board::{Game, OrderKind, SubAction, SubOrder, Unit, UnitId};

/// A unit with the strength it carries into conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub unit: UnitId,
    pub strength: u32,
}

/// Returns the canonical description of the unit's current order.
pub fn current_action(game: &Game, unit: &Unit) -> SubOrder {
    let action = match game.orders.get(&unit.id).map(|o| o.kind) {
        Some(OrderKind::Advance { dest }) => SubAction::Advance(dest),
        Some(OrderKind::Convert { into }) => SubAction::Convert(into),
        Some(OrderKind::Besiege) => SubAction::Besiege,
        _ => SubAction::Hold,
    };
    SubOrder {
        unit_type: unit.unit_type,
        origin: unit.area,
        action,
    }
}

/// Counts the Support orders matching the unit's current order.
///
/// Unknown units have no strength.
pub fn strength(game: &Game, id: UnitId) -> u32 {
    let Some(unit) = game.unit(id) else {
        return 0;
    };
    let described = current_action(game, unit);
    game.orders
        .values()
        .filter(|o| matches!(o.kind, OrderKind::Support { target } if target == described))
        .count() as u32
}

/// Ranks every unit with an Advance or Convert order by descending strength.
///
/// Equal strengths keep unit-id order so the result is deterministic.
pub fn ranked_units(game: &Game) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = game
        .orders
        .values()
        .filter(|o| o.kind.is_contesting())
        .map(|o| Ranked {
            unit: o.unit,
            strength: strength(game, o.unit),
        })
        .collect();
    ranked.sort_by(|a, b| b.strength.cmp(&a.strength).then(a.unit.cmp(&b.unit)));
    ranked
}
