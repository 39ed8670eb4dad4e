//! Order legality and submission.
//!
//! Validates what players submit during the orders, retreats and
//! reinforcement phases, and enumerates legal orders for a unit in the
//! current game state.

pub mod reinforce;
pub mod retreat;
pub mod validate;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Game, Order, OrderCode, Phase, PlayerId, UnitId, UnitType};

pub use reinforce::{disband_units, place_reinforcements, Placement};
pub use retreat::{possible_retreats, submit_retreat};
pub use validate::{legal_orders, submit_order, withdraw_order, OrderRequest};

/// Errors returned to a player whose submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("not accepted during the {0:?} phase")]
    WrongPhase(Phase),

    #[error("unknown player {0:?}")]
    UnknownPlayer(PlayerId),

    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),

    #[error("unit {0:?} belongs to another player")]
    NotOwner(UnitId),

    #[error("player has already finished this phase")]
    AlreadyDone,

    #[error("unit {0:?} already has an order")]
    AlreadyOrdered(UnitId),

    #[error("unit {0:?} has no order to withdraw")]
    NoOrder(UnitId),

    #[error("unknown area code '{0}'")]
    UnknownArea(String),

    #[error("order '{code}' needs a {field}")]
    MissingField { code: OrderCode, field: &'static str },

    #[error("illegal order '{order}': {reason}")]
    Illegal { order: String, reason: &'static str },

    #[error("unit {0:?} does not have to retreat")]
    NotRetreating(UnitId),

    #[error("unit {unit:?} cannot retreat to {area}")]
    BadRetreat { unit: UnitId, area: String },

    #[error("{requested} placements requested but only {allowed} allowed")]
    TooManyPlacements { allowed: i32, requested: usize },

    #[error("cannot place {unit_type:?} in {area}")]
    BadPlacement { area: String, unit_type: UnitType },

    #[error("must disband exactly {expected} units, got {got}")]
    WrongDisbandCount { expected: u32, got: usize },

    #[error("{0} units must be disbanded first")]
    PendingDisbands(u32),
}

/// Picks one random legal order for each of the player's units.
///
/// Units with no legal order other than Hold still get a Hold.
pub fn random_orders(game: &Game, player: PlayerId, rng: &mut impl Rng) -> Vec<Order> {
    if game.phase != Phase::Orders {
        return Vec::new();
    }
    game.units_of(player)
        .filter_map(|u| legal_orders(game, u.id).choose(rng).copied())
        .collect()
}
