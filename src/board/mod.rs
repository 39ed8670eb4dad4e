//! Board representation and game-state types.
//!
//! Contains the scenario (areas and borders), units, orders, and the state of
//! one running game.

pub mod area;
pub mod order;
pub mod scenario;
pub mod state;
pub mod unit;

pub use area::{Area, AreaDef, AreaId};
pub use order::{Order, OrderCode, OrderKind, RetreatOrder, SubAction, SubOrder};
pub use scenario::{Scenario, ScenarioDef, ScenarioError, Setup, SetupDef};
pub use state::{Game, GameArea, GameError, GameSnapshot, Phase, Player, PlayerId, Season};
pub use unit::{Unit, UnitId, UnitType};
