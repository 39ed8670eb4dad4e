//! Order resolution.
//!
//! Adjudicates the simultaneous orders of one phase: strengths, support and
//! convoy validity, conflicts, sieges and retreats, plus the end-of-year
//! control and victory checks and the turn state machine tying them together.

pub mod conflict;
pub mod control;
pub mod phase;
pub mod reinforce;
pub mod retreat;
pub mod siege;
pub mod strength;
pub mod support;

pub use phase::{next_phase, process_orders, TurnMachine};
pub use strength::{current_action, ranked_units, strength, Ranked};
pub use support::find_convoy_line;
