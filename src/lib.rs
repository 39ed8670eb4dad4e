//! Condottiere engine library.
//!
//! Exposes the scenario and game-state types, order validation, the
//! adjudicator and turn state machine, the multi-game engine and the
//! JSON-lines protocol used by the binary entry point.

pub mod board;
pub mod config;
pub mod engine;
pub mod event;
pub mod movegen;
pub mod protocol;
pub mod resolve;
