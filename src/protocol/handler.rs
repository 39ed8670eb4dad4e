//! Request dispatch.
//!
//! Maps each parsed request onto the matching engine operation. Time is
//! injected by the caller so sessions can be replayed deterministically.

use std::sync::Arc;

use crate::board::{Scenario, ScenarioDef};
use crate::engine::Engine;

use super::parser::{ProtocolError, Request};
use super::response::{GameEvents, Payload};

fn load_scenario(
    scenario: Option<ScenarioDef>,
    path: Option<String>,
) -> Result<Scenario, ProtocolError> {
    if let Some(def) = scenario {
        return Ok(Scenario::from_def(&def)?);
    }
    let path = path.ok_or(ProtocolError::MissingScenario)?;
    let json = std::fs::read_to_string(&path)
        .map_err(|source| ProtocolError::ScenarioFile { path: path.clone(), source })?;
    log::info!("loading scenario from {}", path);
    Ok(Scenario::from_json(&json)?)
}

/// Executes one request. `now` is used wherever the request omits it.
///
/// `Quit` is acknowledged here; stopping the loop is up to the caller.
pub fn handle(engine: &mut Engine, request: Request, now: u64) -> Result<Payload, ProtocolError> {
    log::debug!("handling {:?}", request);
    let payload = match request {
        Request::Config(config) => {
            engine.set_config(config);
            Payload::Ack
        }
        Request::NewGame { scenario, path, now: at } => {
            let scenario = load_scenario(scenario, path)?;
            let (game, events) = engine.new_game(Arc::new(scenario), at.unwrap_or(now))?;
            Payload::NewGame { game, events }
        }
        Request::Order { game, player, order } => Payload::Events {
            events: engine.submit_order(game, player, &order)?,
        },
        Request::Withdraw { game, player, unit } => {
            engine.withdraw_order(game, player, unit)?;
            Payload::Ack
        }
        Request::Retreat { game, player, unit, area } => {
            engine.submit_retreat(game, player, unit, area.as_deref())?;
            Payload::Ack
        }
        Request::Reinforce { game, player, placements } => Payload::Events {
            events: engine.place_reinforcements(game, player, &placements)?,
        },
        Request::Disband { game, player, units } => Payload::Events {
            events: engine.disband_units(game, player, &units)?,
        },
        Request::Done { game, player, now: at } => Payload::Events {
            events: engine.mark_done(game, player, at.unwrap_or(now))?,
        },
        Request::Tick { now: at } => Payload::Tick {
            games: engine
                .tick(at.unwrap_or(now))
                .into_iter()
                .map(|(game, events)| GameEvents { game, events })
                .collect(),
        },
        Request::State { game } => Payload::State(engine.snapshot(game)?),
        Request::Quit => Payload::Ack,
    };
    Ok(payload)
}
