//! Request parser.
//!
//! Each input line is one JSON object tagged by `cmd`. Blank lines are
//! skipped; anything else that does not parse is a `ProtocolError`.

use serde::Deserialize;

use crate::board::{PlayerId, ScenarioDef, ScenarioError, UnitId};
use crate::config::EngineConfig;
use crate::engine::{EngineError, GameId};
use crate::movegen::{OrderRequest, Placement};

/// Errors raised while reading or serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read scenario '{path}': {source}")]
    ScenarioFile {
        path: String,
        source: std::io::Error,
    },

    #[error("new_game needs a scenario or a path")]
    MissingScenario,

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A parsed client request.
///
/// `now` fields are Unix seconds; when absent the current time is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// Replace the engine configuration.
    Config(EngineConfig),

    /// Start a game from an inline scenario or a scenario file.
    NewGame {
        #[serde(default)]
        scenario: Option<ScenarioDef>,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        now: Option<u64>,
    },

    Order {
        game: GameId,
        player: PlayerId,
        order: OrderRequest,
    },

    Withdraw {
        game: GameId,
        player: PlayerId,
        unit: UnitId,
    },

    /// Retreat a displaced unit; no `area` disbands it.
    Retreat {
        game: GameId,
        player: PlayerId,
        unit: UnitId,
        #[serde(default)]
        area: Option<String>,
    },

    Reinforce {
        game: GameId,
        player: PlayerId,
        placements: Vec<Placement>,
    },

    Disband {
        game: GameId,
        player: PlayerId,
        units: Vec<UnitId>,
    },

    Done {
        game: GameId,
        player: PlayerId,
        #[serde(default)]
        now: Option<u64>,
    },

    /// Force every game past its time limit.
    Tick {
        #[serde(default)]
        now: Option<u64>,
    },

    State {
        game: GameId,
    },

    Quit,
}

/// Parses a single line of input into a `Request`.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_request(line: &str) -> Result<Option<Request>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}
