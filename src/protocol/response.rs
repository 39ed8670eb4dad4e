//! Response encoding.
//!
//! Every request gets exactly one line back: `{"ok": <payload>}` on success
//! or `{"error": "<message>"}` on failure.

use serde::Serialize;

use crate::board::GameSnapshot;
use crate::engine::GameId;
use crate::event::Event;

/// Events produced by one game during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEvents {
    pub game: GameId,
    pub events: Vec<Event>,
}

/// Successful result of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Accepted with nothing to report; encodes as `null`.
    Ack,
    NewGame { game: GameId, events: Vec<Event> },
    Events { events: Vec<Event> },
    Tick { games: Vec<GameEvents> },
    State(GameSnapshot),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Payload),
    Error(String),
}

impl Response {
    /// Encodes the response as a single JSON line.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => {
                log::error!("cannot encode response: {}", e);
                r#"{"error":"internal encoding failure"}"#.to_string()
            }
        }
    }
}

impl<E: std::fmt::Display> From<Result<Payload, E>> for Response {
    fn from(result: Result<Payload, E>) -> Self {
        match result {
            Ok(payload) => Response::Ok(payload),
            Err(e) => Response::Error(e.to_string()),
        }
    }
}
