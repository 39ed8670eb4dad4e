//! Engine configuration.
//!
//! Passed explicitly to the engine and down to the turn state machine.

use serde::{Deserialize, Serialize};

/// Default phase time limit: two days.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 2 * 24 * 60 * 60;

/// Points for the first, second and third placed players.
pub const DEFAULT_SCORES: [u32; 3] = [20, 10, 5];

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered point tiers awarded at the end of a game.
    pub scores: Vec<u32>,
    /// Seconds a phase may stay open before it is forced.
    pub time_limit_secs: u64,
    /// Overrides the scenario's number of cities needed to win.
    pub cities_to_win: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            scores: DEFAULT_SCORES.to_vec(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            cities_to_win: None,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<EngineConfig, serde_json::Error> {
        serde_json::from_str(json)
    }
}
