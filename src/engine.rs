//! Engine state management.
//!
//! Holds every running game behind its own mutex. Anything that changes a
//! game (order submission, marking a player done and resolving the phase,
//! forced transitions) happens while holding that game's lock, so a phase
//! can never be resolved twice. Independent games are ticked in parallel.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::board::{Game, GameError, GameSnapshot, PlayerId, Scenario, UnitId};
use crate::config::EngineConfig;
use crate::event::Event;
use crate::movegen::{self, OrderError, OrderRequest, Placement};
use crate::resolve::TurnMachine;

/// Identifier of a game within one engine.
pub type GameId = u64;

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown game {0}")]
    UnknownGame(GameId),

    #[error("game {0} is unavailable after a failed update")]
    Poisoned(GameId),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Holds the games and settings shared by every request.
pub struct Engine {
    config: EngineConfig,
    games: RwLock<BTreeMap<GameId, Arc<Mutex<Game>>>>,
    next_id: AtomicU64,
    rng: Mutex<SmallRng>,
}

impl Engine {
    /// Creates an engine whose country draws come from system entropy.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Creates an engine with reproducible country draws.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: SmallRng) -> Self {
        Engine {
            config,
            games: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration used from now on.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Starts a game with one player per country of the scenario.
    pub fn new_game(
        &self,
        scenario: Arc<Scenario>,
        now: u64,
    ) -> Result<(GameId, Vec<Event>), EngineError> {
        let players = scenario.countries().len();
        let (game, events) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            Game::start(scenario, players, &mut *rng, now)?
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(game)));
        log::info!("registered game {}", id);
        Ok((id, events))
    }

    /// Returns the ids of all registered games.
    pub fn game_ids(&self) -> Vec<GameId> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    fn game(&self, id: GameId) -> Result<Arc<Mutex<Game>>, EngineError> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownGame(id))
    }

    /// Runs `f` inside the game's critical section.
    fn with_game<T>(
        &self,
        id: GameId,
        f: impl FnOnce(&mut Game) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let game = self.game(id)?;
        let mut guard = game.lock().map_err(|_| EngineError::Poisoned(id))?;
        f(&mut guard)
    }

    pub fn submit_order(
        &self,
        id: GameId,
        player: PlayerId,
        request: &OrderRequest,
    ) -> Result<Vec<Event>, EngineError> {
        self.with_game(id, |game| {
            Ok(vec![movegen::submit_order(game, player, request)?])
        })
    }

    pub fn withdraw_order(
        &self,
        id: GameId,
        player: PlayerId,
        unit: UnitId,
    ) -> Result<(), EngineError> {
        self.with_game(id, |game| Ok(movegen::withdraw_order(game, player, unit)?))
    }

    pub fn submit_retreat(
        &self,
        id: GameId,
        player: PlayerId,
        unit: UnitId,
        area: Option<&str>,
    ) -> Result<(), EngineError> {
        self.with_game(id, |game| {
            Ok(movegen::submit_retreat(game, player, unit, area)?)
        })
    }

    pub fn place_reinforcements(
        &self,
        id: GameId,
        player: PlayerId,
        placements: &[Placement],
    ) -> Result<Vec<Event>, EngineError> {
        self.with_game(id, |game| {
            let mut events = Vec::new();
            movegen::place_reinforcements(game, player, placements, &mut events)?;
            Ok(events)
        })
    }

    pub fn disband_units(
        &self,
        id: GameId,
        player: PlayerId,
        units: &[UnitId],
    ) -> Result<Vec<Event>, EngineError> {
        self.with_game(id, |game| {
            let mut events = Vec::new();
            movegen::disband_units(game, player, units, &mut events)?;
            Ok(events)
        })
    }

    /// Marks a player done; the last one to finish resolves the phase.
    pub fn mark_done(
        &self,
        id: GameId,
        player: PlayerId,
        now: u64,
    ) -> Result<Vec<Event>, EngineError> {
        let machine = TurnMachine::new(&self.config);
        self.with_game(id, |game| Ok(machine.mark_done(game, player, now)?))
    }

    /// Ends the current phase of a game regardless of who is done.
    pub fn force_phase_change(&self, id: GameId, now: u64) -> Result<Vec<Event>, EngineError> {
        let machine = TurnMachine::new(&self.config);
        self.with_game(id, |game| Ok(machine.force_phase_change(game, now)))
    }

    /// Forces every game whose phase has outlived the time limit.
    ///
    /// Returns the events of the games that changed, in game-id order.
    pub fn tick(&self, now: u64) -> Vec<(GameId, Vec<Event>)> {
        let games: Vec<(GameId, Arc<Mutex<Game>>)> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, g)| (*id, Arc::clone(g)))
            .collect();
        let machine = TurnMachine::new(&self.config);

        games
            .par_iter()
            .filter_map(|(id, game)| {
                let Ok(mut game) = game.lock() else {
                    log::warn!("skipping poisoned game {}", id);
                    return None;
                };
                let events = machine.check_time_limit(&mut game, now);
                (!events.is_empty()).then_some((*id, events))
            })
            .collect()
    }

    /// Returns a serialisable view of a game.
    pub fn snapshot(&self, id: GameId) -> Result<GameSnapshot, EngineError> {
        self.with_game(id, |game| Ok(game.snapshot()))
    }
}
