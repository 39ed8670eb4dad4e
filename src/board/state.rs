//! Game state representation.
//!
//! Holds the dynamic data of one running game: calendar, players, per-area
//! control and standoff markers, units, and the orders submitted for the
//! current phase. Area tables are indexed by `AreaId` like the scenario they
//! were created from.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::area::AreaId;
use super::order::{Order, RetreatOrder};
use super::scenario::Scenario;
use super::unit::{Unit, UnitId, UnitType};
use crate::event::{Event, EventKind};

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Returns the season number (1 to 3).
    pub const fn number(self) -> u8 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
        }
    }

    /// Returns the following season and whether the year rolls over.
    pub const fn next(self) -> (Season, bool) {
        match self {
            Season::Spring => (Season::Summer, false),
            Season::Summer => (Season::Fall, false),
            Season::Fall => (Season::Spring, true),
        }
    }
}

/// The phase within a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inactive,
    Reinforce,
    Orders,
    Retreats,
}

/// Index of a player within its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// A participant in a game. `country == None` is the autonomous player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub country: Option<String>,
    pub done: bool,
    pub score: u32,
}

impl Player {
    pub fn is_autonomous(&self) -> bool {
        self.country.is_none()
    }
}

/// Per-game dynamic data of one board area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameArea {
    pub controller: Option<PlayerId>,
    /// A conflict here ended in a tie this season.
    pub standoff: bool,
}

/// Errors raised while creating a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("scenario has {countries} countries but {players} players joined")]
    PlayerCount { countries: usize, players: usize },

    #[error("too many players: {0}")]
    TooManyPlayers(usize),
}

/// Complete state of a running game.
#[derive(Debug, Clone)]
pub struct Game {
    pub scenario: Arc<Scenario>,
    pub year: u16,
    pub season: Season,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub areas: Vec<GameArea>,
    pub units: BTreeMap<UnitId, Unit>,
    /// At most one order per unit for the current orders phase.
    pub orders: BTreeMap<UnitId, Order>,
    pub retreats: BTreeMap<UnitId, RetreatOrder>,
    /// Unix time (seconds) of the last phase change.
    pub last_phase_change: u64,
    next_unit_id: u32,
}

impl Game {
    /// Creates an empty board in the first orders phase of the scenario.
    pub fn empty(scenario: Arc<Scenario>) -> Self {
        let area_count = scenario.area_count();
        Game {
            year: scenario.start_year,
            season: Season::Spring,
            phase: Phase::Orders,
            players: Vec::new(),
            areas: vec![GameArea::default(); area_count],
            units: BTreeMap::new(),
            orders: BTreeMap::new(),
            retreats: BTreeMap::new(),
            last_phase_change: 0,
            next_unit_id: 1,
            scenario,
        }
    }

    /// Starts a game once every seat is taken.
    ///
    /// Countries are shuffled among the `players` human seats, each country's
    /// setups are placed (its home areas become controlled) and the
    /// autonomous player receives the neutral garrisons.
    pub fn start<R: Rng>(
        scenario: Arc<Scenario>,
        players: usize,
        rng: &mut R,
        now: u64,
    ) -> Result<(Game, Vec<Event>), GameError> {
        let mut countries = scenario.countries();
        if countries.len() != players {
            return Err(GameError::PlayerCount {
                countries: countries.len(),
                players,
            });
        }
        if players >= u8::MAX as usize {
            return Err(GameError::TooManyPlayers(players));
        }
        countries.shuffle(rng);

        let mut game = Game::empty(scenario);
        game.last_phase_change = now;
        let mut events = Vec::new();

        for country in countries {
            let id = game.add_player(Some(country.clone()));
            events.push(game.event(EventKind::CountryEvent {
                country: country.clone(),
                player: id,
            }));
        }
        let autonomous = game.add_player(None);

        let scenario = Arc::clone(&game.scenario);
        for setup in scenario.setups() {
            let owner = match &setup.country {
                Some(c) => match game.player_of(c) {
                    Some(p) => p,
                    None => continue,
                },
                None => autonomous,
            };
            if setup.country.is_some() {
                game.areas[setup.area.index()].controller = Some(owner);
            }
            if let Some(unit_type) = setup.unit_type {
                // Autonomous setups are always garrisons.
                let unit_type = if setup.country.is_none() {
                    UnitType::Garrison
                } else {
                    unit_type
                };
                game.place_unit(unit_type, setup.area, owner, &mut events);
            }
        }

        log::info!(
            "started game on '{}' with {} players, {} units",
            game.scenario.name,
            players,
            game.units.len()
        );
        Ok((game, events))
    }

    /// Adds a player and returns its id. Autonomous players are always done.
    pub fn add_player(&mut self, country: Option<String>) -> PlayerId {
        let id = PlayerId(self.players.len() as u8);
        let done = country.is_none();
        self.players.push(Player {
            id,
            country,
            done,
            score: 0,
        });
        id
    }

    /// Creates a unit without logging it. Used for scenario and test setup.
    pub fn add_unit(&mut self, unit_type: UnitType, area: AreaId, player: PlayerId) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, unit_type, area, player));
        id
    }

    /// Creates a unit and records a NewUnit event.
    pub fn place_unit(
        &mut self,
        unit_type: UnitType,
        area: AreaId,
        player: PlayerId,
        events: &mut Vec<Event>,
    ) -> UnitId {
        let id = self.add_unit(unit_type, area, player);
        events.push(self.event(EventKind::NewUnit {
            country: self.country(player),
            unit_type,
            area: self.scenario.code(area).to_string(),
        }));
        id
    }

    /// Removes a unit with its pending orders and records a Disband event.
    pub fn disband(&mut self, id: UnitId, events: &mut Vec<Event>) {
        let Some(unit) = self.units.remove(&id) else {
            log::warn!("disband of unknown unit {:?}", id);
            return;
        };
        self.orders.remove(&id);
        self.retreats.remove(&id);
        events.push(self.event(EventKind::Disband {
            country: self.country(unit.player),
            unit_type: unit.unit_type,
            area: self.scenario.code(unit.area).to_string(),
        }));
    }

    /// Stamps an event with the current year, season and phase.
    pub fn event(&self, kind: EventKind) -> Event {
        Event {
            year: self.year,
            season: self.season,
            phase: self.phase,
            kind,
        }
    }

    /// Returns the code of an area.
    pub fn code(&self, area: AreaId) -> String {
        self.scenario.code(area).to_string()
    }

    pub fn area(&self, id: AreaId) -> &GameArea {
        &self.areas[id.index()]
    }

    pub fn area_mut(&mut self, id: AreaId) -> &mut GameArea {
        &mut self.areas[id.index()]
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0 as usize)
    }

    /// Returns the country of a player; `None` for the autonomous player.
    pub fn country(&self, id: PlayerId) -> Option<String> {
        self.player(id).and_then(|p| p.country.clone())
    }

    /// Finds the player playing a country.
    pub fn player_of(&self, country: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.country.as_deref() == Some(country))
            .map(|p| p.id)
    }

    pub fn is_autonomous(&self, id: PlayerId) -> bool {
        self.player(id).map_or(true, Player::is_autonomous)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Iterates the units standing in an area.
    pub fn units_in(&self, area: AreaId) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values().filter(move |u| u.area == area)
    }

    /// Returns the garrison in an area, if any.
    pub fn garrison_in(&self, area: AreaId) -> Option<&Unit> {
        self.units_in(area)
            .find(|u| u.unit_type == UnitType::Garrison)
    }

    /// Returns the army or fleet in an area, if any.
    pub fn mobile_unit_in(&self, area: AreaId) -> Option<&Unit> {
        self.units_in(area).find(|u| u.unit_type.is_mobile())
    }

    /// Iterates the units of one player.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values().filter(move |u| u.player == player)
    }

    /// Number of cities a player controls.
    pub fn cities_of(&self, player: PlayerId) -> u32 {
        self.areas
            .iter()
            .enumerate()
            .filter(|(i, a)| {
                a.controller == Some(player) && self.scenario.areas()[*i].has_city
            })
            .count() as u32
    }

    /// Returns true if any unit still has to retreat.
    pub fn has_retreats(&self) -> bool {
        self.units.values().any(|u| u.must_retreat.is_some())
    }

    /// Returns a serialisable view of the state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            year: self.year,
            season: self.season,
            phase: self.phase,
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    country: p.country.clone(),
                    done: p.done,
                    score: p.score,
                    cities: self.cities_of(p.id),
                })
                .collect(),
            areas: self
                .areas
                .iter()
                .enumerate()
                .filter(|(_, a)| a.controller.is_some() || a.standoff)
                .map(|(i, a)| AreaView {
                    code: self.scenario.areas()[i].code.clone(),
                    controller: a.controller.and_then(|p| self.country(p)),
                    standoff: a.standoff,
                })
                .collect(),
            units: self
                .units
                .values()
                .map(|u| UnitView {
                    id: u.id,
                    unit_type: u.unit_type,
                    area: self.code(u.area),
                    country: self.country(u.player),
                    besieging: u.besieging,
                    must_retreat: u.must_retreat.map(|a| self.code(a)),
                })
                .collect(),
        }
    }
}

/// Serialisable view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub year: u16,
    pub season: Season,
    pub phase: Phase,
    pub players: Vec<PlayerView>,
    pub areas: Vec<AreaView>,
    pub units: Vec<UnitView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub country: Option<String>,
    pub done: bool,
    pub score: u32,
    pub cities: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaView {
    pub code: String,
    pub controller: Option<String>,
    pub standoff: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitView {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub area: String,
    pub country: Option<String>,
    pub besieging: bool,
    pub must_retreat: Option<String>,
}
