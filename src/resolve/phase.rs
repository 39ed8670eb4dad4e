//! Phase sequencing logic.
//!
//! Drives a game through its turn cycle. Each season has an orders phase,
//! an optional retreats phase, and every Spring starts with a reinforcement
//! phase:
//!
//! - Reinforce -> Orders
//! - Orders    -> Retreats (if any unit must retreat) OR next season
//! - Retreats  -> next season
//!
//! The next season opens with Reinforce if it is Spring, Orders otherwise.
//! Control and victory are evaluated at the end of every Fall.

use crate::board::{Game, Phase, PlayerId, Season};
use crate::config::EngineConfig;
use crate::event::{Event, EventKind};
use crate::movegen::OrderError;

use super::conflict::{resolve_auto_garrisons, resolve_conflicts};
use super::control::{assign_scores, check_winner, update_controls};
use super::reinforce::{trim_excess_units, units_to_place};
use super::retreat::process_retreats;
use super::siege::{announce_retreats, interrupt_sieges, resolve_sieges};
use super::support::{filter_convoys, filter_supports, filter_unreachable_attacks};

/// Computes the (season, phase) following `phase`, ignoring game over.
pub fn next_phase(season: Season, phase: Phase, has_retreats: bool) -> (Season, Phase) {
    match phase {
        Phase::Inactive => (season, Phase::Inactive),
        Phase::Reinforce => (season, Phase::Orders),
        Phase::Orders if has_retreats => (season, Phase::Retreats),
        Phase::Orders | Phase::Retreats => {
            let (next, _) = season.next();
            let phase = if next == Season::Spring {
                Phase::Reinforce
            } else {
                Phase::Orders
            };
            (next, phase)
        }
    }
}

/// Adjudicates the orders of the current phase.
///
/// Steps run in a fixed order; each one sees the orders left by the previous.
/// Orders still present afterwards had no effect and are cleared.
pub fn process_orders(game: &mut Game, events: &mut Vec<Event>) {
    log::debug!(
        "processing {} orders, {} {:?}",
        game.orders.len(),
        game.year,
        game.season
    );
    interrupt_sieges(game);
    resolve_auto_garrisons(game, events);
    filter_supports(game, events);
    filter_convoys(game);
    filter_unreachable_attacks(game);
    resolve_conflicts(game, events);
    resolve_sieges(game, events);
    announce_retreats(game, events);
    game.orders.clear();
}

/// The turn state machine, parameterised by the engine configuration.
pub struct TurnMachine<'a> {
    config: &'a EngineConfig,
}

impl<'a> TurnMachine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        TurnMachine { config }
    }

    /// Marks a player done and, once every player is done, resolves the
    /// phase. Marking an already-done player, or any player of a finished
    /// game, changes nothing.
    pub fn mark_done(
        &self,
        game: &mut Game,
        player: PlayerId,
        now: u64,
    ) -> Result<Vec<Event>, OrderError> {
        let Some(p) = game.player(player) else {
            return Err(OrderError::UnknownPlayer(player));
        };
        if game.phase == Phase::Inactive || p.done {
            return Ok(Vec::new());
        }
        if game.phase == Phase::Reinforce {
            let quota = units_to_place(game, player);
            if quota < 0 {
                return Err(OrderError::PendingDisbands(quota.unsigned_abs()));
            }
        }
        if let Some(p) = game.players.get_mut(player.0 as usize) {
            p.done = true;
        }
        if game.players.iter().all(|p| p.done) {
            Ok(self.advance(game, now))
        } else {
            Ok(Vec::new())
        }
    }

    /// Resolves the current phase and moves on to the next one.
    pub fn advance(&self, game: &mut Game, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        match game.phase {
            Phase::Inactive => return events,
            Phase::Reinforce => {}
            Phase::Orders => process_orders(game, &mut events),
            Phase::Retreats => process_retreats(game, &mut events),
        }

        let (season, phase) = next_phase(game.season, game.phase, game.has_retreats());
        if phase == Phase::Retreats {
            self.enter(game, phase, now, &mut events);
            return events;
        }
        if game.phase != Phase::Reinforce {
            if game.season == Season::Fall && self.end_of_year(game, &mut events) {
                return events;
            }
            self.next_season(game, season, &mut events);
        }
        self.enter(game, phase, now, &mut events);
        events
    }

    /// Applies default actions for every player who is not done, then
    /// resolves the phase.
    pub fn force_phase_change(&self, game: &mut Game, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if game.phase == Phase::Inactive {
            return events;
        }
        log::info!("forcing end of {:?} phase, {} {:?}", game.phase, game.year, game.season);
        events.push(game.event(EventKind::ForcePhase));

        let waiting: Vec<PlayerId> = game
            .players
            .iter()
            .filter(|p| !p.done)
            .map(|p| p.id)
            .collect();
        for player in waiting {
            match game.phase {
                Phase::Reinforce => trim_excess_units(game, player, &mut events),
                Phase::Retreats => {
                    let stranded: Vec<_> = game
                        .units_of(player)
                        .filter(|u| u.must_retreat.is_some() && !game.retreats.contains_key(&u.id))
                        .map(|u| u.id)
                        .collect();
                    for id in stranded {
                        game.disband(id, &mut events);
                    }
                }
                _ => {}
            }
            if let Some(p) = game.players.get_mut(player.0 as usize) {
                p.done = true;
            }
        }
        events.extend(self.advance(game, now));
        events
    }

    /// Forces the phase if it has been open longer than the time limit.
    pub fn check_time_limit(&self, game: &mut Game, now: u64) -> Vec<Event> {
        if game.phase == Phase::Inactive {
            return Vec::new();
        }
        let elapsed = now.saturating_sub(game.last_phase_change);
        if elapsed < self.config.time_limit_secs {
            return Vec::new();
        }
        self.force_phase_change(game, now)
    }

    /// Settles control after Fall and ends the game if someone has won.
    /// Returns true if the game is over.
    fn end_of_year(&self, game: &mut Game, events: &mut Vec<Event>) -> bool {
        update_controls(game, events);
        if !check_winner(game, self.config) {
            return false;
        }
        let scores = assign_scores(game, self.config);
        log::info!("game over in {}: {:?}", game.year, scores);
        events.push(game.event(EventKind::GameOver { scores }));
        game.phase = Phase::Inactive;
        true
    }

    fn next_season(&self, game: &mut Game, season: Season, events: &mut Vec<Event>) {
        if season == Season::Spring {
            game.year += 1;
        }
        game.season = season;
        for unit in game.units.values_mut() {
            unit.must_retreat = None;
        }
        for area in &mut game.areas {
            area.standoff = false;
        }
        events.push(game.event(EventKind::NewSeason {
            year: game.year,
            season,
        }));
    }

    fn enter(&self, game: &mut Game, phase: Phase, now: u64, events: &mut Vec<Event>) {
        log::debug!("{} {:?}: entering {:?}", game.year, game.season, phase);
        game.phase = phase;
        game.last_phase_change = now;
        for p in &mut game.players {
            p.done = p.is_autonomous();
        }
        events.push(game.event(EventKind::NewPhase { phase }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixture::{self, area, unit, MILAN, NAPLES, VENICE};
    use crate::board::{Order, OrderKind, RetreatOrder, UnitType};

    fn all_done(machine: &TurnMachine, game: &mut Game, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for p in [MILAN, NAPLES, VENICE] {
            events.extend(machine.mark_done(game, p, now).unwrap());
        }
        events
    }

    #[test]
    fn phase_cycle() {
        assert_eq!(
            next_phase(Season::Spring, Phase::Reinforce, false),
            (Season::Spring, Phase::Orders)
        );
        assert_eq!(
            next_phase(Season::Spring, Phase::Orders, true),
            (Season::Spring, Phase::Retreats)
        );
        assert_eq!(
            next_phase(Season::Spring, Phase::Orders, false),
            (Season::Summer, Phase::Orders)
        );
        assert_eq!(
            next_phase(Season::Summer, Phase::Retreats, false),
            (Season::Fall, Phase::Orders)
        );
        assert_eq!(
            next_phase(Season::Fall, Phase::Orders, false),
            (Season::Spring, Phase::Reinforce)
        );
        assert_eq!(
            next_phase(Season::Fall, Phase::Inactive, false),
            (Season::Fall, Phase::Inactive)
        );
    }

    #[test]
    fn barrier_waits_for_every_player() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();

        assert!(machine.mark_done(&mut game, MILAN, 5).unwrap().is_empty());
        assert!(machine.mark_done(&mut game, NAPLES, 5).unwrap().is_empty());
        // Marking twice is a no-op.
        assert!(machine.mark_done(&mut game, NAPLES, 5).unwrap().is_empty());
        assert_eq!(game.season, Season::Spring);

        let events = machine.mark_done(&mut game, VENICE, 5).unwrap();
        assert_eq!(game.season, Season::Summer);
        assert_eq!(game.phase, Phase::Orders);
        assert_eq!(game.last_phase_change, 5);
        assert!(game.players.iter().filter(|p| !p.is_autonomous()).all(|p| !p.done));
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::NewPhase { phase: Phase::Orders })));
    }

    #[test]
    fn unknown_player_is_rejected() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        assert_eq!(
            machine.mark_done(&mut game, PlayerId(9), 0),
            Err(OrderError::UnknownPlayer(PlayerId(9)))
        );
    }

    #[test]
    fn orders_phase_resolves_and_clears() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        let pad = area(&game, "PAD");
        game.orders.insert(a, Order::new(a, OrderKind::Advance { dest: pad }));

        let events = all_done(&machine, &mut game, 10);
        assert_eq!(game.unit(a).unwrap().area, pad);
        assert!(game.orders.is_empty());
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::Movement { .. })));
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::NewSeason { season: Season::Summer, .. })));
    }

    #[test]
    fn dislodgement_opens_retreats_then_next_season() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "PAD", MILAN);
        let b = unit(&mut game, UnitType::Army, "VEN", VENICE);
        let c = unit(&mut game, UnitType::Army, "TRE", VENICE);
        let (pad, ven, tus) = (area(&game, "PAD"), area(&game, "VEN"), area(&game, "TUS"));
        game.orders.insert(b, Order::new(b, OrderKind::Advance { dest: pad }));
        game.orders.insert(
            c,
            Order::new(
                c,
                OrderKind::Support {
                    target: crate::board::SubOrder {
                        unit_type: UnitType::Army,
                        origin: ven,
                        action: crate::board::SubAction::Advance(pad),
                    },
                },
            ),
        );

        all_done(&machine, &mut game, 1);
        assert_eq!(game.phase, Phase::Retreats);
        assert_eq!(game.season, Season::Spring);
        assert_eq!(game.unit(a).unwrap().must_retreat, Some(ven));

        game.retreats.insert(a, RetreatOrder { unit: a, area: Some(tus) });
        all_done(&machine, &mut game, 2);
        assert_eq!(game.phase, Phase::Orders);
        assert_eq!(game.season, Season::Summer);
        assert_eq!(game.unit(a).unwrap().area, tus);
    }

    #[test]
    fn fall_rolls_year_into_reinforcements() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        game.season = Season::Fall;
        unit(&mut game, UnitType::Army, "PAD", MILAN);

        let events = all_done(&machine, &mut game, 3);
        assert_eq!(game.year, 1455);
        assert_eq!(game.season, Season::Spring);
        assert_eq!(game.phase, Phase::Reinforce);
        assert_eq!(game.area(area(&game, "PAD")).controller, Some(MILAN));
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::Control { .. })));
    }

    #[test]
    fn standoff_markers_clear_with_the_season() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        let pad = area(&game, "PAD");
        game.area_mut(pad).standoff = true;
        all_done(&machine, &mut game, 0);
        assert!(!game.area(pad).standoff);
    }

    #[test]
    fn victory_ends_the_game() {
        let config = EngineConfig {
            cities_to_win: Some(2),
            ..EngineConfig::default()
        };
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        game.season = Season::Fall;
        unit(&mut game, UnitType::Army, "MIL", MILAN);
        unit(&mut game, UnitType::Fleet, "GEN", MILAN);

        let events = all_done(&machine, &mut game, 0);
        assert_eq!(game.phase, Phase::Inactive);
        assert_eq!(game.players[MILAN.0 as usize].score, 20);
        assert!(matches!(
            &events.last().unwrap().kind,
            EventKind::GameOver { scores } if scores[0].country == "milan"
        ));

        // A finished game ignores further input.
        assert!(machine.mark_done(&mut game, MILAN, 1).unwrap().is_empty());
        assert!(machine.advance(&mut game, 1).is_empty());
    }

    #[test]
    fn reinforce_done_requires_disbands() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        game.phase = Phase::Reinforce;
        unit(&mut game, UnitType::Army, "PAD", VENICE);
        assert_eq!(
            machine.mark_done(&mut game, VENICE, 0),
            Err(OrderError::PendingDisbands(1))
        );
    }

    #[test]
    fn time_limit_forces_the_phase() {
        let config = EngineConfig {
            time_limit_secs: 100,
            ..EngineConfig::default()
        };
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        game.phase = Phase::Reinforce;
        let old = unit(&mut game, UnitType::Army, "PAD", VENICE);
        let new = unit(&mut game, UnitType::Army, "TUS", VENICE);
        machine.mark_done(&mut game, MILAN, 0).unwrap();

        assert!(machine.check_time_limit(&mut game, 99).is_empty());
        let events = machine.check_time_limit(&mut game, 100);
        assert!(matches!(events[0].kind, EventKind::ForcePhase));
        assert!(game.unit(old).is_none() && game.unit(new).is_none());
        assert_eq!(game.phase, Phase::Orders);
        assert_eq!(game.last_phase_change, 100);
    }

    #[test]
    fn forced_retreats_disband_unordered_units() {
        let config = EngineConfig::default();
        let machine = TurnMachine::new(&config);
        let mut game = fixture::game();
        game.phase = Phase::Retreats;
        let a = unit(&mut game, UnitType::Army, "TUS", MILAN);
        let b = unit(&mut game, UnitType::Army, "PAD", VENICE);
        let (rom, mil, ven) = (area(&game, "ROM"), area(&game, "MIL"), area(&game, "VEN"));
        game.units.get_mut(&a).unwrap().must_retreat = Some(rom);
        game.units.get_mut(&b).unwrap().must_retreat = Some(ven);
        game.retreats.insert(a, RetreatOrder { unit: a, area: Some(mil) });

        machine.force_phase_change(&mut game, 50);
        assert_eq!(game.unit(a).unwrap().area, mil);
        assert!(game.unit(b).is_none());
        assert_eq!(game.phase, Phase::Orders);
        assert_eq!(game.season, Season::Summer);
    }
}
