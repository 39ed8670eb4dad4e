//! Area control, victory and scoring.
//!
//! Control is settled at the end of each Fall: an area occupied by the units
//! of a single (non-autonomous) player passes to that player, an area shared
//! by two players loses its controller.

use std::collections::BTreeSet;

use crate::board::{AreaId, Game, PlayerId};
use crate::config::EngineConfig;
use crate::event::{EventKind, Event, PlayerScore};

/// Updates the controller of every occupied controllable area.
pub fn update_controls(game: &mut Game, events: &mut Vec<Event>) {
    for i in 0..game.areas.len() {
        let area = AreaId(i as u16);
        if !game.scenario.area(area).is_controllable() {
            continue;
        }
        let present: BTreeSet<PlayerId> = game.units_in(area).map(|u| u.player).collect();
        match present.len() {
            0 => {}
            1 => {
                let Some(&player) = present.first() else {
                    continue;
                };
                if game.is_autonomous(player) || game.area(area).controller == Some(player) {
                    continue;
                }
                game.area_mut(area).controller = Some(player);
                if let Some(country) = game.country(player) {
                    events.push(game.event(EventKind::Control {
                        country,
                        area: game.code(area),
                    }));
                }
            }
            2 => game.area_mut(area).controller = None,
            n => log::warn!(
                "{} players share area {}, control unchanged",
                n,
                game.scenario.code(area)
            ),
        }
    }
}

/// Number of cities a player needs to win this game.
pub fn cities_to_win(game: &Game, config: &EngineConfig) -> u32 {
    config.cities_to_win.unwrap_or(game.scenario.cities_to_win)
}

/// Returns true once a player controls enough cities to win.
pub fn check_winner(game: &Game, config: &EngineConfig) -> bool {
    let target = cities_to_win(game, config);
    game.players
        .iter()
        .filter(|p| !p.is_autonomous())
        .any(|p| game.cities_of(p.id) >= target)
}

/// Scores the players by city count and returns the final table.
///
/// Players with the same number of cities share a tier; each tier takes the
/// next entry of the configured scores, tiers past the end get nothing.
pub fn assign_scores(game: &mut Game, config: &EngineConfig) -> Vec<PlayerScore> {
    let mut standings: Vec<(PlayerId, u32)> = game
        .players
        .iter()
        .filter(|p| !p.is_autonomous())
        .map(|p| (p.id, game.cities_of(p.id)))
        .collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut table = Vec::with_capacity(standings.len());
    let mut tier = 0;
    let mut previous: Option<u32> = None;
    for (player, cities) in standings {
        if previous.is_some_and(|c| c != cities) {
            tier += 1;
        }
        previous = Some(cities);
        let score = config.scores.get(tier).copied().unwrap_or(0);
        if let Some(p) = game.players.get_mut(player.0 as usize) {
            p.score = score;
            table.push(PlayerScore {
                country: p.country.clone().unwrap_or_default(),
                cities,
                score,
            });
        }
    }
    table
}
