//! Orders-phase validation.
//!
//! Turns a submitted `OrderRequest` into an `Order`, checking that the
//! request is complete and that the order is possible under the rules:
//! terrain, adjacency and unit-type capability. Illegal orders are refused,
//! never downgraded; a unit without an order holds.

use serde::{Deserialize, Serialize};

use crate::board::{
    AreaId, Game, Order, OrderCode, OrderKind, Phase, PlayerId, SubAction, SubOrder, Unit, UnitId,
    UnitType,
};
use crate::event::{Event, EventKind};

use super::OrderError;

/// An order as submitted by a player. Areas are given by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub unit_id: UnitId,
    pub code: OrderCode,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub conversion_type: Option<UnitType>,
    #[serde(default)]
    pub sub_unit_id: Option<UnitId>,
    #[serde(default)]
    pub sub_code: Option<OrderCode>,
    #[serde(default)]
    pub sub_destination: Option<String>,
    #[serde(default)]
    pub sub_conversion_type: Option<UnitType>,
}

impl OrderRequest {
    pub fn new(unit_id: UnitId, code: OrderCode) -> Self {
        OrderRequest {
            unit_id,
            code,
            destination: None,
            conversion_type: None,
            sub_unit_id: None,
            sub_code: None,
            sub_destination: None,
            sub_conversion_type: None,
        }
    }

    pub fn to(mut self, destination: &str) -> Self {
        self.destination = Some(destination.to_string());
        self
    }

    pub fn into_type(mut self, unit_type: UnitType) -> Self {
        self.conversion_type = Some(unit_type);
        self
    }

    /// Names the unit supported or convoyed and what it is doing.
    pub fn sub(mut self, unit_id: UnitId, code: OrderCode) -> Self {
        self.sub_unit_id = Some(unit_id);
        self.sub_code = Some(code);
        self
    }

    pub fn sub_to(mut self, destination: &str) -> Self {
        self.sub_destination = Some(destination.to_string());
        self
    }

    pub fn sub_into(mut self, unit_type: UnitType) -> Self {
        self.sub_conversion_type = Some(unit_type);
        self
    }
}

fn area_by_code(game: &Game, code: &str) -> Result<AreaId, OrderError> {
    game.scenario
        .area_id(code)
        .ok_or_else(|| OrderError::UnknownArea(code.to_string()))
}

fn require<T>(value: Option<T>, code: OrderCode, field: &'static str) -> Result<T, OrderError> {
    value.ok_or(OrderError::MissingField { code, field })
}

/// Builds the order described by a request, without legality checks.
pub fn build_order(game: &Game, req: &OrderRequest) -> Result<Order, OrderError> {
    let code = req.code;
    let kind = match code {
        OrderCode::Hold => OrderKind::Hold,
        OrderCode::Besiege => OrderKind::Besiege,
        OrderCode::Advance => {
            let dest = require(req.destination.as_deref(), code, "destination")?;
            OrderKind::Advance {
                dest: area_by_code(game, dest)?,
            }
        }
        OrderCode::Convert => OrderKind::Convert {
            into: require(req.conversion_type, code, "conversion type")?,
        },
        OrderCode::Convoy => OrderKind::Convoy {
            target: build_sub_order(game, req)?,
        },
        OrderCode::Support => OrderKind::Support {
            target: build_sub_order(game, req)?,
        },
    };
    Ok(Order::new(req.unit_id, kind))
}

/// Describes the helped unit from its current type and area.
fn build_sub_order(game: &Game, req: &OrderRequest) -> Result<SubOrder, OrderError> {
    let code = req.code;
    let sub_id = require(req.sub_unit_id, code, "sub-unit")?;
    let sub = game.unit(sub_id).ok_or(OrderError::UnknownUnit(sub_id))?;
    let sub_code = match code {
        OrderCode::Convoy => req.sub_code.unwrap_or(OrderCode::Advance),
        _ => require(req.sub_code, code, "sub-order code")?,
    };
    let action = match sub_code {
        OrderCode::Hold => SubAction::Hold,
        OrderCode::Besiege => SubAction::Besiege,
        OrderCode::Advance => {
            let dest = require(req.sub_destination.as_deref(), code, "sub-order destination")?;
            SubAction::Advance(area_by_code(game, dest)?)
        }
        OrderCode::Convert => {
            SubAction::Convert(require(req.sub_conversion_type, code, "sub-order conversion type")?)
        }
        OrderCode::Convoy | OrderCode::Support => {
            return Err(OrderError::Illegal {
                order: format!("{} {}", code, sub_code),
                reason: "a sub-order must be a hold, besiege, advance or conversion",
            })
        }
    };
    Ok(SubOrder {
        unit_type: sub.unit_type,
        origin: sub.area,
        action,
    })
}

/// Checks an order against the rules. Returns the reason it is impossible.
pub fn check_legal(game: &Game, unit: &Unit, kind: &OrderKind) -> Result<(), &'static str> {
    let scenario = &game.scenario;
    let here = scenario.area(unit.area);
    match *kind {
        OrderKind::Hold => Ok(()),
        OrderKind::Advance { dest } => {
            if dest == unit.area {
                return Err("a unit cannot advance into its own area");
            }
            let target = scenario.area(dest);
            match unit.unit_type {
                UnitType::Army => {
                    if target.is_sea {
                        Err("armies cannot advance into the sea")
                    } else if scenario.is_adjacent(unit.area, dest, false) || target.is_coast {
                        Ok(())
                    } else {
                        Err("destination is neither adjacent nor reachable by convoy")
                    }
                }
                UnitType::Fleet => {
                    if !(target.is_sea || target.is_coast) {
                        Err("fleets cannot advance inland")
                    } else if scenario.is_adjacent(unit.area, dest, true) {
                        Ok(())
                    } else {
                        Err("destination is not adjacent")
                    }
                }
                UnitType::Garrison => Err("garrisons cannot advance"),
            }
        }
        OrderKind::Besiege => {
            if !unit.unit_type.is_mobile() {
                return Err("only armies and fleets can besiege");
            }
            if !here.is_fortified {
                return Err("there is no fortified city to besiege");
            }
            match game.garrison_in(unit.area) {
                Some(g) if g.player != unit.player => Ok(()),
                Some(_) => Err("cannot besiege an own garrison"),
                None => Err("there is no garrison to besiege"),
            }
        }
        OrderKind::Convert { into } => {
            if into == unit.unit_type {
                return Err("a unit must convert into a different type");
            }
            if !here.is_fortified {
                return Err("conversion needs a fortified city");
            }
            match (unit.unit_type, into) {
                (UnitType::Garrison, UnitType::Army) if !here.is_sea => Ok(()),
                (UnitType::Garrison, UnitType::Fleet) if here.has_port => Ok(()),
                (UnitType::Garrison, _) => Err("the city cannot hold that unit type"),
                (_, UnitType::Garrison) if game.garrison_in(unit.area).is_some() => {
                    Err("the city already has a garrison")
                }
                (UnitType::Army, UnitType::Garrison) => Ok(()),
                (UnitType::Fleet, UnitType::Garrison) if here.has_port => Ok(()),
                _ => Err("the unit cannot convert into that type"),
            }
        }
        OrderKind::Convoy { target } => {
            if unit.unit_type != UnitType::Fleet || !here.is_sea {
                return Err("only fleets at sea can convoy");
            }
            match (target.unit_type, target.action) {
                (UnitType::Army, SubAction::Advance(_)) => Ok(()),
                _ => Err("only advancing armies can be convoyed"),
            }
        }
        OrderKind::Support { target } => {
            let supported = match target.action {
                SubAction::Advance(dest) => dest,
                _ => target.origin,
            };
            match unit.unit_type {
                UnitType::Garrison => match target.action {
                    SubAction::Advance(dest) if dest == unit.area => Ok(()),
                    SubAction::Hold if target.origin == unit.area => Ok(()),
                    _ => Err("garrisons only support within their own city"),
                },
                UnitType::Fleet => {
                    let area = scenario.area(supported);
                    if (area.is_sea || area.is_coast)
                        && scenario.is_adjacent(unit.area, supported, true)
                    {
                        Ok(())
                    } else {
                        Err("fleets support only adjacent seas and coasts")
                    }
                }
                UnitType::Army => {
                    if !scenario.area(supported).is_sea
                        && scenario.is_adjacent(unit.area, supported, false)
                    {
                        Ok(())
                    } else {
                        Err("armies support only adjacent land")
                    }
                }
            }
        }
    }
}

/// Validates and records an order, returning the echo event.
pub fn submit_order(
    game: &mut Game,
    player: PlayerId,
    req: &OrderRequest,
) -> Result<Event, OrderError> {
    if game.phase != Phase::Orders {
        return Err(OrderError::WrongPhase(game.phase));
    }
    let p = game.player(player).ok_or(OrderError::UnknownPlayer(player))?;
    if p.done {
        return Err(OrderError::AlreadyDone);
    }
    let unit = game
        .unit(req.unit_id)
        .ok_or(OrderError::UnknownUnit(req.unit_id))?;
    if unit.player != player {
        return Err(OrderError::NotOwner(unit.id));
    }
    if game.orders.contains_key(&unit.id) {
        return Err(OrderError::AlreadyOrdered(unit.id));
    }
    if req.sub_unit_id == Some(unit.id) {
        return Err(OrderError::Illegal {
            order: format!("{} {}", unit.unit_type.code(), game.scenario.code(unit.area)),
            reason: "a unit cannot support or convoy itself",
        });
    }

    let order = build_order(game, req)?;
    let notation = order.notation(unit.unit_type, unit.area, &game.scenario);
    check_legal(game, unit, &order.kind).map_err(|reason| OrderError::Illegal {
        order: notation.clone(),
        reason,
    })?;

    log::debug!("accepted order {}", notation);
    let country = game.country(player);
    game.orders.insert(order.unit, order);
    Ok(game.event(EventKind::Order {
        country,
        order: notation,
    }))
}

/// Deletes a player's pending order for one of its units.
pub fn withdraw_order(game: &mut Game, player: PlayerId, unit: UnitId) -> Result<(), OrderError> {
    if game.phase != Phase::Orders {
        return Err(OrderError::WrongPhase(game.phase));
    }
    let owner = game.unit(unit).ok_or(OrderError::UnknownUnit(unit))?.player;
    if owner != player {
        return Err(OrderError::NotOwner(unit));
    }
    game.orders
        .remove(&unit)
        .map(|_| ())
        .ok_or(OrderError::NoOrder(unit))
}

/// Candidate sub-actions a unit could be helped with.
fn sub_actions(game: &Game) -> Vec<SubAction> {
    let mut actions = vec![SubAction::Hold, SubAction::Besiege];
    actions.extend(game.scenario.areas().iter().map(|a| SubAction::Advance(a.id)));
    actions.extend(
        [UnitType::Army, UnitType::Fleet, UnitType::Garrison]
            .into_iter()
            .map(SubAction::Convert),
    );
    actions
}

fn sub_action_kind(action: SubAction) -> OrderKind {
    match action {
        SubAction::Hold => OrderKind::Hold,
        SubAction::Besiege => OrderKind::Besiege,
        SubAction::Advance(dest) => OrderKind::Advance { dest },
        SubAction::Convert(into) => OrderKind::Convert { into },
    }
}

/// Enumerates every legal order for a unit in the current state.
///
/// Supports and convoys are only generated for sub-orders the helped unit
/// could legally give itself.
pub fn legal_orders(game: &Game, id: UnitId) -> Vec<Order> {
    let Some(unit) = game.unit(id) else {
        return Vec::new();
    };
    let mut kinds = vec![OrderKind::Hold, OrderKind::Besiege];
    kinds.extend(
        game.scenario
            .areas()
            .iter()
            .map(|a| OrderKind::Advance { dest: a.id }),
    );
    kinds.extend(
        [UnitType::Army, UnitType::Fleet, UnitType::Garrison]
            .into_iter()
            .map(|into| OrderKind::Convert { into }),
    );

    let actions = sub_actions(game);
    for other in game.units.values().filter(|u| u.id != id) {
        for &action in &actions {
            if check_legal(game, other, &sub_action_kind(action)).is_err() {
                continue;
            }
            let target = SubOrder {
                unit_type: other.unit_type,
                origin: other.area,
                action,
            };
            kinds.push(OrderKind::Support { target });
            kinds.push(OrderKind::Convoy { target });
        }
    }

    kinds
        .into_iter()
        .filter(|k| check_legal(game, unit, k).is_ok())
        .map(|kind| Order::new(id, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixture::{self, unit, AUTONOMOUS, MILAN, NAPLES, VENICE};

    fn submit(game: &mut Game, player: PlayerId, req: OrderRequest) -> Result<Event, OrderError> {
        submit_order(game, player, &req)
    }

    fn illegal(result: Result<Event, OrderError>) -> bool {
        matches!(result, Err(OrderError::Illegal { .. }))
    }

    #[test]
    fn accepted_order_is_echoed() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        let event = submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Advance).to("PAD")).unwrap();
        assert!(matches!(
            &event.kind,
            EventKind::Order { country: Some(c), order } if c == "milan" && order == "A MIL - PAD"
        ));
        assert!(game.orders.contains_key(&a));
    }

    #[test]
    fn submission_preconditions() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);

        assert_eq!(
            submit(&mut game, VENICE, OrderRequest::new(a, OrderCode::Hold)),
            Err(OrderError::NotOwner(a))
        );
        assert_eq!(
            submit(&mut game, MILAN, OrderRequest::new(UnitId(99), OrderCode::Hold)),
            Err(OrderError::UnknownUnit(UnitId(99)))
        );
        submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Hold)).unwrap();
        assert_eq!(
            submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Hold)),
            Err(OrderError::AlreadyOrdered(a))
        );

        game.phase = Phase::Retreats;
        assert_eq!(
            submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Hold)),
            Err(OrderError::WrongPhase(Phase::Retreats))
        );
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        assert!(matches!(
            submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Advance)),
            Err(OrderError::MissingField { field: "destination", .. })
        ));
        assert!(matches!(
            submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Support)),
            Err(OrderError::MissingField { field: "sub-unit", .. })
        ));
        assert_eq!(
            submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Advance).to("XXX")),
            Err(OrderError::UnknownArea("XXX".to_string()))
        );
    }

    #[test]
    fn army_advance_rules() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        let b = unit(&mut game, UnitType::Army, "GEN", MILAN);
        let c = unit(&mut game, UnitType::Army, "PAD", MILAN);
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Advance).to("LIG"))));
        // Not adjacent and not coastal.
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Advance).to("SIE"))));
        // Coastal destinations may be reached by convoy.
        assert!(submit(&mut game, MILAN, OrderRequest::new(b, OrderCode::Advance).to("ROM")).is_ok());
        assert!(submit(&mut game, MILAN, OrderRequest::new(c, OrderCode::Advance).to("VEN")).is_ok());
    }

    #[test]
    fn fleet_and_garrison_advance_rules() {
        let mut game = fixture::game();
        let f = unit(&mut game, UnitType::Fleet, "ROM", NAPLES);
        let g = unit(&mut game, UnitType::Garrison, "NAP", NAPLES);
        // Joined by land only.
        assert!(illegal(submit(&mut game, NAPLES, OrderRequest::new(f, OrderCode::Advance).to("NAP"))));
        assert!(illegal(submit(&mut game, NAPLES, OrderRequest::new(f, OrderCode::Advance).to("SIE"))));
        assert!(illegal(submit(&mut game, NAPLES, OrderRequest::new(g, OrderCode::Advance).to("ROM"))));
        assert!(submit(&mut game, NAPLES, OrderRequest::new(f, OrderCode::Advance).to("TYR")).is_ok());
    }

    #[test]
    fn besiege_needs_foreign_garrison() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "SIE", MILAN);
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Besiege))));
        unit(&mut game, UnitType::Garrison, "SIE", AUTONOMOUS);
        assert!(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Besiege)).is_ok());

        let b = unit(&mut game, UnitType::Army, "MIL", MILAN);
        unit(&mut game, UnitType::Garrison, "MIL", MILAN);
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(b, OrderCode::Besiege))));
    }

    #[test]
    fn conversion_rules() {
        let mut game = fixture::game();
        let g = unit(&mut game, UnitType::Garrison, "MIL", MILAN);
        let f = unit(&mut game, UnitType::Fleet, "GEN", MILAN);
        let a = unit(&mut game, UnitType::Army, "PAD", MILAN);
        // No port in Milan.
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(g, OrderCode::Convert).into_type(UnitType::Fleet))));
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Convert).into_type(UnitType::Garrison))));
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(f, OrderCode::Convert).into_type(UnitType::Fleet))));
        assert!(submit(&mut game, MILAN, OrderRequest::new(g, OrderCode::Convert).into_type(UnitType::Army)).is_ok());
        assert!(submit(&mut game, MILAN, OrderRequest::new(f, OrderCode::Convert).into_type(UnitType::Garrison)).is_ok());
    }

    #[test]
    fn conversion_blocked_by_existing_garrison() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "SIE", MILAN);
        unit(&mut game, UnitType::Garrison, "SIE", AUTONOMOUS);
        assert!(illegal(submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Convert).into_type(UnitType::Garrison))));
    }

    #[test]
    fn convoy_rules() {
        let mut game = fixture::game();
        let f = unit(&mut game, UnitType::Fleet, "LIG", MILAN);
        let coast = unit(&mut game, UnitType::Fleet, "GEN", MILAN);
        let a = unit(&mut game, UnitType::Army, "TUS", MILAN);
        let req = |u| OrderRequest::new(u, OrderCode::Convoy).sub(a, OrderCode::Advance).sub_to("GEN");
        assert!(illegal(submit(&mut game, MILAN, req(coast))));
        let event = submit(&mut game, MILAN, req(f)).unwrap();
        assert!(matches!(&event.kind, EventKind::Order { order, .. } if order == "F LIG C A TUS - GEN"));
    }

    #[test]
    fn support_rules() {
        let mut game = fixture::game();
        let f = unit(&mut game, UnitType::Fleet, "NAP", NAPLES);
        let a = unit(&mut game, UnitType::Army, "ROM", NAPLES);
        let g = unit(&mut game, UnitType::Garrison, "SIE", NAPLES);
        let far = unit(&mut game, UnitType::Army, "VEN", NAPLES);

        let support = |u| OrderRequest::new(u, OrderCode::Support).sub(a, OrderCode::Advance).sub_to("TUS");
        // NAP is not adjacent to TUS.
        assert!(illegal(submit(&mut game, NAPLES, support(f))));
        assert!(illegal(submit(&mut game, NAPLES, support(far))));
        // A garrison only supports into its own city.
        assert!(illegal(submit(&mut game, NAPLES, support(g))));
        let into_siena = OrderRequest::new(g, OrderCode::Support).sub(a, OrderCode::Advance).sub_to("SIE");
        assert!(submit(&mut game, NAPLES, into_siena).is_ok());

        let hold = OrderRequest::new(f, OrderCode::Support).sub(a, OrderCode::Hold);
        // ROM and NAP are joined by land only.
        assert!(illegal(submit(&mut game, NAPLES, hold)));
        let hold = OrderRequest::new(far, OrderCode::Support).sub(a, OrderCode::Hold);
        assert!(illegal(submit(&mut game, NAPLES, hold)));
    }

    #[test]
    fn cannot_support_itself() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "ROM", NAPLES);
        let req = OrderRequest::new(a, OrderCode::Support).sub(a, OrderCode::Hold);
        assert!(illegal(submit(&mut game, NAPLES, req)));
    }

    #[test]
    fn withdraw_removes_own_order() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        submit(&mut game, MILAN, OrderRequest::new(a, OrderCode::Hold)).unwrap();
        assert_eq!(withdraw_order(&mut game, VENICE, a), Err(OrderError::NotOwner(a)));
        withdraw_order(&mut game, MILAN, a).unwrap();
        assert!(game.orders.is_empty());
        assert_eq!(withdraw_order(&mut game, MILAN, a), Err(OrderError::NoOrder(a)));
    }

    #[test]
    fn legal_orders_include_hold_and_adjacent_moves() {
        let mut game = fixture::game();
        let a = unit(&mut game, UnitType::Army, "MIL", MILAN);
        let orders = legal_orders(&game, a);
        assert!(orders.contains(&Order::new(a, OrderKind::Hold)));
        let pad = game.scenario.area_id("PAD").unwrap();
        assert!(orders.contains(&Order::new(a, OrderKind::Advance { dest: pad })));
        assert!(orders.iter().all(|o| check_legal(&game, game.unit(a).unwrap(), &o.kind).is_ok()));
    }

    #[test]
    fn request_deserializes_from_json() {
        let req: OrderRequest = serde_json::from_str(
            r#"{"unit_id": 3, "code": "S", "sub_unit_id": 4, "sub_code": "-", "sub_destination": "TUS"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            OrderRequest::new(UnitId(3), OrderCode::Support)
                .sub(UnitId(4), OrderCode::Advance)
                .sub_to("TUS")
        );
    }
}
