use super::push_resources_updated;
use crate::games_service::game::game_state::{GameState, TradeProposal};
use crate::games_service::game::resources::{Resource, ResourceCount};
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::shared::shared_models::{GameError, ServiceError};
use crate::shared::utility::{get_id, now_ms};

/**
 *  player-to-player proposals plus the two maritime forms.  one proposal
 *  may be active at a time; acceptance re-validates both hands and moves
 *  the cards atomically -- a stale proposal that either side can no longer
 *  cover simply fails for the accepter.
 */

pub fn propose(
    state: &mut GameState,
    player_id: &str,
    offering: &ResourceCount,
    requesting: &ResourceCount,
    target_id: Option<&str>,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    if state.active_trade.is_some() {
        return Err(ServiceError::bad_payload("a trade is already active"));
    }
    if offering.is_empty() || requesting.is_empty() {
        return Err(ServiceError::bad_payload(
            "a trade must offer and request at least one card",
        ));
    }
    if !state.player(player_id)?.resources.contains(offering) {
        return Err(ServiceError::cannot_afford(
            "you cannot offer cards you do not hold",
        ));
    }
    if let Some(target) = target_id {
        if target == player_id || !state.has_player(target) {
            return Err(ServiceError::bad_payload("invalid trade target"));
        }
    }

    let trade = TradeProposal {
        id: get_id(),
        proposer_id: player_id.to_owned(),
        target_id: target_id.map(str::to_owned),
        offering: *offering,
        requesting: *requesting,
        created_at: now_ms(),
    };
    events.push(EngineEvent::all(GameEvent::TradeProposed {
        trade: trade.clone(),
    }));
    state.active_trade = Some(trade);
    Ok(())
}

pub fn accept(
    state: &mut GameState,
    accepter_id: &str,
    trade_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let trade = active_trade_matching(state, trade_id)?.clone();
    if trade.proposer_id == accepter_id {
        return Err(ServiceError::bad_payload("you cannot accept your own trade"));
    }
    if let Some(target) = &trade.target_id {
        if target != accepter_id {
            return Err(ServiceError::bad_payload("that trade is not addressed to you"));
        }
    }

    //  both sides must still be able to deliver
    if !state.player(&trade.proposer_id)?.resources.contains(&trade.offering) {
        return Err(ServiceError::cannot_afford(
            "the proposer can no longer cover the offer",
        ));
    }
    if !state.player(accepter_id)?.resources.contains(&trade.requesting) {
        return Err(ServiceError::cannot_afford(
            "you cannot cover the requested cards",
        ));
    }

    //  atomic swap
    {
        let proposer = state.player_mut(&trade.proposer_id)?;
        proposer.resources.subtract(&trade.offering);
        proposer.resources += trade.requesting;
    }
    {
        let accepter = state.player_mut(accepter_id)?;
        accepter.resources.subtract(&trade.requesting);
        accepter.resources += trade.offering;
    }
    state.active_trade = None;

    events.push(EngineEvent::all(GameEvent::TradeAccepted {
        trade_id: trade.id.clone(),
        accepter_id: accepter_id.to_owned(),
    }));
    events.push(EngineEvent::all(GameEvent::TradeCompleted {
        trade_id: Some(trade.id.clone()),
        player_id: trade.proposer_id.clone(),
        partner_id: Some(accepter_id.to_owned()),
        gave: trade.offering,
        received: trade.requesting,
    }));
    push_resources_updated(state, &trade.proposer_id, events);
    push_resources_updated(state, accepter_id, events);
    Ok(())
}

pub fn reject(
    state: &mut GameState,
    player_id: &str,
    trade_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let trade = active_trade_matching(state, trade_id)?;
    if trade.proposer_id == player_id {
        return Err(ServiceError::bad_payload("cancel your own trade instead"));
    }
    if let Some(target) = &trade.target_id {
        if target != player_id {
            return Err(ServiceError::bad_payload("that trade is not addressed to you"));
        }
    }
    state.active_trade = None;
    events.push(EngineEvent::all(GameEvent::TradeRejected {
        trade_id: trade_id.to_owned(),
        rejecter_id: player_id.to_owned(),
    }));
    Ok(())
}

pub fn cancel(
    state: &mut GameState,
    player_id: &str,
    trade_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let trade = active_trade_matching(state, trade_id)?;
    if trade.proposer_id != player_id {
        return Err(ServiceError::bad_payload("only the proposer may cancel"));
    }
    state.active_trade = None;
    events.push(EngineEvent::all(GameEvent::TradeCancelled {
        trade_id: trade_id.to_owned(),
    }));
    Ok(())
}

/// 4:1 with the bank, no port required.
pub fn bank_trade(
    state: &mut GameState,
    player_id: &str,
    give: Resource,
    receive: Resource,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    maritime_trade(state, player_id, give, receive, 4, events)
}

/// Through an owned port: 2:1 on a matching resource port, else 3:1 on a
/// generic one.
pub fn port_trade(
    state: &mut GameState,
    player_id: &str,
    give: Resource,
    receive: Resource,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let ratio = best_port_ratio(state, player_id, give).ok_or_else(|| {
        ServiceError::bad_payload("none of your buildings reaches a usable port")
    })?;
    maritime_trade(state, player_id, give, receive, ratio, events)
}

fn maritime_trade(
    state: &mut GameState,
    player_id: &str,
    give: Resource,
    receive: Resource,
    ratio: u32,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    if give == receive {
        return Err(ServiceError::bad_payload("pick two different resources"));
    }
    if state.bank.get(receive) < 1 {
        return Err(ServiceError::new(
            GameError::BankShortage,
            "the bank has none of that resource",
        ));
    }
    {
        let player = state.player_mut(player_id)?;
        if !player.resources.remove(give, ratio) {
            return Err(ServiceError::cannot_afford(&format!(
                "that trade needs {} {}",
                ratio, give
            )));
        }
        player.resources.add(receive, 1);
    }
    state.bank.add(give, ratio);
    state.bank.remove(receive, 1);

    events.push(EngineEvent::all(GameEvent::TradeCompleted {
        trade_id: None,
        player_id: player_id.to_owned(),
        partner_id: None,
        gave: ResourceCount::single(give, ratio),
        received: ResourceCount::single(receive, 1),
    }));
    push_resources_updated(state, player_id, events);
    Ok(())
}

/// The best exchange rate the player's buildings unlock for a resource.
pub fn best_port_ratio(state: &GameState, player_id: &str, give: Resource) -> Option<u32> {
    let player = state.player(player_id).ok()?;
    let mut best: Option<u32> = None;
    for vertex in player.settlements.iter().chain(player.cities.iter()) {
        if let Some(port) = state.board.port_at_vertex(vertex) {
            if port.kind.accepts(give) {
                let ratio = port.kind.ratio();
                best = Some(best.map_or(ratio, |b| b.min(ratio)));
            }
        }
    }
    best
}

fn active_trade_matching<'a>(
    state: &'a GameState,
    trade_id: &str,
) -> Result<&'a TradeProposal, ServiceError> {
    match &state.active_trade {
        Some(trade) if trade.id == trade_id => Ok(trade),
        Some(_) => Err(ServiceError::bad_payload("that trade is no longer active")),
        None => Err(ServiceError::bad_payload("there is no active trade")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games_service::buildings::BuildingKind;
    use crate::games_service::game::game_enums::TurnPhase;
    use crate::games_service::rules::actions::GameAction;
    use crate::games_service::rules::test_support::*;
    use crate::games_service::rules::{apply, expire_trade};

    fn main_phase_state() -> GameState {
        let mut state = playing_state();
        state.turn_phase = TurnPhase::Main;
        state
    }

    fn brick_for_wool() -> (ResourceCount, ResourceCount) {
        (
            ResourceCount::single(Resource::Brick, 2),
            ResourceCount::single(Resource::Wool, 1),
        )
    }

    #[test]
    fn test_propose_accept_transfers_atomically() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 2));
        give(&mut state, "b", ResourceCount::single(Resource::Wool, 1));

        let (offering, requesting) = brick_for_wool();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade { offering, requesting, target_id: None },
            &mut ctx(1),
        )
        .unwrap();
        let trade_id = state.active_trade.as_ref().unwrap().id.clone();

        let (state, _) = apply(
            &state,
            "b",
            &GameAction::AcceptTrade { trade_id },
            &mut ctx(1),
        )
        .unwrap();
        assert_invariants(&state);
        assert!(state.active_trade.is_none());
        assert_eq!(state.player("a").unwrap().resources.wool, 1);
        assert_eq!(state.player("a").unwrap().resources.brick, 0);
        assert_eq!(state.player("b").unwrap().resources.brick, 2);
        assert_eq!(state.player("b").unwrap().resources.wool, 0);
    }

    #[test]
    fn test_accept_fails_when_accepter_cannot_cover() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 2));

        let (offering, requesting) = brick_for_wool();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade { offering, requesting, target_id: None },
            &mut ctx(1),
        )
        .unwrap();
        let trade_id = state.active_trade.as_ref().unwrap().id.clone();

        let err = apply(&state, "b", &GameAction::AcceptTrade { trade_id }, &mut ctx(1))
            .unwrap_err();
        assert_eq!(err.kind, GameError::CannotAfford);
        //  the proposal survives a failed acceptance
        assert!(state.active_trade.is_some());
    }

    #[test]
    fn test_single_active_trade() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 4));

        let (offering, requesting) = brick_for_wool();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade {
                offering,
                requesting,
                target_id: None,
            },
            &mut ctx(1),
        )
        .unwrap();
        let err = apply(
            &state,
            "a",
            &GameAction::ProposeTrade { offering, requesting, target_id: None },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::InvalidPayload);
    }

    #[test]
    fn test_targeted_trade_locked_to_target() {
        let mut state = playing_state();
        state.turn_phase = TurnPhase::Main;
        state.players.push(crate::games_service::player::PlayerState::new(
            "c",
            "user-c",
            "carol",
            crate::games_service::player::PlayerColor::Orange,
        ));
        state.turn_order.push("c".to_owned());
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 2));
        give(&mut state, "c", ResourceCount::single(Resource::Wool, 1));

        let (offering, requesting) = brick_for_wool();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade {
                offering,
                requesting,
                target_id: Some("c".to_owned()),
            },
            &mut ctx(1),
        )
        .unwrap();
        let trade_id = state.active_trade.as_ref().unwrap().id.clone();

        let err = apply(
            &state,
            "b",
            &GameAction::AcceptTrade { trade_id: trade_id.clone() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::InvalidPayload);

        let (state, _) = apply(&state, "c", &GameAction::AcceptTrade { trade_id }, &mut ctx(1)).unwrap();
        assert_eq!(state.player("c").unwrap().resources.brick, 2);
    }

    #[test]
    fn test_reject_and_cancel_clear_the_trade() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 2));
        let (offering, requesting) = brick_for_wool();

        let (with_trade, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade { offering, requesting, target_id: None },
            &mut ctx(1),
        )
        .unwrap();
        let trade_id = with_trade.active_trade.as_ref().unwrap().id.clone();

        let (after_reject, _) = apply(
            &with_trade,
            "b",
            &GameAction::RejectTrade { trade_id: trade_id.clone() },
            &mut ctx(1),
        )
        .unwrap();
        assert!(after_reject.active_trade.is_none());

        //  only the proposer cancels
        let err = apply(
            &with_trade,
            "b",
            &GameAction::CancelTrade { trade_id: trade_id.clone() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::InvalidPayload);
        let (after_cancel, _) = apply(
            &with_trade,
            "a",
            &GameAction::CancelTrade { trade_id },
            &mut ctx(1),
        )
        .unwrap();
        assert!(after_cancel.active_trade.is_none());
    }

    #[test]
    fn test_expiry_clears_matching_trade_only() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 2));
        let (offering, requesting) = brick_for_wool();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::ProposeTrade { offering, requesting, target_id: None },
            &mut ctx(1),
        )
        .unwrap();
        let trade_id = state.active_trade.as_ref().unwrap().id.clone();

        assert!(expire_trade(&state, "some-other-id").is_none());
        let (expired, events) = expire_trade(&state, &trade_id).unwrap();
        assert!(expired.active_trade.is_none());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_bank_trade_is_four_to_one() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Brick, 4));

        let err = apply(
            &state,
            "a",
            &GameAction::BankTrade { give: Resource::Brick, receive: Resource::Brick },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::InvalidPayload);

        let (next, _) = apply(
            &state,
            "a",
            &GameAction::BankTrade { give: Resource::Brick, receive: Resource::Ore },
            &mut ctx(1),
        )
        .unwrap();
        assert_invariants(&next);
        let a = next.player("a").unwrap();
        assert_eq!(a.resources.brick, 0);
        assert_eq!(a.resources.ore, 1);
        //  the fixture's four brick came from the bank and went back to it
        assert_eq!(next.bank.brick, 19);
    }

    #[test]
    fn test_port_trade_needs_a_port_building() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Grain, 3));

        let err = apply(
            &state,
            "a",
            &GameAction::PortTrade { give: Resource::Grain, receive: Resource::Ore },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::InvalidPayload);

        //  settle a generic-port vertex and the 3:1 rate opens up
        let port_vertex = {
            let port = state
                .board
                .ports
                .iter()
                .find(|p| p.kind == crate::games_service::board::PortKind::Generic)
                .unwrap();
            port.vertices[0]
        };
        place_building_raw(&mut state, "a", port_vertex, BuildingKind::Settlement);
        assert_eq!(best_port_ratio(&state, "a", Resource::Grain), Some(3));

        let (next, _) = apply(
            &state,
            "a",
            &GameAction::PortTrade { give: Resource::Grain, receive: Resource::Ore },
            &mut ctx(1),
        )
        .unwrap();
        assert_eq!(next.player("a").unwrap().resources.grain, 0);
        assert_eq!(next.player("a").unwrap().resources.ore, 1);
    }

    #[test]
    fn test_resource_port_gives_two_to_one() {
        let mut state = main_phase_state();
        give(&mut state, "a", ResourceCount::single(Resource::Wool, 2));
        let port_vertex = {
            let port = state
                .board
                .ports
                .iter()
                .find(|p| p.kind == crate::games_service::board::PortKind::Wool)
                .unwrap();
            port.vertices[0]
        };
        place_building_raw(&mut state, "a", port_vertex, BuildingKind::Settlement);
        assert_eq!(best_port_ratio(&state, "a", Resource::Wool), Some(2));
        //  the wool port is useless for grain
        assert_eq!(best_port_ratio(&state, "a", Resource::Grain), None);

        let (next, _) = apply(
            &state,
            "a",
            &GameAction::PortTrade { give: Resource::Wool, receive: Resource::Grain },
            &mut ctx(1),
        )
        .unwrap();
        assert_eq!(next.player("a").unwrap().resources.grain, 1);
    }
}
