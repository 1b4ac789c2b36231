use super::actions::GameAction;
use crate::games_service::game::game_enums::{GamePhase, SetupPiece, TurnPhase};
use crate::games_service::game::game_state::GameState;
use crate::shared::shared_models::ServiceError;

/**
 *  the gate in front of the rules engine.  two nested machines: the phase
 *  machine (roll_for_order -> setup_first -> setup_second -> playing ->
 *  finished) and the turn-phase machine inside each playing turn.  nothing
 *  here mutates state; it only answers "may this player do that right now"
 *  so every rules module can assume its turn context.
 */
pub fn ensure_legal(
    state: &GameState,
    player_id: &str,
    action: &GameAction,
) -> Result<(), ServiceError> {
    //  routing guarantees the player is mapped to this game; re-check anyway
    if !state.has_player(player_id) {
        return Err(ServiceError::not_in_game(player_id));
    }

    match state.phase {
        GamePhase::Finished => Err(ServiceError::wrong_phase("the game is over")),
        GamePhase::RollForOrder => ensure_roll_for_order(state, player_id, action),
        GamePhase::SetupFirst | GamePhase::SetupSecond => ensure_setup(state, player_id, action),
        GamePhase::Playing => ensure_playing(state, player_id, action),
    }
}

fn ensure_roll_for_order(
    state: &GameState,
    player_id: &str,
    action: &GameAction,
) -> Result<(), ServiceError> {
    if !matches!(action, GameAction::RollForOrder) {
        return Err(ServiceError::wrong_phase(
            "waiting for opening rolls to decide turn order",
        ));
    }
    //  seating order is strict: the next player without a recorded roll
    let next_roller = state
        .players
        .iter()
        .find(|p| !state.roll_for_order_state.contains_key(&p.id));
    match next_roller {
        Some(p) if p.id == player_id => Ok(()),
        Some(_) => Err(ServiceError::not_your_turn()),
        None => Err(ServiceError::internal("all opening rolls already recorded")),
    }
}

fn ensure_setup(
    state: &GameState,
    player_id: &str,
    action: &GameAction,
) -> Result<(), ServiceError> {
    let setup = state
        .setup_state
        .as_ref()
        .ok_or_else(|| ServiceError::internal("setup phase without setup state"))?;

    match action {
        GameAction::BuildSettlement { .. } | GameAction::BuildRoad { .. } => {
            if !state.is_current_player(player_id) {
                return Err(ServiceError::not_your_turn());
            }
            let wants = match action {
                GameAction::BuildSettlement { .. } => SetupPiece::Settlement,
                _ => SetupPiece::Road,
            };
            if setup.expecting != wants {
                return Err(ServiceError::wrong_turn_phase(&format!(
                    "setup expects a {:?} placement",
                    setup.expecting
                )));
            }
            Ok(())
        }
        _ => Err(ServiceError::wrong_phase(
            "only settlement and road placement are allowed during setup",
        )),
    }
}

fn ensure_playing(
    state: &GameState,
    player_id: &str,
    action: &GameAction,
) -> Result<(), ServiceError> {
    let active = state.is_current_player(player_id);

    match state.turn_phase {
        TurnPhase::PreRoll => match action {
            GameAction::RollDice | GameAction::PlayKnight => {
                if active {
                    Ok(())
                } else {
                    Err(ServiceError::not_your_turn())
                }
            }
            _ => Err(ServiceError::wrong_turn_phase("roll the dice first")),
        },
        TurnPhase::Discard => match action {
            GameAction::DiscardResources { .. } => {
                if state.pending_discards.contains_key(player_id) {
                    Ok(())
                } else {
                    Err(ServiceError::wrong_turn_phase("you owe no discard"))
                }
            }
            _ => Err(ServiceError::wrong_turn_phase(
                "waiting for players to discard",
            )),
        },
        TurnPhase::RobberMove => match action {
            GameAction::MoveRobber { .. } => {
                if active {
                    Ok(())
                } else {
                    Err(ServiceError::not_your_turn())
                }
            }
            _ => Err(ServiceError::wrong_turn_phase("the robber must be moved")),
        },
        TurnPhase::RobberSteal => match action {
            GameAction::StealResource { .. } => {
                if active {
                    Ok(())
                } else {
                    Err(ServiceError::not_your_turn())
                }
            }
            _ => Err(ServiceError::wrong_turn_phase("pick a player to steal from")),
        },
        TurnPhase::RoadBuilding => match action {
            GameAction::BuildRoad { .. } | GameAction::FinishRoadBuilding => {
                if active {
                    Ok(())
                } else {
                    Err(ServiceError::not_your_turn())
                }
            }
            _ => Err(ServiceError::wrong_turn_phase(
                "road building is in progress",
            )),
        },
        //  the year-of-plenty and monopoly phases resolve inside the card
        //  play itself; no client command is ever gated on them
        TurnPhase::YearOfPlenty | TurnPhase::Monopoly => Err(ServiceError::wrong_turn_phase(
            "a development card is resolving",
        )),
        TurnPhase::Main => match action {
            //  trade responses come from the other seats
            GameAction::AcceptTrade { .. } | GameAction::RejectTrade { .. } => Ok(()),
            GameAction::BuildSettlement { .. }
            | GameAction::BuildCity { .. }
            | GameAction::BuildRoad { .. }
            | GameAction::BuyDevCard
            | GameAction::PlayKnight
            | GameAction::PlayRoadBuilding
            | GameAction::PlayYearOfPlenty { .. }
            | GameAction::PlayMonopoly { .. }
            | GameAction::ProposeTrade { .. }
            | GameAction::CancelTrade { .. }
            | GameAction::BankTrade { .. }
            | GameAction::PortTrade { .. }
            | GameAction::EndTurn => {
                if active {
                    Ok(())
                } else {
                    Err(ServiceError::not_your_turn())
                }
            }
            GameAction::RollDice => Err(ServiceError::wrong_turn_phase(
                "the dice were already rolled this turn",
            )),
            _ => Err(ServiceError::wrong_turn_phase("not allowed right now")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games_service::rules::test_support::{playing_state, setup_state_fixture};
    use crate::shared::shared_models::GameError;

    #[test]
    fn test_finished_game_rejects_everything() {
        let mut state = playing_state();
        state.phase = GamePhase::Finished;
        let err = ensure_legal(&state, "a", &GameAction::RollDice).unwrap_err();
        assert_eq!(err.kind, GameError::WrongPhase);
    }

    #[test]
    fn test_unknown_player_rejected_first() {
        let state = playing_state();
        let err = ensure_legal(&state, "zz", &GameAction::RollDice).unwrap_err();
        assert_eq!(err.kind, GameError::NotInGame);
    }

    #[test]
    fn test_pre_roll_allows_roll_and_knight_only() {
        let state = playing_state();
        assert!(ensure_legal(&state, "a", &GameAction::RollDice).is_ok());
        assert!(ensure_legal(&state, "a", &GameAction::PlayKnight).is_ok());
        let err = ensure_legal(&state, "a", &GameAction::EndTurn).unwrap_err();
        assert_eq!(err.kind, GameError::WrongTurnPhase);
        let err = ensure_legal(&state, "b", &GameAction::RollDice).unwrap_err();
        assert_eq!(err.kind, GameError::NotYourTurn);
    }

    #[test]
    fn test_main_phase_gates_by_activity() {
        let mut state = playing_state();
        state.turn_phase = TurnPhase::Main;
        assert!(ensure_legal(&state, "a", &GameAction::EndTurn).is_ok());
        let err = ensure_legal(&state, "b", &GameAction::EndTurn).unwrap_err();
        assert_eq!(err.kind, GameError::NotYourTurn);
        //  double roll is a turn-phase error, not a turn error
        let err = ensure_legal(&state, "a", &GameAction::RollDice).unwrap_err();
        assert_eq!(err.kind, GameError::WrongTurnPhase);
    }

    #[test]
    fn test_discard_phase_is_a_barrier() {
        let mut state = playing_state();
        state.turn_phase = TurnPhase::Discard;
        state.pending_discards.insert("b".to_owned(), 4);
        //  the active player may not move the robber until the fence clears
        let err = ensure_legal(
            &state,
            "a",
            &GameAction::MoveRobber {
                hex_id: "hex_0_0".to_owned(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::WrongTurnPhase);
        //  only players who owe cards may discard
        assert!(ensure_legal(
            &state,
            "b",
            &GameAction::DiscardResources {
                resources: Default::default()
            }
        )
        .is_ok());
        let err = ensure_legal(
            &state,
            "a",
            &GameAction::DiscardResources {
                resources: Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::WrongTurnPhase);
    }

    #[test]
    fn test_setup_expects_pieces_in_order() {
        let state = setup_state_fixture();
        //  expecting a settlement from the first player in turn order
        assert!(ensure_legal(
            &state,
            "a",
            &GameAction::BuildSettlement {
                vertex_id: "x".to_owned()
            }
        )
        .is_ok());
        let err = ensure_legal(
            &state,
            "a",
            &GameAction::BuildRoad {
                edge_id: "x".to_owned(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::WrongTurnPhase);
        let err = ensure_legal(&state, "a", &GameAction::BuyDevCard).unwrap_err();
        assert_eq!(err.kind, GameError::WrongPhase);
        let err = ensure_legal(
            &state,
            "b",
            &GameAction::BuildSettlement {
                vertex_id: "x".to_owned(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::NotYourTurn);
    }

    #[test]
    fn test_roll_for_order_follows_seating() {
        let mut state = playing_state();
        state.phase = GamePhase::RollForOrder;
        state.roll_for_order_state.clear();
        assert!(ensure_legal(&state, "a", &GameAction::RollForOrder).is_ok());
        let err = ensure_legal(&state, "b", &GameAction::RollForOrder).unwrap_err();
        assert_eq!(err.kind, GameError::NotYourTurn);
        state.roll_for_order_state.insert("a".to_owned(), 8);
        assert!(ensure_legal(&state, "b", &GameAction::RollForOrder).is_ok());
    }
}
