/**
 * this is the module where the error taxonomy shared by every layer of the
 * service is defined.  commands never panic on a rules violation -- they
 * return a ServiceError and the caller relays {code, message} to the one
 * client that submitted the command.
 */
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use std::fmt;

//
//  the error *kinds* surfaced to clients.  the kind is stable protocol; the
//  message is free text for humans.  rules and state-machine failures are all
//  local: state is untouched and only the submitter hears about them.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Copy, Display)]
#[serde(rename_all = "camelCase")]
pub enum GameError {
    NotInGame,
    NotYourTurn,
    WrongPhase,
    WrongTurnPhase,
    IllegalPlacement,
    CannotAfford,
    PieceExhausted,
    DeckEmpty,
    BankShortage,
    InvalidPayload,
    InvalidId,
    InvalidDirection,
    LobbyFull,
    ColorTaken,
    CodeUnknown,
    AlreadyStarted,
    Busy,
    InternalError,
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    pub kind: GameError,
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ServiceError {}

// we need a From<> for each error type we propagate with ?
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::new(GameError::InvalidPayload, &err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::new(GameError::InternalError, &err.to_string())
    }
}

impl ServiceError {
    pub fn new(kind: GameError, message: &str) -> Self {
        Self {
            kind,
            message: message.to_owned(),
        }
    }

    pub fn not_in_game(player_id: &str) -> Self {
        Self::new(
            GameError::NotInGame,
            &format!("player {} is not in a game", player_id),
        )
    }

    pub fn not_your_turn() -> Self {
        Self::new(GameError::NotYourTurn, "it is not your turn")
    }

    pub fn wrong_phase(msg: &str) -> Self {
        Self::new(GameError::WrongPhase, msg)
    }

    pub fn wrong_turn_phase(msg: &str) -> Self {
        Self::new(GameError::WrongTurnPhase, msg)
    }

    pub fn illegal_placement(msg: &str) -> Self {
        Self::new(GameError::IllegalPlacement, msg)
    }

    pub fn cannot_afford(msg: &str) -> Self {
        Self::new(GameError::CannotAfford, msg)
    }

    pub fn bad_id(id: &str) -> Self {
        Self::new(GameError::InvalidId, &format!("malformed id: {}", id))
    }

    pub fn bad_payload(msg: &str) -> Self {
        Self::new(GameError::InvalidPayload, msg)
    }

    pub fn code_unknown(code: &str) -> Self {
        Self::new(GameError::CodeUnknown, &format!("no lobby or game {}", code))
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(GameError::InternalError, msg)
    }
}
