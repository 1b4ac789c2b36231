use serde::{Deserialize, Serialize};
use strum_macros::Display;

/**
 *  lifecycle enums for a game.  two nested machines: the phase machine runs
 *  the whole game, the turn-phase machine runs inside each playing turn.
 */

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Setup,
    Playing,
    Finished,
    Abandoned,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    RollForOrder,
    SetupFirst,
    SetupSecond,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    PreRoll,
    Discard,
    RobberMove,
    RobberSteal,
    Main,
    RoadBuilding,
    YearOfPlenty,
    Monopoly,
}

//  what the setup machine is waiting for from the current placer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetupPiece {
    Settlement,
    Road,
}
