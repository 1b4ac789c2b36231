pub mod game_enums;
pub mod game_state;
pub mod resources;

pub use game_enums::{GamePhase, GameStatus, SetupPiece, TurnPhase};
pub use game_state::{GameState, SetupState, TradeProposal, TRADE_EXPIRY_SECONDS};
pub use resources::{Resource, ResourceCount};
