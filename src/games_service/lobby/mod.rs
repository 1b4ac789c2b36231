pub mod lobby;

pub use lobby::{
    LobbyManager, LobbyPlayer, LobbySnapshot, LobbyStatus, COUNTDOWN_SECONDS, MAX_PLAYERS,
    MIN_PLAYERS,
};
