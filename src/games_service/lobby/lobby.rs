use crate::games_service::player::PlayerColor;
use crate::shared::shared_models::{GameError, ServiceError};
use crate::shared::utility::new_game_code;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tokio::sync::RwLock;

/**
 *  pre-game state.  a lobby collects 2-4 players under a short code, tracks
 *  colors and ready flags, and is consumed by the session manager when the
 *  host starts the game.  joining with a known player id is a reconnect,
 *  not a second seat.
 */

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const COUNTDOWN_SECONDS: u8 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Waiting,
    Starting,
    Started,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub color: PlayerColor,
    pub is_ready: bool,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub code: String,
    pub host_id: String,
    pub players: Vec<LobbyPlayer>,
    pub max_players: usize,
    pub status: LobbyStatus,
}

impl LobbySnapshot {
    pub fn member_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }
}

pub struct LobbyManager {
    lobbies: RwLock<HashMap<String, LobbySnapshot>>,
    player_to_lobby: RwLock<HashMap<String, String>>,
}

impl LobbyManager {
    pub fn new() -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
            player_to_lobby: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(
        &self,
        host_id: &str,
        user_id: &str,
        username: &str,
        max_players: usize,
    ) -> Result<LobbySnapshot, ServiceError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(ServiceError::bad_payload("lobbies hold two to four players"));
        }
        if self.lobby_of(host_id).await.is_some() {
            return Err(ServiceError::new(
                GameError::AlreadyStarted,
                "leave your current lobby first",
            ));
        }

        let mut lobbies = self.lobbies.write().await;
        //  codes collide rarely; re-roll until free
        let mut code = new_game_code();
        while lobbies.contains_key(&code) {
            code = new_game_code();
        }

        let lobby = LobbySnapshot {
            code: code.clone(),
            host_id: host_id.to_owned(),
            players: vec![LobbyPlayer {
                id: host_id.to_owned(),
                user_id: user_id.to_owned(),
                username: username.to_owned(),
                color: PlayerColor::Red,
                is_ready: true,
                is_host: true,
            }],
            max_players,
            status: LobbyStatus::Waiting,
        };
        lobbies.insert(code.clone(), lobby.clone());
        self.player_to_lobby
            .write()
            .await
            .insert(host_id.to_owned(), code.clone());
        log::info!("lobby {} created by {}", code, host_id);
        Ok(lobby)
    }

    pub async fn join(
        &self,
        code: &str,
        player_id: &str,
        user_id: &str,
        username: &str,
    ) -> Result<LobbySnapshot, ServiceError> {
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(code)
            .ok_or_else(|| ServiceError::code_unknown(code))?;

        //  same id again is a reconnect: hand the state back unchanged
        if lobby.players.iter().any(|p| p.id == player_id) {
            return Ok(lobby.clone());
        }
        if lobby.status != LobbyStatus::Waiting {
            return Err(ServiceError::new(
                GameError::AlreadyStarted,
                "that game is already starting",
            ));
        }
        if lobby.players.len() >= lobby.max_players {
            return Err(ServiceError::new(GameError::LobbyFull, "that lobby is full"));
        }

        let color = Self::free_color(lobby)
            .ok_or_else(|| ServiceError::new(GameError::ColorTaken, "no color is free"))?;
        lobby.players.push(LobbyPlayer {
            id: player_id.to_owned(),
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            color,
            is_ready: false,
            is_host: false,
        });
        self.player_to_lobby
            .write()
            .await
            .insert(player_id.to_owned(), code.to_owned());
        Ok(lobby.clone())
    }

    /// Removes the player; promotes the earliest remaining player when the
    /// host leaves; deletes the lobby when it empties.  Returns the updated
    /// lobby, or None when it was deleted.
    pub async fn leave(&self, player_id: &str) -> Result<Option<LobbySnapshot>, ServiceError> {
        let code = self
            .lobby_of(player_id)
            .await
            .ok_or_else(|| ServiceError::not_in_game(player_id))?;
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&code)
            .ok_or_else(|| ServiceError::code_unknown(&code))?;

        lobby.players.retain(|p| p.id != player_id);
        self.player_to_lobby.write().await.remove(player_id);

        if lobby.players.is_empty() {
            lobbies.remove(&code);
            log::info!("lobby {} deleted (empty)", code);
            return Ok(None);
        }
        if lobby.host_id == player_id {
            let promoted = &mut lobby.players[0];
            promoted.is_host = true;
            promoted.is_ready = true;
            lobby.host_id = promoted.id.clone();
            log::info!("lobby {}: host left, {} promoted", code, lobby.host_id);
        }
        Ok(Some(lobby.clone()))
    }

    pub async fn set_color(
        &self,
        player_id: &str,
        color: PlayerColor,
    ) -> Result<LobbySnapshot, ServiceError> {
        self.update_player(player_id, |lobby, index| {
            let taken = lobby
                .players
                .iter()
                .enumerate()
                .any(|(i, p)| i != index && p.color == color);
            if taken {
                return Err(ServiceError::new(
                    GameError::ColorTaken,
                    "another player has that color",
                ));
            }
            lobby.players[index].color = color;
            Ok(())
        })
        .await
    }

    pub async fn set_ready(
        &self,
        player_id: &str,
        is_ready: bool,
    ) -> Result<LobbySnapshot, ServiceError> {
        self.update_player(player_id, |lobby, index| {
            lobby.players[index].is_ready = is_ready;
            Ok(())
        })
        .await
    }

    /// Host-only.  Validates the room and flips it to Starting; the caller
    /// runs the countdown and then takes the lobby with `take_started`.
    pub async fn start_game(&self, host_id: &str) -> Result<LobbySnapshot, ServiceError> {
        let code = self
            .lobby_of(host_id)
            .await
            .ok_or_else(|| ServiceError::not_in_game(host_id))?;
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&code)
            .ok_or_else(|| ServiceError::code_unknown(&code))?;

        if lobby.host_id != host_id {
            return Err(ServiceError::bad_payload("only the host starts the game"));
        }
        if lobby.status != LobbyStatus::Waiting {
            return Err(ServiceError::new(
                GameError::AlreadyStarted,
                "the countdown is already running",
            ));
        }
        if lobby.players.len() < MIN_PLAYERS {
            return Err(ServiceError::bad_payload("at least two players are needed"));
        }
        if lobby.players.iter().any(|p| !p.is_host && !p.is_ready) {
            return Err(ServiceError::bad_payload("everyone must be ready"));
        }

        lobby.status = LobbyStatus::Starting;
        Ok(lobby.clone())
    }

    /// Consumes a Starting lobby at the end of the countdown.  Unmaps the
    /// players; the session manager remaps them to the new game.
    pub async fn take_started(&self, code: &str) -> Result<LobbySnapshot, ServiceError> {
        let mut lobbies = self.lobbies.write().await;
        match lobbies.get(code) {
            Some(lobby) if lobby.status == LobbyStatus::Starting => {}
            Some(_) => return Err(ServiceError::wrong_phase("that lobby is not starting")),
            None => return Err(ServiceError::code_unknown(code)),
        }
        let lobby = lobbies.remove(code).expect("checked above");
        let mut mapping = self.player_to_lobby.write().await;
        for player in &lobby.players {
            mapping.remove(&player.id);
        }
        Ok(lobby)
    }

    pub async fn lobby_of(&self, player_id: &str) -> Option<String> {
        self.player_to_lobby.read().await.get(player_id).cloned()
    }

    pub async fn snapshot(&self, code: &str) -> Option<LobbySnapshot> {
        self.lobbies.read().await.get(code).cloned()
    }

    async fn update_player<F>(&self, player_id: &str, f: F) -> Result<LobbySnapshot, ServiceError>
    where
        F: FnOnce(&mut LobbySnapshot, usize) -> Result<(), ServiceError>,
    {
        let code = self
            .lobby_of(player_id)
            .await
            .ok_or_else(|| ServiceError::not_in_game(player_id))?;
        let mut lobbies = self.lobbies.write().await;
        let lobby = lobbies
            .get_mut(&code)
            .ok_or_else(|| ServiceError::code_unknown(&code))?;
        let index = lobby
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| ServiceError::not_in_game(player_id))?;
        f(lobby, index)?;
        Ok(lobby.clone())
    }

    fn free_color(lobby: &LobbySnapshot) -> Option<PlayerColor> {
        PlayerColor::iter().find(|c| !lobby.players.iter().any(|p| p.color == *c))
    }
}

impl Default for LobbyManager {
    fn default() -> Self {
        Self::new()
    }
}
