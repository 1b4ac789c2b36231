use super::game_messages::{Audience, EngineEvent, GameEvent};
use crate::games_service::board::generate_board;
use crate::games_service::game::game_enums::{GameStatus, TurnPhase};
use crate::games_service::game::game_state::{GameState, TRADE_EXPIRY_SECONDS};
use crate::games_service::game::resources::ResourceCount;
use crate::games_service::lobby::LobbySnapshot;
use crate::games_service::player::PlayerState;
use crate::games_service::rules::actions::GameAction;
use crate::games_service::rules::{self, GameContext};
use crate::games_service::storage::GameStoreTrait;
use crate::shared::service_config::ServiceConfig;
use crate::shared::shared_models::{GameError, ServiceError};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};

/**
 *  one tokio task per game.  the task owns the GameState, the rng and the
 *  dev-card deck; every mutation arrives over a bounded command queue, so
 *  commands are strictly serialized and every subscriber observes one
 *  monotonic event sequence.  across games there is no ordering at all.
 */

const COMMAND_QUEUE_DEPTH: usize = 64;
const SUBSCRIBER_BUFFER: usize = 128;

pub enum ActorCommand {
    Submit {
        player_id: String,
        action: GameAction,
        reply: oneshot::Sender<Result<(), ServiceError>>,
    },
    Chat {
        player_id: String,
        text: String,
    },
    Subscribe {
        player_id: String,
        tx: mpsc::Sender<GameEvent>,
        reply: oneshot::Sender<Result<(), ServiceError>>,
    },
    Unsubscribe {
        player_id: String,
    },
    Snapshot {
        reply: oneshot::Sender<Box<GameState>>,
    },
    //  timer-driven internals
    ExpireTrade {
        trade_id: String,
    },
    TurnTimeout {
        player_id: String,
        turn_number: u32,
    },
    AbandonCheck,
}

pub struct GameHandle {
    tx: mpsc::Sender<ActorCommand>,
}

pub struct SessionManager {
    games: Arc<RwLock<HashMap<String, GameHandle>>>,
    player_to_game: Arc<RwLock<HashMap<String, String>>>,
    store: Arc<dyn GameStoreTrait>,
    turn_timeout: Option<Duration>,
    abandonment: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn GameStoreTrait>, config: &ServiceConfig) -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            player_to_game: Arc::new(RwLock::new(HashMap::new())),
            store,
            turn_timeout: config.turn_timeout_seconds.map(Duration::from_secs),
            abandonment: Duration::from_secs(config.abandonment_seconds),
        }
    }

    /// Builds the game from a consumed lobby, spawns its actor, and maps
    /// the players.  Returns the initial snapshot for the caller to emit.
    pub async fn create_game(&self, lobby: &LobbySnapshot) -> Result<GameState, ServiceError> {
        let seed: u64 = OsRng.gen();
        log::info!("game {}: created with seed {:#x}", lobby.code, seed);

        let mut ctx = GameContext::new(seed);
        let board = generate_board(&mut ctx.rng);
        let players: Vec<PlayerState> = lobby
            .players
            .iter()
            .map(|p| PlayerState::new(&p.id, &p.user_id, &p.username, p.color))
            .collect();
        let state = GameState::new(&lobby.code, players, board, ctx.deck.len());
        let snapshot = state.clone();

        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let actor = GameActor {
            state,
            ctx,
            subscribers: HashMap::new(),
            rx,
            self_tx: tx.clone(),
            store: self.store.clone(),
            turn_timeout: self.turn_timeout,
            abandonment: self.abandonment,
        };

        {
            let mut games = self.games.write().await;
            if games.contains_key(&lobby.code) {
                return Err(ServiceError::new(
                    GameError::AlreadyStarted,
                    "that game already exists",
                ));
            }
            games.insert(lobby.code.clone(), GameHandle { tx });
        }
        {
            let mut mapping = self.player_to_game.write().await;
            for player in &lobby.players {
                mapping.insert(player.id.clone(), lobby.code.clone());
            }
        }

        //  the reaper unregisters the game when its actor loop ends
        let games = self.games.clone();
        let mapping = self.player_to_game.clone();
        tokio::spawn(async move {
            let code = actor.run().await;
            games.write().await.remove(&code);
            mapping.write().await.retain(|_, c| *c != code);
            log::info!("game {}: unregistered", code);
        });

        Ok(snapshot)
    }

    pub async fn game_of(&self, player_id: &str) -> Option<String> {
        self.player_to_game.read().await.get(player_id).cloned()
    }

    /// Routes a player's command to their game and waits for the verdict.
    /// A full queue refuses with Busy rather than blocking the gateway.
    pub async fn submit(&self, player_id: &str, action: GameAction) -> Result<(), ServiceError> {
        let (reply, verdict) = oneshot::channel();
        self.send_command(
            player_id,
            ActorCommand::Submit {
                player_id: player_id.to_owned(),
                action,
                reply,
            },
        )
        .await?;
        verdict
            .await
            .map_err(|_| ServiceError::internal("game closed while processing the command"))?
    }

    pub async fn chat(&self, player_id: &str, text: String) -> Result<(), ServiceError> {
        self.send_command(
            player_id,
            ActorCommand::Chat {
                player_id: player_id.to_owned(),
                text,
            },
        )
        .await
    }

    /// Registers an event stream for the player; the actor leads with a
    /// full snapshot, so reconnection needs nothing special.
    pub async fn subscribe(
        &self,
        player_id: &str,
        tx: mpsc::Sender<GameEvent>,
    ) -> Result<(), ServiceError> {
        let (reply, done) = oneshot::channel();
        self.send_command(
            player_id,
            ActorCommand::Subscribe {
                player_id: player_id.to_owned(),
                tx,
                reply,
            },
        )
        .await?;
        done.await
            .map_err(|_| ServiceError::internal("game closed during subscribe"))?
    }

    pub async fn unsubscribe(&self, player_id: &str) {
        let _ = self
            .send_command(
                player_id,
                ActorCommand::Unsubscribe {
                    player_id: player_id.to_owned(),
                },
            )
            .await;
    }

    pub async fn snapshot(&self, player_id: &str) -> Result<GameState, ServiceError> {
        let (reply, snapshot) = oneshot::channel();
        self.send_command(player_id, ActorCommand::Snapshot { reply })
            .await?;
        snapshot
            .await
            .map(|boxed| *boxed)
            .map_err(|_| ServiceError::internal("game closed during snapshot"))
    }

    async fn send_command(
        &self,
        player_id: &str,
        command: ActorCommand,
    ) -> Result<(), ServiceError> {
        let code = self
            .game_of(player_id)
            .await
            .ok_or_else(|| ServiceError::not_in_game(player_id))?;
        let games = self.games.read().await;
        let handle = games
            .get(&code)
            .ok_or_else(|| ServiceError::code_unknown(&code))?;
        handle.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                ServiceError::new(GameError::Busy, "the game is busy, retry shortly")
            }
            mpsc::error::TrySendError::Closed(_) => ServiceError::code_unknown(&code),
        })
    }
}

struct Subscriber {
    tx: mpsc::Sender<GameEvent>,
    //  a slow consumer is skipped until it can take a fresh snapshot
    lagged: bool,
}

struct GameActor {
    state: GameState,
    ctx: GameContext,
    subscribers: HashMap<String, Subscriber>,
    rx: mpsc::Receiver<ActorCommand>,
    self_tx: mpsc::Sender<ActorCommand>,
    store: Arc<dyn GameStoreTrait>,
    turn_timeout: Option<Duration>,
    abandonment: Duration,
}

impl GameActor {
    async fn run(mut self) -> String {
        while let Some(command) = self.rx.recv().await {
            match command {
                ActorCommand::Submit {
                    player_id,
                    action,
                    reply,
                } => {
                    let outcome = self.handle_submit(&player_id, &action).await;
                    let _ = reply.send(outcome);
                    if self.state.status == GameStatus::Finished {
                        if let Err(e) = self.store.save_finished(&self.state).await {
                            log::error!("game {}: save failed: {}", self.state.code, e);
                        }
                        break;
                    }
                }
                ActorCommand::Chat { player_id, text } => {
                    let username = self
                        .state
                        .player(&player_id)
                        .map(|p| p.username.clone())
                        .unwrap_or_default();
                    self.fan_out(vec![EngineEvent::all(GameEvent::ChatMessage {
                        player_id,
                        username,
                        text,
                    })])
                    .await;
                }
                ActorCommand::Subscribe {
                    player_id,
                    tx,
                    reply,
                } => {
                    let outcome = self.handle_subscribe(&player_id, tx).await;
                    let _ = reply.send(outcome);
                }
                ActorCommand::Unsubscribe { player_id } => {
                    self.handle_unsubscribe(&player_id).await;
                }
                ActorCommand::Snapshot { reply } => {
                    let _ = reply.send(Box::new(self.state.clone()));
                }
                ActorCommand::ExpireTrade { trade_id } => {
                    if let Some((next, events)) = rules::expire_trade(&self.state, &trade_id) {
                        self.state = next;
                        self.fan_out(events).await;
                    }
                }
                ActorCommand::TurnTimeout {
                    player_id,
                    turn_number,
                } => {
                    self.handle_turn_timeout(&player_id, turn_number).await;
                    if self.state.status == GameStatus::Finished {
                        break;
                    }
                }
                ActorCommand::AbandonCheck => {
                    if self.state.players.iter().all(|p| !p.is_connected) {
                        log::warn!("game {}: abandoned", self.state.code);
                        self.state.status = GameStatus::Abandoned;
                        break;
                    }
                }
            }
        }
        self.state.code.clone()
    }

    async fn handle_submit(
        &mut self,
        player_id: &str,
        action: &GameAction,
    ) -> Result<(), ServiceError> {
        let had_trade = self.state.active_trade.as_ref().map(|t| t.id.clone());
        let (next, events) = rules::apply(&self.state, player_id, action, &mut self.ctx)?;
        self.state = next;
        log::debug!(
            "game {}: {} -> {:?} ok ({} events)",
            self.state.code,
            player_id,
            action,
            events.len()
        );
        self.fan_out(events).await;

        //  arm the expiry timer for a freshly created proposal
        if let Some(trade) = &self.state.active_trade {
            if had_trade.as_deref() != Some(&trade.id) {
                let tx = self.self_tx.clone();
                let trade_id = trade.id.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(TRADE_EXPIRY_SECONDS)).await;
                    let _ = tx
                        .send(ActorCommand::ExpireTrade { trade_id })
                        .await;
                });
            }
        }
        self.arm_turn_timer();
        Ok(())
    }

    async fn handle_subscribe(
        &mut self,
        player_id: &str,
        tx: mpsc::Sender<GameEvent>,
    ) -> Result<(), ServiceError> {
        if !self.state.has_player(player_id) {
            return Err(ServiceError::not_in_game(player_id));
        }
        let was_connected = self
            .state
            .player(player_id)
            .map(|p| p.is_connected)
            .unwrap_or(false);
        if let Ok(player) = self.state.player_mut(player_id) {
            player.is_connected = true;
        }

        //  lead with a full snapshot so the stream is self-contained
        let _ = tx
            .send(GameEvent::StateSnapshot {
                state: Box::new(self.state.clone()),
            })
            .await;
        self.subscribers
            .insert(player_id.to_owned(), Subscriber { tx, lagged: false });

        if !was_connected {
            self.fan_out(vec![EngineEvent::all(GameEvent::PlayerReconnected {
                player_id: player_id.to_owned(),
            })])
            .await;
        }
        Ok(())
    }

    async fn handle_unsubscribe(&mut self, player_id: &str) {
        self.subscribers.remove(player_id);
        if let Ok(player) = self.state.player_mut(player_id) {
            if player.is_connected {
                player.is_connected = false;
                self.fan_out(vec![EngineEvent::all(GameEvent::PlayerDisconnected {
                    player_id: player_id.to_owned(),
                })])
                .await;
            }
        }

        if self.state.players.iter().all(|p| !p.is_connected) {
            let tx = self.self_tx.clone();
            let wait = self.abandonment;
            tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                let _ = tx.send(ActorCommand::AbandonCheck).await;
            });
        }
        self.arm_turn_timer();
    }

    //  starts the auto-play clock when the current player is offline and a
    //  timeout is configured.  default configuration has no timeout at all.
    fn arm_turn_timer(&self) {
        let timeout = match self.turn_timeout {
            Some(t) => t,
            None => return,
        };
        let current = match self.state.current_player_id() {
            Some(id) => id.to_owned(),
            None => return,
        };
        let connected = self
            .state
            .player(&current)
            .map(|p| p.is_connected)
            .unwrap_or(true);
        if connected {
            return;
        }
        let turn_number = self.state.turn_number;
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx
                .send(ActorCommand::TurnTimeout {
                    player_id: current,
                    turn_number,
                })
                .await;
        });
    }

    /// Plays out a disconnected player's turn: random discards at the
    /// fence, a robber move that avoids stealing when possible, then end
    /// turn.  Every step goes through the same rules entry as a client
    /// command.
    async fn handle_turn_timeout(&mut self, player_id: &str, turn_number: u32) {
        if self.state.turn_number != turn_number
            || self.state.current_player_id() != Some(player_id)
        {
            return; // stale timer
        }
        if self
            .state
            .player(player_id)
            .map(|p| p.is_connected)
            .unwrap_or(true)
        {
            return; // they came back
        }
        log::info!(
            "game {}: auto-playing {}'s turn after timeout",
            self.state.code,
            player_id
        );

        //  bounded loop; every arm strictly advances the turn machine
        for _ in 0..16 {
            if self.state.status != GameStatus::Playing {
                break;
            }
            let action = match self.state.turn_phase {
                TurnPhase::PreRoll => Some(GameAction::RollDice),
                TurnPhase::Discard => {
                    self.auto_discard_disconnected().await;
                    if self.state.turn_phase == TurnPhase::Discard {
                        //  a connected player still owes cards; let them act
                        break;
                    }
                    continue;
                }
                TurnPhase::RobberMove => Some(GameAction::MoveRobber {
                    hex_id: self.pick_robber_hex(),
                }),
                TurnPhase::RobberSteal => self
                    .state
                    .building_owners_on_hex(&self.state.board.robber_hex, player_id)
                    .first()
                    .map(|victim| GameAction::StealResource {
                        victim_id: victim.clone(),
                    }),
                TurnPhase::RoadBuilding => Some(GameAction::FinishRoadBuilding),
                TurnPhase::Main => Some(GameAction::EndTurn),
                TurnPhase::YearOfPlenty | TurnPhase::Monopoly => None,
            };
            let Some(action) = action else { break };
            match rules::apply(&self.state, player_id, &action, &mut self.ctx) {
                Ok((next, events)) => {
                    self.state = next;
                    self.fan_out(events).await;
                }
                Err(e) => {
                    log::warn!(
                        "game {}: auto-play stopped on {:?}: {}",
                        self.state.code,
                        action,
                        e
                    );
                    break;
                }
            }
            if matches!(action, GameAction::EndTurn) {
                break;
            }
        }
        self.arm_turn_timer();
    }

    //  random legal discards for every disconnected player at the fence
    async fn auto_discard_disconnected(&mut self) {
        let owing: Vec<(String, u32)> = self
            .state
            .pending_discards
            .iter()
            .filter(|(pid, _)| {
                self.state
                    .player(pid)
                    .map(|p| !p.is_connected)
                    .unwrap_or(false)
            })
            .map(|(pid, n)| (pid.clone(), *n))
            .collect();

        for (pid, count) in owing {
            let hand = match self.state.player(&pid) {
                Ok(p) => p.resources,
                Err(_) => continue,
            };
            let mut cards = hand.to_multiset();
            cards.shuffle(&mut self.ctx.rng);
            let mut discard = ResourceCount::new();
            for resource in cards.into_iter().take(count as usize) {
                discard.add(resource, 1);
            }
            match rules::apply(
                &self.state,
                &pid,
                &GameAction::DiscardResources { resources: discard },
                &mut self.ctx,
            ) {
                Ok((next, events)) => {
                    self.state = next;
                    self.fan_out(events).await;
                }
                Err(e) => log::warn!("game {}: auto-discard for {} failed: {}", self.state.code, pid, e),
            }
        }
    }

    //  prefer a tile where nobody gets robbed; fall back to any legal tile
    fn pick_robber_hex(&self) -> String {
        let current = self.state.board.robber_hex;
        let actor_id = self
            .state
            .current_player_id()
            .unwrap_or_default()
            .to_owned();
        let mut fallback = None;
        for tile in self.state.board.tiles.values() {
            if tile.key == current {
                continue;
            }
            if self
                .state
                .building_owners_on_hex(&tile.key, &actor_id)
                .is_empty()
            {
                return tile.id.clone();
            }
            fallback.get_or_insert_with(|| tile.id.clone());
        }
        fallback.unwrap_or_else(|| current.id())
    }

    async fn fan_out(&mut self, events: Vec<EngineEvent>) {
        for EngineEvent { audience, event } in events {
            match audience {
                Audience::All => {
                    let ids: Vec<String> = self.subscribers.keys().cloned().collect();
                    for id in ids {
                        self.send_to(&id, event.clone()).await;
                    }
                }
                Audience::Player(id) => self.send_to(&id, event).await,
            }
        }
        self.resync_lagged().await;
    }

    async fn send_to(&mut self, player_id: &str, event: GameEvent) {
        if let Some(subscriber) = self.subscribers.get_mut(player_id) {
            if subscriber.lagged {
                return;
            }
            match subscriber.tx.try_send(event) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "game {}: subscriber {} lagging, will resnapshot",
                        self.state.code,
                        player_id
                    );
                    subscriber.lagged = true;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.subscribers.remove(player_id);
                }
            }
        }
    }

    //  a lagged subscriber rejoins the stream with a fresh snapshot as soon
    //  as its buffer has room again
    async fn resync_lagged(&mut self) {
        let lagged: Vec<String> = self
            .subscribers
            .iter()
            .filter(|(_, s)| s.lagged)
            .map(|(id, _)| id.clone())
            .collect();
        for id in lagged {
            let snapshot = GameEvent::StateSnapshot {
                state: Box::new(self.state.clone()),
            };
            if let Some(subscriber) = self.subscribers.get_mut(&id) {
                if subscriber.tx.try_send(snapshot).is_ok() {
                    subscriber.lagged = false;
                }
            }
        }
    }
}
