use crate::full_info;
use crate::games_service::game_container::game_messages::{ClientIntent, GameEvent};
use crate::games_service::game_container::SessionManager;
use crate::games_service::hex::{EdgeKey, HexKey, VertexKey};
use crate::games_service::lobby::{LobbyManager, LobbySnapshot, COUNTDOWN_SECONDS};
use crate::shared::shared_models::{GameError, ServiceError};
use actix::prelude::*;
use actix::{Actor, StreamHandler};
use actix_web::web::{Data, Payload, Query};
use actix_web::{Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/**
 *  the websocket boundary.  one actor per connection decodes client
 *  intents, validates the payload shape, and routes: lobby intents to the
 *  LobbyManager, game intents to the player's game actor.  events come
 *  back through the connection registry; game errors go only to the
 *  submitter and never close the socket.
 */

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CHAT_LEN: usize = 500;

lazy_static! {
    static ref USERNAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_-]{2,20}$").expect("username regex compiles");
    static ref GAME_CODE_RE: Regex =
        Regex::new(r"^[A-Z0-9]{6}$").expect("game code regex compiles");
}

//  message delivered to a connection actor for transmission
pub struct WsEvent(pub String);

impl Message for WsEvent {
    type Result = ();
}

/// player_id -> live connection.  Lobby broadcasts and event pumps route
/// through here; a reconnect simply rebinds the id.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<String, Recipient<WsEvent>>>>,
}

impl ConnectionRegistry {
    pub fn bind(&self, player_id: &str, recipient: Recipient<WsEvent>) {
        self.inner.write().insert(player_id.to_owned(), recipient);
    }

    pub fn unbind(&self, player_id: &str) {
        self.inner.write().remove(player_id);
    }

    pub fn send_event(&self, player_id: &str, event: &GameEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            if let Some(recipient) = self.inner.read().get(player_id) {
                recipient.do_send(WsEvent(json));
            }
        }
    }

    pub fn broadcast(&self, player_ids: &[String], event: &GameEvent) {
        for player_id in player_ids {
            self.send_event(player_id, event);
        }
    }
}

pub struct AppState {
    pub lobby_manager: LobbyManager,
    pub session_manager: Arc<SessionManager>,
    pub registry: ConnectionRegistry,
}

pub struct CatanWs {
    player_id: String,
    user_id: String,
    username: String,
    app: Data<AppState>,
    hb: Instant,
}

impl Actor for CatanWs {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heart_beat(ctx);
        self.app
            .registry
            .bind(&self.player_id, ctx.address().recipient::<WsEvent>());

        //  the client stores this id and presents it on reconnect
        if let Ok(json) = serde_json::to_string(&GameEvent::ConnectionEstablished {
            player_id: self.player_id.clone(),
        }) {
            ctx.text(json);
        }
        full_info!("ws connected: player {} (user {})", self.player_id, self.user_id);

        //  socket re-bind to a running game: resubscribe, snapshot leads
        let app = self.app.clone();
        let player_id = self.player_id.clone();
        actix_web::rt::spawn(async move {
            if app.session_manager.game_of(&player_id).await.is_some() {
                spawn_event_pump(&app, &player_id).await;
            }
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        self.app.registry.unbind(&self.player_id);
        let app = self.app.clone();
        let player_id = self.player_id.clone();
        actix_web::rt::spawn(async move {
            //  flips is_connected, never surrenders the seat
            app.session_manager.unsubscribe(&player_id).await;
        });
        full_info!("ws disconnected: player {}", self.player_id);
    }
}

impl CatanWs {
    fn new(player_id: String, user_id: String, username: String, app: Data<AppState>) -> Self {
        Self {
            player_id,
            user_id,
            username,
            app,
            hb: Instant::now(),
        }
    }

    fn heart_beat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("disconnecting {} on failed heartbeat", act.player_id);
                ctx.stop();
                return;
            }
            ctx.ping(b"hb");
        });
    }

    fn dispatch(&self, intent: ClientIntent) {
        let app = self.app.clone();
        let player_id = self.player_id.clone();
        let user_id = self.user_id.clone();
        let username = self.username.clone();
        actix_web::rt::spawn(async move {
            if let Err(err) = handle_intent(&app, &player_id, &user_id, &username, &intent).await {
                app.registry
                    .send_event(&player_id, &GameEvent::error_for(&intent, &err));
            }
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for CatanWs {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.hb = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientIntent>(&text) {
                Ok(intent) => match validate_intent(&intent) {
                    Ok(()) => self.dispatch(intent),
                    Err(err) => self
                        .app
                        .registry
                        .send_event(&self.player_id, &GameEvent::error_for(&intent, &err)),
                },
                Err(e) => {
                    //  undecodable frames get a generic error; the socket
                    //  stays open
                    let err = ServiceError::bad_payload(&format!("unrecognized message: {}", e));
                    self.app.registry.send_event(
                        &self.player_id,
                        &GameEvent::GameCommandError {
                            code: err.kind,
                            message: err.message,
                        },
                    );
                }
            },
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => {}
        }
    }
}

impl Handler<WsEvent> for CatanWs {
    type Result = ();

    fn handle(&mut self, msg: WsEvent, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

/// Wire-level shape checks, before anything reaches a manager or an actor.
pub fn validate_intent(intent: &ClientIntent) -> Result<(), ServiceError> {
    match intent {
        ClientIntent::LobbyCreate {
            username,
            max_players,
        } => {
            validate_username(username)?;
            if !(2..=4).contains(max_players) {
                return Err(ServiceError::bad_payload("maxPlayers must be 2, 3 or 4"));
            }
        }
        ClientIntent::LobbyJoin { code, username } => {
            validate_username(username)?;
            if !GAME_CODE_RE.is_match(code) {
                return Err(ServiceError::bad_payload(
                    "game codes are six characters, A-Z and 0-9",
                ));
            }
        }
        ClientIntent::BuildSettlement { vertex_id } | ClientIntent::BuildCity { vertex_id } => {
            VertexKey::from_id(vertex_id)?;
        }
        ClientIntent::BuildRoad { edge_id } => {
            EdgeKey::from_id(edge_id)?;
        }
        ClientIntent::RobberMove { hex_id } => {
            HexKey::from_id(hex_id)?;
        }
        ClientIntent::ChatSend { text } => {
            if text.is_empty() || text.len() > MAX_CHAT_LEN {
                return Err(ServiceError::bad_payload("chat messages are 1-500 characters"));
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), ServiceError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ServiceError::bad_payload(
            "usernames are 2-20 characters: letters, digits, _ or -",
        ))
    }
}

async fn handle_intent(
    app: &Data<AppState>,
    player_id: &str,
    user_id: &str,
    fallback_username: &str,
    intent: &ClientIntent,
) -> Result<(), ServiceError> {
    match intent {
        ClientIntent::LobbyCreate {
            username,
            max_players,
        } => {
            let lobby = app
                .lobby_manager
                .create(player_id, user_id, username, *max_players)
                .await?;
            app.registry
                .send_event(player_id, &GameEvent::LobbyCreated { lobby });
            Ok(())
        }
        ClientIntent::LobbyJoin { code, username } => {
            let lobby = app
                .lobby_manager
                .join(code, player_id, user_id, username)
                .await?;
            broadcast_lobby(app, &lobby);
            Ok(())
        }
        ClientIntent::LobbyLeave => {
            if let Some(lobby) = app.lobby_manager.leave(player_id).await? {
                broadcast_lobby(app, &lobby);
                app.registry.broadcast(
                    &lobby.member_ids(),
                    &GameEvent::LobbyLeft {
                        player_id: player_id.to_owned(),
                    },
                );
            }
            Ok(())
        }
        ClientIntent::LobbyReady { is_ready } => {
            let lobby = app.lobby_manager.set_ready(player_id, *is_ready).await?;
            broadcast_lobby(app, &lobby);
            Ok(())
        }
        ClientIntent::LobbySetColor { color } => {
            let lobby = app.lobby_manager.set_color(player_id, *color).await?;
            broadcast_lobby(app, &lobby);
            Ok(())
        }
        ClientIntent::LobbyStartGame => {
            let lobby = app.lobby_manager.start_game(player_id).await?;
            start_countdown(app.clone(), lobby);
            Ok(())
        }
        ClientIntent::RequestState => {
            let state = app.session_manager.snapshot(player_id).await?;
            app.registry.send_event(
                player_id,
                &GameEvent::StateSnapshot {
                    state: Box::new(state),
                },
            );
            Ok(())
        }
        ClientIntent::ChatSend { text } => {
            //  in-game chat rides the game stream; lobby chat fans out here
            if app.session_manager.game_of(player_id).await.is_some() {
                app.session_manager.chat(player_id, text.clone()).await
            } else if let Some(code) = app.lobby_manager.lobby_of(player_id).await {
                if let Some(lobby) = app.lobby_manager.snapshot(&code).await {
                    app.registry.broadcast(
                        &lobby.member_ids(),
                        &GameEvent::ChatMessage {
                            player_id: player_id.to_owned(),
                            username: fallback_username.to_owned(),
                            text: text.clone(),
                        },
                    );
                }
                Ok(())
            } else {
                Err(ServiceError::not_in_game(player_id))
            }
        }
        other => {
            let action = match intent_to_action(other) {
                Some(action) => action,
                None => return Err(ServiceError::bad_payload("unroutable intent")),
            };
            app.session_manager.submit(player_id, action).await
        }
    }
}

fn intent_to_action(
    intent: &ClientIntent,
) -> Option<crate::games_service::rules::actions::GameAction> {
    use crate::games_service::rules::actions::GameAction;
    let action = match intent {
        ClientIntent::RollForOrder => GameAction::RollForOrder,
        ClientIntent::RollDice => GameAction::RollDice,
        ClientIntent::EndTurn => GameAction::EndTurn,
        ClientIntent::BuildSettlement { vertex_id } => GameAction::BuildSettlement {
            vertex_id: vertex_id.clone(),
        },
        ClientIntent::BuildCity { vertex_id } => GameAction::BuildCity {
            vertex_id: vertex_id.clone(),
        },
        ClientIntent::BuildRoad { edge_id } => GameAction::BuildRoad {
            edge_id: edge_id.clone(),
        },
        ClientIntent::BuyDevCard => GameAction::BuyDevCard,
        ClientIntent::RobberMove { hex_id } => GameAction::MoveRobber {
            hex_id: hex_id.clone(),
        },
        ClientIntent::RobberSteal { victim_id } => GameAction::StealResource {
            victim_id: victim_id.clone(),
        },
        ClientIntent::RobberDiscard { resources } => GameAction::DiscardResources {
            resources: *resources,
        },
        ClientIntent::TradePropose {
            offering,
            requesting,
            target_id,
        } => GameAction::ProposeTrade {
            offering: *offering,
            requesting: *requesting,
            target_id: target_id.clone(),
        },
        ClientIntent::TradeAccept { trade_id } => GameAction::AcceptTrade {
            trade_id: trade_id.clone(),
        },
        ClientIntent::TradeReject { trade_id } => GameAction::RejectTrade {
            trade_id: trade_id.clone(),
        },
        ClientIntent::TradeCancel { trade_id } => GameAction::CancelTrade {
            trade_id: trade_id.clone(),
        },
        ClientIntent::TradeBank { give, receive } => GameAction::BankTrade {
            give: *give,
            receive: *receive,
        },
        ClientIntent::TradePort { give, receive } => GameAction::PortTrade {
            give: *give,
            receive: *receive,
        },
        ClientIntent::PlayKnight => GameAction::PlayKnight,
        ClientIntent::PlayRoadBuilding => GameAction::PlayRoadBuilding,
        ClientIntent::PlayYearOfPlenty { first, second } => GameAction::PlayYearOfPlenty {
            first: *first,
            second: *second,
        },
        ClientIntent::PlayMonopoly { resource } => GameAction::PlayMonopoly {
            resource: *resource,
        },
        ClientIntent::FinishRoadBuilding => GameAction::FinishRoadBuilding,
        _ => return None,
    };
    Some(action)
}

fn broadcast_lobby(app: &Data<AppState>, lobby: &LobbySnapshot) {
    app.registry.broadcast(
        &lobby.member_ids(),
        &GameEvent::LobbyUpdated {
            lobby: lobby.clone(),
        },
    );
}

//  3 second countdown, then the lobby becomes a game and every connected
//  member gets an event stream
fn start_countdown(app: Data<AppState>, lobby: LobbySnapshot) {
    app.registry.broadcast(
        &lobby.member_ids(),
        &GameEvent::LobbyCountdown {
            seconds: COUNTDOWN_SECONDS,
        },
    );
    actix_web::rt::spawn(async move {
        tokio::time::sleep(Duration::from_secs(COUNTDOWN_SECONDS as u64)).await;
        let started = match app.lobby_manager.take_started(&lobby.code).await {
            Ok(l) => l,
            Err(e) => {
                log::warn!("lobby {} vanished during countdown: {}", lobby.code, e);
                return;
            }
        };
        match app.session_manager.create_game(&started).await {
            Ok(state) => {
                app.registry.broadcast(
                    &started.member_ids(),
                    &GameEvent::GameStarted {
                        code: state.code.clone(),
                    },
                );
                for player in &started.players {
                    spawn_event_pump(&app, &player.id).await;
                }
            }
            Err(e) => {
                log::error!("lobby {}: game creation failed: {}", lobby.code, e);
                app.registry.broadcast(
                    &started.member_ids(),
                    &GameEvent::LobbyError {
                        code: GameError::InternalError,
                        message: "the game could not be created".to_owned(),
                    },
                );
            }
        }
    });
}

/// Bridges a game actor's event stream onto a player's socket.  The pump
/// dies with either end; a reconnect builds a fresh one.
pub async fn spawn_event_pump(app: &Data<AppState>, player_id: &str) {
    let (tx, mut rx) = mpsc::channel::<GameEvent>(128);
    if let Err(e) = app.session_manager.subscribe(player_id, tx).await {
        log::debug!("no event pump for {}: {}", player_id, e);
        return;
    }
    let registry = app.registry.clone();
    let player_id = player_id.to_owned();
    actix_web::rt::spawn(async move {
        while let Some(event) = rx.recv().await {
            registry.send_event(&player_id, &event);
        }
    });
}

/// GET /api/v1/ws?userId=..&username=..&playerId=..
/// `playerId` is the stable identity issued on first connect; presenting
/// it again re-binds the socket to the same seat.
pub async fn ws_bootstrap(
    query: Query<HashMap<String, String>>,
    req: HttpRequest,
    stream: Payload,
    app: Data<AppState>,
) -> Result<HttpResponse, Error> {
    let player_id = query
        .get("playerId")
        .cloned()
        .unwrap_or_else(crate::shared::utility::get_id);
    let user_id = query
        .get("userId")
        .cloned()
        .unwrap_or_else(crate::shared::utility::get_id);
    let username = query
        .get("username")
        .filter(|u| USERNAME_RE.is_match(u))
        .cloned()
        .unwrap_or_else(|| "player".to_owned());

    ws::start(CatanWs::new(player_id, user_id, username, app), &req, stream)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
