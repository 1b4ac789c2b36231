use crate::games_service::dev_cards::{DevCard, DevCardKind};
use crate::games_service::game::game_enums::{GamePhase, TurnPhase};
use crate::games_service::game::game_state::{GameState, TradeProposal};
use crate::games_service::game::resources::{Resource, ResourceCount};
use crate::games_service::lobby::LobbySnapshot;
use crate::games_service::player::PlayerColor;
use crate::shared::shared_models::{GameError, ServiceError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/**
 *  the two wire vocabularies: client intents in, server events out.  both
 *  are externally tagged as {"type": "...", "payload": {...}} so clients
 *  dispatch on one string.  every intent is schema-checked by serde typing
 *  plus the gateway's id/code validation before it reaches a game actor.
 */

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    #[serde(rename = "lobby:create")]
    LobbyCreate { username: String, max_players: usize },
    #[serde(rename = "lobby:join")]
    LobbyJoin { code: String, username: String },
    #[serde(rename = "lobby:leave")]
    LobbyLeave,
    #[serde(rename = "lobby:ready")]
    LobbyReady { is_ready: bool },
    #[serde(rename = "lobby:set_color")]
    LobbySetColor { color: PlayerColor },
    #[serde(rename = "lobby:start_game")]
    LobbyStartGame,
    #[serde(rename = "game:roll_for_order")]
    RollForOrder,
    #[serde(rename = "game:roll_dice")]
    RollDice,
    #[serde(rename = "game:end_turn")]
    EndTurn,
    #[serde(rename = "game:request_state")]
    RequestState,
    #[serde(rename = "build:settlement")]
    BuildSettlement { vertex_id: String },
    #[serde(rename = "build:city")]
    BuildCity { vertex_id: String },
    #[serde(rename = "build:road")]
    BuildRoad { edge_id: String },
    #[serde(rename = "build:dev_card")]
    BuyDevCard,
    #[serde(rename = "robber:move")]
    RobberMove { hex_id: String },
    #[serde(rename = "robber:steal")]
    RobberSteal { victim_id: String },
    #[serde(rename = "robber:discard")]
    RobberDiscard { resources: ResourceCount },
    #[serde(rename = "trade:propose")]
    TradePropose {
        offering: ResourceCount,
        requesting: ResourceCount,
        target_id: Option<String>,
    },
    #[serde(rename = "trade:accept")]
    TradeAccept { trade_id: String },
    #[serde(rename = "trade:reject")]
    TradeReject { trade_id: String },
    #[serde(rename = "trade:cancel")]
    TradeCancel { trade_id: String },
    #[serde(rename = "trade:bank")]
    TradeBank { give: Resource, receive: Resource },
    #[serde(rename = "trade:port")]
    TradePort { give: Resource, receive: Resource },
    #[serde(rename = "devcard:play_knight")]
    PlayKnight,
    #[serde(rename = "devcard:play_road_building")]
    PlayRoadBuilding,
    #[serde(rename = "devcard:play_year_of_plenty")]
    PlayYearOfPlenty { first: Resource, second: Resource },
    #[serde(rename = "devcard:play_monopoly")]
    PlayMonopoly { resource: Resource },
    #[serde(rename = "devcard:finish_road_building")]
    FinishRoadBuilding,
    #[serde(rename = "chat:send")]
    ChatSend { text: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum GameEvent {
    #[serde(rename = "connection:established")]
    ConnectionEstablished { player_id: String },
    #[serde(rename = "lobby:created")]
    LobbyCreated { lobby: LobbySnapshot },
    #[serde(rename = "lobby:updated")]
    LobbyUpdated { lobby: LobbySnapshot },
    #[serde(rename = "lobby:left")]
    LobbyLeft { player_id: String },
    #[serde(rename = "lobby:countdown")]
    LobbyCountdown { seconds: u8 },
    #[serde(rename = "game:state")]
    StateSnapshot { state: Box<GameState> },
    #[serde(rename = "game:started")]
    GameStarted { code: String },
    #[serde(rename = "game:roll_for_order_result")]
    RollForOrderResult {
        player_id: String,
        dice: (u8, u8),
        total: u8,
    },
    #[serde(rename = "game:turn_changed")]
    TurnChanged {
        current_player_id: String,
        turn_number: u32,
    },
    #[serde(rename = "game:phase_changed")]
    PhaseChanged {
        phase: GamePhase,
        turn_phase: TurnPhase,
    },
    #[serde(rename = "game:ended")]
    GameEnded { winner_id: String },
    #[serde(rename = "dice:rolled")]
    DiceRolled {
        player_id: String,
        dice: (u8, u8),
        total: u8,
    },
    #[serde(rename = "dice:resources_distributed")]
    ResourcesDistributed {
        gains: BTreeMap<String, ResourceCount>,
    },
    #[serde(rename = "build:settlement_placed")]
    SettlementPlaced {
        player_id: String,
        vertex_id: String,
    },
    #[serde(rename = "build:city_placed")]
    CityPlaced {
        player_id: String,
        vertex_id: String,
    },
    #[serde(rename = "build:road_placed")]
    RoadPlaced { player_id: String, edge_id: String },
    #[serde(rename = "robber:activated")]
    RobberActivated { triggered_by: String },
    #[serde(rename = "robber:discard_required")]
    DiscardRequired { player_id: String, count: u32 },
    #[serde(rename = "robber:player_discarded")]
    PlayerDiscarded { player_id: String, count: u32 },
    #[serde(rename = "robber:moved")]
    RobberMoved { player_id: String, hex_id: String },
    #[serde(rename = "robber:steal")]
    RobberStole {
        thief_id: String,
        victim_id: String,
    },
    //  targeted to thief and victim only; the broadcast stream never
    //  carries the resource type
    #[serde(rename = "robber:stolen_resource")]
    StolenResource { resource: Resource },
    #[serde(rename = "trade:proposed")]
    TradeProposed { trade: TradeProposal },
    #[serde(rename = "trade:accepted")]
    TradeAccepted {
        trade_id: String,
        accepter_id: String,
    },
    #[serde(rename = "trade:rejected")]
    TradeRejected {
        trade_id: String,
        rejecter_id: String,
    },
    #[serde(rename = "trade:cancelled")]
    TradeCancelled { trade_id: String },
    #[serde(rename = "trade:completed")]
    TradeCompleted {
        trade_id: Option<String>,
        player_id: String,
        partner_id: Option<String>,
        gave: ResourceCount,
        received: ResourceCount,
    },
    #[serde(rename = "devcard:purchased")]
    DevCardPurchased {
        player_id: String,
        deck_count: usize,
    },
    //  targeted to the buyer
    #[serde(rename = "devcard:drawn")]
    DevCardDrawn { card: DevCard },
    #[serde(rename = "devcard:played")]
    DevCardPlayed {
        player_id: String,
        kind: DevCardKind,
    },
    #[serde(rename = "achievement:longest_road")]
    LongestRoad {
        holder_id: Option<String>,
        length: u32,
    },
    #[serde(rename = "achievement:largest_army")]
    LargestArmy {
        holder_id: Option<String>,
        size: u32,
    },
    #[serde(rename = "player:disconnected")]
    PlayerDisconnected { player_id: String },
    #[serde(rename = "player:reconnected")]
    PlayerReconnected { player_id: String },
    #[serde(rename = "player:resources_updated")]
    ResourcesUpdated {
        player_id: String,
        resources: ResourceCount,
    },
    #[serde(rename = "player:victory_points")]
    VictoryPoints {
        player_id: String,
        public_victory_points: u32,
    },
    #[serde(rename = "chat:message")]
    ChatMessage {
        player_id: String,
        username: String,
        text: String,
    },
    #[serde(rename = "lobby:error")]
    LobbyError { code: GameError, message: String },
    #[serde(rename = "game:error")]
    GameCommandError { code: GameError, message: String },
    #[serde(rename = "build:error")]
    BuildError { code: GameError, message: String },
    #[serde(rename = "trade:error")]
    TradeError { code: GameError, message: String },
}

impl GameEvent {
    /// Wraps a rejected intent into the error event family the client is
    /// listening on.
    pub fn error_for(intent: &ClientIntent, err: &ServiceError) -> GameEvent {
        match intent {
            ClientIntent::LobbyCreate { .. }
            | ClientIntent::LobbyJoin { .. }
            | ClientIntent::LobbyLeave
            | ClientIntent::LobbyReady { .. }
            | ClientIntent::LobbySetColor { .. }
            | ClientIntent::LobbyStartGame => GameEvent::LobbyError {
                code: err.kind,
                message: err.message.clone(),
            },
            ClientIntent::BuildSettlement { .. }
            | ClientIntent::BuildCity { .. }
            | ClientIntent::BuildRoad { .. }
            | ClientIntent::BuyDevCard
            | ClientIntent::PlayKnight
            | ClientIntent::PlayRoadBuilding
            | ClientIntent::PlayYearOfPlenty { .. }
            | ClientIntent::PlayMonopoly { .. }
            | ClientIntent::FinishRoadBuilding => GameEvent::BuildError {
                code: err.kind,
                message: err.message.clone(),
            },
            ClientIntent::TradePropose { .. }
            | ClientIntent::TradeAccept { .. }
            | ClientIntent::TradeReject { .. }
            | ClientIntent::TradeCancel { .. }
            | ClientIntent::TradeBank { .. }
            | ClientIntent::TradePort { .. } => GameEvent::TradeError {
                code: err.kind,
                message: err.message.clone(),
            },
            _ => GameEvent::GameCommandError {
                code: err.kind,
                message: err.message.clone(),
            },
        }
    }
}

//  who should see an event.  errors are always per-client; a few game
//  events (steal reveal, drawn card) go to one player as well
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    All,
    Player(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub audience: Audience,
    pub event: GameEvent,
}

impl EngineEvent {
    pub fn all(event: GameEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn to(player_id: &str, event: GameEvent) -> Self {
        Self {
            audience: Audience::Player(player_id.to_owned()),
            event,
        }
    }
}
