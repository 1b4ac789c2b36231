use crate::games_service::game::resources::{Resource, ResourceCount};
use serde::{Deserialize, Serialize};

/**
 *  the commands a game actor feeds the rules engine.  the gateway maps wire
 *  intents onto these one-for-one; build actions double as setup placements
 *  because the engine dispatches on the game phase.
 */
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GameAction {
    RollForOrder,
    RollDice,
    EndTurn,
    BuildSettlement {
        vertex_id: String,
    },
    BuildCity {
        vertex_id: String,
    },
    BuildRoad {
        edge_id: String,
    },
    BuyDevCard,
    MoveRobber {
        hex_id: String,
    },
    StealResource {
        victim_id: String,
    },
    DiscardResources {
        resources: ResourceCount,
    },
    ProposeTrade {
        offering: ResourceCount,
        requesting: ResourceCount,
        target_id: Option<String>,
    },
    AcceptTrade {
        trade_id: String,
    },
    RejectTrade {
        trade_id: String,
    },
    CancelTrade {
        trade_id: String,
    },
    BankTrade {
        give: Resource,
        receive: Resource,
    },
    PortTrade {
        give: Resource,
        receive: Resource,
    },
    PlayKnight,
    PlayRoadBuilding,
    PlayYearOfPlenty {
        first: Resource,
        second: Resource,
    },
    PlayMonopoly {
        resource: Resource,
    },
    FinishRoadBuilding,
}
