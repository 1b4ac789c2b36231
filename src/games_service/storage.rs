use crate::games_service::game::game_state::GameState;
use crate::shared::shared_models::ServiceError;
use async_trait::async_trait;

/**
 *  persistence boundary.  the core is in-memory; finished games are handed
 *  to whatever adapter the operator wires in.  the default keeps nothing.
 */
#[async_trait]
pub trait GameStoreTrait: Send + Sync {
    /// Called once when a game reaches `finished`.
    async fn save_finished(&self, state: &GameState) -> Result<(), ServiceError>;

    /// Optional crash recovery; the core never requires it.
    async fn load_game(&self, code: &str) -> Result<Option<GameState>, ServiceError>;
}

pub struct NoopStore;

#[async_trait]
impl GameStoreTrait for NoopStore {
    async fn save_finished(&self, state: &GameState) -> Result<(), ServiceError> {
        log::debug!("noop store: dropping finished game {}", state.code);
        Ok(())
    }

    async fn load_game(&self, _code: &str) -> Result<Option<GameState>, ServiceError> {
        Ok(None)
    }
}
