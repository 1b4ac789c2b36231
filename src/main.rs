/**
 *  main entry point for the application.  the goal here is to stand up the
 *  web server: one websocket route for the whole game protocol, a health
 *  probe, CORS for the configured frontend, and the shared managers in
 *  app data.
 */
mod games_service;
mod macros;
mod shared;

use actix_cors::Cors;
use actix_web::{
    web::{self, Data},
    App, HttpServer,
};
use anyhow::Context;
use games_service::catanws::{self, AppState, ConnectionRegistry};
use games_service::game_container::SessionManager;
use games_service::lobby::LobbyManager;
use games_service::storage::NoopStore;
use shared::service_config::SERVICE_CONFIG;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SERVICE_CONFIG.clone();
    full_info!(
        "starting on port {} (turn timeout: {:?})",
        config.port,
        config.turn_timeout_seconds
    );

    //  the persistence adapter is a no-op until an operator wires one in;
    //  DATABASE_URL is reserved for that adapter
    let store = Arc::new(NoopStore);
    let app_state = Data::new(AppState {
        lobby_manager: LobbyManager::new(),
        session_manager: Arc::new(SessionManager::new(store, &config)),
        registry: ConnectionRegistry::default(),
    });

    let bind_addr = ("0.0.0.0", config.port);
    HttpServer::new(move || {
        let cors = match &SERVICE_CONFIG.frontend_url {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::permissive(),
        };
        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .service(
                web::scope("/api/v1")
                    .route("/ws", web::get().to(catanws::ws_bootstrap))
                    .route("/health", web::get().to(catanws::health)),
            )
    })
    .bind(bind_addr)
    .with_context(|| format!("cannot listen on {}:{}", bind_addr.0, bind_addr.1))?
    .run()
    .await
    .context("server stopped with an error")
}
