#![allow(dead_code)]

/**
 *  the configuration the service needs to run, loaded from the environment
 *  once and only once the first time it is accessed.  there are no command
 *  line flags -- everything an operator can set arrives as an env var.
 */
use lazy_static::lazy_static;
use std::env;

lazy_static! {
    pub static ref SERVICE_CONFIG: ServiceConfig = ServiceConfig::from_env();
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    /// CORS allowlist origin; None means permissive (dev mode)
    pub frontend_url: Option<String>,
    /// handed to the storage adapter; the core never touches it
    pub database_url: Option<String>,
    /// seconds before a disconnected player's turn is auto-played; None disables
    pub turn_timeout_seconds: Option<u64>,
    /// seconds a fully-disconnected game survives before it is reaped
    pub abandonment_seconds: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let turn_timeout_seconds = env::var("TURN_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0);

        let abandonment_seconds = env::var("ABANDONMENT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Self {
            port,
            frontend_url: env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            turn_timeout_seconds,
            abandonment_seconds,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: None,
            database_url: None,
            turn_timeout_seconds: None,
            abandonment_seconds: 600,
        }
    }
}
