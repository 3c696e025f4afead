//! Server configuration read from the environment (and `.env`).
use std::env;

use log::warn;

use crate::ai::AiConfig;

const DEFAULT_DATABASE_URL: &str = "/tmp/lamp.db";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEVELOPMENT_SECRET: &str = "development-secret-key-change-in-production";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub sentry_dsn: Option<String>,
    /// Secret used to sign session tokens.
    pub auth_secret: Vec<u8>,
    /// Shared secret guarding the seed endpoint. Seeding is disabled
    /// when unset.
    pub admin_seed_key: Option<String>,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let auth_secret = non_empty("AUTH_SECRET").unwrap_or_else(|| {
            warn!("AUTH_SECRET is not set; using the development secret");
            DEVELOPMENT_SECRET.to_string()
        });

        Config {
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_address: non_empty("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            sentry_dsn: non_empty("SENTRY_DSN"),
            auth_secret: auth_secret.into_bytes(),
            admin_seed_key: non_empty("ADMIN_SEED_KEY"),
            ai: AiConfig::from_env(),
        }
    }
}

/// Reads an environment variable, treating an empty value as unset.
pub(crate) fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
