use std::{env, net::SocketAddr, time::Duration};

use services::services::config::EditorConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub editor: EditorConfig,
}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

impl ServerConfig {
    /// Read `CARDS_*`, `HOST` and `PORT`, falling back to local defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut editor = EditorConfig::default();
        if let Ok(origin) = env::var("CARDS_PUBLIC_ORIGIN") {
            editor.public_origin = origin;
        }
        if let Some(ms) = parse_var::<u64>("CARDS_AUTO_SAVE_MS")? {
            editor.auto_save_delay = Duration::from_millis(ms);
        }

        Ok(Self {
            database_url: env::var("CARDS_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://cards.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT")?.unwrap_or(3000),
            editor,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: raw,
        })
    }
}
