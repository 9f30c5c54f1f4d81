//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Hard ceiling on concurrently running matches
    pub max_concurrent_matches: usize,
    /// Runner poll interval when no work is ready
    pub poll_interval: Duration,
    /// Connections paired into each match
    pub players_per_match: usize,
    /// Per-connection receive deadline within a round
    pub recv_timeout: Duration,

    /// Arena grid dimensions
    pub arena_width: i32,
    pub arena_height: i32,
    /// Fixed arena seed for reproducible runs; generated when absent
    pub arena_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:45678".to_string());

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            max_concurrent_matches: parse_or("MAX_CONCURRENT_MATCHES", 10)?,
            poll_interval: Duration::from_millis(parse_or("POLL_INTERVAL_MS", 100)?),
            players_per_match: parse_or("PLAYERS_PER_MATCH", 2)?,
            recv_timeout: Duration::from_secs(parse_or("RECV_TIMEOUT_SECS", 30)?),

            arena_width: parse_or("ARENA_WIDTH", 20)?,
            arena_height: parse_or("ARENA_HEIGHT", 20)?,
            arena_seed: match env::var("ARENA_SEED") {
                Ok(raw) => Some(
                    raw.parse()
                        .map_err(|_| ConfigError::InvalidNumber("ARENA_SEED"))?,
                ),
                Err(_) => None,
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid numeric value for environment variable: {0}")]
    InvalidNumber(&'static str),
}
