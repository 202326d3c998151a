//! Server configuration.
//!
//! Defaults suit local development; [`ServerConfig::from_env`] overrides
//! them from the process environment.

use std::env;

/// Runtime settings for a [`ParlorServer`](crate::ParlorServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Inbox size of each namespace actor.
    pub command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            log_filter: "info".to_string(),
            command_buffer: 64,
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from environment variables.
    ///
    /// - `PORT` binds `0.0.0.0:<PORT>`; otherwise `PARLOR_ADDR`, otherwise the default
    /// - `PARLOR_LOG` sets the log filter
    /// - `PARLOR_COMMAND_BUFFER` sets the namespace inbox size
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: port })?;
            config.bind_addr = format!("0.0.0.0:{port}");
        } else if let Some(addr) = lookup("PARLOR_ADDR") {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::Invalid { key: "PARLOR_ADDR", value: addr });
            }
            config.bind_addr = addr;
        }

        if let Some(filter) = lookup("PARLOR_LOG") {
            config.log_filter = filter;
        }

        if let Some(size) = lookup("PARLOR_COMMAND_BUFFER") {
            config.command_buffer = size
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { key: "PARLOR_COMMAND_BUFFER", value: size })?;
        }

        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}
