use std::{env, net::SocketAddr};

pub const DEFAULT_DATABASE_URL: &str = "app.db";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5555";
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddress { name: &'static str, value: String },
    #[error("{name} must be a positive integer, got {value}")]
    InvalidPoolSize { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub pool_size: u32,
}

impl Config {
    /// Reads `DB_URI`, `BIND_ADDRESS` and `DB_POOL_SIZE` from the process
    /// environment (after `.env` has been loaded by the caller).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DB_URI")
            .map(|uri| sqlite_path(&uri).to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_address = match lookup("BIND_ADDRESS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidAddress {
                name: "BIND_ADDRESS",
                value,
            })?,
            None => DEFAULT_BIND_ADDRESS
                .parse()
                .map_err(|_| ConfigError::InvalidAddress {
                    name: "BIND_ADDRESS",
                    value: DEFAULT_BIND_ADDRESS.to_string(),
                })?,
        };

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(value) => match value.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidPoolSize {
                        name: "DB_POOL_SIZE",
                        value,
                    })
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            bind_address,
            pool_size,
        })
    }
}

/// Accepts SQLAlchemy style `sqlite:///relative.db` and `sqlite:////abs.db`
/// as well as a bare path.
fn sqlite_path(uri: &str) -> &str {
    uri.strip_prefix("sqlite:///").unwrap_or(uri)
}
