//! Process configuration read from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_SERVICE_NAME: &str = "catalog";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_PUBLISH_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where items are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

/// Where published events go after the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusBackend {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub service_name: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreBackend,
    pub bus: BusBackend,
    pub publish_queue_capacity: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let service_name = get("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let store = match get("ITEM_STORE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "ITEM_STORE",
                    value: other.to_string(),
                });
            }
        };

        let bus = match get("EVENT_BUS").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => BusBackend::Memory,
            Some("redis") => BusBackend::Redis {
                url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "EVENT_BUS",
                    value: other.to_string(),
                });
            }
        };

        let publish_queue_capacity = match get("PUBLISH_QUEUE_CAPACITY") {
            None => DEFAULT_PUBLISH_QUEUE_CAPACITY,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PUBLISH_QUEUE_CAPACITY",
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            service_name,
            bind_addr,
            jwt_secret,
            store,
            bus,
            publish_queue_capacity,
        })
    }
}
