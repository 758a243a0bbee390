//! Service configuration from environment variables.
//!
//! Each loader has a `from_env` form and a `from_lookup` form taking any
//! `Fn(&str) -> Option<String>`, so tests never touch the process
//! environment. Empty values count as unset. `.env` files are loaded by the
//! binaries before calling these.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::billing::LatencyPolicy;

pub const DEFAULT_GRPC_ADDR: &str = "0.0.0.0:50051";
pub const DEFAULT_STORE_TABLE: &str = "orders";
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn millis_or(&self, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse_or(key, default.as_millis() as u64)
            .map(Duration::from_millis)
    }

    fn nats(&self, default_name: &str) -> Result<NatsConfig, ConfigError> {
        Ok(NatsConfig {
            url: self.required("NATS_URL")?,
            client_name: self
                .get("NATS_CLIENT_NAME")
                .unwrap_or_else(|| default_name.to_string()),
        })
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Bus connection settings shared by every service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NatsConfig {
    pub url: String,
    pub client_name: String,
}

/// Where the order service keeps its documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { url: String, table: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderServiceConfig {
    pub nats: NatsConfig,
    pub grpc_addr: SocketAddr,
    pub store: StoreConfig,
}

impl OrderServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let grpc_addr = env
            .get("GRPC_URL")
            .unwrap_or_else(|| DEFAULT_GRPC_ADDR.to_string());
        // ":50051" means every interface.
        let grpc_addr = match grpc_addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => grpc_addr,
        };
        let grpc_addr = grpc_addr.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                key: "GRPC_URL",
                reason: e.to_string(),
                value: grpc_addr.clone(),
            }
        })?;

        let store = match env.get("DOCUMENT_STORE_URL") {
            None => StoreConfig::InMemory,
            Some(url) => StoreConfig::Postgres {
                url,
                table: env
                    .get("DOCUMENT_STORE_DB")
                    .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string()),
            },
        };

        Ok(Self {
            nats: env.nats("order-service")?,
            grpc_addr,
            store,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BillingConfig {
    pub nats: NatsConfig,
    pub order_service_host: String,
    /// Raw configured value; clamped by `PaymentDecider`.
    pub success_rate: f64,
    pub latency: LatencyPolicy,
    pub handler_timeout: Duration,
}

impl BillingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let latency = LatencyPolicy::Uniform {
            min: env.millis_or("PAYMENT_MIN_DELAY_MS", Duration::from_millis(1000))?,
            max: env.millis_or("PAYMENT_MAX_DELAY_MS", Duration::from_millis(2000))?,
        };

        Ok(Self {
            nats: env.nats("billing-service")?,
            order_service_host: env.required("ORDER_SERVICE_HOST")?,
            success_rate: env.parse_or("PAYMENT_SUCCESS_RATE", 0.0)?,
            latency,
            handler_timeout: env.millis_or("HANDLER_TIMEOUT_MS", DEFAULT_HANDLER_TIMEOUT)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationConfig {
    pub nats: NatsConfig,
    pub order_service_host: String,
    pub handler_timeout: Duration,
}

impl NotificationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let env = Env { lookup };
        Ok(Self {
            nats: env.nats("notification-service")?,
            order_service_host: env.required("ORDER_SERVICE_HOST")?,
            handler_timeout: env.millis_or("HANDLER_TIMEOUT_MS", DEFAULT_HANDLER_TIMEOUT)?,
        })
    }
}
