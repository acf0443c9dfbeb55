use serde::Deserialize;
use std::env;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

pub const DEFAULT_TABLE_NAME: &str = "OrderSolicitations";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Which table implementation backs the order repository
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Dynamodb,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub table_name: String,
    pub region: String,
    /// Local DynamoDB endpoint, e.g. http://localhost:8000
    pub service_url: Option<String>,
}

impl StoreConfig {
    pub fn local_endpoint(&self) -> Option<&str> {
        self.service_url.as_deref().filter(|url| !url.is_empty())
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `KITCHEN__STORE__TABLE_NAME=Orders` sets `store.table_name`
            .add_source(config::Environment::with_prefix("KITCHEN").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.port", 8080_i64)?
            .set_default("store.backend", "dynamodb")?
            .set_default("store.table_name", DEFAULT_TABLE_NAME)?
            .set_default("store.region", "us-east-1")
    }
}
