use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
}

impl AppConfig {
    /// Defaults, then `estate.toml`, then `ESTATE_*` variables, then `DATABASE_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        let builder = Self::defaults()?
            .add_source(File::with_name("estate").required(false))
            .add_source(Environment::with_prefix("ESTATE").try_parsing(true))
            .set_override_option("database_url", env::var("DATABASE_URL").ok())?;
        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database_url", "estate.db")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("pool_size", 8)
    }
}
