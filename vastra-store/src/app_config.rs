use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub carrier: CarrierConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Shiprocket account settings. `enabled = false` forces every shipment onto
/// the manual path.
#[derive(Debug, Deserialize, Clone)]
pub struct CarrierConfig {
    pub email: String,
    pub password: String,
    #[serde(default = "default_carrier_base_url")]
    pub base_url: String,
    #[serde(default = "default_pickup_location")]
    pub pickup_location: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_carrier_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub relay_url: String,
    pub api_key: String,
    pub from_address: String,
}

fn default_carrier_base_url() -> String {
    "https://apiv2.shiprocket.in".to_string()
}

fn default_pickup_location() -> String {
    "Primary".to_string()
}

fn default_true() -> bool {
    true
}

fn default_carrier_timeout() -> u64 {
    20
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that shouldn't be checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VASTRA)
            // Eg.. `VASTRA_SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("VASTRA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
