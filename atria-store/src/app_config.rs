use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// `url: None` runs the service against the in-memory store.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
}

fn default_jwt_secret() -> String {
    "dev-secret-change-me".to_string()
}

fn default_jwt_expiration() -> u64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_seconds: default_jwt_expiration(),
        }
    }
}

/// Payment gateway credentials. Leaving the key pair unset switches the
/// service into test mode: mock orders, signature verification skipped.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub api_url: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            key_secret: None,
            currency: default_currency(),
            api_url: None,
        }
    }
}

impl GatewayConfig {
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.key_id, &self.key_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_grace_minutes")]
    pub hold_grace_minutes: i64,
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: i64,
    #[serde(default = "default_durations")]
    pub allowed_durations_hours: Vec<i64>,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_grace_minutes() -> i64 {
    15
}

fn default_clock_skew() -> i64 {
    60
}

fn default_durations() -> Vec<i64> {
    vec![1, 2, 3, 4, 5, 8]
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            hold_grace_minutes: default_grace_minutes(),
            clock_skew_seconds: default_clock_skew(),
            allowed_durations_hours: default_durations(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Environment-specific overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, kept out of version control
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables, e.g. ATRIA__GATEWAY__KEY_SECRET
            .add_source(config::Environment::with_prefix("ATRIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
