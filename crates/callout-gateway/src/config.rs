//! Gateway configuration
//!
//! All configuration is read once at startup into an explicit [`Config`]
//! value; components receive what they need through constructors and never
//! consult the environment themselves.

use crate::error::ConfigError;
use std::env;
use tracing::Level;

/// Gateway configuration, read once at startup
pub struct Config {
    /// Trust-domain account nkey seed ("SA...")
    pub signing_seed: String,
    /// Base64-encoded JWKS document of the external provider
    pub provider_jwks_b64: String,
    /// Bus endpoint to connect to
    pub bus_url: String,
    /// Optional bus username
    pub bus_user: Option<String>,
    /// Optional bus password
    pub bus_password: Option<String>,
    /// Requested log verbosity (raw value, parsed with [`parse_log_level`])
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("signing_seed", &"[redacted]")
            .field("provider_jwks_b64", &format!("{} bytes", self.provider_jwks_b64.len()))
            .field("bus_url", &self.bus_url)
            .field("bus_user", &self.bus_user)
            .field(
                "bus_password",
                &self.bus_password.as_deref().map(mask_secret),
            )
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Read the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            signing_seed: require("AUTH_ACCOUNT_SIGNING_SEED")?,
            provider_jwks_b64: require("PROVIDER_JWKS_B64")?,
            bus_url: require("BUS_URL")?,
            bus_user: env::var("BUS_USER").ok(),
            bus_password: env::var("BUS_PASSWORD").ok(),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        })
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

/// Parse a log level, falling back to `info` for unrecognized values
///
/// Returns the level and whether the raw value was recognized; the caller
/// warns on fallback once the subscriber is installed.
pub fn parse_log_level(raw: &str) -> (Level, bool) {
    match raw.parse() {
        Ok(level) => (level, true),
        Err(_) => (Level::INFO, false),
    }
}

/// Mask a secret down to a short prefix for debug logging
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(3).collect();
    format!("{}****", prefix)
}
