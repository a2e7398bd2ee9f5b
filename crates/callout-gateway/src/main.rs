//! Callout Gateway Binary
//!
//! Loads configuration, builds the signing identity and provider key set,
//! connects to the bus, and serves authorization callouts until shutdown.
//! Startup errors are fatal; there is no partial-startup mode.

use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use callout_core::SigningIdentity;
use callout_gateway::config::{mask_secret, parse_log_level};
use callout_gateway::{
    CalloutService, Config, CredentialIssuer, ProviderKeySet, TokenValidator,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };

    // Initialize logging
    let (log_level, recognized) = parse_log_level(&config.log_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !recognized {
        warn!(value = %config.log_level, "Unrecognized LOG_LEVEL, defaulting to info");
    }

    // Trust-domain signing identity
    let identity = match SigningIdentity::from_seed(&config.signing_seed) {
        Ok(identity) => Arc::new(identity),
        Err(e) => {
            error!(error = %e, "Failed to load account signing identity");
            process::exit(1);
        }
    };

    // Provider key set
    let keys = match ProviderKeySet::from_base64(&config.provider_jwks_b64) {
        Ok(keys) => Arc::new(keys),
        Err(e) => {
            error!(error = %e, "Failed to load provider key set");
            process::exit(1);
        }
    };
    if keys.is_empty() {
        warn!("Provider key set holds no keys; every token will be denied");
    }

    // Bus connection
    debug!(
        url = %config.bus_url,
        user = ?config.bus_user,
        password = ?config.bus_password.as_deref().map(mask_secret),
        "Connecting to bus"
    );
    let mut options = async_nats::ConnectOptions::new();
    if let (Some(user), Some(password)) = (&config.bus_user, &config.bus_password) {
        options = options.user_and_password(user.clone(), password.clone());
    }
    let client = match options.connect(config.bus_url.as_str()).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, url = %config.bus_url, "Failed to connect to bus");
            process::exit(1);
        }
    };

    info!(
        account = %identity.account_id(),
        provider_keys = keys.len(),
        "Starting callout gateway"
    );

    let validator = Arc::new(TokenValidator::new(keys));
    let issuer = Arc::new(CredentialIssuer::new(identity));
    let service = Arc::new(CalloutService::new(validator, issuer));

    if let Err(e) = service.run(client).await {
        error!(error = %e, "Callout service terminated");
        process::exit(1);
    }
}
