//! # Callout Core
//!
//! Bus credential model for the callout gateway: the compact `ed25519-nkey`
//! JWT encoding, publish/subscribe capability types, the claim sets of the
//! authorization callout exchange, and the trust domain's signing identity.
//!
//! ## Credential layers
//!
//! - **Authorization request**: published by the bus for every connection
//!   attempt, carries the client's external bearer token
//! - **User credential**: the short-lived inner credential scoping a single
//!   connection to an explicit permission set
//! - **Authorization response**: the signed outer envelope returning either
//!   a user credential or a generic denial

pub mod credential;
pub mod error;
pub mod jwt;
pub mod permissions;
pub mod signing;

pub use credential::{
    AuthRequestClaims, AuthRequestPayload, AuthResponseClaims, AuthResponsePayload,
    ConnectOptions, ServerInfo, UserClaims, UserPayload, GLOBAL_ACCOUNT,
    USER_CREDENTIAL_TTL_SECS,
};
pub use error::{CredentialError, Result};
pub use permissions::{CapabilityRule, CapabilitySet, Direction, PermissionList, Permissions};
pub use signing::{verify_signature, SigningIdentity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
