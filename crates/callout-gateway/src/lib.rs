//! # Callout Gateway
//!
//! Authorization callout gateway for a NATS-style message bus. Sits at the
//! trust boundary between an external identity provider (RSA-signed OIDC
//! tokens) and the bus's internal trust domain: for every connection
//! attempt it validates the presented bearer token, derives least-privilege
//! publish/subscribe capabilities from the token's claims, and answers with
//! a short-lived credential signed by the trust domain's account key.
//!
//! ## Pipeline
//!
//! ```text
//! bus request -> decode -> validate token -> derive capabilities -> issue -> reply
//! ```
//!
//! Every request gets exactly one reply; failures become signed generic
//! denials, never silence.

pub mod config;
pub mod error;
pub mod issuer;
pub mod keyset;
pub mod policy;
pub mod service;
pub mod validator;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::Config;
pub use error::{AuthError, ConfigError, KeySetError, StartupError, ValidationError};
pub use issuer::CredentialIssuer;
pub use keyset::ProviderKeySet;
pub use service::{CalloutService, AUTH_CALLOUT_SUBJECT};
pub use validator::{ExternalClaims, TokenValidator};
