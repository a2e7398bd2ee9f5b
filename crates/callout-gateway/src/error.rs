//! Error types for the callout gateway
//!
//! Per-request failures (`ValidationError`, `AuthError`) are contained and
//! answered with a generic denial; `KeySetError`, `ConfigError`, and
//! `StartupError` are fatal at startup.

use thiserror::Error;

/// Errors from validating an external provider token
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Token names a key id the provisioned key set does not contain
    #[error("Unknown key id: {0}")]
    UnknownKeyId(String),

    /// Token is not structurally a verifiable JWT
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Signature did not verify against the resolved key
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Token is outside its validity window
    #[error("Token expired")]
    Expired,

    /// A required claim is missing or has the wrong shape
    #[error("Claim shape error: {0}")]
    ClaimShape(String),
}

impl From<jsonwebtoken::errors::Error> for ValidationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => ValidationError::Expired,
            ErrorKind::InvalidSignature => ValidationError::SignatureInvalid(err.to_string()),
            ErrorKind::InvalidAlgorithm => ValidationError::SignatureInvalid(err.to_string()),
            ErrorKind::MissingRequiredClaim(claim) => {
                ValidationError::ClaimShape(format!("missing claim '{}'", claim))
            }
            ErrorKind::Json(e) => ValidationError::ClaimShape(e.to_string()),
            _ => ValidationError::MalformedToken(err.to_string()),
        }
    }
}

/// Per-request errors caught inside the callout service
#[derive(Error, Debug)]
pub enum AuthError {
    /// The authorization request envelope could not be decoded
    #[error("Request decode failed: {0}")]
    Decode(String),

    /// The embedded bearer token failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Building or signing the credential failed
    #[error("Credential issuance failed: {0}")]
    Issuance(#[from] callout_core::CredentialError),

    /// The reply could not be delivered
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors from loading the provider key set
#[derive(Error, Debug)]
pub enum KeySetError {
    /// The configured document is not valid base64
    #[error("Key set is not valid base64: {0}")]
    Decode(String),

    /// The decoded document is not a parseable JWKS
    #[error("Key set is not a valid JWKS document: {0}")]
    Parse(String),

    /// A key entry lacks a required component
    #[error("Key '{kid}' is missing component '{component}'")]
    MissingComponent { kid: String, component: String },

    /// A key entry uses a key type the gateway cannot verify with
    #[error("Key '{kid}' has unsupported key type '{kty}'")]
    UnsupportedKeyType { kid: String, kty: String },

    /// A key entry declares an algorithm the gateway cannot verify with
    #[error("Key '{kid}' declares unsupported algorithm '{alg}'")]
    UnsupportedAlgorithm { kid: String, alg: String },

    /// A key entry's material could not be turned into a verification key
    #[error("Key '{kid}' is invalid: {reason}")]
    InvalidKey { kid: String, reason: String },
}

/// Errors from reading the gateway configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}

/// Startup-fatal errors; there is no partial-startup mode
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration could not be read
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The signing seed could not be loaded
    #[error("Invalid signing identity: {0}")]
    SigningIdentity(String),

    /// The provider key set could not be loaded
    #[error(transparent)]
    KeySet(#[from] KeySetError),

    /// Connecting to the bus failed
    #[error("Bus connection failed: {0}")]
    Connect(String),

    /// Subscribing to the authorization subject failed
    #[error("Subscription failed: {0}")]
    Subscribe(String),
}
