//! Error types for the bus credential model

use thiserror::Error;

/// Result type alias using CredentialError
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors that can occur while encoding, decoding, or signing credentials
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Signing key material could not be loaded
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Signature verification failed
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),

    /// Token is not well-formed compact JWT
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Token header carries an algorithm this trust domain does not use
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        CredentialError::Serialization(err.to_string())
    }
}

impl From<nkeys::error::Error> for CredentialError {
    fn from(err: nkeys::error::Error) -> Self {
        CredentialError::SigningFailed(err.to_string())
    }
}

impl From<base64::DecodeError> for CredentialError {
    fn from(err: base64::DecodeError) -> Self {
        CredentialError::Malformed(err.to_string())
    }
}
