//! Provider key set
//!
//! The external provider's JWKS document is provisioned as a base64-encoded
//! configuration value and parsed once at startup into ready-to-use
//! verification keys. There is no background refresh; rotating provider keys
//! requires a restart. The set is read-only afterwards, so concurrent
//! lookups need no synchronization.

use crate::error::KeySetError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use std::collections::HashMap;

/// A verification key resolved from the provider's JWKS
pub struct ResolvedKey {
    /// Algorithm to verify with, implied by the key entry
    pub algorithm: Algorithm,
    /// The prepared decoding key
    pub decoding_key: DecodingKey,
}

/// JWKS document shape
#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<ProviderJwk>,
}

/// Individual JWK entry; only RSA signing keys are supported
#[derive(Debug, Deserialize)]
struct ProviderJwk {
    kid: Option<String>,
    kty: String,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// The external provider's public key set, indexed by key id
pub struct ProviderKeySet {
    keys: HashMap<String, ResolvedKey>,
}

impl ProviderKeySet {
    /// Parse a base64-encoded JWKS document into a key set
    ///
    /// Every entry must be usable: an unsupported key type or unparseable
    /// key material fails construction rather than leaving a kid that
    /// resolves to nothing.
    pub fn from_base64(encoded: &str) -> Result<Self, KeySetError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeySetError::Decode(e.to_string()))?;
        let document: JwksDocument =
            serde_json::from_slice(&bytes).map_err(|e| KeySetError::Parse(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in document.keys {
            let kid = jwk.kid.clone().ok_or_else(|| KeySetError::MissingComponent {
                kid: "<unnamed>".into(),
                component: "kid".into(),
            })?;
            let resolved = resolve_jwk(&kid, &jwk)?;
            keys.insert(kid, resolved);
        }

        Ok(Self { keys })
    }

    /// Resolve a verification key by key id
    pub fn resolve(&self, kid: &str) -> Option<&ResolvedKey> {
        self.keys.get(kid)
    }

    /// Get the number of resolvable keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check whether the set holds no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn resolve_jwk(kid: &str, jwk: &ProviderJwk) -> Result<ResolvedKey, KeySetError> {
    match jwk.kty.as_str() {
        "RSA" => {
            let algorithm = match jwk.alg.as_deref() {
                None | Some("RS256") => Algorithm::RS256,
                Some("RS384") => Algorithm::RS384,
                Some("RS512") => Algorithm::RS512,
                Some(other) => {
                    return Err(KeySetError::UnsupportedAlgorithm {
                        kid: kid.into(),
                        alg: other.into(),
                    })
                }
            };
            let n = jwk.n.as_deref().ok_or_else(|| KeySetError::MissingComponent {
                kid: kid.into(),
                component: "n".into(),
            })?;
            let e = jwk.e.as_deref().ok_or_else(|| KeySetError::MissingComponent {
                kid: kid.into(),
                component: "e".into(),
            })?;
            let decoding_key =
                DecodingKey::from_rsa_components(n, e).map_err(|e| KeySetError::InvalidKey {
                    kid: kid.into(),
                    reason: e.to_string(),
                })?;
            Ok(ResolvedKey {
                algorithm,
                decoding_key,
            })
        }
        kty => Err(KeySetError::UnsupportedKeyType {
            kid: kid.into(),
            kty: kty.into(),
        }),
    }
}
