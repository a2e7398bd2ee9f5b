//! Compact JWT encoding for the bus's native `ed25519-nkey` algorithm
//!
//! The bus exchanges credentials as three base64url segments
//! (`header.payload.signature`) signed with nkey Ed25519 keys. This module
//! owns that framing; claim structure lives in [`crate::credential`].

use crate::error::{CredentialError, Result};
use crate::signing::{verify_signature, SigningIdentity};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Signature algorithm identifier used by the bus
pub const ALGORITHM: &str = "ed25519-nkey";

/// Compact JWT header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, always "JWT"
    pub typ: String,
    /// Signature algorithm
    pub alg: String,
}

impl Header {
    fn new() -> Self {
        Self {
            typ: "JWT".into(),
            alg: ALGORITHM.into(),
        }
    }
}

/// Encode claims into a compact JWT signed by the trust-domain identity
pub fn encode<T: Serialize>(claims: &T, identity: &SigningIdentity) -> Result<String> {
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::new())?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{}.{}", header, payload);
    let signature = identity.sign(signing_input.as_bytes())?;
    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Decode the claims of a compact JWT without verifying its signature
///
/// The header is still parsed and its algorithm checked, so a token signed
/// under a foreign scheme is rejected before its payload is interpreted.
pub fn decode_unverified<T: DeserializeOwned>(token: &str) -> Result<T> {
    let (header, payload, _) = split(token)?;
    check_algorithm(&header)?;
    parse_segment(payload)
}

/// Decode the claims of a compact JWT, verifying its signature against the
/// expected issuer's public nkey
pub fn decode_verified<T: DeserializeOwned>(token: &str, issuer: &str) -> Result<T> {
    let (header, payload, signature) = split(token)?;
    check_algorithm(&header)?;
    let signing_input = &token[..token.len() - signature.len() - 1];
    let signature = URL_SAFE_NO_PAD.decode(signature)?;
    verify_signature(issuer, signing_input.as_bytes(), &signature)?;
    parse_segment(payload)
}

fn split(token: &str) -> Result<(Header, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => {
            let header: Header = parse_segment(header)?;
            Ok((header, payload, signature))
        }
        _ => Err(CredentialError::Malformed(
            "expected three dot-separated segments".into(),
        )),
    }
}

fn check_algorithm(header: &Header) -> Result<()> {
    if header.alg != ALGORITHM {
        return Err(CredentialError::UnsupportedAlgorithm(header.alg.clone()));
    }
    Ok(())
}

fn parse_segment<T: DeserializeOwned>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_decode_roundtrip() {
        let identity = SigningIdentity::generate();
        let claims = json!({"sub": "UABC", "name": "edge-7"});

        let token = encode(&claims, &identity).unwrap();
        let decoded: serde_json::Value = decode_unverified(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_verified_accepts_issuer_key() {
        let identity = SigningIdentity::generate();
        let claims = json!({"sub": "UABC"});

        let token = encode(&claims, &identity).unwrap();
        let decoded: serde_json::Value =
            decode_verified(&token, identity.account_id()).unwrap();
        assert_eq!(decoded["sub"], "UABC");
    }

    #[test]
    fn test_decode_verified_rejects_wrong_key() {
        let identity = SigningIdentity::generate();
        let other = SigningIdentity::generate();

        let token = encode(&json!({"sub": "UABC"}), &identity).unwrap();
        let result: Result<serde_json::Value> = decode_verified(&token, other.account_id());
        assert!(matches!(result, Err(CredentialError::SignatureInvalid(_))));
    }

    #[test]
    fn test_decode_verified_rejects_tampered_payload() {
        let identity = SigningIdentity::generate();
        let token = encode(&json!({"sub": "UABC"}), &identity).unwrap();

        let forged_payload = URL_SAFE_NO_PAD.encode(b"{\"sub\":\"UEVIL\"}");
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        let result: Result<serde_json::Value> =
            decode_verified(&forged, identity.account_id());
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        let result: Result<serde_json::Value> = decode_unverified("only.two");
        assert!(matches!(result, Err(CredentialError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_foreign_algorithm() {
        let header = URL_SAFE_NO_PAD.encode(b"{\"typ\":\"JWT\",\"alg\":\"RS256\"}");
        let payload = URL_SAFE_NO_PAD.encode(b"{}");
        let token = format!("{}.{}.c2ln", header, payload);

        let result: Result<serde_json::Value> = decode_unverified(&token);
        assert!(matches!(
            result,
            Err(CredentialError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_header_shape() {
        let identity = SigningIdentity::generate();
        let token = encode(&json!({}), &identity).unwrap();
        let header_segment = token.split('.').next().unwrap();
        let header: Header =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_segment).unwrap()).unwrap();
        assert_eq!(header.typ, "JWT");
        assert_eq!(header.alg, ALGORITHM);
    }
}
