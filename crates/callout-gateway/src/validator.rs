//! External token validation
//!
//! Verifies an inbound bearer token against the provisioned provider key
//! set and extracts the claims the gateway derives authority from. Claim
//! extraction is fully typed: a token that verifies cryptographically but
//! carries wrong-shaped claims is rejected, never partially accepted.

use crate::error::ValidationError;
use crate::keyset::ProviderKeySet;
use jsonwebtoken::{decode, decode_header, Validation};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Claims extracted from a validated provider token
///
/// Built fresh per request; never cached or persisted.
#[derive(Debug, Clone)]
pub struct ExternalClaims {
    /// Principal identifier (the authorized-party claim)
    pub principal: String,
    /// Role names granted by the provider
    pub roles: Vec<String>,
    /// Token expiry (seconds since epoch)
    pub expires_at: i64,
    /// Provider issuer, if the token names one
    pub issuer: Option<String>,
    /// Key id the token was verified against
    pub key_id: String,
}

/// Raw claim payload; principal and roles are extracted with explicit shape
/// checks after signature verification
#[derive(Debug, Deserialize)]
struct RawClaims {
    exp: i64,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    azp: Option<serde_json::Value>,
    #[serde(default)]
    realm_access: Option<serde_json::Value>,
}

/// Validates provider tokens against the provisioned key set
pub struct TokenValidator {
    keys: Arc<ProviderKeySet>,
}

impl TokenValidator {
    /// Create a validator over a provider key set
    pub fn new(keys: Arc<ProviderKeySet>) -> Self {
        Self { keys }
    }

    /// Validate a bearer token and extract its typed claims
    ///
    /// Any failure yields no claims. The raw token is never logged in full.
    pub fn validate(&self, token: &str) -> Result<ExternalClaims, ValidationError> {
        let header =
            decode_header(token).map_err(|e| ValidationError::MalformedToken(e.to_string()))?;
        let kid = header
            .kid
            .filter(|kid| !kid.is_empty())
            .ok_or_else(|| ValidationError::MalformedToken("token carries no key id".into()))?;

        let key = self.keys.resolve(&kid).ok_or_else(|| {
            warn!(kid = %kid, "Token references a key id outside the provisioned set");
            ValidationError::UnknownKeyId(kid.clone())
        })?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;
        validation.leeway = 0;

        let data = decode::<RawClaims>(token, &key.decoding_key, &validation)?;
        let claims = data.claims;

        let principal = claims
            .azp
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .filter(|azp| !azp.is_empty())
            .ok_or_else(|| {
                ValidationError::ClaimShape("azp must be a non-empty string".into())
            })?
            .to_string();

        let roles = extract_roles(claims.realm_access.as_ref())?;

        Ok(ExternalClaims {
            principal,
            roles,
            expires_at: claims.exp,
            issuer: claims.iss,
            key_id: kid,
        })
    }
}

fn extract_roles(
    realm_access: Option<&serde_json::Value>,
) -> Result<Vec<String>, ValidationError> {
    let roles = realm_access
        .and_then(|v| v.get("roles"))
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            ValidationError::ClaimShape("realm_access.roles must be an array".into())
        })?;

    roles
        .iter()
        .map(|role| {
            role.as_str().map(String::from).ok_or_else(|| {
                ValidationError::ClaimShape("realm_access.roles entries must be strings".into())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;

    fn validator() -> TokenValidator {
        let keys = ProviderKeySet::from_base64(&testutil::provider_jwks_b64()).unwrap();
        TokenValidator::new(Arc::new(keys))
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let token = testutil::signed_provider_token("VIN123", &["edge-device"], 300);

        let claims = validator().validate(&token).unwrap();
        assert_eq!(claims.principal, "VIN123");
        assert_eq!(claims.roles, vec!["edge-device"]);
        assert_eq!(claims.key_id, testutil::TEST_KID);
        assert!(claims.issuer.is_some());
    }

    #[test]
    fn test_unknown_kid_rejected_before_signature_check() {
        let token = testutil::signed_provider_token_with_kid(
            "rotated-away",
            &json!({
                "azp": "VIN123",
                "realm_access": {"roles": ["edge-device"]},
                "exp": chrono::Utc::now().timestamp() + 300,
            }),
        );

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownKeyId(kid) if kid == "rotated-away"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = testutil::signed_provider_token("VIN123", &["edge-device"], -120);

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::Expired));
    }

    #[test]
    fn test_missing_kid_rejected() {
        let token = testutil::signed_provider_token_without_kid("VIN123", &["edge-device"]);

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedToken(_)));
    }

    #[test]
    fn test_forged_signature_rejected() {
        let token = testutil::signed_provider_token("VIN123", &["edge-device"], 300);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "Zm9yZ2Vk";
        let forged = parts.join(".");

        let err = validator().validate(&forged).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::SignatureInvalid(_) | ValidationError::MalformedToken(_)
        ));
    }

    #[test]
    fn test_wrong_shaped_roles_rejected() {
        let token = testutil::sign_provider_claims(&json!({
            "azp": "VIN123",
            "realm_access": "not-an-object",
            "exp": chrono::Utc::now().timestamp() + 300,
        }));

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::ClaimShape(_)));
    }

    #[test]
    fn test_non_string_role_entries_rejected() {
        let token = testutil::sign_provider_claims(&json!({
            "azp": "VIN123",
            "realm_access": {"roles": ["edge-device", 42]},
            "exp": chrono::Utc::now().timestamp() + 300,
        }));

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::ClaimShape(_)));
    }

    #[test]
    fn test_missing_realm_access_rejected() {
        let token = testutil::sign_provider_claims(&json!({
            "azp": "VIN123",
            "exp": chrono::Utc::now().timestamp() + 300,
        }));

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::ClaimShape(_)));
    }

    #[test]
    fn test_missing_principal_rejected() {
        let token = testutil::sign_provider_claims(&json!({
            "realm_access": {"roles": ["edge-device"]},
            "exp": chrono::Utc::now().timestamp() + 300,
        }));

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::ClaimShape(_)));
    }

    #[test]
    fn test_empty_principal_rejected() {
        let token = testutil::sign_provider_claims(&json!({
            "azp": "",
            "realm_access": {"roles": []},
            "exp": chrono::Utc::now().timestamp() + 300,
        }));

        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, ValidationError::ClaimShape(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = validator().validate("not-a-jwt").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedToken(_)));
    }
}
