//! Claim types for the bus's authorization callout exchange
//!
//! Three claim sets travel through the gateway: the inbound authorization
//! request published by the bus, the inner user credential the gateway
//! issues, and the outer authorization response envelope that carries either
//! that credential or a denial.

use crate::permissions::Permissions;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Audience of every issued user credential: the global account marker
pub const GLOBAL_ACCOUNT: &str = "$G";

/// Maximum lifetime of an issued user credential
pub const USER_CREDENTIAL_TTL_SECS: i64 = 3600;

/// Claim type carried in issued user credentials
pub const USER_CLAIM_TYPE: &str = "user";

/// Claim type carried in authorization response envelopes
pub const AUTH_RESPONSE_CLAIM_TYPE: &str = "authorization_response";

/// Claim schema version used by the bus
pub const CLAIM_VERSION: u8 = 2;

/// Inbound authorization request published by the bus, one per connection
/// attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequestClaims {
    /// Issuing server's key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Ephemeral user nkey (mirrors `nats.user_nkey`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued-at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Request payload
    pub nats: AuthRequestPayload,
}

/// Payload of an authorization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequestPayload {
    /// Ephemeral public nkey assigned to the connecting client
    pub user_nkey: String,
    /// The bus server handling the connection
    pub server_id: ServerInfo,
    /// Options the client presented at connect time
    #[serde(default)]
    pub connect_opts: ConnectOptions,
}

/// Identity of the bus server that published a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Unique server id; becomes the audience of the response
    pub id: String,
    /// Server name, if configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Host the server listens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Client connect options relevant to authorization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Externally issued bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Display name requested by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Inner user credential issued on a successful authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Trust-domain account id
    pub iss: String,
    /// Ephemeral user nkey the credential is bound to
    pub sub: String,
    /// Always the global account marker
    pub aud: String,
    /// Display name requested by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiry, at most one hour after issuance
    pub exp: i64,
    /// User payload
    pub nats: UserPayload,
}

/// Payload of a user credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    /// Claim type marker
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim schema version
    pub version: u8,
    /// Granted publish/subscribe permissions
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl UserClaims {
    /// Create a user credential bound to an ephemeral user nkey, valid for
    /// the maximum credential lifetime starting now
    pub fn new(subject: impl Into<String>, issuer: impl Into<String>) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: GLOBAL_ACCOUNT.into(),
            name: None,
            iat,
            exp: iat + USER_CREDENTIAL_TTL_SECS,
            nats: UserPayload {
                claim_type: USER_CLAIM_TYPE.into(),
                version: CLAIM_VERSION,
                permissions: Permissions::default(),
            },
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the granted permissions
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.nats.permissions = permissions;
        self
    }
}

/// Outer authorization response envelope, returned for every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponseClaims {
    /// Trust-domain account id
    pub iss: String,
    /// Ephemeral user nkey from the request (empty when the request could
    /// not be decoded)
    #[serde(default)]
    pub sub: String,
    /// Requesting server id
    #[serde(default)]
    pub aud: String,
    /// Issued-at timestamp
    pub iat: i64,
    /// Response payload
    pub nats: AuthResponsePayload,
}

/// Payload of an authorization response: a credential or an error, never
/// both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponsePayload {
    /// Claim type marker
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim schema version
    pub version: u8,
    /// Encoded user credential on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    /// Account that signed the user credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_account: Option<String>,
    /// Generic denial message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponseClaims {
    fn envelope(issuer: &str, user_nkey: &str, server_id: &str) -> Self {
        Self {
            iss: issuer.into(),
            sub: user_nkey.into(),
            aud: server_id.into(),
            iat: Utc::now().timestamp(),
            nats: AuthResponsePayload {
                claim_type: AUTH_RESPONSE_CLAIM_TYPE.into(),
                version: CLAIM_VERSION,
                jwt: None,
                issuer_account: None,
                error: None,
            },
        }
    }

    /// Build a granting response carrying an issued user credential
    pub fn grant(issuer: &str, user_nkey: &str, server_id: &str, user_jwt: String) -> Self {
        let mut claims = Self::envelope(issuer, user_nkey, server_id);
        claims.nats.jwt = Some(user_jwt);
        claims.nats.issuer_account = Some(issuer.into());
        claims
    }

    /// Build a denying response carrying a generic error message
    pub fn deny(issuer: &str, user_nkey: &str, server_id: &str, message: impl Into<String>) -> Self {
        let mut claims = Self::envelope(issuer, user_nkey, server_id);
        claims.nats.error = Some(message.into());
        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{CapabilityRule, CapabilitySet};

    #[test]
    fn test_user_claims_defaults() {
        let claims = UserClaims::new("UUSER", "AACCT");
        assert_eq!(claims.aud, GLOBAL_ACCOUNT);
        assert_eq!(claims.exp - claims.iat, USER_CREDENTIAL_TTL_SECS);
        assert_eq!(claims.nats.claim_type, USER_CLAIM_TYPE);
        assert_eq!(claims.nats.version, CLAIM_VERSION);
        assert!(claims.nats.permissions.publish.allow.is_empty());
    }

    #[test]
    fn test_user_payload_wire_shape() {
        let mut set = CapabilitySet::new();
        set.add(CapabilityRule::subscribe("commands.V1.>"));
        let claims = UserClaims::new("UUSER", "AACCT")
            .with_name("edge-7")
            .with_permissions(set.to_permissions());

        let encoded = serde_json::to_value(&claims).unwrap();
        assert_eq!(encoded["name"], "edge-7");
        assert_eq!(encoded["nats"]["type"], "user");
        assert_eq!(encoded["nats"]["version"], 2);
        assert_eq!(
            encoded["nats"]["sub"]["allow"],
            serde_json::json!(["commands.V1.>"])
        );
    }

    #[test]
    fn test_grant_response_shape() {
        let claims = AuthResponseClaims::grant("AACCT", "UUSER", "SRV1", "inner".into());
        assert_eq!(claims.aud, "SRV1");
        assert_eq!(claims.nats.issuer_account.as_deref(), Some("AACCT"));
        assert_eq!(claims.nats.jwt.as_deref(), Some("inner"));
        assert!(claims.nats.error.is_none());
    }

    #[test]
    fn test_deny_response_shape() {
        let claims = AuthResponseClaims::deny("AACCT", "UUSER", "SRV1", "authorization failed");
        assert!(claims.nats.jwt.is_none());
        assert_eq!(claims.nats.error.as_deref(), Some("authorization failed"));

        let encoded = serde_json::to_value(&claims).unwrap();
        assert!(encoded["nats"].get("jwt").is_none());
    }

    #[test]
    fn test_request_parses_with_unknown_fields() {
        let raw = serde_json::json!({
            "iss": "NSERVER",
            "sub": "UUSER",
            "iat": 1700000000,
            "nats": {
                "user_nkey": "UUSER",
                "server_id": {"id": "SRV1", "name": "hub", "cluster": "c1"},
                "connect_opts": {"auth_token": "tok", "name": "edge-7", "lang": "go"},
                "type": "authorization_request",
                "version": 2
            }
        });

        let claims: AuthRequestClaims = serde_json::from_value(raw).unwrap();
        assert_eq!(claims.nats.user_nkey, "UUSER");
        assert_eq!(claims.nats.server_id.id, "SRV1");
        assert_eq!(claims.nats.connect_opts.auth_token.as_deref(), Some("tok"));
        assert_eq!(claims.nats.connect_opts.name.as_deref(), Some("edge-7"));
    }

    #[test]
    fn test_request_tolerates_missing_connect_opts() {
        let raw = serde_json::json!({
            "nats": {
                "user_nkey": "UUSER",
                "server_id": {"id": "SRV1"}
            }
        });

        let claims: AuthRequestClaims = serde_json::from_value(raw).unwrap();
        assert!(claims.nats.connect_opts.auth_token.is_none());
    }
}
