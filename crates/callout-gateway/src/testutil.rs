//! Shared test utilities
//!
//! Helpers for minting provider-signed test tokens from the RSA fixture key
//! in `testdata/` (its public half is the sole entry of the fixture JWKS)
//! and for building authorization-request envelopes the way the bus does.
//! Feature-gated behind `testutil` to keep fixture key material out of
//! production builds.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use callout_core::{jwt, SigningIdentity};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;

/// Key id of the fixture RSA key
pub const TEST_KID: &str = "test-rsa-1";

const PROVIDER_KEY_PEM: &str = include_str!("../testdata/provider_rsa.pem");
const PROVIDER_JWKS: &str = include_str!("../testdata/provider_jwks.json");

/// The fixture JWKS document, base64-encoded the way it is provisioned
pub fn provider_jwks_b64() -> String {
    STANDARD.encode(PROVIDER_JWKS)
}

/// Generate a fresh ephemeral user nkey ("U...")
pub fn user_nkey() -> String {
    nkeys::KeyPair::new_user().public_key()
}

/// Mint a provider token for a principal with the given roles, expiring
/// `expires_in_secs` from now (negative values mint already-expired tokens)
pub fn signed_provider_token(azp: &str, roles: &[&str], expires_in_secs: i64) -> String {
    sign_provider_claims(&json!({
        "azp": azp,
        "realm_access": {"roles": roles},
        "exp": Utc::now().timestamp() + expires_in_secs,
        "iss": "https://provider.test/realms/fleet",
    }))
}

/// Sign arbitrary claims with the fixture key under the fixture kid
pub fn sign_provider_claims(claims: &serde_json::Value) -> String {
    sign_with_header(claims, Some(TEST_KID))
}

/// Sign claims under a caller-chosen kid (e.g. one absent from the JWKS)
pub fn signed_provider_token_with_kid(kid: &str, claims: &serde_json::Value) -> String {
    sign_with_header(claims, Some(kid))
}

/// Sign a token whose header carries no kid at all
pub fn signed_provider_token_without_kid(azp: &str, roles: &[&str]) -> String {
    sign_with_header(
        &json!({
            "azp": azp,
            "realm_access": {"roles": roles},
            "exp": Utc::now().timestamp() + 300,
        }),
        None,
    )
}

fn sign_with_header(claims: &serde_json::Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(PROVIDER_KEY_PEM.as_bytes())
        .expect("fixture RSA key must parse");
    jsonwebtoken::encode(&header, claims, &key).expect("fixture token must sign")
}

/// Assemble a raw compact token from arbitrary segments, for tokens no
/// honest signer would produce
pub fn craft_raw_token(
    header: &serde_json::Value,
    claims: &serde_json::Value,
    signature: &[u8],
) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(signature)
    )
}

/// Build an authorization-request envelope the way a bus server publishes
/// it: claims wrapped in a compact JWT (the gateway parses it without
/// enforcing the server's signature, so any signer suffices)
pub fn auth_request(
    user_nkey: &str,
    server_id: &str,
    auth_token: Option<&str>,
    name: Option<&str>,
) -> Vec<u8> {
    let signer = SigningIdentity::generate();
    let claims = json!({
        "iss": signer.account_id(),
        "sub": user_nkey,
        "iat": Utc::now().timestamp(),
        "nats": {
            "user_nkey": user_nkey,
            "server_id": {"id": server_id},
            "connect_opts": {"auth_token": auth_token, "name": name},
            "type": "authorization_request",
            "version": 2,
        }
    });
    jwt::encode(&claims, &signer)
        .expect("request envelope must encode")
        .into_bytes()
}
