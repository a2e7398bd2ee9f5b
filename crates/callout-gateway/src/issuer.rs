//! Credential issuance
//!
//! Builds and signs the two credential layers of a callout reply: the inner
//! user credential scoping one connection to its derived permissions, and
//! the outer authorization response envelope addressed to the requesting
//! server. Denials travel in the same signed envelope as grants.

use callout_core::{
    jwt, AuthRequestPayload, AuthResponseClaims, CapabilitySet, CredentialError, SigningIdentity,
    UserClaims,
};
use std::sync::Arc;
use tracing::debug;

/// Issues signed bus credentials with the trust domain's account identity
pub struct CredentialIssuer {
    identity: Arc<SigningIdentity>,
}

impl CredentialIssuer {
    /// Create an issuer over the trust domain's signing identity
    pub fn new(identity: Arc<SigningIdentity>) -> Self {
        Self { identity }
    }

    /// Get the trust-domain account id the issuer signs as
    pub fn account_id(&self) -> &str {
        self.identity.account_id()
    }

    /// Issue a granting response for an authorized request
    ///
    /// The inner credential is bound to the request's ephemeral user nkey,
    /// carries exactly the derived permissions, and expires one hour after
    /// issuance. The outer envelope is addressed to the requesting server.
    pub fn issue(
        &self,
        request: &AuthRequestPayload,
        capabilities: &CapabilitySet,
    ) -> Result<String, CredentialError> {
        let mut user = UserClaims::new(&request.user_nkey, self.account_id())
            .with_permissions(capabilities.to_permissions());
        if let Some(name) = &request.connect_opts.name {
            user = user.with_name(name);
        }
        let user_jwt = jwt::encode(&user, &self.identity)?;

        debug!(
            user = %request.user_nkey,
            server = %request.server_id.id,
            rules = capabilities.len(),
            "Issued user credential"
        );

        let response = AuthResponseClaims::grant(
            self.account_id(),
            &request.user_nkey,
            &request.server_id.id,
            user_jwt,
        );
        jwt::encode(&response, &self.identity)
    }

    /// Sign a denying response carrying a generic error message
    pub fn deny(
        &self,
        user_nkey: &str,
        server_id: &str,
        message: &str,
    ) -> Result<String, CredentialError> {
        let response = AuthResponseClaims::deny(self.account_id(), user_nkey, server_id, message);
        jwt::encode(&response, &self.identity)
    }
}
