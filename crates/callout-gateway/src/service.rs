//! The authorization callout service
//!
//! Subscribes to the bus's reserved authorization subject and answers every
//! request with exactly one signed response. Each inbound request runs in
//! its own task; shared state is immutable after startup.

use crate::error::{AuthError, StartupError, ValidationError};
use crate::issuer::CredentialIssuer;
use crate::policy;
use crate::validator::TokenValidator;
use callout_core::{jwt, AuthRequestClaims, AuthResponseClaims};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reserved subject the bus publishes authorization requests on
pub const AUTH_CALLOUT_SUBJECT: &str = "$SYS.REQ.USER.AUTH";

/// The one error message callers ever see. Validation detail stays in local
/// logs so failed attempts cannot probe the key set or policy.
const DENIAL_MESSAGE: &str = "authorization failed";

/// Identities recovered from a request, used to address its response
#[derive(Default)]
struct RequestContext {
    user_nkey: String,
    server_id: String,
}

/// Orchestrates decode, validation, capability derivation, and issuance for
/// every authorization request
pub struct CalloutService {
    validator: Arc<TokenValidator>,
    issuer: Arc<CredentialIssuer>,
}

impl CalloutService {
    /// Create the service over its validator and issuer
    pub fn new(validator: Arc<TokenValidator>, issuer: Arc<CredentialIssuer>) -> Self {
        Self { validator, issuer }
    }

    /// Subscribe to the authorization subject and serve requests until the
    /// subscription ends
    pub async fn run(self: Arc<Self>, client: async_nats::Client) -> Result<(), StartupError> {
        let mut subscription = client
            .subscribe(AUTH_CALLOUT_SUBJECT)
            .await
            .map_err(|e| StartupError::Subscribe(e.to_string()))?;

        info!(subject = AUTH_CALLOUT_SUBJECT, "Listening for authorization requests");

        while let Some(message) = subscription.next().await {
            let service = Arc::clone(&self);
            let client = client.clone();
            tokio::spawn(async move {
                let Some(reply) = message.reply else {
                    warn!("Authorization request carried no reply subject, dropping");
                    return;
                };
                let body = service.answer(&message.payload);
                if let Err(e) = client.publish(reply, body.into()).await {
                    error!(error = %e, "Failed to deliver authorization reply");
                }
            });
        }

        Ok(())
    }

    /// Answer a single authorization request
    ///
    /// Terminal in exactly one reply body: a signed grant, a signed denial,
    /// or (if the denial itself cannot be signed) an unsigned denial rather
    /// than silence.
    pub fn answer(&self, payload: &[u8]) -> Vec<u8> {
        let mut context = RequestContext::default();
        match self.process(payload, &mut context) {
            Ok(envelope) => envelope.into_bytes(),
            Err(err) => {
                match &err {
                    AuthError::Issuance(_) => error!(
                        user = %context.user_nkey,
                        server = %context.server_id,
                        error = %err,
                        "Denying authorization request"
                    ),
                    _ => warn!(
                        user = %context.user_nkey,
                        server = %context.server_id,
                        error = %err,
                        "Denying authorization request"
                    ),
                }
                self.denial(&context)
            }
        }
    }

    /// Decode, validate, derive, issue
    fn process(
        &self,
        payload: &[u8],
        context: &mut RequestContext,
    ) -> Result<String, AuthError> {
        let raw = std::str::from_utf8(payload)
            .map_err(|e| AuthError::Decode(format!("request is not UTF-8: {}", e)))?;
        let request: AuthRequestClaims = jwt::decode_unverified(raw)
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        context.user_nkey = request.nats.user_nkey.clone();
        context.server_id = request.nats.server_id.id.clone();

        let token = request
            .nats
            .connect_opts
            .auth_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AuthError::Validation(ValidationError::MalformedToken(
                    "connect options carry no bearer token".into(),
                ))
            })?;

        let claims = self.validator.validate(token)?;
        let capabilities = policy::derive_capabilities(&claims.principal, &claims.roles);

        let envelope = self.issuer.issue(&request.nats, &capabilities)?;

        info!(
            principal = %claims.principal,
            user = %context.user_nkey,
            server = %context.server_id,
            rules = capabilities.len(),
            "Authorized connection"
        );

        Ok(envelope)
    }

    /// Build the denial reply, falling back to an unsigned envelope if even
    /// the denial cannot be signed (silence would block the connection
    /// globally)
    fn denial(&self, context: &RequestContext) -> Vec<u8> {
        match self
            .issuer
            .deny(&context.user_nkey, &context.server_id, DENIAL_MESSAGE)
        {
            Ok(envelope) => envelope.into_bytes(),
            Err(sign_err) => {
                error!(error = %sign_err, "Failed to sign denial, replying unsigned");
                let claims = AuthResponseClaims::deny(
                    self.issuer.account_id(),
                    &context.user_nkey,
                    &context.server_id,
                    DENIAL_MESSAGE,
                );
                serde_json::to_vec(&claims)
                    .unwrap_or_else(|_| DENIAL_MESSAGE.as_bytes().to_vec())
            }
        }
    }
}
