//! Trust-domain signing identity
//!
//! The gateway signs every credential it issues with the trust domain's
//! Ed25519 account key, loaded once from nkey seed material at startup.
//! The seed never leaves this module and never appears in `Debug` output.

use crate::error::{CredentialError, Result};
use nkeys::KeyPair;

/// The trust domain's long-lived account signing identity
pub struct SigningIdentity {
    keypair: KeyPair,
    /// Public account id ("A..."), cached since `public_key()` allocates
    account_id: String,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("account_id", &self.account_id)
            .field("seed", &"[redacted]")
            .finish()
    }
}

impl SigningIdentity {
    /// Load the identity from an account nkey seed ("SA...")
    pub fn from_seed(seed: &str) -> Result<Self> {
        let keypair =
            KeyPair::from_seed(seed).map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        let account_id = keypair.public_key();
        if !account_id.starts_with('A') {
            return Err(CredentialError::InvalidKey(
                "seed is not an account key".into(),
            ));
        }
        Ok(Self {
            keypair,
            account_id,
        })
    }

    /// Generate a fresh account identity
    pub fn generate() -> Self {
        let keypair = KeyPair::new_account();
        let account_id = keypair.public_key();
        Self {
            keypair,
            account_id,
        }
    }

    /// Get the public account id
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Sign arbitrary bytes with the account key
    pub fn sign(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.keypair
            .sign(input)
            .map_err(|e| CredentialError::SigningFailed(e.to_string()))
    }
}

/// Verify an Ed25519 signature against a public nkey ("A...", "U...", ...)
pub fn verify_signature(public_key: &str, input: &[u8], signature: &[u8]) -> Result<()> {
    let verifier = KeyPair::from_public_key(public_key)
        .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
    verifier
        .verify(input, signature)
        .map_err(|e| CredentialError::SignatureInvalid(e.to_string()))
}
