use async_trait::async_trait;
use thiserror::Error;

use crate::security::identity::VerifiedIdentity;

/// Why a bearer parameter could not be turned into an identity.
///
/// Every variant is a verification failure; none of them is ever treated as
/// "no identity, carry on".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("empty bearer token")]
    EmptyToken,
    #[error("identity service unreachable: {0}")]
    Transport(String),
    #[error("identity service timed out")]
    Timeout,
    #[error("identity service rejected the token with status {0}")]
    Rejected(u16),
    #[error("identity service returned an unreadable body: {0}")]
    Malformed(String),
    #[error("identity service returned no identity")]
    NoIdentity,
    #[error("verifier fault: {0}")]
    Fault(String),
}

/// Turns a bearer parameter into a verified identity.
///
/// The pipeline only ever hands bearer parameters to a verifier; other
/// schemes are rejected before this point.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    // Verifier name (for logging).
    fn name(&self) -> &'static str;

    async fn verify(&self, bearer: &str) -> Result<VerifiedIdentity, VerificationError>;
}
