//! Authorization decision.
//!
//! `START -> CLASSIFY -> {SKIP | DENY | AUTHENTICATE} -> {ALLOW | FORBID | UNAUTHORIZED}`
//!
//! Only `Allow` lets the endpoint run with a security context attached.
//! `Unauthorized` maps to 401 and `Forbid` to 403; the `Denial` reason is for
//! logs only and never reaches the caller.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::task::{JoinError, JoinHandle};

use super::{
    context::SecurityContext,
    credential::{Credential, Scheme},
    identity::{Role, VerifiedIdentity},
    requirement::SecurityRequirement,
    target::{ExemptPaths, RequestTarget},
};
use crate::services::identity::{IdentityVerifier, VerificationError};

/// Fixed settings of the access guard.
#[derive(Debug, Clone)]
pub struct AccessSettings {
    pub exempt: ExemptPaths,
    // Upper bound for one verification, on top of the client's own timeout.
    pub verify_timeout: Duration,
    /// Honor `X-Forwarded-Proto` for the context's secure flag.
    pub trust_forwarded_proto: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The pipeline does not engage; the endpoint runs without a context.
    Skip,
    Allow(SecurityContext),
    Unauthorized,
    Forbid(Denial),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("operation denies every caller")]
    DeniedPolicy,
    #[error("unsupported authorization scheme: {0}")]
    UnsupportedScheme(Scheme),
    #[error("verification failed: {0}")]
    VerificationFailure(VerificationError),
    #[error("role {0} is not allowed")]
    RoleMismatch(Role),
}

pub async fn authorize(
    settings: &AccessSettings,
    requirement: Option<&SecurityRequirement>,
    target: &RequestTarget,
    authorization: Option<&str>,
    verifier: &Arc<dyn IdentityVerifier>,
) -> Decision {
    if settings.exempt.matches(target) {
        return Decision::Skip;
    }

    let Some(requirement) = requirement else {
        return Decision::Skip;
    };

    if *requirement == SecurityRequirement::Denied {
        return Decision::Forbid(Denial::DeniedPolicy);
    }

    let credential = Credential::parse(authorization);

    if credential.is_none() {
        return Decision::Unauthorized;
    }

    let Some(token) = credential.bearer() else {
        return Decision::Forbid(Denial::UnsupportedScheme(credential.scheme().clone()));
    };

    let identity = match verify_bearer(verifier, token, settings.verify_timeout).await {
        Ok(identity) => identity,
        Err(err) => return Decision::Forbid(Denial::VerificationFailure(err)),
    };

    if !requirement.admits(identity.role()) {
        return Decision::Forbid(Denial::RoleMismatch(identity.role()));
    }

    Decision::Allow(SecurityContext::bearer(identity, target.is_secure()))
}

/// Run one verification on its own task.
///
/// A panicking verifier becomes `VerificationError::Fault`, a slow one
/// `VerificationError::Timeout`. The task is aborted on timeout and when the
/// caller's future is dropped.
async fn verify_bearer(
    verifier: &Arc<dyn IdentityVerifier>,
    token: &str,
    timeout: Duration,
) -> Result<VerifiedIdentity, VerificationError> {
    if token.is_empty() {
        return Err(VerificationError::EmptyToken);
    }

    let verifier = Arc::clone(verifier);
    let token = token.to_string();
    let task = AbortOnDrop(tokio::spawn(async move { verifier.verify(&token).await }));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(VerificationError::Fault(join_err.to_string())),
        Err(_) => Err(VerificationError::Timeout),
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
