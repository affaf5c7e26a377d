//! Short-lived cache in front of another verifier.
//!
//! Entries are keyed on a digest of the exact bearer parameter and only
//! successful verifications are stored, so a revoked token stops working
//! once its entry expires. Cache backend failures fall through to the
//! wrapped verifier.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::security::identity::VerifiedIdentity;
use crate::services::cache::CacheClient;
use crate::services::identity::verifier::{IdentityVerifier, VerificationError};

pub struct CachedIdentityVerifier<C: CacheClient> {
    inner: Arc<dyn IdentityVerifier>,
    cache: Arc<C>,
    ttl: Duration,
    // Key prefix to avoid collisions with other users of the same backend
    prefix: String,
}

impl<C: CacheClient> CachedIdentityVerifier<C> {
    pub fn new(inner: Arc<dyn IdentityVerifier>, cache: Arc<C>, ttl: Duration) -> Self {
        Self::new_with_prefix(inner, cache, ttl, "identity:verified")
    }

    pub fn new_with_prefix(
        inner: Arc<dyn IdentityVerifier>,
        cache: Arc<C>,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            prefix: prefix.into(),
        }
    }

    // The raw token never reaches the cache backend.
    pub fn key(&self, bearer: &str) -> String {
        let digest = Sha256::digest(bearer.as_bytes());
        format!("{}:{}", self.prefix, URL_SAFE_NO_PAD.encode(digest))
    }

    async fn lookup(&self, key: &str) -> Option<VerifiedIdentity> {
        let raw = match self.cache.fetch(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    backend = self.cache.backend_name(),
                    error = %err,
                    "verification cache read failed"
                );
                return None;
            }
        };

        match serde_json::from_str::<VerifiedIdentity>(&raw) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "dropping unreadable verification cache entry");
                if let Err(err) = self.cache.evict(key).await {
                    tracing::warn!(error = %err, "verification cache delete failed");
                }
                None
            }
        }
    }

    async fn store(&self, key: &str, identity: &VerifiedIdentity) {
        let raw = match serde_json::to_string(identity) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "identity not cacheable");
                return;
            }
        };

        if let Err(err) = self.cache.store(key, &raw, self.ttl).await {
            tracing::warn!(
                backend = self.cache.backend_name(),
                error = %err,
                "verification cache write failed"
            );
        }
    }
}

#[async_trait]
impl<C: CacheClient> IdentityVerifier for CachedIdentityVerifier<C> {
    fn name(&self) -> &'static str {
        "cached"
    }

    async fn verify(&self, bearer: &str) -> Result<VerifiedIdentity, VerificationError> {
        let key = self.key(bearer);

        if let Some(identity) = self.lookup(&key).await {
            tracing::debug!(user_id = identity.id(), "verification cache hit");
            return Ok(identity);
        }

        let identity = self.inner.verify(bearer).await?;
        self.store(&key, &identity).await;

        Ok(identity)
    }
}
