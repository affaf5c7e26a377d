/// Factory: build the identity verifier from application `Config`.
use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::config::Config;
use crate::services::cache::ValkeyClient;
use crate::services::identity::{CachedIdentityVerifier, IdentityVerifier, RemoteIdentityVerifier};

pub async fn build_identity_verifier(config: &Config) -> anyhow::Result<Arc<dyn IdentityVerifier>> {
    let remote = RemoteIdentityVerifier::new(&config.auth_check_endpoint, config.auth_check_timeout)
        .context("building identity service client")?;

    tracing::info!(check_url = %remote.check_url(), "identity verification via remote endpoint");

    let remote: Arc<dyn IdentityVerifier> = Arc::new(remote);

    let Some(cache_url) = config.verify_cache_url.as_deref() else {
        return Ok(remote);
    };

    let cache = ValkeyClient::connect(cache_url)
        .await
        .context("connecting verification cache")?;

    tracing::info!(
        ttl_seconds = config.verify_cache_ttl_seconds,
        "verification cache enabled"
    );

    Ok(Arc::new(CachedIdentityVerifier::new(
        remote,
        Arc::new(cache),
        Duration::from_secs(config.verify_cache_ttl_seconds),
    )))
}
