/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: verifier: IdentityVerifier, access: AccessSettings
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエスト間で共有される可変状態は持たない
 */
use std::sync::Arc;

use crate::config::Config;
use crate::security::{AccessSettings, ExemptPaths};
use crate::services::identity::IdentityVerifier;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub access: Arc<AccessSettings>,
}

impl AppState {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, access: AccessSettings) -> Self {
        Self {
            verifier,
            access: Arc::new(access),
        }
    }

    pub fn from_config(config: &Config, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let access = AccessSettings {
            exempt: ExemptPaths::new(
                config.introspection_path_prefix.clone(),
                &config.auth_check_endpoint,
                config.public_base_url.as_ref(),
            ),
            verify_timeout: config.auth_check_timeout,
            trust_forwarded_proto: config.trust_forwarded_proto,
        };

        Self::new(verifier, access)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.verifier.name())
            .field("access", &self.access)
            .finish()
    }
}
