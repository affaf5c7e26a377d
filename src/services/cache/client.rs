//! Key/value cache seam for the verification cache.
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Kept apart from `AppError`: every caller in this crate treats a cache
/// failure as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache {op} failed: {message}")]
    Command { op: &'static str, message: String },
}

impl CacheError {
    pub(crate) fn command(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Command {
            op,
            message: err.to_string(),
        }
    }
}

/// String values with a per-entry expiry.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn fetch(&self, key: &str) -> CacheResult<Option<String>>;

    /// Insert or overwrite; the entry expires after `ttl`.
    async fn store(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// `true` when an entry was removed.
    async fn evict(&self, key: &str) -> CacheResult<bool>;
}
